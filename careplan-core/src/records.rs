//! Concrete completable record kinds: action items and the follow-up family.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::completion::{Completable, Completion};
use crate::error::{TrackerError, TrackerResult};
use crate::note::{EntryKind, Note, NoteHeader};
use crate::text::{ActorRef, NonEmptyText};

macro_rules! impl_note {
    ($ty:ty, $kind:expr) => {
        impl Note for $ty {
            fn header(&self) -> &NoteHeader {
                &self.header
            }

            fn header_mut(&mut self) -> &mut NoteHeader {
                &mut self.header
            }

            fn kind(&self) -> EntryKind {
                $kind
            }
        }
    };
}

pub(crate) use impl_note;

fn required_text(kind: EntryKind, field: &str, value: &str) -> TrackerResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|_| TrackerError::ContractViolation {
        kind: kind.as_str(),
        detail: format!("{field} must not be empty"),
    })
}

fn with_comments(base: String, comments: &str) -> String {
    let comments = comments.trim();
    if comments.is_empty() {
        base
    } else {
        format!("{base}: {comments}")
    }
}

/// A task someone must carry out for a patient by a due date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionItem {
    #[serde(flatten)]
    pub header: NoteHeader,
    /// What kind of action this is, e.g. "Call patient". Doubles as the short label.
    pub instruction: NonEmptyText,
    #[serde(default)]
    pub priority: bool,
    pub comments: NonEmptyText,
    due_date: NaiveDate,
    #[serde(flatten)]
    completion: Completion,
}

impl ActionItem {
    pub fn new(
        header: NoteHeader,
        instruction: &str,
        comments: &str,
        due_date: NaiveDate,
    ) -> TrackerResult<Self> {
        Ok(Self {
            header,
            instruction: required_text(EntryKind::ActionItem, "instruction", instruction)?,
            priority: false,
            comments: required_text(EntryKind::ActionItem, "comments", comments)?,
            due_date,
            completion: Completion::open(),
        })
    }

    /// Who is responsible for the item's current state, for display next to it.
    pub fn attribution(&self) -> String {
        match (self.completion.author(), self.completion.date()) {
            (Some(author), Some(date)) => {
                format!("Marked done by {author} on {}", date.date_naive())
            }
            _ => format!(
                "Added by {} on {}",
                self.header.author,
                self.header.written_datetime.date_naive()
            ),
        }
    }
}

impl_note!(ActionItem, EntryKind::ActionItem);

/// Outcome of an attempt to reach the patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactResult {
    pub name: String,
    pub patient_reached: bool,
}

/// How a follow-up contact was attempted and how it went.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowupContact {
    /// Phone, email, in person...
    pub contact_method: String,
    pub contact_resolution: ContactResult,
}

impl FollowupContact {
    pub fn new(contact_method: impl Into<String>, resolution: ContactResult) -> Self {
        Self {
            contact_method: contact_method.into(),
            contact_resolution: resolution,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabFollowup {
    #[serde(flatten)]
    pub header: NoteHeader,
    #[serde(flatten)]
    pub contact: FollowupContact,
    /// Whether the results were successfully communicated to the patient.
    #[serde(default)]
    pub communication_success: bool,
    #[serde(default)]
    pub comments: String,
    due_date: NaiveDate,
    #[serde(flatten)]
    completion: Completion,
}

impl LabFollowup {
    pub fn new(header: NoteHeader, contact: FollowupContact, due_date: NaiveDate) -> Self {
        Self {
            header,
            contact,
            communication_success: false,
            comments: String::new(),
            due_date,
            completion: Completion::open(),
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }
}

impl_note!(LabFollowup, EntryKind::LabFollowup);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VaccineFollowup {
    #[serde(flatten)]
    pub header: NoteHeader,
    #[serde(flatten)]
    pub contact: FollowupContact,
    /// Whether the patient still needs a subsequent dose in the series.
    #[serde(default)]
    pub subsequent_dose: bool,
    #[serde(default)]
    pub dose_date: Option<NaiveDate>,
    #[serde(default)]
    pub comments: String,
    due_date: NaiveDate,
    #[serde(flatten)]
    completion: Completion,
}

impl VaccineFollowup {
    pub fn new(header: NoteHeader, contact: FollowupContact, due_date: NaiveDate) -> Self {
        Self {
            header,
            contact,
            subsequent_dose: false,
            dose_date: None,
            comments: String::new(),
            due_date,
            completion: Completion::open(),
        }
    }

    pub fn with_next_dose(mut self, dose_date: NaiveDate) -> Self {
        self.subsequent_dose = true;
        self.dose_date = Some(dose_date);
        self
    }
}

impl_note!(VaccineFollowup, EntryKind::VaccineFollowup);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferralFollowup {
    #[serde(flatten)]
    pub header: NoteHeader,
    #[serde(flatten)]
    pub contact: FollowupContact,
    /// Kind of care the patient was referred for, e.g. "Dental".
    pub referral_type: NonEmptyText,
    #[serde(default)]
    pub has_appointment: bool,
    #[serde(default)]
    pub no_appointment_reason: Option<String>,
    #[serde(default)]
    pub comments: String,
    due_date: NaiveDate,
    #[serde(flatten)]
    completion: Completion,
}

impl ReferralFollowup {
    pub fn new(
        header: NoteHeader,
        contact: FollowupContact,
        referral_type: &str,
        due_date: NaiveDate,
    ) -> TrackerResult<Self> {
        Ok(Self {
            header,
            contact,
            referral_type: required_text(EntryKind::ReferralFollowup, "referral type", referral_type)?,
            has_appointment: false,
            no_appointment_reason: None,
            comments: String::new(),
            due_date,
            completion: Completion::open(),
        })
    }
}

impl_note!(ReferralFollowup, EntryKind::ReferralFollowup);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralFollowup {
    #[serde(flatten)]
    pub header: NoteHeader,
    #[serde(flatten)]
    pub contact: FollowupContact,
    pub comments: NonEmptyText,
    due_date: NaiveDate,
    #[serde(flatten)]
    completion: Completion,
}

impl GeneralFollowup {
    pub fn new(
        header: NoteHeader,
        contact: FollowupContact,
        comments: &str,
        due_date: NaiveDate,
    ) -> TrackerResult<Self> {
        Ok(Self {
            header,
            contact,
            comments: required_text(EntryKind::GeneralFollowup, "comments", comments)?,
            due_date,
            completion: Completion::open(),
        })
    }
}

impl_note!(GeneralFollowup, EntryKind::GeneralFollowup);

macro_rules! impl_completable {
    ($ty:ty, |$this:ident| label: $label:expr, summary: $summary:expr) => {
        impl Completable for $ty {
            fn due_date(&self) -> NaiveDate {
                self.due_date
            }

            fn completion(&self) -> &Completion {
                &self.completion
            }

            fn completion_mut(&mut self) -> &mut Completion {
                &mut self.completion
            }

            #[allow(unused_variables)]
            fn short_label(&self) -> String {
                let $this = self;
                $label
            }

            #[allow(unused_variables)]
            fn summary_text(&self) -> String {
                let $this = self;
                $summary
            }
        }
    };
}

impl_completable!(ActionItem, |item|
    label: item.instruction.to_string(),
    summary: item.comments.to_string()
);

impl_completable!(LabFollowup, |lab|
    label: "Lab".to_string(),
    summary: with_comments("Follow up on lab results".to_string(), &lab.comments)
);

impl_completable!(VaccineFollowup, |vaccine|
    label: "Vaccine".to_string(),
    summary: {
        let base = match (vaccine.subsequent_dose, vaccine.dose_date) {
            (true, Some(date)) => format!("Follow up on vaccine dose due {date}"),
            _ => "Follow up on vaccine series".to_string(),
        };
        with_comments(base, &vaccine.comments)
    }
);

impl_completable!(ReferralFollowup, |referral|
    label: "Referral".to_string(),
    summary: {
        let mut base = format!("Follow up on {} referral", referral.referral_type);
        if !referral.has_appointment {
            if let Some(reason) = referral.no_appointment_reason.as_deref().filter(|r| !r.trim().is_empty()) {
                base.push_str(&format!(" (no appointment: {})", reason.trim()));
            }
        }
        with_comments(base, &referral.comments)
    }
);

impl_completable!(GeneralFollowup, |general|
    label: "General".to_string(),
    summary: general.comments.to_string()
);

/// One follow-up of any kind, for views that merge the follow-up tables.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowupRecord {
    Lab(LabFollowup),
    Vaccine(VaccineFollowup),
    Referral(ReferralFollowup),
    General(GeneralFollowup),
}

impl FollowupRecord {
    fn as_completable(&self) -> &dyn Completable {
        match self {
            Self::Lab(f) => f,
            Self::Vaccine(f) => f,
            Self::Referral(f) => f,
            Self::General(f) => f,
        }
    }

    fn as_completable_mut(&mut self) -> &mut dyn Completable {
        match self {
            Self::Lab(f) => f,
            Self::Vaccine(f) => f,
            Self::Referral(f) => f,
            Self::General(f) => f,
        }
    }

    fn as_note(&self) -> &dyn Note {
        match self {
            Self::Lab(f) => f,
            Self::Vaccine(f) => f,
            Self::Referral(f) => f,
            Self::General(f) => f,
        }
    }

    fn as_note_mut(&mut self) -> &mut dyn Note {
        match self {
            Self::Lab(f) => f,
            Self::Vaccine(f) => f,
            Self::Referral(f) => f,
            Self::General(f) => f,
        }
    }
}

/// Anything that counts toward a patient's status.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackedItem {
    ActionItem(ActionItem),
    Followup(FollowupRecord),
}

impl TrackedItem {
    fn as_completable(&self) -> &dyn Completable {
        match self {
            Self::ActionItem(item) => item,
            Self::Followup(followup) => followup,
        }
    }

    fn as_completable_mut(&mut self) -> &mut dyn Completable {
        match self {
            Self::ActionItem(item) => item,
            Self::Followup(followup) => followup,
        }
    }

    fn as_note(&self) -> &dyn Note {
        match self {
            Self::ActionItem(item) => item,
            Self::Followup(followup) => followup,
        }
    }

    fn as_note_mut(&mut self) -> &mut dyn Note {
        match self {
            Self::ActionItem(item) => item,
            Self::Followup(followup) => followup,
        }
    }
}

macro_rules! delegate_variants {
    ($ty:ty) => {
        impl Completable for $ty {
            fn due_date(&self) -> NaiveDate {
                self.as_completable().due_date()
            }

            fn completion(&self) -> &Completion {
                self.as_completable().completion()
            }

            fn completion_mut(&mut self) -> &mut Completion {
                self.as_completable_mut().completion_mut()
            }

            fn short_label(&self) -> String {
                self.as_completable().short_label()
            }

            fn summary_text(&self) -> String {
                self.as_completable().summary_text()
            }
        }

        impl Note for $ty {
            fn header(&self) -> &NoteHeader {
                self.as_note().header()
            }

            fn header_mut(&mut self) -> &mut NoteHeader {
                self.as_note_mut().header_mut()
            }

            fn kind(&self) -> EntryKind {
                self.as_note().kind()
            }
        }
    };
}

delegate_variants!(FollowupRecord);
delegate_variants!(TrackedItem);

/// Marks `record` done and stamps its last-modified time.
pub fn complete<T: Completable + Note>(
    record: &mut T,
    actor: ActorRef,
    now: DateTime<Utc>,
) {
    record.mark_done(actor, now);
    record.header_mut().touch(now);
}

/// Clears the completion mark on `record` and stamps its last-modified time.
pub fn reopen<T: Completable + Note>(record: &mut T, now: DateTime<Utc>) {
    record.clear_done();
    record.header_mut().touch(now);
}
