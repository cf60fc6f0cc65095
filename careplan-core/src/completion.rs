//! The completion contract shared by every trackable record kind.
//!
//! A completable carries a due date and an optional completion mark (who
//! finished it and when). Its state is never stored: it is re-derived from the
//! mark and the due date against a caller-supplied "today" on every read.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::ids::RecordId;
use crate::text::ActorRef;

/// Where a completable sits in its lifecycle on a given day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    /// Not done, due strictly after today.
    Pending,
    /// Not done, due today or earlier.
    Overdue,
    Done,
}

impl CompletionState {
    pub fn classify(completion: &Completion, due_date: NaiveDate, today: NaiveDate) -> Self {
        if completion.is_done() {
            Self::Done
        } else if due_date <= today {
            Self::Overdue
        } else {
            Self::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Overdue => "overdue",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CompletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion mark: a timestamp and the actor responsible, set and cleared together.
///
/// The fields are private so the only in-process mutators are [`Completion::mark`]
/// and [`Completion::clear`]. Data arriving from outside (deserialization) can
/// still disagree, which [`Completion::verify`] reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    #[serde(default)]
    completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    completion_author: Option<ActorRef>,
}

impl Completion {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.completion_date
    }

    pub fn author(&self) -> Option<&ActorRef> {
        self.completion_author.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.completion_date.is_some()
    }

    pub fn mark(&mut self, actor: ActorRef, at: DateTime<Utc>) {
        self.completion_date = Some(at);
        self.completion_author = Some(actor);
    }

    pub fn clear(&mut self) {
        self.completion_date = None;
        self.completion_author = None;
    }

    /// Checks the both-or-neither rule for the record owning this mark.
    pub fn verify(&self, record: RecordId) -> TrackerResult<()> {
        match (&self.completion_date, &self.completion_author) {
            (Some(_), None) => Err(TrackerError::InvariantViolation {
                record,
                detail: "completion date is set without a completion author".into(),
            }),
            (None, Some(author)) => Err(TrackerError::InvariantViolation {
                record,
                detail: format!("completion author {author} is set without a completion date"),
            }),
            _ => Ok(()),
        }
    }
}

/// Uniform contract over the record kinds that can be marked done.
///
/// `short_label` and `summary_text` have no default: every kind must say what
/// it is and what remains to be done.
pub trait Completable {
    fn due_date(&self) -> NaiveDate;

    fn completion(&self) -> &Completion;

    fn completion_mut(&mut self) -> &mut Completion;

    /// One or two words naming the kind of action, e.g. "Referral".
    fn short_label(&self) -> String;

    /// What must be done before this item can be marked done.
    fn summary_text(&self) -> String;

    fn is_done(&self) -> bool {
        self.completion().is_done()
    }

    /// Marks the item done by `actor` at `now`, overwriting any earlier mark.
    fn mark_done(&mut self, actor: ActorRef, now: DateTime<Utc>) {
        self.completion_mut().mark(actor, now);
    }

    fn clear_done(&mut self) {
        self.completion_mut().clear();
    }

    fn state(&self, today: NaiveDate) -> CompletionState {
        CompletionState::classify(self.completion(), self.due_date(), today)
    }

    /// Whole days from `today` until the due date; negative once past due.
    fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date() - today).num_days()
    }
}
