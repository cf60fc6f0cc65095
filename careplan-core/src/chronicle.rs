//! Timestamped notes with no completion state, and the merged history entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::completion::Completable;
use crate::error::{TrackerError, TrackerResult};
use crate::note::{EntryKind, Note, NoteHeader};
use crate::records::{impl_note, FollowupRecord};
use crate::text::NonEmptyText;

/// A clinical workup written on a clinic day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workup {
    #[serde(flatten)]
    pub header: NoteHeader,
    pub clinic_day: NaiveDate,
    pub chief_complaint: String,
    #[serde(default)]
    pub diagnosis: String,
}

impl Workup {
    pub fn new(header: NoteHeader, clinic_day: NaiveDate, chief_complaint: impl Into<String>) -> Self {
        Self {
            header,
            clinic_day,
            chief_complaint: chief_complaint.into(),
            diagnosis: String::new(),
        }
    }
}

impl_note!(Workup, EntryKind::Workup);

/// An uploaded document. Only its metadata is tracked here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(flatten)]
    pub header: NoteHeader,
    pub title: NonEmptyText,
    pub document_type: String,
    #[serde(default)]
    pub comments: String,
}

impl Document {
    pub fn new(
        header: NoteHeader,
        title: &str,
        document_type: impl Into<String>,
    ) -> TrackerResult<Self> {
        let title = NonEmptyText::new(title).map_err(|_| TrackerError::ContractViolation {
            kind: EntryKind::Document.as_str(),
            detail: "title must not be empty".into(),
        })?;
        Ok(Self {
            header,
            title,
            document_type: document_type.into(),
            comments: String::new(),
        })
    }

    pub fn short_text(&self) -> &str {
        self.title.as_str()
    }
}

impl_note!(Document, EntryKind::Document);

/// One line of a patient's note history.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteEntry {
    Workup(Workup),
    Document(Document),
    Followup(FollowupRecord),
}

impl NoteEntry {
    /// Short heading for the entry in a history listing.
    pub fn headline(&self) -> String {
        match self {
            Self::Workup(workup) => format!("Workup: {}", workup.chief_complaint),
            Self::Document(document) => format!("Document: {}", document.short_text()),
            Self::Followup(followup) => format!("{} followup", followup.short_label()),
        }
    }
}

impl Note for NoteEntry {
    fn header(&self) -> &NoteHeader {
        match self {
            Self::Workup(workup) => workup.header(),
            Self::Document(document) => document.header(),
            Self::Followup(followup) => followup.header(),
        }
    }

    fn header_mut(&mut self) -> &mut NoteHeader {
        match self {
            Self::Workup(workup) => workup.header_mut(),
            Self::Document(document) => document.header_mut(),
            Self::Followup(followup) => followup.header_mut(),
        }
    }

    fn kind(&self) -> EntryKind {
        match self {
            Self::Workup(workup) => workup.kind(),
            Self::Document(document) => document.kind(),
            Self::Followup(followup) => followup.kind(),
        }
    }
}
