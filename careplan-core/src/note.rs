//! Authorship header common to every record attached to a patient.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{PatientId, RecordId};
use crate::text::{ActorRef, NonEmptyText};

/// Every kind of record the tracker knows about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    ActionItem,
    LabFollowup,
    VaccineFollowup,
    ReferralFollowup,
    GeneralFollowup,
    Workup,
    Document,
}

impl EntryKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ActionItem => "action item",
            Self::LabFollowup => "lab followup",
            Self::VaccineFollowup => "vaccine followup",
            Self::ReferralFollowup => "referral followup",
            Self::GeneralFollowup => "general followup",
            Self::Workup => "workup",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteHeader {
    pub id: RecordId,
    pub patient: PatientId,
    pub author: ActorRef,
    /// Role the author held when writing, e.g. "Attending" or "Coordinator".
    pub author_role: NonEmptyText,
    pub written_datetime: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl NoteHeader {
    /// A header for a record written at `written`, with a fresh identity.
    pub fn new(
        patient: PatientId,
        author: ActorRef,
        author_role: NonEmptyText,
        written: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            patient,
            author,
            author_role,
            written_datetime: written,
            last_modified: written,
        }
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_modified = at;
    }
}

/// Anything authored about a patient at a point in time.
pub trait Note {
    fn header(&self) -> &NoteHeader;

    fn header_mut(&mut self) -> &mut NoteHeader;

    fn kind(&self) -> EntryKind;

    fn id(&self) -> RecordId {
        self.header().id
    }

    fn patient(&self) -> PatientId {
        self.header().patient
    }

    fn author(&self) -> &ActorRef {
        &self.header().author
    }

    fn written_datetime(&self) -> DateTime<Utc> {
        self.header().written_datetime
    }
}
