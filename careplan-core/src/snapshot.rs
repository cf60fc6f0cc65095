use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::chronicle::NoteEntry;
use crate::completion::{Completable, CompletionState};
use crate::ids::{PatientId, RecordId};
use crate::note::{EntryKind, Note};
use crate::text::ActorRef;

/// A completable reduced to what a listing shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemSummary {
    pub id: RecordId,
    pub kind: EntryKind,
    pub label: String,
    pub summary: String,
    pub due_date: NaiveDate,
    pub state: CompletionState,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<ActorRef>,
}

impl ItemSummary {
    pub fn of<T: Completable + Note + ?Sized>(item: &T, today: NaiveDate) -> Self {
        Self {
            id: item.id(),
            kind: item.kind(),
            label: item.short_label(),
            summary: item.summary_text(),
            due_date: item.due_date(),
            state: item.state(today),
            completed_at: item.completion().date(),
            completed_by: item.completion().author().cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteSummary {
    pub id: RecordId,
    pub kind: EntryKind,
    pub headline: String,
    pub author: ActorRef,
    pub written_datetime: DateTime<Utc>,
}

impl From<&NoteEntry> for NoteSummary {
    fn from(entry: &NoteEntry) -> Self {
        Self {
            id: entry.id(),
            kind: entry.kind(),
            headline: entry.headline(),
            author: entry.author().clone(),
            written_datetime: entry.written_datetime(),
        }
    }
}

/// Everything the patient detail view needs, computed in one pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSnapshot {
    pub generated_at: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub patient: PatientId,
    pub patient_name: String,
    pub status: String,
    pub active_action_items: Vec<ItemSummary>,
    pub inactive_action_items: Vec<ItemSummary>,
    pub done_action_items: Vec<ItemSummary>,
    pub followups: Vec<ItemSummary>,
    pub notes: Vec<NoteSummary>,
}
