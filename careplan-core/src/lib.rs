//! Completion tracking for patient action items and follow-ups.
//!
//! Record kinds share the [`Completable`] contract (due date plus an optional
//! completion mark). [`PatientTracker`] merges them per patient into the
//! overdue / pending / done lists, a one-line status and a note history.

pub mod chronicle;
pub mod clock;
pub mod completion;
pub mod config;
pub mod error;
pub mod ids;
pub mod note;
pub mod patient;
pub mod records;
pub mod snapshot;
pub mod store;
pub mod text;
pub mod tracker;

pub use chronicle::{Document, NoteEntry, Workup};
pub use clock::{Clock, FixedClock, SystemClock};
pub use completion::{Completable, Completion, CompletionState};
pub use config::TrackerConfig;
pub use error::{TrackerError, TrackerResult};
pub use ids::{PatientId, RecordId};
pub use note::{EntryKind, Note, NoteHeader};
pub use patient::{AlternatePhone, Patient};
pub use records::{
    ActionItem, ContactResult, FollowupContact, FollowupRecord, GeneralFollowup, LabFollowup,
    ReferralFollowup, TrackedItem, VaccineFollowup,
};
pub use snapshot::{ItemSummary, NoteSummary, PatientSnapshot};
pub use store::{
    ChartStore, CompletableRepository, InMemoryStore, PatientDirectory, Repository, StoredRecord,
};
pub use text::{ActorRef, NonEmptyText, TextError};
pub use tracker::{PatientStatus, PatientTracker};
