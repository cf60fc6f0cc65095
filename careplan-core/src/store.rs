//! Persistence collaborator seams and an in-memory implementation.
//!
//! Every record kind lives in its own table; nothing here forces a shared
//! schema. The tracker fetches per kind and merges in memory.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::chronicle::{Document, Workup};
use crate::completion::Completable;
use crate::error::{TrackerError, TrackerResult};
use crate::ids::{PatientId, RecordId};
use crate::note::{EntryKind, Note};
use crate::patient::Patient;
use crate::records::{ActionItem, GeneralFollowup, LabFollowup, ReferralFollowup, VaccineFollowup};

/// A record kind that has a table of its own.
pub trait StoredRecord: Note + Clone {
    const KIND: EntryKind;
}

impl StoredRecord for ActionItem {
    const KIND: EntryKind = EntryKind::ActionItem;
}

impl StoredRecord for LabFollowup {
    const KIND: EntryKind = EntryKind::LabFollowup;
}

impl StoredRecord for VaccineFollowup {
    const KIND: EntryKind = EntryKind::VaccineFollowup;
}

impl StoredRecord for ReferralFollowup {
    const KIND: EntryKind = EntryKind::ReferralFollowup;
}

impl StoredRecord for GeneralFollowup {
    const KIND: EntryKind = EntryKind::GeneralFollowup;
}

impl StoredRecord for Workup {
    const KIND: EntryKind = EntryKind::Workup;
}

impl StoredRecord for Document {
    const KIND: EntryKind = EntryKind::Document;
}

pub trait PatientDirectory {
    fn find_patient(&self, id: PatientId) -> TrackerResult<Option<Patient>>;

    fn patient(&self, id: PatientId) -> TrackerResult<Patient> {
        self.find_patient(id)?.ok_or_else(|| TrackerError::NotFound {
            entity: "patient",
            id: id.to_string(),
        })
    }
}

/// Typed access to one record table.
pub trait Repository<T: StoredRecord> {
    fn find_all_by_patient(&self, patient: PatientId) -> TrackerResult<Vec<T>>;

    fn find(&self, id: RecordId) -> TrackerResult<Option<T>>;

    /// Inserts `record`, or replaces the stored record with the same id.
    fn save(&mut self, record: T) -> TrackerResult<()>;

    fn get(&self, id: RecordId) -> TrackerResult<T> {
        self.find(id)?.ok_or_else(|| TrackerError::NotFound {
            entity: T::KIND.as_str(),
            id: id.to_string(),
        })
    }
}

/// Completion-aware queries over a table of completables.
///
/// Results are ordered by completion date only; callers that need the open
/// subsets in due-date order sort them themselves. The provided methods filter
/// [`Repository::find_all_by_patient`]; a backend with real indexes should
/// override them. Every record of the patient is checked for a consistent
/// completion mark before filtering, so a corrupt record fails the query
/// instead of falling out of every subset.
pub trait CompletableRepository<T: StoredRecord + Completable>: Repository<T> {
    /// Not completed and due on or before `date`.
    fn find_overdue(&self, patient: PatientId, date: NaiveDate) -> TrackerResult<Vec<T>> {
        let records = verified(self.find_all_by_patient(patient)?)?;
        Ok(by_completion_date(records.into_iter().filter(|r| {
            r.completion().author().is_none() && r.due_date() <= date
        })))
    }

    /// Not completed and due after `date`.
    fn find_pending(&self, patient: PatientId, date: NaiveDate) -> TrackerResult<Vec<T>> {
        let records = verified(self.find_all_by_patient(patient)?)?;
        Ok(by_completion_date(records.into_iter().filter(|r| {
            r.completion().author().is_none() && r.due_date() > date
        })))
    }

    fn find_completed(&self, patient: PatientId) -> TrackerResult<Vec<T>> {
        let records = verified(self.find_all_by_patient(patient)?)?;
        Ok(by_completion_date(
            records
                .into_iter()
                .filter(|r| r.completion().author().is_some()),
        ))
    }
}

fn verified<T: StoredRecord + Completable>(records: Vec<T>) -> TrackerResult<Vec<T>> {
    for record in &records {
        record.completion().verify(record.id())?;
    }
    Ok(records)
}

fn by_completion_date<T: Completable>(records: impl Iterator<Item = T>) -> Vec<T> {
    let mut records: Vec<T> = records.collect();
    records.sort_by_key(|r| r.completion().date());
    records
}

/// Everything the tracker needs from storage.
pub trait ChartStore:
    PatientDirectory
    + CompletableRepository<ActionItem>
    + CompletableRepository<LabFollowup>
    + CompletableRepository<VaccineFollowup>
    + CompletableRepository<ReferralFollowup>
    + CompletableRepository<GeneralFollowup>
    + Repository<Workup>
    + Repository<Document>
{
}

impl<S> ChartStore for S where
    S: PatientDirectory
        + CompletableRepository<ActionItem>
        + CompletableRepository<LabFollowup>
        + CompletableRepository<VaccineFollowup>
        + CompletableRepository<ReferralFollowup>
        + CompletableRepository<GeneralFollowup>
        + Repository<Workup>
        + Repository<Document>
{
}

/// Vec-backed tables, insertion ordered.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    patients: BTreeMap<PatientId, Patient>,
    action_items: Vec<ActionItem>,
    lab_followups: Vec<LabFollowup>,
    vaccine_followups: Vec<VaccineFollowup>,
    referral_followups: Vec<ReferralFollowup>,
    general_followups: Vec<GeneralFollowup>,
    workups: Vec<Workup>,
    documents: Vec<Document>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a patient.
    pub fn insert_patient(&mut self, patient: Patient) {
        self.patients.insert(patient.id, patient);
    }

    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    pub fn contains_patient(&self, id: PatientId) -> bool {
        self.patients.contains_key(&id)
    }
}

impl PatientDirectory for InMemoryStore {
    fn find_patient(&self, id: PatientId) -> TrackerResult<Option<Patient>> {
        Ok(self.patients.get(&id).cloned())
    }
}

macro_rules! in_memory_table {
    ($ty:ty, $field:ident) => {
        impl Repository<$ty> for InMemoryStore {
            fn find_all_by_patient(&self, patient: PatientId) -> TrackerResult<Vec<$ty>> {
                Ok(self
                    .$field
                    .iter()
                    .filter(|r| r.patient() == patient)
                    .cloned()
                    .collect())
            }

            fn find(&self, id: RecordId) -> TrackerResult<Option<$ty>> {
                Ok(self.$field.iter().find(|r| r.id() == id).cloned())
            }

            fn save(&mut self, record: $ty) -> TrackerResult<()> {
                match self.$field.iter_mut().find(|r| r.id() == record.id()) {
                    Some(slot) => *slot = record,
                    None => self.$field.push(record),
                }
                Ok(())
            }
        }
    };
}

in_memory_table!(ActionItem, action_items);
in_memory_table!(LabFollowup, lab_followups);
in_memory_table!(VaccineFollowup, vaccine_followups);
in_memory_table!(ReferralFollowup, referral_followups);
in_memory_table!(GeneralFollowup, general_followups);
in_memory_table!(Workup, workups);
in_memory_table!(Document, documents);

impl CompletableRepository<ActionItem> for InMemoryStore {}
impl CompletableRepository<LabFollowup> for InMemoryStore {}
impl CompletableRepository<VaccineFollowup> for InMemoryStore {}
impl CompletableRepository<ReferralFollowup> for InMemoryStore {}
impl CompletableRepository<GeneralFollowup> for InMemoryStore {}
