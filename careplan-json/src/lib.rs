//! JSON chart bundles: load them into an [`InMemoryStore`] and summarize a patient.
//!
//! A bundle is one object holding a `patients` array plus one array per record
//! kind. Every record is checked on the way in: it must point at a patient in
//! the same bundle, and completables must carry both or neither completion
//! field. Corrupt data is rejected, never repaired.

use careplan_core::{
    ActionItem, Clock, Completable, Document, GeneralFollowup, InMemoryStore, LabFollowup, Patient,
    PatientId, PatientSnapshot, PatientTracker, ReferralFollowup, Repository, StoredRecord,
    TrackerConfig, TrackerError, TrackerResult, VaccineFollowup, Workup,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartBundle {
    pub patients: Vec<Patient>,
    pub action_items: Vec<ActionItem>,
    pub lab_followups: Vec<LabFollowup>,
    pub vaccine_followups: Vec<VaccineFollowup>,
    pub referral_followups: Vec<ReferralFollowup>,
    pub general_followups: Vec<GeneralFollowup>,
    pub workups: Vec<Workup>,
    pub documents: Vec<Document>,
}

/// Parse a bundle from a JSON string and load it.
pub fn load_chart_str(bundle_json: &str) -> TrackerResult<InMemoryStore> {
    let bundle: ChartBundle =
        serde_json::from_str(bundle_json).map_err(|err| TrackerError::Parse(err.to_string()))?;
    build_store(bundle)
}

/// Load a bundle that has already been parsed into a `serde_json::Value`.
pub fn load_chart_value(bundle: &Value) -> TrackerResult<InMemoryStore> {
    if !bundle.is_object() {
        return Err(TrackerError::Parse(
            "expected a JSON object at the top of the chart bundle".into(),
        ));
    }
    let bundle =
        ChartBundle::deserialize(bundle).map_err(|err| TrackerError::Parse(err.to_string()))?;
    build_store(bundle)
}

/// Validate every record in `bundle` and insert it into a fresh store.
pub fn build_store(bundle: ChartBundle) -> TrackerResult<InMemoryStore> {
    let mut store = InMemoryStore::new();
    let patient_count = bundle.patients.len();
    for patient in bundle.patients {
        if store.contains_patient(patient.id) {
            warn!(patient = %patient.id, "duplicate patient in bundle; keeping the later entry");
        }
        store.insert_patient(patient);
    }

    admit_completables(&mut store, bundle.action_items)?;
    admit_completables(&mut store, bundle.lab_followups)?;
    admit_completables(&mut store, bundle.vaccine_followups)?;
    admit_completables(&mut store, bundle.referral_followups)?;
    admit_completables(&mut store, bundle.general_followups)?;
    admit(&mut store, bundle.workups)?;
    admit(&mut store, bundle.documents)?;

    debug!(patients = patient_count, "loaded chart bundle");
    Ok(store)
}

/// Parse a bundle and build the snapshot for one patient in it.
pub fn summarize_chart_str<C: Clock>(
    bundle_json: &str,
    patient: PatientId,
    clock: C,
    config: &TrackerConfig,
) -> TrackerResult<PatientSnapshot> {
    let store = load_chart_str(bundle_json)?;
    PatientTracker::new(store, clock)
        .with_config(config.clone())
        .snapshot(patient)
}

fn admit<T>(store: &mut InMemoryStore, records: Vec<T>) -> TrackerResult<()>
where
    T: StoredRecord,
    InMemoryStore: Repository<T>,
{
    for record in records {
        let patient = record.patient();
        if !store.contains_patient(patient) {
            warn!(record = %record.id(), kind = %T::KIND, %patient, "record points at an unknown patient");
            return Err(TrackerError::NotFound {
                entity: "patient",
                id: patient.to_string(),
            });
        }
        if <InMemoryStore as Repository<T>>::find(store, record.id())?.is_some() {
            warn!(record = %record.id(), kind = %T::KIND, "duplicate record; keeping the later entry");
        }
        store.save(record)?;
    }
    Ok(())
}

fn admit_completables<T>(store: &mut InMemoryStore, records: Vec<T>) -> TrackerResult<()>
where
    T: StoredRecord + Completable,
    InMemoryStore: Repository<T>,
{
    for record in &records {
        record.completion().verify(record.id())?;
    }
    admit(store, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use careplan_core::{FixedClock, PatientDirectory};
    use chrono::NaiveDate;

    const PATIENT: &str = "3b0a4d52-1c7e-4f0a-8e55-6d2c9a7b1e01";

    fn patient_json() -> String {
        format!(
            r#"{{"id": "{PATIENT}", "first_name": "Lin", "last_name": "Chen", "date_of_birth": "1975-02-11"}}"#
        )
    }

    fn action_item_json(patient: &str, completion: &str) -> String {
        format!(
            r#"{{
                "id": "9d1f0a8e-7b6c-4d5e-8f90-a1b2c3d4e5f6",
                "patient": "{patient}",
                "author": "dr-chen",
                "author_role": "Attending",
                "written_datetime": "2024-07-01T09:00:00Z",
                "last_modified": "2024-07-01T09:00:00Z",
                "instruction": "Call patient",
                "comments": "Review imaging",
                "due_date": "2024-07-10"{completion}
            }}"#
        )
    }

    #[test]
    fn empty_object_is_an_empty_store() {
        let store = load_chart_str("{}").unwrap();
        assert_eq!(store.patients().count(), 0);
    }

    #[test]
    fn non_object_value_is_rejected() {
        let err = load_chart_value(&serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, TrackerError::Parse(_)));
    }

    #[test]
    fn loads_patient_defaults() {
        let json = format!(r#"{{"patients": [{}]}}"#, patient_json());
        let store = load_chart_str(&json).unwrap();
        let patient = store.patient(PATIENT.parse().unwrap()).unwrap();

        assert!(patient.needs_workup);
        assert!(patient.alternate_phones.is_empty());
        assert_eq!(patient.date_of_birth, NaiveDate::from_ymd_opt(1975, 2, 11).unwrap());
    }

    #[test]
    fn record_for_unknown_patient_is_not_found() {
        let json = format!(
            r#"{{"patients": [{}], "action_items": [{}]}}"#,
            patient_json(),
            action_item_json("00000000-0000-4000-8000-000000000000", "")
        );
        let err = load_chart_str(&json).unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { entity: "patient", .. }));
    }

    #[test]
    fn half_completed_record_is_rejected() {
        let json = format!(
            r#"{{"patients": [{}], "action_items": [{}]}}"#,
            patient_json(),
            action_item_json(PATIENT, r#", "completion_author": "nurse-li""#)
        );
        let err = load_chart_str(&json).unwrap_err();
        assert!(matches!(err, TrackerError::InvariantViolation { .. }));
    }

    #[test]
    fn empty_instruction_is_a_parse_error() {
        let item = action_item_json(PATIENT, "").replace("\"Call patient\"", "\"  \"");
        let json = format!(r#"{{"patients": [{}], "action_items": [{item}]}}"#, patient_json());
        assert!(matches!(load_chart_str(&json), Err(TrackerError::Parse(_))));
    }

    #[test]
    fn summarize_reports_status() {
        let json = format!(
            r#"{{"patients": [{}], "action_items": [{}]}}"#,
            patient_json(),
            action_item_json(PATIENT, "")
        );
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 7, 12).unwrap());
        let snapshot =
            summarize_chart_str(&json, PATIENT.parse().unwrap(), clock, &TrackerConfig::default())
                .unwrap();

        assert_eq!(snapshot.status, "Action items 2 days past due");
        assert_eq!(snapshot.patient_name, "Chen, Lin");
    }
}
