#![allow(dead_code)]

use careplan_core::{
    ActionItem, ActorRef, ContactResult, FollowupContact, InMemoryStore, NonEmptyText,
    NoteHeader, Patient, PatientId,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, day, hour, 0, 0).unwrap()
}

pub fn patient() -> Patient {
    Patient::new(
        NonEmptyText::new("Grace").unwrap(),
        NonEmptyText::new("Hopper").unwrap(),
        NaiveDate::from_ymd_opt(1980, 12, 9).unwrap(),
    )
}

pub fn store_with_patient() -> (InMemoryStore, PatientId) {
    let mut store = InMemoryStore::new();
    let patient = patient();
    let id = patient.id;
    store.insert_patient(patient);
    (store, id)
}

pub fn header(patient: PatientId, written: DateTime<Utc>) -> NoteHeader {
    NoteHeader::new(
        patient,
        ActorRef::new("dr-osler"),
        NonEmptyText::new("Attending").unwrap(),
        written,
    )
}

pub fn phone_contact() -> FollowupContact {
    FollowupContact::new(
        "Phone",
        ContactResult {
            name: "Left voicemail".into(),
            patient_reached: false,
        },
    )
}

pub fn action_item(patient: PatientId, due_in_days: i64) -> ActionItem {
    ActionItem::new(
        header(patient, at(1, 9)),
        "Call patient",
        "Discuss lab results",
        days_from_today(due_in_days),
    )
    .unwrap()
}
