mod common;

use careplan_core::{
    ActionItem, ActorRef, Completable, CompletionState, Document, EntryKind, FixedClock,
    FollowupRecord, GeneralFollowup, LabFollowup, Note, PatientTracker, ReferralFollowup,
    Repository, TrackerError, VaccineFollowup, Workup,
};
use chrono::NaiveDate;
use common::*;

#[test]
fn unified_followups_are_grouped_by_kind() {
    let (mut store, patient) = store_with_patient();
    let general = GeneralFollowup::new(
        header(patient, at(1, 9)),
        phone_contact(),
        "Check on housing application",
        days_from_today(3),
    )
    .unwrap();
    let referral =
        ReferralFollowup::new(header(patient, at(3, 9)), phone_contact(), "Dental", days_from_today(1))
            .unwrap();
    let vaccine = VaccineFollowup::new(header(patient, at(2, 9)), phone_contact(), days_from_today(2));
    let lab = LabFollowup::new(header(patient, at(5, 9)), phone_contact(), days_from_today(4));
    store.save(general).unwrap();
    store.save(referral).unwrap();
    store.save(vaccine).unwrap();
    store.save(lab).unwrap();

    let tracker = PatientTracker::new(store, FixedClock::on(today()));
    let kinds: Vec<EntryKind> = tracker
        .unified_followups(patient)
        .unwrap()
        .iter()
        .map(|followup| followup.kind())
        .collect();

    assert_eq!(
        kinds,
        vec![
            EntryKind::LabFollowup,
            EntryKind::VaccineFollowup,
            EntryKind::ReferralFollowup,
            EntryKind::GeneralFollowup,
        ]
    );
}

#[test]
fn notes_are_sorted_by_written_time_and_skip_action_items() {
    let (mut store, patient) = store_with_patient();
    store
        .save(Workup::new(
            header(patient, at(4, 9)),
            NaiveDate::from_ymd_opt(2024, 7, 4).unwrap(),
            "Cough",
        ))
        .unwrap();
    store
        .save(Document::new(header(patient, at(2, 9)), "Outside labs", "Lab report").unwrap())
        .unwrap();
    store
        .save(LabFollowup::new(header(patient, at(3, 9)), phone_contact(), days_from_today(1)))
        .unwrap();
    store.save(action_item(patient, -1)).unwrap();

    let tracker = PatientTracker::new(store, FixedClock::on(today()));
    let notes = tracker.notes(patient).unwrap();
    let headlines: Vec<String> = notes.iter().map(|note| note.headline()).collect();

    assert_eq!(
        headlines,
        vec!["Document: Outside labs", "Lab followup", "Workup: Cough"]
    );
}

#[test]
fn notes_written_at_the_same_instant_keep_insertion_order() {
    let (mut store, patient) = store_with_patient();
    let same = at(6, 14);
    store
        .save(Document::new(header(patient, same), "Consent form", "Consent").unwrap())
        .unwrap();
    store
        .save(Workup::new(
            header(patient, same),
            NaiveDate::from_ymd_opt(2024, 7, 6).unwrap(),
            "Follow-up visit",
        ))
        .unwrap();
    store
        .save(
            GeneralFollowup::new(header(patient, same), phone_contact(), "Check in", days_from_today(2))
                .unwrap(),
        )
        .unwrap();

    let tracker = PatientTracker::new(store, FixedClock::on(today()));
    let kinds: Vec<EntryKind> = tracker
        .notes(patient)
        .unwrap()
        .iter()
        .map(|note| note.kind())
        .collect();

    assert_eq!(
        kinds,
        vec![EntryKind::Workup, EntryKind::GeneralFollowup, EntryKind::Document]
    );
}

#[test]
fn latest_workup_uses_clinic_day() {
    let (mut store, patient) = store_with_patient();
    let older = Workup::new(
        header(patient, at(10, 9)),
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        "Back pain",
    );
    let newer = Workup::new(
        header(patient, at(2, 9)),
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        "Rash",
    );
    store.save(older).unwrap();
    store.save(newer.clone()).unwrap();

    let tracker = PatientTracker::new(store, FixedClock::on(today()));
    assert_eq!(tracker.latest_workup(patient).unwrap(), Some(newer));
}

#[test]
fn mark_done_and_clear_done_through_the_tracker() {
    let (mut store, patient) = store_with_patient();
    let item = action_item(patient, -2);
    let id = item.id();
    store.save(item).unwrap();
    let mut tracker = PatientTracker::new(store, FixedClock::at(at(15, 16)));

    let done: ActionItem = tracker.mark_done(id, ActorRef::new("nurse-kim")).unwrap();
    assert_eq!(done.completion().date(), Some(at(15, 16)));
    assert_eq!(done.header().last_modified, at(15, 16));
    assert_eq!(tracker.status(patient).unwrap(), "all actions complete");
    assert_eq!(tracker.done_action_items(patient).unwrap(), vec![done]);

    let reopened: ActionItem = tracker.clear_done(id).unwrap();
    assert_eq!(reopened.state(today()), CompletionState::Overdue);
    assert_eq!(
        tracker.status(patient).unwrap(),
        "Action items 2 days past due"
    );
}

#[test]
fn mark_done_on_followup_counts_toward_status() {
    let (mut store, patient) = store_with_patient();
    let lab = LabFollowup::new(header(patient, at(3, 9)), phone_contact(), days_from_today(-6));
    let id = lab.id();
    store.save(lab).unwrap();
    let mut tracker = PatientTracker::new(store, FixedClock::on(today()));

    assert_eq!(tracker.status(patient).unwrap(), "Action items 6 days past due");
    tracker
        .mark_done::<LabFollowup>(id, ActorRef::new("dr-osler"))
        .unwrap();
    assert_eq!(tracker.status(patient).unwrap(), "all actions complete");

    let followups = tracker.unified_followups(patient).unwrap();
    assert!(matches!(&followups[..], [FollowupRecord::Lab(lab)] if lab.is_done()));
}

#[test]
fn mark_done_on_missing_record_is_not_found() {
    let (store, _) = store_with_patient();
    let mut tracker = PatientTracker::new(store, FixedClock::on(today()));

    let err = tracker
        .mark_done::<ReferralFollowup>(careplan_core::RecordId::generate(), ActorRef::new("x"))
        .unwrap_err();
    assert!(matches!(
        err,
        TrackerError::NotFound { entity: "referral followup", .. }
    ));
}

#[test]
fn snapshot_lists_agree_with_individual_queries() {
    let (mut store, patient) = store_with_patient();
    store.save(action_item(patient, -3)).unwrap();
    store.save(action_item(patient, 6)).unwrap();
    let mut done = action_item(patient, -9);
    done.mark_done(ActorRef::new("nurse"), at(10, 10));
    store.save(done).unwrap();
    store
        .save(VaccineFollowup::new(header(patient, at(8, 9)), phone_contact(), days_from_today(2)))
        .unwrap();

    let tracker = PatientTracker::new(store, FixedClock::on(today()));
    let snapshot = tracker.snapshot(patient).unwrap();

    assert_eq!(snapshot.patient_name, "Hopper, Grace");
    assert_eq!(snapshot.as_of, today());
    assert_eq!(snapshot.status, tracker.status(patient).unwrap());
    assert_eq!(snapshot.status, "Action items 3 days past due");

    let ids = |items: &[careplan_core::ItemSummary]| items.iter().map(|i| i.id).collect::<Vec<_>>();
    let expect = |items: Vec<ActionItem>| items.iter().map(|i| i.id()).collect::<Vec<_>>();
    assert_eq!(
        ids(&snapshot.active_action_items),
        expect(tracker.active_action_items(patient).unwrap())
    );
    assert_eq!(
        ids(&snapshot.inactive_action_items),
        expect(tracker.inactive_action_items(patient).unwrap())
    );
    assert_eq!(
        ids(&snapshot.done_action_items),
        expect(tracker.done_action_items(patient).unwrap())
    );
    assert_eq!(snapshot.followups.len(), 1);
    assert_eq!(snapshot.followups[0].label, "Vaccine");
    assert_eq!(snapshot.followups[0].state, CompletionState::Pending);
    assert_eq!(snapshot.notes.len(), 1);
}
