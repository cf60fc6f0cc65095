//! Per-patient aggregation across record kinds.
//!
//! Nothing computed here is cached: every call re-reads the store, captures
//! "today" from the clock exactly once, and derives lists and status from that
//! single snapshot of the data.

use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::chronicle::{Document, NoteEntry, Workup};
use crate::clock::Clock;
use crate::completion::{Completable, CompletionState};
use crate::config::TrackerConfig;
use crate::error::TrackerResult;
use crate::ids::{PatientId, RecordId};
use crate::note::Note;
use crate::records::{
    complete, reopen, ActionItem, FollowupRecord, GeneralFollowup, LabFollowup,
    ReferralFollowup, TrackedItem, VaccineFollowup,
};
use crate::snapshot::{ItemSummary, NoteSummary, PatientSnapshot};
use crate::store::{ChartStore, CompletableRepository, Repository, StoredRecord};
use crate::text::ActorRef;

/// The outstanding-work summary for one patient, in strict priority order:
/// anything overdue beats anything pending, which beats completed work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientStatus {
    /// Days past due for each overdue item, in the order the items were fetched.
    PastDue { days_overdue: Vec<i64> },
    /// Days until the earliest pending due date.
    NextActionIn { days: i64 },
    AllComplete,
    NoPendingActions,
}

impl PatientStatus {
    /// Classifies `items` against `today` and picks the status they imply.
    ///
    /// Fails on the first item whose completion fields disagree.
    pub fn evaluate(items: &[TrackedItem], today: NaiveDate) -> TrackerResult<Self> {
        let mut overdue = Vec::new();
        let mut pending = Vec::new();
        let mut done = 0usize;

        for item in items {
            if let Err(err) = item.completion().verify(item.id()) {
                warn!(record = %item.id(), kind = %item.kind(), "refusing corrupt completion mark");
                return Err(err);
            }
            match item.state(today) {
                CompletionState::Done => done += 1,
                CompletionState::Overdue => overdue.push(item),
                CompletionState::Pending => pending.push(item),
            }
        }

        if !overdue.is_empty() {
            let days_overdue = overdue
                .iter()
                .map(|item| (today - item.due_date()).num_days())
                .collect();
            return Ok(Self::PastDue { days_overdue });
        }

        if let Some(next) = pending.iter().min_by_key(|item| item.due_date()) {
            return Ok(Self::NextActionIn {
                days: next.days_until_due(today),
            });
        }

        if done > 0 {
            Ok(Self::AllComplete)
        } else {
            Ok(Self::NoPendingActions)
        }
    }

    pub fn render(&self, separator: &str) -> String {
        match self {
            Self::PastDue { days_overdue } => {
                let days = days_overdue
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<_>>()
                    .join(separator);
                format!("Action items {days} days past due")
            }
            Self::NextActionIn { days } => format!("next action in {days} days"),
            Self::AllComplete => "all actions complete".to_string(),
            Self::NoPendingActions => "no pending actions".to_string(),
        }
    }

    pub fn is_past_due(&self) -> bool {
        matches!(self, Self::PastDue { .. })
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(", "))
    }
}

/// Aggregates a patient's records out of a [`ChartStore`], reading time from a [`Clock`].
#[derive(Debug, Clone)]
pub struct PatientTracker<S, C> {
    store: S,
    clock: C,
    config: TrackerConfig,
}

impl<S, C> PatientTracker<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            config: TrackerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

impl<S: ChartStore, C: Clock> PatientTracker<S, C> {
    /// Overdue, not-done action items, earliest due date first.
    pub fn active_action_items(&self, patient: PatientId) -> TrackerResult<Vec<ActionItem>> {
        self.store.patient(patient)?;
        let today = self.clock.today();
        let mut items =
            <S as CompletableRepository<ActionItem>>::find_overdue(&self.store, patient, today)?;
        verify_all(&items)?;
        items.sort_by_key(|item| item.due_date());
        Ok(items)
    }

    /// Done action items, earliest completion first.
    pub fn done_action_items(&self, patient: PatientId) -> TrackerResult<Vec<ActionItem>> {
        self.store.patient(patient)?;
        let mut items =
            <S as CompletableRepository<ActionItem>>::find_completed(&self.store, patient)?;
        verify_all(&items)?;
        items.sort_by_key(|item| item.completion().date());
        Ok(items)
    }

    /// Not-done action items that are not due yet, earliest due date first.
    pub fn inactive_action_items(&self, patient: PatientId) -> TrackerResult<Vec<ActionItem>> {
        self.store.patient(patient)?;
        let today = self.clock.today();
        let mut items =
            <S as CompletableRepository<ActionItem>>::find_pending(&self.store, patient, today)?;
        verify_all(&items)?;
        items.sort_by_key(|item| item.due_date());
        Ok(items)
    }

    /// Every follow-up of every kind, grouped by kind (lab, vaccine, referral,
    /// general) in store order. No cross-kind sorting is applied.
    pub fn unified_followups(&self, patient: PatientId) -> TrackerResult<Vec<FollowupRecord>> {
        self.store.patient(patient)?;
        self.followups_for(patient)
    }

    /// Workups, follow-ups and documents, oldest first. Entries written at the
    /// same instant keep workup, follow-up, document order.
    pub fn notes(&self, patient: PatientId) -> TrackerResult<Vec<NoteEntry>> {
        self.store.patient(patient)?;
        let followups = self.followups_for(patient)?;
        self.notes_for(patient, followups)
    }

    /// The workup from the most recent clinic day, if any.
    pub fn latest_workup(&self, patient: PatientId) -> TrackerResult<Option<Workup>> {
        self.store.patient(patient)?;
        let workups = self.fetch::<Workup>(patient)?;
        Ok(workups
            .into_iter()
            .max_by_key(|workup| (workup.clinic_day, workup.written_datetime())))
    }

    pub fn status_summary(&self, patient: PatientId) -> TrackerResult<PatientStatus> {
        self.store.patient(patient)?;
        let today = self.clock.today();
        let items = self.tracked_items(patient)?;
        let status = PatientStatus::evaluate(&items, today)?;
        debug!(%patient, %today, items = items.len(), %status, "computed patient status");
        Ok(status)
    }

    /// Human-readable status line, e.g. "Action items 2, 5 days past due".
    pub fn status(&self, patient: PatientId) -> TrackerResult<String> {
        let status = self.status_summary(patient)?;
        Ok(status.render(&self.config.status_separator))
    }

    /// Lists, status and history for one patient, reading each table once.
    pub fn snapshot(&self, patient: PatientId) -> TrackerResult<PatientSnapshot> {
        let record = self.store.patient(patient)?;
        let today = self.clock.today();

        let action_items = self.fetch::<ActionItem>(patient)?;
        let followups = self.followups_for(patient)?;

        let mut tracked: Vec<TrackedItem> = action_items
            .iter()
            .cloned()
            .map(TrackedItem::ActionItem)
            .collect();
        tracked.extend(followups.iter().cloned().map(TrackedItem::Followup));
        let status = PatientStatus::evaluate(&tracked, today)?;

        let (mut active, mut inactive, mut done) = (Vec::new(), Vec::new(), Vec::new());
        for item in &action_items {
            match item.state(today) {
                CompletionState::Overdue => active.push(item),
                CompletionState::Pending => inactive.push(item),
                CompletionState::Done => done.push(item),
            }
        }
        active.sort_by_key(|item| item.due_date());
        inactive.sort_by_key(|item| item.due_date());
        done.sort_by_key(|item| item.completion().date());

        let summarize = |items: Vec<&ActionItem>| -> Vec<ItemSummary> {
            items.into_iter().map(|item| ItemSummary::of(item, today)).collect()
        };
        let followup_summaries: Vec<ItemSummary> = followups
            .iter()
            .map(|followup| ItemSummary::of(followup, today))
            .collect();
        let notes = self.notes_for(patient, followups)?;

        debug!(%patient, %today, notes = notes.len(), "built patient snapshot");

        Ok(PatientSnapshot {
            generated_at: self.clock.now(),
            as_of: today,
            patient,
            patient_name: record.name(true, true),
            status: status.render(&self.config.status_separator),
            active_action_items: summarize(active),
            inactive_action_items: summarize(inactive),
            done_action_items: summarize(done),
            followups: followup_summaries,
            notes: notes.iter().map(NoteSummary::from).collect(),
        })
    }

    /// Marks a stored completable done by `actor` at the clock's current time.
    pub fn mark_done<T>(&mut self, id: RecordId, actor: ActorRef) -> TrackerResult<T>
    where
        T: StoredRecord + Completable,
        S: Repository<T>,
    {
        let mut record = <S as Repository<T>>::get(&self.store, id)?;
        complete(&mut record, actor, self.clock.now());
        <S as Repository<T>>::save(&mut self.store, record.clone())?;
        debug!(record = %id, kind = %T::KIND, "marked done");
        Ok(record)
    }

    /// Clears the completion mark on a stored completable.
    pub fn clear_done<T>(&mut self, id: RecordId) -> TrackerResult<T>
    where
        T: StoredRecord + Completable,
        S: Repository<T>,
    {
        let mut record = <S as Repository<T>>::get(&self.store, id)?;
        reopen(&mut record, self.clock.now());
        <S as Repository<T>>::save(&mut self.store, record.clone())?;
        debug!(record = %id, kind = %T::KIND, "cleared completion");
        Ok(record)
    }

    fn fetch<T>(&self, patient: PatientId) -> TrackerResult<Vec<T>>
    where
        T: StoredRecord,
        S: Repository<T>,
    {
        <S as Repository<T>>::find_all_by_patient(&self.store, patient)
    }

    fn followups_for(&self, patient: PatientId) -> TrackerResult<Vec<FollowupRecord>> {
        let mut followups = Vec::new();
        followups.extend(
            self.fetch::<LabFollowup>(patient)?
                .into_iter()
                .map(FollowupRecord::Lab),
        );
        followups.extend(
            self.fetch::<VaccineFollowup>(patient)?
                .into_iter()
                .map(FollowupRecord::Vaccine),
        );
        followups.extend(
            self.fetch::<ReferralFollowup>(patient)?
                .into_iter()
                .map(FollowupRecord::Referral),
        );
        followups.extend(
            self.fetch::<GeneralFollowup>(patient)?
                .into_iter()
                .map(FollowupRecord::General),
        );
        Ok(followups)
    }

    fn tracked_items(&self, patient: PatientId) -> TrackerResult<Vec<TrackedItem>> {
        let mut items: Vec<TrackedItem> = self
            .fetch::<ActionItem>(patient)?
            .into_iter()
            .map(TrackedItem::ActionItem)
            .collect();
        items.extend(
            self.followups_for(patient)?
                .into_iter()
                .map(TrackedItem::Followup),
        );
        Ok(items)
    }

    fn notes_for(
        &self,
        patient: PatientId,
        followups: Vec<FollowupRecord>,
    ) -> TrackerResult<Vec<NoteEntry>> {
        let mut notes: Vec<NoteEntry> = self
            .fetch::<Workup>(patient)?
            .into_iter()
            .map(NoteEntry::Workup)
            .collect();
        notes.extend(followups.into_iter().map(NoteEntry::Followup));
        notes.extend(
            self.fetch::<Document>(patient)?
                .into_iter()
                .map(NoteEntry::Document),
        );
        notes.sort_by_key(|note| note.written_datetime());
        Ok(notes)
    }
}

fn verify_all<T: Completable + Note>(records: &[T]) -> TrackerResult<()> {
    for record in records {
        if let Err(err) = record.completion().verify(record.id()) {
            warn!(record = %record.id(), kind = %record.kind(), "refusing corrupt completion mark");
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn past_due_render_uses_separator() {
        let status = PatientStatus::PastDue {
            days_overdue: vec![2, 5],
        };
        assert_eq!(status.to_string(), "Action items 2, 5 days past due");
        assert_eq!(status.render(" / "), "Action items 2 / 5 days past due");
        assert!(status.is_past_due());
    }

    #[test]
    fn empty_input_has_no_pending_actions() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            PatientStatus::evaluate(&[], today).unwrap(),
            PatientStatus::NoPendingActions
        );
    }
}
