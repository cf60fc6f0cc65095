//! The patient, root of every record the tracker aggregates.
//!
//! A patient owns its records by reference only: each record points back at a
//! [`PatientId`]. Status and note history are computed by the tracker and
//! never stored here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::PatientId;
use crate::text::{ActorRef, NonEmptyText};

/// An additional phone number and whose it is (e.g. "daughter").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlternatePhone {
    pub number: String,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: NonEmptyText,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: NonEmptyText,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub alternate_phones: Vec<AlternatePhone>,
    #[serde(default)]
    pub preferred_contact_method: Option<String>,
    #[serde(default)]
    pub case_managers: Vec<ActorRef>,
    /// Set while the patient is in clinic waiting to be worked up.
    #[serde(default = "default_needs_workup")]
    pub needs_workup: bool,
}

fn default_needs_workup() -> bool {
    true
}

impl Patient {
    pub fn new(
        first_name: NonEmptyText,
        last_name: NonEmptyText,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            id: PatientId::generate(),
            first_name,
            middle_name: None,
            last_name,
            date_of_birth,
            phone: None,
            alternate_phones: Vec::new(),
            preferred_contact_method: None,
            case_managers: Vec::new(),
            needs_workup: true,
        }
    }

    /// Display name.
    ///
    /// `reverse` gives "Last, First M." ordering; `middle_short` reduces each
    /// middle name to its initial.
    pub fn name(&self, reverse: bool, middle_short: bool) -> String {
        let middle = match self.middle_name.as_deref().map(str::trim) {
            Some(middle) if !middle.is_empty() => {
                if middle_short {
                    middle
                        .split_whitespace()
                        .filter_map(|part| part.chars().next())
                        .map(|initial| format!("{initial}."))
                        .collect::<String>()
                } else {
                    middle.to_string()
                }
            }
            _ => String::new(),
        };

        let parts = if reverse {
            [
                format!("{},", self.last_name),
                self.first_name.to_string(),
                middle,
            ]
        } else {
            [
                self.first_name.to_string(),
                middle,
                self.last_name.to_string(),
            ]
        };

        parts
            .iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Age in whole years, counting a year as 365 days.
    pub fn age(&self, today: NaiveDate) -> i64 {
        (today - self.date_of_birth).num_days() / 365
    }

    /// Primary phone first, then the alternates in the order they were recorded.
    pub fn all_phones(&self) -> Vec<AlternatePhone> {
        let primary = self.phone.iter().map(|number| AlternatePhone {
            number: number.clone(),
            owner: None,
        });
        primary.chain(self.alternate_phones.iter().cloned()).collect()
    }

    pub fn toggle_active_status(&mut self) {
        self.needs_workup = !self.needs_workup;
    }
}

impl std::fmt::Display for Patient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name(true, true))
    }
}
