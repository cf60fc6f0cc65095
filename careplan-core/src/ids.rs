//! Identifiers for patients and records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TrackerError;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TrackerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|err| TrackerError::Parse(format!("invalid identifier {s:?}: {err}")))
            }
        }
    };
}

uuid_identifier!(
    /// Identity of a patient, the aggregation root every record points back to.
    PatientId
);

uuid_identifier!(
    /// Identity of a single stored record of any kind.
    RecordId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_uuid() {
        let id: PatientId = "6f1c1c3e-8a4e-4e53-9a43-0f7f5f1d2b11".parse().unwrap();
        assert_eq!(id.to_string(), "6f1c1c3e-8a4e-4e53-9a43-0f7f5f1d2b11");
    }

    #[test]
    fn rejects_garbage() {
        let err = "not-a-uuid".parse::<RecordId>().unwrap_err();
        assert!(matches!(err, TrackerError::Parse(_)));
    }
}
