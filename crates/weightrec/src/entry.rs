//! Core entry types for weightrec.
//!
//! This module defines the record that is persisted for every weigh-in,
//! along with its identifier and the sports activity flag.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Date format used at the storage boundary and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque identifier of a stored entry.
///
/// Assigned by the store on insert and never changed afterwards. Rendered
/// as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(ObjectId);

impl EntryId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// The underlying object id.
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for EntryId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for EntryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::invalid_id(s))
    }
}

impl TryFrom<String> for EntryId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0.to_hex()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// Whether exercise happened on the day of a weigh-in.
///
/// Stored as the strings `"Yes"` and `"No"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SportsActivity {
    /// Exercise happened.
    Yes,
    /// No exercise.
    #[default]
    No,
}

impl SportsActivity {
    /// The stored string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    /// Check if this is `Yes`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for SportsActivity {
    fn from(active: bool) -> Self {
        if active {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl FromStr for SportsActivity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Self::Yes),
            "No" => Ok(Self::No),
            other => Err(Error::invalid_document(format!(
                "sports_activity must be \"Yes\" or \"No\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for SportsActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single weigh-in as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Store-assigned identifier.
    pub id: EntryId,
    /// Calendar day of the measurement. Not unique.
    pub date: NaiveDate,
    /// Weight in kilograms.
    pub weight: f64,
    /// Whether exercise happened that day.
    pub sports_activity: SportsActivity,
}

/// The fields of an entry that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewEntry {
    /// Calendar day of the measurement.
    pub date: NaiveDate,
    /// Weight in kilograms.
    pub weight: f64,
    /// Whether exercise happened that day.
    pub sports_activity: SportsActivity,
}

impl NewEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(date: NaiveDate, weight: f64, sports_activity: SportsActivity) -> Self {
        Self {
            date,
            weight,
            sports_activity,
        }
    }

    /// Attach the identifier the store assigned.
    #[must_use]
    pub fn with_id(self, id: EntryId) -> WeightEntry {
        WeightEntry {
            id,
            date: self.date,
            weight: self.weight,
            sports_activity: self.sports_activity,
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] if the string is not a valid date.
pub fn parse_date(s: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| Error::invalid_document(format!("invalid date {s:?}: {e}")))
}
