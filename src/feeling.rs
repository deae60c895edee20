use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::error;

use crate::error::PollError;

/// How a user reports their day, from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feeling {
    VeryBad = 0,
    Bad = 1,
    Good = 2,
    VeryGood = 3,
}

impl Feeling {
    pub const ALL: [Feeling; 4] = [
        Feeling::VeryBad,
        Feeling::Bad,
        Feeling::Good,
        Feeling::VeryGood,
    ];

    /// Validate a raw level. Only `0..=3` map to a feeling.
    pub fn validate(value: i64) -> Result<Self, PollError> {
        match value {
            0 => Ok(Feeling::VeryBad),
            1 => Ok(Feeling::Bad),
            2 => Ok(Feeling::Good),
            3 => Ok(Feeling::VeryGood),
            _ => Err(PollError::InvalidFeeling(value.to_string())),
        }
    }

    /// Name of the stored counter attribute for this feeling.
    pub fn field_name(self) -> &'static str {
        match self {
            Feeling::VeryBad => "very_bad",
            Feeling::Bad => "bad",
            Feeling::Good => "good",
            Feeling::VeryGood => "very_good",
        }
    }

    /// Counter attribute for a raw level.
    ///
    /// Callers are expected to have validated already, so an out of range
    /// value here is an internal invariant failure rather than bad input.
    pub fn field_name_for(value: i64) -> Result<&'static str, PollError> {
        Feeling::validate(value)
            .map(Feeling::field_name)
            .inspect_err(|_| error!(value, "no counter attribute for feeling level"))
    }

    pub fn level(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl TryFrom<i64> for Feeling {
    type Error = PollError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Feeling::validate(value)
    }
}

impl FromStr for Feeling {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feeling::ALL
            .into_iter()
            .find(|f| f.field_name() == s)
            .ok_or_else(|| PollError::InvalidFeeling(s.to_string()))
    }
}

impl Serialize for Feeling {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.level())
    }
}

/// An unvalidated feeling as it arrives on the wire: the numeric level or
/// the attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FeelingValue {
    Level(i64),
    Name(String),
}

impl FeelingValue {
    pub fn validate(&self) -> Result<Feeling, PollError> {
        match self {
            FeelingValue::Level(level) => Feeling::validate(*level),
            FeelingValue::Name(name) => name.parse(),
        }
    }
}

impl<'de> Deserialize<'de> for Feeling {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FeelingValue::deserialize(deserializer)?
            .validate()
            .map_err(serde::de::Error::custom)
    }
}
