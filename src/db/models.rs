use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PollError;
use crate::feeling::Feeling;

/// `YYYY-MM-DD`, the partition key format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored record as returned by a backend: attribute name to raw value.
pub type Attributes = Map<String, Value>;

/// Aggregated feelings for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResult {
    pub date: NaiveDate,
    pub very_bad: u64,
    pub bad: u64,
    pub good: u64,
    pub very_good: u64,
}

impl PollResult {
    /// A day with no activity.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            very_bad: 0,
            bad: 0,
            good: 0,
            very_good: 0,
        }
    }

    pub fn count(&self, feeling: Feeling) -> u64 {
        match feeling {
            Feeling::VeryBad => self.very_bad,
            Feeling::Bad => self.bad,
            Feeling::Good => self.good,
            Feeling::VeryGood => self.very_good,
        }
    }

    fn count_mut(&mut self, feeling: Feeling) -> &mut u64 {
        match feeling {
            Feeling::VeryBad => &mut self.very_bad,
            Feeling::Bad => &mut self.bad,
            Feeling::Good => &mut self.good,
            Feeling::VeryGood => &mut self.very_good,
        }
    }

    /// Build a result from a stored record.
    ///
    /// Missing counters are zero. A counter that is present but not a
    /// non-negative integer is corruption. Attributes that are not counters
    /// (the key itself, for one) are ignored.
    pub fn from_attributes(date: NaiveDate, attributes: &Attributes) -> Result<Self, PollError> {
        let mut result = Self::empty(date);

        for feeling in Feeling::ALL {
            let field = feeling.field_name();
            let Some(value) = attributes.get(field) else {
                continue;
            };

            *result.count_mut(feeling) = value.as_u64().ok_or_else(|| PollError::DataCorruption {
                key: date_key(date),
                detail: format!("{field} holds {value}, expected a non-negative integer"),
            })?;
        }

        Ok(result)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a client supplied date, accepting only the canonical form.
pub fn parse_date(input: &str) -> Result<NaiveDate, PollError> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .filter(|date| date_key(*date) == input)
        .ok_or_else(|| PollError::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn serializes_with_canonical_date() {
        let mut result = PollResult::empty(day());
        result.good = 3;
        result.very_bad = 1;
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"date": "2024-03-01", "very_bad": 1, "bad": 0, "good": 3, "very_good": 0})
        );
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let result =
            PollResult::from_attributes(day(), &attrs(json!({"date": "2024-03-01", "good": 4})))
                .unwrap();
        assert_eq!(result.good, 4);
        assert_eq!(result.count(Feeling::Bad), 0);
        assert_eq!(result.count(Feeling::VeryGood), 0);
    }

    #[test]
    fn non_numeric_counter_is_corruption() {
        for bad in [json!("abc"), json!(-1), json!(1.5), json!(null)] {
            let err = PollResult::from_attributes(day(), &attrs(json!({ "bad": bad })))
                .unwrap_err();
            match err {
                PollError::DataCorruption { key, detail } => {
                    assert_eq!(key, "2024-03-01");
                    assert!(detail.starts_with("bad holds"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn parse_date_is_strict() {
        assert_eq!(parse_date("2024-03-01").unwrap(), day());
        for input in ["2024-3-1", "2024-02-30", "01-03-2024", "2024-03-01T00:00:00", ""] {
            assert!(matches!(parse_date(input), Err(PollError::InvalidDate(_))));
        }
    }
}
