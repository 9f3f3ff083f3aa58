use serde::{Deserialize, Serialize};

/// One dataset row: a population group within a measure/comparison pair.
/// `value` is the group's share of the hundred people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub measure: String,
    pub comparison: String,
    pub group: String,
    pub value: f64,
}

impl Record {
    /// Number of person dots this row contributes. Fractional shares round
    /// up so a 0.4 group still shows a person.
    pub fn member_count(&self) -> usize {
        self.value.ceil() as usize
    }
}

/// The active measure/comparison pair. The chart starts on the `none`
/// sentinel, which matches no rows and renders an empty scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub measure: String,
    pub comparison: String,
}

impl Selection {
    pub fn new(measure: impl Into<String>, comparison: impl Into<String>) -> Self {
        Self {
            measure: measure.into(),
            comparison: comparison.into(),
        }
    }

    pub fn none() -> Self {
        Self::new("none", "none")
    }

    pub fn matches(&self, record: &Record) -> bool {
        record.measure == self.measure && record.comparison == self.comparison
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_count_rounds_fractions_up() {
        let record = |value: f64| Record {
            measure: "housing".into(),
            comparison: "2016".into(),
            group: "Rented".into(),
            value,
        };
        assert_eq!(record(31.0).member_count(), 31);
        assert_eq!(record(34.5).member_count(), 35);
        assert_eq!(record(0.4).member_count(), 1);
        assert_eq!(record(0.0).member_count(), 0);
        assert_eq!(record(-2.0).member_count(), 0);
    }

    #[test]
    fn selection_matches_on_both_fields() {
        let record = Record {
            measure: "housing".into(),
            comparison: "2016".into(),
            group: "Rented".into(),
            value: 30.9,
        };
        assert!(Selection::new("housing", "2016").matches(&record));
        assert!(!Selection::new("housing", "2011").matches(&record));
        assert!(!Selection::new("ancestry", "2016").matches(&record));
        assert!(!Selection::none().matches(&record));
    }
}
