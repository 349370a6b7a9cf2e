//! Weekday curriculum lookup
//!
//! A fixed table mapping each weekday to the block of schedule text sent as
//! `classes_tomorrow`. The table is injected into the composer so deployments
//! and tests can swap it; it must always hold all seven weekdays.

use crate::error::RelayError;
use chrono::Weekday;
use serde::Deserialize;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Curriculum section as written in the config file
///
/// Every field is optional at parse time so that an incomplete table can be
/// reported with all missing weekdays at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurriculumSpec {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

impl CurriculumSpec {
    fn get(&self, weekday: Weekday) -> Option<&String> {
        match weekday {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }
}

impl From<&CurriculumTable> for CurriculumSpec {
    fn from(table: &CurriculumTable) -> Self {
        let entry = |day: Weekday| Some(table.lookup(day).to_string());
        Self {
            monday: entry(Weekday::Mon),
            tuesday: entry(Weekday::Tue),
            wednesday: entry(Weekday::Wed),
            thursday: entry(Weekday::Thu),
            friday: entry(Weekday::Fri),
            saturday: entry(Weekday::Sat),
            sunday: entry(Weekday::Sun),
        }
    }
}

/// Complete weekday → schedule text table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurriculumTable {
    entries: [String; 7],
}

impl Default for CurriculumTable {
    fn default() -> Self {
        let lines = |subjects: &[&str]| {
            subjects
                .iter()
                .map(|s| format!("   {s}"))
                .collect::<Vec<_>>()
                .join(" \n")
        };

        Self {
            entries: [
                lines(&["機器人/生物", "機器人/生物", "國文", "數學", "英文作文", "英文作文", "自然充實", "數學"]),
                lines(&["數學", "音樂", "化學", "化學", "體育", "數學", "國文", "國文"]),
                lines(&["國文", "全民國防教育", "英文", "化學", "班會", "團體活動", "地科", "化學"]),
                lines(&["家政", "家政", "本土語", "物理", "國文", "健康與護理", "數學", "英文"]),
                lines(&["進階程設/生物", "進階程設/生物", "英文", "體育", "國文", "物理", "數學", "物理"]),
                lines(&["不用上課！"]),
                lines(&["不用上課！明天要上課喔"]),
            ],
        }
    }
}

impl CurriculumTable {
    /// Build a table from seven entries ordered Monday..Sunday
    pub fn new(entries: [String; 7]) -> Self {
        Self { entries }
    }

    /// Build a table from a parsed config section
    ///
    /// Fails with a config error naming every weekday that has no entry.
    pub fn from_spec(spec: &CurriculumSpec) -> Result<Self, RelayError> {
        let missing: Vec<&str> = WEEKDAYS
            .iter()
            .filter(|day| spec.get(**day).is_none())
            .map(|day| weekday_name(*day))
            .collect();

        if !missing.is_empty() {
            return Err(RelayError::Config(format!(
                "curriculum table is incomplete, missing: {}",
                missing.join(", ")
            )));
        }

        let entries = WEEKDAYS.map(|day| spec.get(day).cloned().unwrap_or_default());
        Ok(Self { entries })
    }

    /// Schedule text for the given weekday
    pub fn lookup(&self, weekday: Weekday) -> &str {
        &self.entries[weekday.num_days_from_monday() as usize]
    }

    /// Schedule text by index, Monday = 0
    pub fn lookup_index(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_complete() {
        let table = CurriculumTable::default();
        for index in 0..7 {
            let text = table.lookup_index(index).unwrap();
            assert!(!text.is_empty());
            assert!(text.starts_with("   "));
        }
        assert!(table.lookup_index(7).is_none());
    }

    #[test]
    fn test_lookup_by_weekday() {
        let table = CurriculumTable::new([
            "mon".to_string(),
            "tue".to_string(),
            "wed".to_string(),
            "thu".to_string(),
            "fri".to_string(),
            "sat".to_string(),
            "sun".to_string(),
        ]);

        assert_eq!(table.lookup(Weekday::Mon), "mon");
        assert_eq!(table.lookup(Weekday::Sun), "sun");
        assert_eq!(table.lookup_index(4), Some("fri"));
    }

    #[test]
    fn test_incomplete_spec_is_config_error() {
        let spec = CurriculumSpec {
            monday: Some("a".to_string()),
            tuesday: Some("b".to_string()),
            ..Default::default()
        };

        let err = CurriculumTable::from_spec(&spec).unwrap_err();
        match err {
            RelayError::Config(msg) => {
                assert!(msg.contains("wednesday"));
                assert!(msg.contains("sunday"));
                assert!(!msg.contains("monday"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_spec_round_trips_default_table() {
        let table = CurriculumTable::default();
        let spec = CurriculumSpec::from(&table);
        let rebuilt = CurriculumTable::from_spec(&spec).unwrap();

        assert_eq!(rebuilt, table);
    }
}
