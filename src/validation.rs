use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Factor, MoodEntry};

/// Valid mood scale
pub const MOOD_MIN: f64 = 1.0;
pub const MOOD_MAX: f64 = 10.0;

/// Valid factor rating scale
pub const FACTOR_MIN: f64 = 1.0;
pub const FACTOR_MAX: f64 = 5.0;

/// What a validation pass had to clean up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub entries_checked: usize,
    pub moods_cleared: usize,
    pub factors_cleared: usize,
    pub tags_dropped: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.moods_cleared == 0 && self.factors_cleared == 0 && self.tags_dropped == 0
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.entries_checked += other.entries_checked;
        self.moods_cleared += other.moods_cleared;
        self.factors_cleared += other.factors_cleared;
        self.tags_dropped += other.tags_dropped;
    }
}

/// Validate and clean mood entries coming from a collaborator
pub struct MoodEntryValidator;

impl MoodEntryValidator {
    /// Clean a batch of entries in place
    pub fn validate_entries(entries: &mut [MoodEntry]) -> ValidationReport {
        let report = entries
            .iter_mut()
            .map(Self::validate_entry)
            .fold(ValidationReport::default(), |mut total, report| {
                total.merge(report);
                total
            });

        if !report.is_clean() {
            warn!(
                entries = report.entries_checked,
                moods_cleared = report.moods_cleared,
                factors_cleared = report.factors_cleared,
                tags_dropped = report.tags_dropped,
                "Cleaned invalid values from mood entries"
            );
        }

        report
    }

    /// Clean a single entry. Out-of-range values become absent rather than
    /// being clamped, so they drop out of averages and correlations.
    pub fn validate_entry(entry: &mut MoodEntry) -> ValidationReport {
        let mut report = ValidationReport {
            entries_checked: 1,
            ..ValidationReport::default()
        };

        if let Some(mood) = entry.mood {
            if !Self::is_valid_mood(mood) {
                entry.mood = None;
                report.moods_cleared += 1;
            }
        }

        for factor in Factor::ALL {
            if let Some(value) = entry.factors.get(factor) {
                if !Self::is_valid_factor(value) {
                    entry.factors.set(factor, None);
                    report.factors_cleared += 1;
                }
            }
        }

        let before = entry.tags.len();
        let mut cleaned: Vec<String> = Vec::with_capacity(before);
        for tag in entry.tags.drain(..) {
            let tag = tag.trim();
            if !tag.is_empty() && !cleaned.iter().any(|t| t == tag) {
                cleaned.push(tag.to_string());
            }
        }
        report.tags_dropped = before - cleaned.len();
        entry.tags = cleaned;

        report
    }

    pub fn is_valid_mood(mood: f64) -> bool {
        mood.is_finite() && (MOOD_MIN..=MOOD_MAX).contains(&mood)
    }

    pub fn is_valid_factor(value: f64) -> bool {
        value.is_finite() && (FACTOR_MIN..=FACTOR_MAX).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(mood: f64) -> MoodEntry {
        MoodEntry::new(mood, Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_valid_entry_untouched() {
        let mut e = entry(7.0).with_factor(Factor::Sleep, 4.0).with_tags(["work"]);
        let original = e.clone();

        let report = MoodEntryValidator::validate_entry(&mut e);

        assert!(report.is_clean());
        assert_eq!(e, original);
    }

    #[test]
    fn test_out_of_range_mood_cleared() {
        let mut high = entry(11.0);
        let mut low = entry(0.0);

        assert_eq!(MoodEntryValidator::validate_entry(&mut high).moods_cleared, 1);
        assert_eq!(MoodEntryValidator::validate_entry(&mut low).moods_cleared, 1);
        assert_eq!(high.mood, None);
        assert_eq!(low.mood, None);
    }

    #[test]
    fn test_out_of_range_factors_cleared() {
        let mut e = entry(5.0)
            .with_factor(Factor::Sleep, 6.0)
            .with_factor(Factor::Stress, 0.0)
            .with_factor(Factor::Social, 3.0);

        let report = MoodEntryValidator::validate_entry(&mut e);

        assert_eq!(report.factors_cleared, 2);
        assert_eq!(e.factors.get(Factor::Sleep), None);
        assert_eq!(e.factors.get(Factor::Stress), None);
        assert_eq!(e.factors.get(Factor::Social), Some(3.0));
    }

    #[test]
    fn test_tags_trimmed_and_deduplicated() {
        let mut e = entry(5.0).with_tags([" work ", "work", "", "family", "   "]);

        let report = MoodEntryValidator::validate_entry(&mut e);

        assert_eq!(e.tags, vec!["work", "family"]);
        assert_eq!(report.tags_dropped, 3);
    }

    #[test]
    fn test_batch_report() {
        let mut entries = vec![entry(5.0), entry(42.0), entry(3.0).with_factor(Factor::Activity, 9.0)];

        let report = MoodEntryValidator::validate_entries(&mut entries);

        assert_eq!(report.entries_checked, 3);
        assert_eq!(report.moods_cleared, 1);
        assert_eq!(report.factors_cleared, 1);
        assert!(!report.is_clean());
    }
}
