use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::correlation::pearson;
use crate::models::{DateRange, Factor, FactorCorrelation, MoodEntry, Statistics};

/// Tunables for statistics aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Minimum entries carrying a factor before its correlation is reported
    pub min_factor_samples: usize,

    /// Value substituted into the trend for entries without a usable mood
    pub neutral_mood: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        StatisticsConfig {
            min_factor_samples: 3,
            neutral_mood: 5.0,
        }
    }
}

/// Reduces a mood history into average, trend and factor correlations
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    config: StatisticsConfig,
}

impl StatisticsAggregator {
    /// Create aggregator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create aggregator with custom configuration
    pub fn with_config(config: StatisticsConfig) -> Self {
        StatisticsAggregator { config }
    }

    pub fn config(&self) -> &StatisticsConfig {
        &self.config
    }

    /// Compute statistics over `entries`, optionally restricted to `date_range`.
    ///
    /// Entries should be ordered oldest to newest for the trend to read
    /// chronologically; the order is preserved as given.
    pub fn compute(&self, entries: &[MoodEntry], date_range: Option<&DateRange>) -> Statistics {
        let filtered = filter_by_date_range(entries, date_range);

        if filtered.is_empty() {
            debug!("No mood entries in range, returning empty statistics");
            return Statistics::default();
        }

        let average_mood = average_mood(filtered.iter().copied());
        let mood_trend: Vec<f64> = filtered.iter().map(|e| self.coerced_mood(e)).collect();

        let factor_correlations = Factor::ALL
            .iter()
            .filter_map(|&factor| self.factor_correlation(&filtered, factor))
            .collect();

        Statistics {
            average_mood,
            mood_trend,
            factor_correlations,
        }
    }

    fn factor_correlation(&self, entries: &[&MoodEntry], factor: Factor) -> Option<FactorCorrelation> {
        let (values, moods): (Vec<f64>, Vec<f64>) = entries
            .iter()
            .filter_map(|entry| {
                entry
                    .factors
                    .get(factor)
                    .filter(|v| v.is_finite())
                    .map(|v| (v, self.coerced_mood(entry)))
            })
            .unzip();

        if values.len() < self.config.min_factor_samples {
            debug!(
                factor = %factor,
                samples = values.len(),
                required = self.config.min_factor_samples,
                "Skipping factor correlation, not enough samples"
            );
            return None;
        }

        let correlation = pearson(&values, &moods);
        correlation
            .is_finite()
            .then_some(FactorCorrelation { factor, correlation })
    }

    fn coerced_mood(&self, entry: &MoodEntry) -> f64 {
        entry.mood_value().unwrap_or(self.config.neutral_mood)
    }
}

/// Compute statistics with the default configuration
pub fn compute_statistics(entries: &[MoodEntry], date_range: Option<&DateRange>) -> Statistics {
    StatisticsAggregator::new().compute(entries, date_range)
}

/// Keep entries whose date lies inside the inclusive range, preserving order
pub fn filter_by_date_range<'a>(entries: &'a [MoodEntry], date_range: Option<&DateRange>) -> Vec<&'a MoodEntry> {
    entries
        .iter()
        .filter(|entry| date_range.map_or(true, |range| range.contains(&entry.date)))
        .collect()
}

/// Mean of the usable moods; 0 when there are none
pub fn average_mood<'a, I>(entries: I) -> f64
where
    I: IntoIterator<Item = &'a MoodEntry>,
{
    let (sum, count) = entries
        .into_iter()
        .filter_map(MoodEntry::mood_value)
        .fold((0.0, 0usize), |(sum, count), mood| (sum + mood, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
