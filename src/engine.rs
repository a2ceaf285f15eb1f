//! Mood analytics and recommendation pipeline
//!
//! Every call works on snapshots handed in by the caller and keeps no state
//! between calls, so one engine can serve any number of threads.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::affinity::extract_affinity_tags;
use crate::error::{MoodRsError, Result};
use crate::models::{CandidateItem, DateRange, MoodEntry, Recommendation, Statistics};
use crate::ranking::rank;
use crate::scoring::{MoodProfile, RecommendationScorer, ScoringStrategy, COLD_START_SCORE};
use crate::statistics::{average_mood, StatisticsAggregator, StatisticsConfig};

/// Engine configuration with customizable sample sizes and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of most recent entries used for mood profile (default: 5)
    pub recent_sample_size: usize,

    /// Recommendations returned when the caller gives no limit (default: 3)
    pub default_limit: usize,

    /// Affinity tags kept per user (default: 3)
    pub max_affinity_tags: usize,

    /// Entries needed before a factor correlation is reported (default: 3)
    pub min_factor_samples: usize,

    /// Trend value for entries without a usable mood (default: 5.0)
    pub neutral_mood: f64,

    /// Flat score for users without history (default: 0.5)
    pub cold_start_score: f64,

    /// Exercise weights
    pub exercise: ScoringStrategy,

    /// Resource weights
    pub resource: ScoringStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            recent_sample_size: 5,
            default_limit: 3,
            max_affinity_tags: 3,
            min_factor_samples: 3,
            neutral_mood: 5.0,
            cold_start_score: COLD_START_SCORE,
            exercise: ScoringStrategy::exercise(),
            resource: ScoringStrategy::resource(),
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.recent_sample_size == 0 {
            return Err(MoodRsError::Configuration(
                "recent_sample_size must be at least 1".to_string(),
            ));
        }

        if self.default_limit == 0 {
            return Err(MoodRsError::Configuration(
                "default_limit must be at least 1".to_string(),
            ));
        }

        if !(1.0..=10.0).contains(&self.neutral_mood) {
            return Err(MoodRsError::Configuration(format!(
                "neutral_mood must be within 1-10, got {}",
                self.neutral_mood
            )));
        }

        let weights = [
            ("cold_start_score", self.cold_start_score),
            ("exercise.baseline", self.exercise.baseline),
            ("exercise.mood_match_bonus", self.exercise.mood_match_bonus),
            ("exercise.tag_bonus", self.exercise.tag_bonus),
            ("resource.baseline", self.resource.baseline),
            ("resource.mood_match_bonus", self.resource.mood_match_bonus),
            ("resource.tag_bonus", self.resource.tag_bonus),
        ];

        if let Some((name, value)) = weights
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            return Err(MoodRsError::Configuration(format!(
                "{} must be within 0-1, got {}",
                name, value
            )));
        }

        Ok(())
    }

    fn scorer(&self) -> RecommendationScorer {
        RecommendationScorer {
            exercise: self.exercise,
            resource: self.resource,
            cold_start_score: self.cold_start_score,
        }
    }

    fn statistics_config(&self) -> StatisticsConfig {
        StatisticsConfig {
            min_factor_samples: self.min_factor_samples,
            neutral_mood: self.neutral_mood,
        }
    }
}

/// One user's recommendation request within a batch
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRequest<'a> {
    /// Recent entries, most recent first
    pub recent_entries: &'a [MoodEntry],

    /// Every candidate to consider
    pub candidates: &'a [CandidateItem],

    /// Falls back to the configured default when `None`
    pub limit: Option<usize>,
}

/// Core analytics and recommendation engine
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    config: EngineConfig,
    scorer: RecommendationScorer,
    aggregator: StatisticsAggregator,
}

impl RecommendationEngine {
    /// Create new engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create new engine with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        RecommendationEngine {
            scorer: config.scorer(),
            aggregator: StatisticsAggregator::with_config(config.statistics_config()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Statistics over a user's history (oldest first), optionally date-bounded
    pub fn statistics(&self, entries: &[MoodEntry], date_range: Option<&DateRange>) -> Statistics {
        self.aggregator.compute(entries, date_range)
    }

    /// Average mood and interest tags from the most recent entries.
    ///
    /// `recent` must be ordered most recent first; only the configured sample
    /// size is considered.
    pub fn mood_profile(&self, recent: &[MoodEntry]) -> MoodProfile {
        let sample = &recent[..recent.len().min(self.config.recent_sample_size)];

        if sample.is_empty() {
            return MoodProfile::default();
        }

        MoodProfile {
            average_mood: Some(average_mood(sample)),
            affinity_tags: extract_affinity_tags(sample, self.config.max_affinity_tags),
        }
    }

    /// Score every candidate against the user's recent mood and keep the best
    pub fn recommend(
        &self,
        recent: &[MoodEntry],
        candidates: &[CandidateItem],
        limit: Option<usize>,
    ) -> Vec<Recommendation> {
        let profile = self.mood_profile(recent);
        self.recommend_for_profile(&profile, candidates, limit)
    }

    /// Same as [`recommend`](Self::recommend) with a precomputed profile
    pub fn recommend_for_profile(
        &self,
        profile: &MoodProfile,
        candidates: &[CandidateItem],
        limit: Option<usize>,
    ) -> Vec<Recommendation> {
        let limit = limit.unwrap_or(self.config.default_limit);

        debug!(
            cold_start = profile.is_cold_start(),
            average_mood = ?profile.average_mood,
            affinity_tags = ?profile.affinity_tags,
            candidates = candidates.len(),
            limit,
            "Scoring candidates"
        );

        let scored = candidates
            .iter()
            .map(|item| Recommendation {
                score: self.scorer.score(item, profile),
                item: item.clone(),
            })
            .collect();

        rank(scored, limit)
    }

    /// Run independent requests in parallel; results follow request order
    pub fn recommend_batch(&self, requests: &[RecommendationRequest<'_>]) -> Vec<Vec<Recommendation>> {
        debug!(requests = requests.len(), "Running recommendation batch");

        requests
            .par_iter()
            .map(|request| self.recommend(request.recent_entries, request.candidates, request.limit))
            .collect()
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Factor, ItemKind};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const EPS: f64 = 1e-9;

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 10, 20, 0, 0).unwrap() - Duration::days(offset)
    }

    fn resources() -> Vec<CandidateItem> {
        vec![
            CandidateItem::new("r-general", ItemKind::Resource, "General wellbeing"),
            CandidateItem::new("r-low", ItemKind::Resource, "When you feel low").for_mood_range(1.0, 4.0),
            CandidateItem::new("r-work", ItemKind::Resource, "Work balance")
                .for_mood_range(4.0, 7.0)
                .with_tags(["work"]),
            CandidateItem::new("r-sleep", ItemKind::Resource, "Sleep hygiene").with_tags(["sleep", "work"]),
        ]
    }

    fn recent_low_mood() -> Vec<MoodEntry> {
        vec![
            MoodEntry::new(3.0, day(0)).with_tags(["work", "sleep"]),
            MoodEntry::new(4.0, day(1)).with_tags(["work"]),
            MoodEntry::new(2.0, day(2)).with_tags(["sleep"]),
        ]
    }

    #[test]
    fn test_mood_profile() {
        let engine = RecommendationEngine::new();
        let profile = engine.mood_profile(&recent_low_mood());

        assert!((profile.average_mood.unwrap() - 3.0).abs() < EPS);
        assert_eq!(profile.affinity_tags, vec!["work", "sleep"]);
    }

    #[test]
    fn test_mood_profile_uses_recent_sample_only() {
        let engine = RecommendationEngine::with_config(EngineConfig {
            recent_sample_size: 2,
            ..EngineConfig::default()
        });

        let profile = engine.mood_profile(&recent_low_mood());
        assert!((profile.average_mood.unwrap() - 3.5).abs() < EPS);
    }

    #[test]
    fn test_profile_without_valid_moods_is_not_cold_start() {
        let engine = RecommendationEngine::new();
        let mut entry = MoodEntry::new(0.0, day(0));
        entry.mood = None;

        let profile = engine.mood_profile(&[entry]);
        assert_eq!(profile.average_mood, Some(0.0));
        assert!(!profile.is_cold_start());
    }

    #[test]
    fn test_recommend_resources() {
        let engine = RecommendationEngine::new();
        let ranked = engine.recommend(&recent_low_mood(), &resources(), None);

        // r-sleep: 0.3 + 2 * 0.2 = 0.7; r-low: 0.3 + 0.4 = 0.7; r-work: 0.3 + 0.2 = 0.5
        let ids: Vec<&str> = ranked.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(ids, vec!["r-low", "r-sleep", "r-work"]);
        assert!((ranked[0].score - 0.7).abs() < EPS);
        assert!((ranked[2].score - 0.5).abs() < EPS);
    }

    #[test]
    fn test_cold_start_keeps_candidate_order() {
        let engine = RecommendationEngine::new();
        let ranked = engine.recommend(&[], &resources(), Some(10));

        assert_eq!(ranked.len(), 4);
        assert!(ranked.iter().all(|r| r.score == 0.5));
        assert_eq!(ranked[0].item.id, "r-general");
        assert_eq!(ranked[3].item.id, "r-sleep");
    }

    #[test]
    fn test_no_candidates() {
        let engine = RecommendationEngine::new();
        assert!(engine.recommend(&recent_low_mood(), &[], Some(5)).is_empty());
    }

    #[test]
    fn test_statistics_uses_config() {
        let engine = RecommendationEngine::with_config(EngineConfig {
            min_factor_samples: 2,
            ..EngineConfig::default()
        });

        let entries = vec![
            MoodEntry::new(6.0, day(1)).with_factor(Factor::Sleep, 3.0),
            MoodEntry::new(8.0, day(0)).with_factor(Factor::Sleep, 5.0),
        ];

        let stats = engine.statistics(&entries, None);
        assert!(stats.correlation_for(Factor::Sleep).is_some());
        assert_eq!(stats.average_mood, 7.0);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let engine = RecommendationEngine::new();
        let exercises = vec![
            CandidateItem::new("e-calm", ItemKind::Exercise, "Calm").for_mood_range(1.0, 4.0),
            CandidateItem::new("e-energy", ItemKind::Exercise, "Energize").for_mood_range(6.0, 10.0),
        ];
        let low = recent_low_mood();
        let high = vec![MoodEntry::new(9.0, day(0))];

        let requests = vec![
            RecommendationRequest { recent_entries: &low, candidates: &exercises, limit: Some(1) },
            RecommendationRequest { recent_entries: &high, candidates: &exercises, limit: Some(1) },
            RecommendationRequest { recent_entries: &[], candidates: &exercises, limit: None },
        ];

        let results = engine.recommend_batch(&requests);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0][0].item.id, "e-calm");
        assert_eq!(results[1][0].item.id, "e-energy");
        assert_eq!(results[2].len(), 2);
        for (request, result) in requests.iter().zip(&results) {
            assert_eq!(
                *result,
                engine.recommend(request.recent_entries, request.candidates, request.limit)
            );
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let zero_sample = EngineConfig {
            recent_sample_size: 0,
            ..EngineConfig::default()
        };
        assert!(zero_sample.validate().is_err());

        let heavy = EngineConfig {
            resource: ScoringStrategy {
                tag_bonus: 1.5,
                ..ScoringStrategy::resource()
            },
            ..EngineConfig::default()
        };
        let err = heavy.validate().unwrap_err();
        assert!(err.to_string().contains("resource.tag_bonus"));
    }
}
