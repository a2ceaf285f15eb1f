//! Fitness scoring of candidate items against a user's recent mood
//!
//! Exercises and resources share one formula:
//!
//! ```text
//! score = baseline
//!       + mood_match_bonus  (once, if any applicability range holds the average mood)
//!       + tag_bonus * |item tags ∩ affinity tags|
//! ```
//!
//! clamped to [0, 1]. Users without any mood history get a flat cold-start
//! score instead.

use serde::{Deserialize, Serialize};

use crate::models::{CandidateItem, ItemKind};

/// Score every candidate receives when the user has no mood history
pub const COLD_START_SCORE: f64 = 0.5;

/// Weights for one kind of candidate item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringStrategy {
    /// Starting score before any bonus
    pub baseline: f64,

    /// Added once when an applicability range contains the average mood
    pub mood_match_bonus: f64,

    /// Added per item tag found among the user's affinity tags
    pub tag_bonus: f64,
}

impl ScoringStrategy {
    /// Exercises: mood fit only
    pub fn exercise() -> Self {
        ScoringStrategy {
            baseline: 0.5,
            mood_match_bonus: 0.3,
            tag_bonus: 0.0,
        }
    }

    /// Resources: mood fit plus topical overlap
    pub fn resource() -> Self {
        ScoringStrategy {
            baseline: 0.3,
            mood_match_bonus: 0.4,
            tag_bonus: 0.2,
        }
    }

    pub fn for_kind(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Exercise => Self::exercise(),
            ItemKind::Resource => Self::resource(),
        }
    }

    /// Weighted score for a user whose average mood is known
    pub fn score(&self, item: &CandidateItem, average_mood: f64, affinity_tags: &[String]) -> f64 {
        let mood_bonus = if matches_mood(item, average_mood) {
            self.mood_match_bonus
        } else {
            0.0
        };

        let tag_bonus = if self.tag_bonus > 0.0 {
            self.tag_bonus * shared_tag_count(item, affinity_tags) as f64
        } else {
            0.0
        };

        (self.baseline + mood_bonus + tag_bonus).clamp(0.0, 1.0)
    }
}

/// What the scorer knows about the user for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    /// Average recent mood; `None` when the user has no history (cold start)
    pub average_mood: Option<f64>,

    /// Most frequent recent tags
    pub affinity_tags: Vec<String>,
}

impl MoodProfile {
    pub fn is_cold_start(&self) -> bool {
        self.average_mood.is_none()
    }
}

/// Scores candidates of any kind with per-kind strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationScorer {
    pub exercise: ScoringStrategy,
    pub resource: ScoringStrategy,
    pub cold_start_score: f64,
}

impl Default for RecommendationScorer {
    fn default() -> Self {
        RecommendationScorer {
            exercise: ScoringStrategy::exercise(),
            resource: ScoringStrategy::resource(),
            cold_start_score: COLD_START_SCORE,
        }
    }
}

impl RecommendationScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(&self, kind: ItemKind) -> &ScoringStrategy {
        match kind {
            ItemKind::Exercise => &self.exercise,
            ItemKind::Resource => &self.resource,
        }
    }

    /// Score `item` for `profile`. Cold start bypasses the weighted formula.
    pub fn score(&self, item: &CandidateItem, profile: &MoodProfile) -> f64 {
        match profile.average_mood {
            Some(mood) => self
                .strategy(item.kind)
                .score(item, mood, &profile.affinity_tags),
            None => self.cold_start_score,
        }
    }
}

/// Score with the default weights for the item's kind
pub fn score(item: &CandidateItem, average_mood: Option<f64>, affinity_tags: &[String]) -> f64 {
    match average_mood {
        Some(mood) => ScoringStrategy::for_kind(item.kind).score(item, mood, affinity_tags),
        None => COLD_START_SCORE,
    }
}

fn matches_mood(item: &CandidateItem, mood: f64) -> bool {
    item.recommended_for.iter().any(|rule| rule.contains(mood))
}

fn shared_tag_count(item: &CandidateItem, affinity_tags: &[String]) -> usize {
    item.tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| affinity_tags.iter().any(|affinity| affinity == tag))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MoodRange;

    const EPS: f64 = 1e-9;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resource_mood_match() {
        let item = CandidateItem::new("r1", ItemKind::Resource, "Low mood reading").for_mood_range(1.0, 5.0);

        assert!((score(&item, Some(3.0), &[]) - 0.7).abs() < EPS);
        assert!((score(&item, Some(8.0), &[]) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_exercise_mood_match() {
        let item = CandidateItem::new("e1", ItemKind::Exercise, "Breathing").for_mood_range(1.0, 4.0);

        assert!((score(&item, Some(4.0), &[]) - 0.8).abs() < EPS);
        assert!((score(&item, Some(4.5), &[]) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_exercise_ignores_tags() {
        let item = CandidateItem::new("e1", ItemKind::Exercise, "Walk").with_tags(["work", "sleep"]);
        let affinity = tags(&["work", "sleep"]);

        assert!((score(&item, Some(6.0), &affinity) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_mood_bonus_applies_once() {
        let item = CandidateItem::new("r1", ItemKind::Resource, "Overlapping")
            .for_mood_range(1.0, 6.0)
            .for_mood_range(3.0, 8.0)
            .for_mood_range(4.0, 5.0);

        assert!((score(&item, Some(4.5), &[]) - 0.7).abs() < EPS);
    }

    #[test]
    fn test_empty_rules_never_match() {
        let item = CandidateItem::new("r1", ItemKind::Resource, "General");
        assert!((score(&item, Some(5.0), &[]) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_malformed_range_never_matches() {
        let mut item = CandidateItem::new("r1", ItemKind::Resource, "Broken");
        item.recommended_for.push(MoodRange::new(8.0, 2.0));

        assert!((score(&item, Some(5.0), &[]) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_resource_tag_bonus() {
        let affinity = tags(&["work", "sleep", "family"]);

        let one = CandidateItem::new("r1", ItemKind::Resource, "Work stress").with_tags(["work", "career"]);
        assert!((score(&one, Some(9.0), &affinity) - 0.5).abs() < EPS);

        let all = CandidateItem::new("r2", ItemKind::Resource, "Everything")
            .for_mood_range(1.0, 10.0)
            .with_tags(["work", "sleep", "family"]);
        // 0.3 + 0.4 + 0.6 clamps to 1.0
        assert_eq!(score(&all, Some(5.0), &affinity), 1.0);
    }

    #[test]
    fn test_cold_start_is_flat() {
        let items = vec![
            CandidateItem::new("e1", ItemKind::Exercise, "A").for_mood_range(1.0, 10.0),
            CandidateItem::new("r1", ItemKind::Resource, "B").with_tags(["work"]),
            CandidateItem::new("r2", ItemKind::Resource, "C").for_mood_range(2.0, 3.0),
        ];
        let affinity = tags(&["work"]);

        for item in &items {
            assert_eq!(score(item, None, &affinity), COLD_START_SCORE);
        }

        let scorer = RecommendationScorer::new();
        let profile = MoodProfile::default();
        assert!(profile.is_cold_start());
        for item in &items {
            assert_eq!(scorer.score(item, &profile), 0.5);
        }
    }

    #[test]
    fn test_scorer_picks_strategy_by_kind() {
        let scorer = RecommendationScorer::new();
        let profile = MoodProfile {
            average_mood: Some(3.0),
            affinity_tags: Vec::new(),
        };

        let exercise = CandidateItem::new("e1", ItemKind::Exercise, "A").for_mood_range(1.0, 5.0);
        let resource = CandidateItem::new("r1", ItemKind::Resource, "B").for_mood_range(1.0, 5.0);

        assert!((scorer.score(&exercise, &profile) - 0.8).abs() < EPS);
        assert!((scorer.score(&resource, &profile) - 0.7).abs() < EPS);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_score_stays_in_unit_interval(
            mood in -5.0f64..15.0,
            min in 0.0f64..10.0,
            width in -3.0f64..10.0,
            tag_count in 0usize..6,
            resource in any::<bool>()
        ) {
            let kind = if resource { ItemKind::Resource } else { ItemKind::Exercise };
            let item_tags: Vec<String> = (0..tag_count).map(|i| format!("t{}", i)).collect();
            let item = CandidateItem::new("x", kind, "X")
                .for_mood_range(min, min + width)
                .with_tags(item_tags.clone());

            let s = score(&item, Some(mood), &item_tags);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
