use tracing::instrument;

use crate::engine::RecommendationEngine;
use crate::error::Result;
use crate::models::{DateRange, ItemKind, Recommendation, Statistics};
use crate::snapshot::MoodDataSource;

/// Serves analytics and recommendation requests from a data source
pub struct MoodService<S> {
    source: S,
    engine: RecommendationEngine,
}

impl<S: MoodDataSource> MoodService<S> {
    pub fn new(source: S, engine: RecommendationEngine) -> Self {
        Self { source, engine }
    }

    /// Statistics over the user's entries within `date_range`
    #[instrument(skip(self))]
    pub fn statistics(&self, user_id: &str, date_range: Option<&DateRange>) -> Result<Statistics> {
        let entries = self.source.fetch_mood_entries(user_id, date_range)?;
        Ok(self.engine.statistics(&entries, None))
    }

    /// Best candidates of `kind` for the user's recent mood
    #[instrument(skip(self))]
    pub fn recommend(&self, user_id: &str, kind: ItemKind, limit: Option<usize>) -> Result<Vec<Recommendation>> {
        let recent = self
            .source
            .fetch_recent_mood_entries(user_id, self.engine.config().recent_sample_size)?;
        let candidates = self.source.fetch_all_candidate_items(kind)?;

        Ok(self.engine.recommend(&recent, &candidates, limit))
    }

    pub fn recommend_exercises(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<Recommendation>> {
        self.recommend(user_id, ItemKind::Exercise, limit)
    }

    pub fn recommend_resources(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<Recommendation>> {
        self.recommend(user_id, ItemKind::Resource, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateItem, Factor, MoodEntry};
    use crate::snapshot::SnapshotStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap() + Duration::days(offset)
    }

    fn service() -> MoodService<SnapshotStore> {
        let mut store = SnapshotStore::new();
        store.add_entries(
            "alice",
            vec![
                MoodEntry::new(8.0, day(0)).with_factor(Factor::Sleep, 5.0).with_tags(["friends"]),
                MoodEntry::new(4.0, day(1)).with_factor(Factor::Sleep, 2.0).with_tags(["work"]),
                MoodEntry::new(3.0, day(2)).with_factor(Factor::Sleep, 1.0).with_tags(["work"]),
            ],
        );
        store.add_item(CandidateItem::new("e-low", ItemKind::Exercise, "Grounding").for_mood_range(1.0, 5.0));
        store.add_item(CandidateItem::new("e-high", ItemKind::Exercise, "Gratitude").for_mood_range(7.0, 10.0));
        store.add_item(CandidateItem::new("r-work", ItemKind::Resource, "Work stress").with_tags(["work"]));
        store.add_item(CandidateItem::new("r-other", ItemKind::Resource, "Hobbies"));

        MoodService::new(store, RecommendationEngine::new())
    }

    #[test]
    fn test_statistics_for_user() {
        let stats = service().statistics("alice", None).unwrap();

        assert_eq!(stats.mood_trend, vec![8.0, 4.0, 3.0]);
        assert_eq!(stats.average_mood, 5.0);
        assert!(stats.correlation_for(Factor::Sleep).unwrap() > 0.9);
    }

    #[test]
    fn test_statistics_with_range() {
        let range = DateRange::new(Some(day(1)), None);
        let stats = service().statistics("alice", Some(&range)).unwrap();

        assert_eq!(stats.mood_trend, vec![4.0, 3.0]);
        assert!(stats.factor_correlations.is_empty());
    }

    #[test]
    fn test_recommendations_by_kind() {
        let svc = service();

        let exercises = svc.recommend_exercises("alice", Some(1)).unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].item.id, "e-low");

        let resources = svc.recommend_resources("alice", None).unwrap();
        assert_eq!(resources[0].item.id, "r-work");
        assert!((resources[0].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_user_gets_cold_start() {
        let recommendations = service().recommend_exercises("nobody", None).unwrap();

        assert_eq!(recommendations.len(), 2);
        assert!(recommendations.iter().all(|r| r.score == 0.5));
    }
}
