use crate::models::Recommendation;

/// Default number of recommendations returned
pub const DEFAULT_LIMIT: usize = 3;

/// Order by descending score and keep the first `limit`.
///
/// The sort is stable, so equal scores keep the candidates' original order.
pub fn rank(mut scored: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}
