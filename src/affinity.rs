//! Interest tags derived from how often a tag recurs in recent entries

use std::collections::HashMap;

use crate::models::MoodEntry;

/// Default number of affinity tags kept per user
pub const DEFAULT_MAX_TAGS: usize = 3;

/// Most frequent tags across `entries`, at most `max_tags` of them.
///
/// Equal counts are ordered by first appearance in the input, so the result is
/// deterministic for a given entry order. Blank tags are ignored.
pub fn extract_affinity_tags(entries: &[MoodEntry], max_tags: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    let tags = entries
        .iter()
        .flat_map(|entry| entry.tags.iter())
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty());

    for (position, tag) in tags.enumerate() {
        counts
            .entry(tag)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(tag, (count, first_seen))| (tag, count, first_seen))
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(max_tags)
        .map(|(tag, _, _)| tag.to_string())
        .collect()
}
