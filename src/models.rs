use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contributing factors a user can rate alongside their mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Sleep,
    Stress,
    Activity,
    Social,
}

impl Factor {
    /// Every tracked factor, in reporting order
    pub const ALL: [Factor; 4] = [Factor::Sleep, Factor::Stress, Factor::Activity, Factor::Social];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Sleep => "sleep",
            Factor::Stress => "stress",
            Factor::Activity => "activity",
            Factor::Social => "social",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Factor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sleep" => Ok(Factor::Sleep),
            "stress" => Ok(Factor::Stress),
            "activity" | "exercise" => Ok(Factor::Activity),
            "social" => Ok(Factor::Social),
            _ => Err(format!("Unknown factor: {}", s)),
        }
    }
}

/// Per-entry factor ratings (1-5). Absent factors stay `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorRatings {
    #[serde(default, deserialize_with = "lenient_number::deserialize", skip_serializing_if = "Option::is_none")]
    pub sleep: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number::deserialize", skip_serializing_if = "Option::is_none")]
    pub stress: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number::deserialize", skip_serializing_if = "Option::is_none")]
    pub activity: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number::deserialize", skip_serializing_if = "Option::is_none")]
    pub social: Option<f64>,
}

impl FactorRatings {
    pub fn get(&self, factor: Factor) -> Option<f64> {
        match factor {
            Factor::Sleep => self.sleep,
            Factor::Stress => self.stress,
            Factor::Activity => self.activity,
            Factor::Social => self.social,
        }
    }

    pub fn set(&mut self, factor: Factor, value: Option<f64>) {
        let slot = match factor {
            Factor::Sleep => &mut self.sleep,
            Factor::Stress => &mut self.stress,
            Factor::Activity => &mut self.activity,
            Factor::Social => &mut self.social,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        Factor::ALL.iter().all(|factor| self.get(*factor).is_none())
    }
}

/// A single mood log as handed over by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Self-reported mood on a 1-10 scale; `None` when missing or unparseable
    #[serde(default, deserialize_with = "lenient_number::deserialize")]
    pub mood: Option<f64>,

    #[serde(default, deserialize_with = "null_as_default::deserialize")]
    pub factors: FactorRatings,

    #[serde(default, deserialize_with = "null_as_default::deserialize")]
    pub tags: Vec<String>,

    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MoodEntry {
    pub fn new(mood: f64, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            mood: Some(mood),
            factors: FactorRatings::default(),
            tags: Vec::new(),
            date,
            notes: None,
        }
    }

    pub fn with_factor(mut self, factor: Factor, value: f64) -> Self {
        self.factors.set(factor, Some(value));
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Mood as a usable number, if there is one
    pub fn mood_value(&self) -> Option<f64> {
        self.mood.filter(|m| m.is_finite())
    }
}

/// Kinds of suggestion the engine can rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Exercise,
    Resource,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Exercise => write!(f, "exercise"),
            ItemKind::Resource => write!(f, "resource"),
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exercise" | "exercises" => Ok(ItemKind::Exercise),
            "resource" | "resources" => Ok(ItemKind::Resource),
            _ => Err(format!("Invalid item kind: {}", s)),
        }
    }
}

/// Inclusive mood range under which an item is considered suitable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodRange {
    pub min: f64,
    pub max: f64,
}

impl MoodRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Malformed ranges (inverted or non-finite bounds) contain nothing.
    pub fn contains(&self, value: f64) -> bool {
        self.is_well_formed() && value >= self.min && value <= self.max
    }

    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Exercise or resource offered to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    pub id: String,

    pub kind: ItemKind,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Mood ranges that earn the mood-match bonus; empty means it never applies
    #[serde(default, deserialize_with = "null_as_default::deserialize")]
    pub recommended_for: Vec<MoodRange>,

    #[serde(default, deserialize_with = "null_as_default::deserialize")]
    pub tags: Vec<String>,
}

impl CandidateItem {
    pub fn new(id: impl Into<String>, kind: ItemKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: None,
            recommended_for: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn for_mood_range(mut self, min: f64, max: f64) -> Self {
        self.recommended_for.push(MoodRange::new(min, max));
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A scored candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item: CandidateItem,
    pub score: f64,
}

/// Correlation between one factor and mood
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorCorrelation {
    pub factor: Factor,
    pub correlation: f64,
}

/// Aggregate view over a user's mood history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub average_mood: f64,
    pub mood_trend: Vec<f64>,
    pub factor_correlations: Vec<FactorCorrelation>,
}

impl Statistics {
    pub fn correlation_for(&self, factor: Factor) -> Option<f64> {
        self.factor_correlations
            .iter()
            .find(|c| c.factor == factor)
            .map(|c| c.correlation)
    }
}

/// Inclusive date window; a missing bound leaves that side open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Whole-day window: from the start of `start` to the last instant of `end`
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let start = start.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc());
        let end = end
            .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
            .map(|dt| dt.and_utc());
        Self { start, end }
    }

    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| *date >= start) && self.end.map_or(true, |end| *date <= end)
    }

    /// True when the bounds cross and nothing can match
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }
}

/// Deserialize optional numbers the way form input arrives: numbers and numeric
/// strings parse, everything else (null, text, NaN) becomes `None`.
mod lenient_number {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;

        Ok(value
            .and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .filter(|v| v.is_finite()))
    }
}

/// Treat an explicit `null` like a missing key.
mod null_as_default {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
    }
}
