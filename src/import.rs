//! Import mood entries exported from other trackers
//!
//! CSV files use flexible column names; JSON files hold an array of entries in
//! the snapshot format. Every imported entry goes through validation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ImportError, MoodRsError, Result};
use crate::models::{Factor, FactorRatings, MoodEntry};
use crate::validation::MoodEntryValidator;

/// Trait for importing mood entries from different file formats
pub trait ImportFormat {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Import mood entries from the file
    fn import_file(&self, file_path: &Path) -> Result<Vec<MoodEntry>>;

    /// Get the format name for this importer
    fn format_name(&self) -> &'static str;
}

/// Picks an importer by file extension
pub struct ImportManager {
    importers: Vec<Box<dyn ImportFormat>>,
}

impl ImportManager {
    pub fn new() -> Self {
        let importers: Vec<Box<dyn ImportFormat>> =
            vec![Box::new(CsvImporter::new()), Box::new(JsonImporter)];

        Self { importers }
    }

    /// Import a single file, auto-detecting the format
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<MoodEntry>> {
        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| ImportError::UnsupportedFormat {
                format: file_path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?;

        info!(
            file = %file_path.display(),
            format = importer.format_name(),
            "Importing mood entries"
        );

        let mut entries = importer.import_file(file_path)?;
        if entries.is_empty() {
            return Err(ImportError::Empty {
                path: file_path.to_path_buf(),
            }
            .into());
        }

        MoodEntryValidator::validate_entries(&mut entries);
        Ok(entries)
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

/// CSV importer with flexible column mapping
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        // Common column name variations
        Self::add_mapping(&mut column_mapping, "id", &["id", "entry_id", "uuid"]);
        Self::add_mapping(
            &mut column_mapping,
            "date",
            &["date", "timestamp", "time", "datetime", "created_at", "logged_at"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "mood",
            &["mood", "score", "rating", "mood_score", "mood_rating"],
        );
        Self::add_mapping(&mut column_mapping, "sleep", &["sleep", "sleep_quality"]);
        Self::add_mapping(&mut column_mapping, "stress", &["stress", "stress_level"]);
        Self::add_mapping(
            &mut column_mapping,
            "activity",
            &["activity", "exercise", "physical_activity"],
        );
        Self::add_mapping(&mut column_mapping, "social", &["social", "social_interaction"]);
        Self::add_mapping(&mut column_mapping, "tags", &["tags", "labels", "activities"]);
        Self::add_mapping(&mut column_mapping, "notes", &["notes", "note", "comment", "journal"]);

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    fn normalize_column_name(&self, name: &str) -> String {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");

        self.column_mapping
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }

    pub(crate) fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }

        let datetime_formats = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S%.f",
            "%d/%m/%Y %H:%M:%S",
            "%d/%m/%Y %H:%M",
        ];

        for format in &datetime_formats {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Some(naive.and_utc());
            }
        }

        for format in &["%Y-%m-%d", "%d/%m/%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
            }
        }

        // Seconds since epoch
        value
            .parse::<i64>()
            .ok()
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    fn parse_number(value: &str) -> Option<f64> {
        value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn parse_tags(value: &str) -> Vec<String> {
        value
            .split([';', '|'])
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn parse_record(
        &self,
        record: &StringRecord,
        columns: &HashMap<String, usize>,
        line: u64,
    ) -> Result<MoodEntry> {
        let field = |name: &str| {
            columns
                .get(name)
                .and_then(|&i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let date = field("date")
            .ok_or_else(|| ImportError::InvalidRow {
                line,
                reason: "missing date".to_string(),
            })
            .and_then(|raw| {
                Self::parse_datetime(raw).ok_or_else(|| ImportError::InvalidRow {
                    line,
                    reason: format!("unparseable date '{}'", raw),
                })
            })?;

        let mut factors = FactorRatings::default();
        for factor in Factor::ALL {
            factors.set(factor, field(factor.as_str()).and_then(Self::parse_number));
        }

        Ok(MoodEntry {
            id: Some(
                field("id")
                    .map(str::to_string)
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            ),
            mood: field("mood").and_then(Self::parse_number),
            factors,
            tags: field("tags").map(Self::parse_tags).unwrap_or_default(),
            date,
            notes: field("notes").map(str::to_string),
        })
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<MoodEntry>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(file_path)
            .map_err(ImportError::from)?;

        let headers = reader.headers().map_err(ImportError::from)?.clone();

        // Map standard names to column positions; first occurrence wins
        let mut columns: HashMap<String, usize> = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            columns.entry(self.normalize_column_name(header)).or_insert(i);
        }

        for required in ["date", "mood"] {
            if !columns.contains_key(required) {
                return Err(ImportError::MissingColumn {
                    column: required.to_string(),
                }
                .into());
            }
        }

        let mut entries = Vec::new();
        for result in reader.records() {
            let record = result.map_err(ImportError::from)?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            entries.push(self.parse_record(&record, &columns, line)?);
        }

        debug!(entries = entries.len(), "Parsed CSV mood entries");
        Ok(entries)
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}

/// JSON array of entries in snapshot format
pub struct JsonImporter;

impl ImportFormat for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "json")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<MoodEntry>> {
        let content = fs::read_to_string(file_path)?;
        let entries: Vec<MoodEntry> = serde_json::from_str(&content).map_err(MoodRsError::from)?;
        Ok(entries)
    }

    fn format_name(&self) -> &'static str {
        "JSON"
    }
}

fn has_extension(file_path: &Path, expected: &str) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}
