//! Season calendar: named date ranges that boost categories.
//!
//! RULE: A bad calendar never stops a run. Missing files, malformed
//! JSON and individually invalid records all degrade to fewer (or no)
//! seasons, with a warning, and generation carries on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the calendar inside a data directory.
pub const SEASONS_FILE: &str = "seasons.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub boosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Season {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        boosts: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start_date,
            end_date,
            boosts: boosts.iter().map(|b| b.to_string()).collect(),
            description: None,
            color: None,
        }
    }

    /// Inclusive, date-only containment.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.contains_date(timestamp.date_naive())
    }
}

/// An immutable, ordered set of seasons for one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonCalendar {
    seasons: Vec<Season>,
}

impl SeasonCalendar {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a calendar, dropping records whose start is after their end.
    pub fn new(seasons: Vec<Season>) -> Self {
        let seasons = seasons
            .into_iter()
            .filter(|s| {
                let valid = s.start_date <= s.end_date;
                if !valid {
                    log::warn!(
                        "season '{}' ends ({}) before it starts ({}); skipping",
                        s.id,
                        s.end_date,
                        s.start_date
                    );
                }
                valid
            })
            .collect();
        Self { seasons }
    }

    /// Parse a calendar from JSON text. Records that fail to parse are
    /// skipped individually; text that is not a JSON array yields the
    /// empty calendar.
    pub fn from_json(text: &str) -> Self {
        let raw: Vec<serde_json::Value> = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("season calendar is not a JSON array ({e}); continuing without seasons");
                return Self::empty();
            }
        };
        let seasons = raw
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match serde_json::from_value::<Season>(value) {
                Ok(s) => Some(s),
                Err(e) => {
                    log::warn!("season record #{i} is malformed ({e}); skipping");
                    None
                }
            })
            .collect();
        Self::new(seasons)
    }

    /// Load `path`, substituting the empty calendar on any failure.
    pub fn load_or_empty(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let calendar = Self::from_json(&text);
                log::info!("loaded {} seasons from {}", calendar.len(), path.display());
                calendar
            }
            Err(e) => {
                log::warn!(
                    "cannot read {} ({e}); continuing without seasonal boosts",
                    path.display()
                );
                Self::empty()
            }
        }
    }

    /// Every season whose inclusive date range contains `timestamp`.
    pub fn active_seasons(&self, timestamp: DateTime<Utc>) -> Vec<&Season> {
        let date = timestamp.date_naive();
        self.seasons.iter().filter(|s| s.contains_date(date)).collect()
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    pub fn len(&self) -> usize {
        self.seasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }
}
