use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub schedule: ScheduleSettings,
    /// Username the background workers act as
    pub system_user: String,
    /// Optional JSON file with documents and tags to load at startup
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = ScheduleSettings::default();

        Ok(Self {
            schedule: ScheduleSettings {
                analyzer_frequency_check: minutes_var(
                    "ANALYZER_FREQUENCY_CHECK",
                    defaults.analyzer_frequency_check,
                )?,
                indexing_frequency_check: minutes_var(
                    "INDEXING_FREQUENCY_CHECK",
                    defaults.indexing_frequency_check,
                )?,
                tag_indexing_frequency_check: minutes_var(
                    "TAG_INDEXING_FREQUENCY_CHECK",
                    defaults.tag_indexing_frequency_check,
                )?,
                max_indexing_delay: minutes_var("MAX_INDEXING_DELAY", defaults.max_indexing_delay)?,
                batch_size: env::var("BATCH_SIZE")
                    .unwrap_or_else(|_| defaults.batch_size.to_string())
                    .parse()
                    .context("BATCH_SIZE must be a valid number")?,
            },
            system_user: env::var("SYSTEM_USER").unwrap_or_else(|_| "system".to_string()),
            seed_file: env::var("SEED_FILE").ok().map(PathBuf::from),
        })
    }
}

fn minutes_var(name: &str, default: i64) -> Result<i64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a whole number of minutes")),
        Err(_) => Ok(default),
    }
}

/// Worker timing, in minutes.
///
/// Values are signed so that a bad deployment value surfaces as a
/// [`ConfigError`] at the start of a pass instead of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// How often the document analyzer looks for submitted documents
    pub analyzer_frequency_check: i64,
    /// How often the document indexer looks for stale documents
    pub indexing_frequency_check: i64,
    /// How often the tag indexer looks for stale tags
    pub tag_indexing_frequency_check: i64,
    /// How far an item may lag behind its content before it is re-indexed
    pub max_indexing_delay: i64,
    /// Items fetched per backlog query
    pub batch_size: usize,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            analyzer_frequency_check: 1,
            indexing_frequency_check: 1,
            tag_indexing_frequency_check: 5,
            max_indexing_delay: 5,
            batch_size: 20,
        }
    }
}

impl ScheduleSettings {
    pub fn analyzer_interval(&self) -> Result<Duration, ConfigError> {
        positive_minutes("analyzer_frequency_check", self.analyzer_frequency_check)
    }

    pub fn indexing_interval(&self) -> Result<Duration, ConfigError> {
        positive_minutes("indexing_frequency_check", self.indexing_frequency_check)
    }

    pub fn tag_indexing_interval(&self) -> Result<Duration, ConfigError> {
        positive_minutes("tag_indexing_frequency_check", self.tag_indexing_frequency_check)
    }

    pub fn max_indexing_delay(&self) -> Result<chrono::Duration, ConfigError> {
        positive_minutes("max_indexing_delay", self.max_indexing_delay)?;
        chrono::Duration::try_minutes(self.max_indexing_delay).ok_or(ConfigError::OutOfRange {
            name: "max_indexing_delay",
            value: self.max_indexing_delay,
            max: MAX_MINUTES,
        })
    }

    pub fn batch_size(&self) -> Result<usize, ConfigError> {
        match self.batch_size {
            0 => Err(ConfigError::NonPositive {
                name: "batch_size",
                value: 0,
            }),
            n => Ok(n),
        }
    }

    /// Check every setting at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyzer_interval()?;
        self.indexing_interval()?;
        self.tag_indexing_interval()?;
        self.max_indexing_delay()?;
        self.batch_size()?;
        Ok(())
    }
}

/// Longest accepted interval or delay: one year.
pub const MAX_MINUTES: i64 = 366 * 24 * 60;

fn positive_minutes(name: &'static str, value: i64) -> Result<Duration, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositive { name, value });
    }
    if value > MAX_MINUTES {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            max: MAX_MINUTES,
        });
    }
    value
        .unsigned_abs()
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or(ConfigError::OutOfRange {
            name,
            value,
            max: MAX_MINUTES,
        })
}
