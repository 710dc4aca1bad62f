//! Report configuration: rounding policy, date basis and label maps.

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::entry::DateBasis;
use crate::label_map::LabelMap;
use crate::rounding::{DEFAULT_ROUND_TO_MINUTES, DurationRounder};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The rounding unit was not a positive number of at least one millisecond.
    #[error("round_to_minutes must be a positive number of minutes, got {0}")]
    InvalidRoundTo(f64),
    /// The rounding boundary was negative or not finite.
    #[error("rounding_boundary must be a non-negative number of minutes, got {0}")]
    InvalidBoundary(f64),
    /// The timezone name is not in the IANA database.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    /// The configuration document could not be decoded.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration exactly as written in the JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_round_to_minutes")]
    pub round_to_minutes: f64,
    /// Boundary in minutes; `None` means `round_to_minutes / 2.3`.
    #[serde(default)]
    pub rounding_boundary: Option<f64>,
    #[serde(default)]
    pub client_map: LabelMap,
    #[serde(default)]
    pub project_map: LabelMap,
    #[serde(default)]
    pub task_map: LabelMap,
    /// IANA zone used to pick each entry's calendar day. When absent the
    /// offset written in the entry's timestamp decides.
    #[serde(default)]
    pub timezone: Option<String>,
}

const fn default_round_to_minutes() -> f64 {
    DEFAULT_ROUND_TO_MINUTES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            round_to_minutes: DEFAULT_ROUND_TO_MINUTES,
            rounding_boundary: None,
            client_map: LabelMap::default(),
            project_map: LabelMap::default(),
            task_map: LabelMap::default(),
            timezone: None,
        }
    }
}

impl ConfigFile {
    /// Validates the raw values and builds the resolved [`Config`].
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let rounder = DurationRounder::from_minutes(self.round_to_minutes, self.rounding_boundary)?;
        let date_basis = match self.timezone.as_deref().map(str::trim) {
            None | Some("") => DateBasis::EntryOffset,
            Some(name) => DateBasis::Zone(
                name.parse::<Tz>()
                    .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))?,
            ),
        };

        Ok(Config {
            rounder,
            date_basis,
            client_map: self.client_map,
            project_map: self.project_map,
            task_map: self.task_map,
        })
    }
}

/// Resolved configuration for one report run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub rounder: DurationRounder,
    pub date_basis: DateBasis,
    pub client_map: LabelMap,
    pub project_map: LabelMap,
    pub task_map: LabelMap,
}

impl Config {
    /// Parses and resolves a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<ConfigFile>(json)?.resolve()
    }
}
