//! TOML-based scheduler configuration.
//!
//! Stores the scoring weights used to order tasks. Every field has a
//! default, so a partial file (or no file at all) loads.
//!
//! Configuration is stored at `~/.config/pawpal/config.toml`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::scheduler::ScoreWeights;

/// Upper bound for the recency thresholds: one year.
pub const MAX_RECENCY_HOURS: i64 = 24 * 365;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pawpal/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoreWeights,
}

/// JSON pointer for a dot-separated key; `None` for keys that cannot name a field.
fn pointer_for(key: &str) -> Option<String> {
    if key.is_empty() || key.contains(['/', '~']) {
        return None;
    }
    Some(format!("/{}", key.replace('.', "/")))
}

/// Parse `value` as an integer if possible, else as a float.
fn parse_number(value: &str) -> Option<Value> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(Value::from(n));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

impl Config {
    /// `~/.config/pawpal[-dev]/config.toml`
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, or return defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, or return defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Reject weights the scorer cannot use meaningfully.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: format!("scoring.{key}"),
            message: message.to_string(),
        };

        let hours_range = 0..=MAX_RECENCY_HOURS;
        let out_of_range = format!("must be between 0 and {MAX_RECENCY_HOURS}");
        if !hours_range.contains(&s.recent_hours) {
            return Err(invalid("recent_hours", &out_of_range));
        }
        if !hours_range.contains(&s.settling_hours) {
            return Err(invalid("settling_hours", &out_of_range));
        }
        if s.settling_hours < s.recent_hours {
            return Err(invalid("settling_hours", "must be at least recent_hours"));
        }
        if s.overdue_cap < 0.0 {
            return Err(invalid("overdue_cap", "must not be negative"));
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        json.pointer(&pointer_for(key)?).map(Value::to_string)
    }

    /// Set a config value by dot-separated key, e.g. `scoring.required_bonus`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field. The config is left unchanged on error.
    ///
    /// Numeric fields take a number; `scoring.priority_base` also accepts a
    /// whole JSON object.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let leaf = pointer_for(key)
            .and_then(|pointer| json.pointer_mut(&pointer))
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        *leaf = match *leaf {
            Value::Number(_) => parse_number(value)
                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
            Value::Object(_) => serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?,
            _ => return Err(invalid("not a settable value".to_string())),
        };

        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
