//! Engine configuration: rendering timezone, slot length and lookahead horizon.
//!
//! Loaded from JSON (every field optional), then optionally overridden by the
//! `SLOT_ENGINE_TZ` environment variable.

use std::path::Path;

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Environment variable that overrides [`EngineConfig::timezone`].
pub const TIMEZONE_ENV: &str = "SLOT_ENGINE_TZ";

pub const DEFAULT_SLOT_MINUTES: u32 = 30;
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Timezone used for calendar dates, weekdays and slot labels.
    pub timezone: Tz,
    /// Length of one bookable slot.
    pub slot_minutes: u32,
    /// Number of days returned by an availability query.
    pub horizon_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl EngineConfig {
    /// Default configuration rendering in `timezone`.
    pub fn with_timezone(timezone: Tz) -> Self {
        Self {
            timezone,
            ..Self::default()
        }
    }

    /// Parse a JSON config document. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidConfig` if the document is malformed (an
    /// unknown timezone name is reported the same way, by serde) or if
    /// [`EngineConfig::validate`] rejects the values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| SlotError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SlotError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Apply `SLOT_ENGINE_TZ` if it is set.
    pub fn with_env_overrides(self) -> Result<Self> {
        match std::env::var(TIMEZONE_ENV) {
            Ok(name) => Ok(Self {
                timezone: parse_timezone(&name)?,
                ..self
            }),
            Err(_) => Ok(self),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes == 0 {
            return Err(SlotError::InvalidConfig(
                "slot_minutes must be greater than zero".to_string(),
            ));
        }
        if self.horizon_days == 0 {
            return Err(SlotError::InvalidConfig(
                "horizon_days must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }
}

/// Parse an IANA timezone name (e.g. "Europe/Paris").
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| SlotError::InvalidTimezone(name.to_string()))
}
