//! Game configuration.
//!
//! Passed explicitly to the engine; there is no global state. Every field has
//! a serde default so partial JSON/YAML requests work.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Rule and tuning knobs for one game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Regulation periods (default: 4)
    pub num_periods: u8,
    /// Regulation period length in seconds (default: 900)
    pub period_secs: u32,
    /// Overtime period length in seconds (default: 600)
    pub overtime_secs: u32,
    /// End a tied game after regulation instead of playing overtime (default: false)
    pub ties_allowed: bool,
    /// Home advantage in percent (default: 1.0)
    pub home_field_advantage: f64,
    /// Multiplier on `home_field_advantage` (default: 1.0)
    pub home_court_factor: f64,
    /// Neutral site (default: false)
    pub disable_home_court_advantage: bool,
    /// Injury probability per involved player per play at intensity 1.0 (default: 0.0005)
    pub base_injury_rate: f64,
    /// Produce event descriptions (default: true)
    pub do_play_by_play: bool,
    /// Exhibition of mixed rosters; no cohesion bonus (default: false)
    pub all_star_game: bool,
}

/// Effective-rating bonus for a regular team that plays together.
pub const COHESION_BONUS: f64 = 0.03;

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_periods: 4,
            period_secs: 900,
            overtime_secs: 600,
            ties_allowed: false,
            home_field_advantage: 1.0,
            home_court_factor: 1.0,
            disable_home_court_advantage: false,
            base_injury_rate: 0.0005,
            do_play_by_play: true,
            all_star_game: false,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_periods == 0 {
            return Err(ConfigError::InvalidPeriodCount(self.num_periods));
        }
        if self.period_secs == 0 {
            return Err(ConfigError::InvalidPeriodLength(self.period_secs));
        }
        if !self.ties_allowed && self.overtime_secs == 0 {
            return Err(ConfigError::InvalidOvertimeLength(self.overtime_secs));
        }

        non_negative("home_field_advantage", self.home_field_advantage)?;
        non_negative("home_court_factor", self.home_court_factor)?;
        non_negative("base_injury_rate", self.base_injury_rate)?;
        if self.base_injury_rate > 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "base_injury_rate",
                value: self.base_injury_rate,
            });
        }

        Ok(())
    }

    /// Multiplier applied to the home side's effective ratings.
    pub fn home_multiplier(&self) -> f64 {
        if self.disable_home_court_advantage {
            1.0
        } else {
            1.0 + self.home_field_advantage / 100.0 * self.home_court_factor
        }
    }

    /// Multiplier applied to both sides' effective ratings.
    pub fn cohesion_multiplier(&self) -> f64 {
        if self.all_star_game {
            1.0
        } else {
            1.0 + COHESION_BONUS
        }
    }

    /// Halftime falls after this regulation period; `None` for odd counts.
    pub fn halftime_after(&self) -> Option<u8> {
        if self.num_periods % 2 == 0 {
            Some(self.num_periods / 2)
        } else {
            None
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}
