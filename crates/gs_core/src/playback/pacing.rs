use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

/// How long to wait before each batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PacingPolicy {
    Fixed { delay_ms: u64 },
    /// Game seconds since the previous batch, divided by `speed`, clamped.
    GameClock { speed: f64, min_delay_ms: u64, max_delay_ms: u64 },
}

impl Default for PacingPolicy {
    fn default() -> Self {
        PacingPolicy::GameClock { speed: 60.0, min_delay_ms: 50, max_delay_ms: 3_000 }
    }
}

impl PacingPolicy {
    /// Delay before a batch whose last event is `elapsed_game_secs` after the
    /// previous batch.
    pub fn delay(&self, elapsed_game_secs: u32) -> Duration {
        match *self {
            PacingPolicy::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            PacingPolicy::GameClock { speed, min_delay_ms, max_delay_ms } => {
                let ms = (elapsed_game_secs as f64 * 1000.0 / speed).round() as u64;
                Duration::from_millis(ms.clamp(min_delay_ms, max_delay_ms))
            }
        }
    }

    fn validate(&self) -> Result<(), PlaybackError> {
        if let PacingPolicy::GameClock { speed, min_delay_ms, max_delay_ms } = *self {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(PlaybackError::InvalidConfig(format!(
                    "speed must be positive, got {}",
                    speed
                )));
            }
            if min_delay_ms > max_delay_ms {
                return Err(PlaybackError::InvalidConfig(format!(
                    "min_delay_ms {} exceeds max_delay_ms {}",
                    min_delay_ms, max_delay_ms
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub pacing: PacingPolicy,
    /// Events per batch, at least 1.
    pub batch_size: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { pacing: PacingPolicy::default(), batch_size: 1 }
    }
}

impl PlaybackConfig {
    pub fn fixed(delay_ms: u64, batch_size: usize) -> Self {
        Self { pacing: PacingPolicy::Fixed { delay_ms }, batch_size }
    }

    pub fn validate(&self) -> Result<(), PlaybackError> {
        if self.batch_size == 0 {
            return Err(PlaybackError::InvalidConfig("batch_size must be at least 1".into()));
        }
        self.pacing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ignores_game_time() {
        let pacing = PacingPolicy::Fixed { delay_ms: 250 };
        assert_eq!(pacing.delay(0), Duration::from_millis(250));
        assert_eq!(pacing.delay(900), Duration::from_millis(250));
    }

    #[test]
    fn test_game_clock_scales_and_clamps() {
        let pacing = PacingPolicy::GameClock { speed: 10.0, min_delay_ms: 100, max_delay_ms: 2_000 };
        assert_eq!(pacing.delay(5), Duration::from_millis(500));
        assert_eq!(pacing.delay(0), Duration::from_millis(100));
        assert_eq!(pacing.delay(600), Duration::from_millis(2_000));
    }

    #[test]
    fn test_validation() {
        assert!(PlaybackConfig::default().validate().is_ok());
        assert!(PlaybackConfig::fixed(0, 0).validate().is_err());

        let bad_speed = PlaybackConfig {
            pacing: PacingPolicy::GameClock { speed: 0.0, min_delay_ms: 0, max_delay_ms: 10 },
            batch_size: 4,
        };
        assert!(matches!(bad_speed.validate(), Err(PlaybackError::InvalidConfig(_))));

        let inverted = PlaybackConfig {
            pacing: PacingPolicy::GameClock { speed: 1.0, min_delay_ms: 10, max_delay_ms: 5 },
            batch_size: 4,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{"pacing":{"mode":"fixed","delay_ms":20}}"#).unwrap();
        assert_eq!(config, PlaybackConfig::fixed(20, 1));
    }
}
