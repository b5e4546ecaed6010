use std::time::Duration;

use crate::camera::domain::camera::CameraConstraints;
use crate::shared::constants::{DEFAULT_MIN_CONFIDENCE, DEFAULT_REFRESH_HZ, DEFAULT_START_DELAY};

#[derive(Clone, Debug, PartialEq)]
pub struct LoopConfig {
    pub constraints: CameraConstraints,
    /// Detections scoring below this are treated as "no face".
    pub min_confidence: f64,
    /// Minimum wait between requesting the camera and the first detection.
    /// Detection also waits for the stream to be ready, whichever is later.
    pub start_delay: Duration,
    /// Ticks per second; one detection attempt per tick.
    pub refresh_hz: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            constraints: CameraConstraints::default(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            start_delay: DEFAULT_START_DELAY,
            refresh_hz: DEFAULT_REFRESH_HZ,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "min confidence must be between 0.0 and 1.0, got {}",
                self.min_confidence
            ));
        }
        if self.refresh_hz == 0 {
            return Err("refresh rate must be at least 1 Hz".into());
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_hz.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let c = LoopConfig::default();
        assert_eq!(c.min_confidence, 0.5);
        assert_eq!(c.start_delay, Duration::from_millis(2000));
        assert_eq!(c.refresh_hz, 60);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_tick_interval_at_60hz() {
        let c = LoopConfig::default();
        assert_eq!(c.tick_interval(), Duration::from_nanos(16_666_666));
    }

    #[rstest]
    #[case::negative(-0.1)]
    #[case::above_one(1.5)]
    fn test_validate_rejects_confidence(#[case] min_confidence: f64) {
        let c = LoopConfig {
            min_confidence,
            ..LoopConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_refresh() {
        let c = LoopConfig {
            refresh_hz: 0,
            ..LoopConfig::default()
        };
        assert!(c.validate().is_err());
    }
}
