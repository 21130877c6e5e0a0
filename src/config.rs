use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The number of slots in a depot's frequency table.
pub const HOURS_IN_DAY: usize = 24;

/// Time constants used to schedule dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// World time units in one in-world hour.
    pub ticks_per_hour: i64,
    /// Offset applied to the world time so that hour 0 of the table lines up with the world's day.
    pub day_offset: i64,
    /// Real milliseconds in one world time unit at normal speed.
    pub millis_per_tick: i64,
}

/// An invalid schedule configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse schedule config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{0}` must be positive")]
    NotPositive(&'static str),
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ticks_per_hour: 1000,
            day_offset: -6000,
            millis_per_tick: 50,
        }
    }
}

impl ScheduleConfig {
    /// Parses a configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the constants can be used for scheduling.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_hour <= 0 {
            return Err(ConfigError::NotPositive("ticks_per_hour"));
        }
        if self.millis_per_tick <= 0 {
            return Err(ConfigError::NotPositive("millis_per_tick"));
        }
        Ok(())
    }

    /// World time units in one in-world day, or `None` if that does not fit.
    pub fn ticks_per_day(&self) -> Option<i64> {
        self.ticks_per_hour.checked_mul(HOURS_IN_DAY as i64)
    }

    /// Shifts the world time by the day offset and wraps it into a single day.
    /// Returns `None` if the constants do not describe a usable day.
    pub fn wrap_time(&self, world_time: i64) -> Option<i64> {
        if self.ticks_per_hour <= 0 {
            return None;
        }
        let ticks_per_day = self.ticks_per_day()?;
        Some(world_time.wrapping_sub(self.day_offset).rem_euclid(ticks_per_day))
    }

    /// The frequency table slot that is active at the given world time.
    pub fn hour_of_day(&self, world_time: i64) -> Option<usize> {
        Some((self.wrap_time(world_time)? / self.ticks_per_hour) as usize)
    }

    /// The minimum real time between dispatches for a target number of trains per hour,
    /// or `None` if there is no service.
    pub fn min_interval_millis(&self, per_hour: i32) -> Option<i64> {
        if per_hour <= 0 || self.validate().is_err() {
            return None;
        }
        Some(self.millis_per_tick.checked_mul(self.ticks_per_hour)? / per_hour as i64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hour_zero_starts_at_offset() {
        let config = ScheduleConfig::default();
        assert_eq!(config.hour_of_day(-6000), Some(0));
        assert_eq!(config.hour_of_day(0), Some(6));
        assert_eq!(config.hour_of_day(17_999), Some(23));
        assert_eq!(config.hour_of_day(18_000), Some(0));
        assert_eq!(config.hour_of_day(24_000 * 1000 + 1500), Some(7));
    }

    #[test]
    fn negative_world_time_wraps() {
        let config = ScheduleConfig::default();
        assert_eq!(config.hour_of_day(-7000), Some(23));
        assert_eq!(config.hour_of_day(-1_000_000), config.hour_of_day(-1_000_000 + 24_000 * 7));
        for t in (-100_000..100_000).step_by(777) {
            assert!(config.hour_of_day(t).unwrap() < HOURS_IN_DAY);
        }
        for t in [i64::MIN, i64::MIN + 1, i64::MAX] {
            assert!(config.hour_of_day(t).unwrap() < HOURS_IN_DAY);
        }
    }

    #[test]
    fn unusable_constants_give_no_schedule() {
        let no_hours = ScheduleConfig {
            ticks_per_hour: 0,
            ..Default::default()
        };
        assert_eq!(no_hours.wrap_time(1234), None);
        assert_eq!(no_hours.hour_of_day(1234), None);
        assert_eq!(no_hours.min_interval_millis(4), None);

        let backwards = ScheduleConfig {
            ticks_per_hour: -1000,
            millis_per_tick: -50,
            ..Default::default()
        };
        assert_eq!(backwards.hour_of_day(1234), None);
        assert_eq!(backwards.min_interval_millis(4), None);

        let huge = ScheduleConfig {
            ticks_per_hour: i64::MAX / 2,
            ..Default::default()
        };
        assert_eq!(huge.hour_of_day(1234), None);
        assert_eq!(huge.min_interval_millis(4), None);
    }

    #[test]
    fn min_interval() {
        let config = ScheduleConfig::default();
        assert_eq!(config.min_interval_millis(0), None);
        assert_eq!(config.min_interval_millis(-3), None);
        assert_eq!(config.min_interval_millis(1), Some(50_000));
        assert_eq!(config.min_interval_millis(3), Some(16_666));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = ScheduleConfig::from_json(r#"{ "ticks_per_hour": 500 }"#).unwrap();
        assert_eq!(config.ticks_per_hour, 500);
        assert_eq!(config.day_offset, -6000);
        assert_eq!(config.millis_per_tick, 50);
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(
            ScheduleConfig::from_json(r#"{ "ticks_per_hour": 0 }"#),
            Err(ConfigError::NotPositive("ticks_per_hour"))
        ));
        assert!(matches!(
            ScheduleConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
