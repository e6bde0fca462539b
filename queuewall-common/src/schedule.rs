use chrono::{DateTime, Local, Timelike};
use std::path::PathBuf;
use std::time::Duration;

/// Source of wall-clock time. The scheduler only ever asks "what time is it
/// now"; tests substitute a fixed clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Change on every hour rollover (the wallpaper is named after the hour).
    HourlyByClock,
    /// Change every n minutes, independent of clock alignment.
    FixedInterval(u64),
    /// Random pick from the directory. Randomness affects only which image
    /// is chosen, not the timing, which stays hour-aligned.
    Random,
}

/// Immutable for the process lifetime, except when replaced wholesale by a
/// `reload` command.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub mode: ScheduleMode,
    pub directory: PathBuf,
    pub extension: String,
}

/// Delay until the next wallpaper change should fire.
///
/// Hour-aligned modes sleep until the next hour boundary, so the result is
/// always in `(0, 3600]` seconds.
pub fn delay_until_next(mode: &ScheduleMode, now: &DateTime<Local>) -> Duration {
    match mode {
        ScheduleMode::FixedInterval(minutes) => Duration::from_secs(60 * minutes),
        ScheduleMode::HourlyByClock | ScheduleMode::Random => {
            let secs = 60 * (60 - u64::from(now.minute())) - u64::from(now.second());
            Duration::from_secs(secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local_time(hour: u32, min: u32, sec: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 15, hour, min, sec).unwrap()
    }

    #[test]
    fn test_hourly_delay_close_to_rollover() {
        let now = local_time(14, 59, 30);
        let delay = delay_until_next(&ScheduleMode::HourlyByClock, &now);
        assert_eq!(delay, Duration::from_secs(30));
    }

    #[test]
    fn test_hourly_delay_at_exact_hour() {
        let now = local_time(9, 0, 0);
        let delay = delay_until_next(&ScheduleMode::HourlyByClock, &now);
        assert_eq!(delay, Duration::from_secs(3600));
    }

    #[test]
    fn test_hourly_delay_always_in_bounds() {
        for min in 0..60 {
            for sec in 0..60 {
                let now = local_time(3, min, sec);
                let delay = delay_until_next(&ScheduleMode::HourlyByClock, &now);
                assert!(delay > Duration::ZERO, "zero delay at {}:{}", min, sec);
                assert!(delay <= Duration::from_secs(3600));
                assert_eq!(delay.as_secs(), 3600 - u64::from(min * 60 + sec));
            }
        }
    }

    #[test]
    fn test_fixed_interval_ignores_clock() {
        for now in [local_time(0, 0, 0), local_time(14, 59, 30), local_time(23, 1, 7)] {
            let delay = delay_until_next(&ScheduleMode::FixedInterval(15), &now);
            assert_eq!(delay, Duration::from_secs(900));
        }
    }

    #[test]
    fn test_random_mode_uses_hourly_delay() {
        let now = local_time(14, 59, 30);
        assert_eq!(
            delay_until_next(&ScheduleMode::Random, &now),
            delay_until_next(&ScheduleMode::HourlyByClock, &now)
        );
    }
}
