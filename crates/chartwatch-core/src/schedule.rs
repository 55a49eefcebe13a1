//! Repeated runs during market hours

use crate::config::ScheduleConfig;
use crate::pipeline::TrendWatch;
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sleep between checks outside market hours
pub const IDLE_INTERVAL: Duration = Duration::from_secs(300);

/// Daily window in a given time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    pub tz: Tz,
    pub start: NaiveTime,
    pub stop: NaiveTime,
}

impl MarketHours {
    pub fn new(tz: Tz, start: NaiveTime, stop: NaiveTime) -> Self {
        Self { tz, start, stop }
    }

    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(config.timezone, config.start, config.stop)
    }

    /// Whether the wall-clock time of `instant` in `tz` is inside the window
    ///
    /// Both bounds are inclusive at minute precision: with a 16:00 stop,
    /// 16:00:59 is still inside.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.tz).time();
        let minute = local
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(local);
        minute >= self.start && minute <= self.stop
    }
}

/// Runs the pipeline once, or on an interval during market hours
#[derive(Debug, Clone)]
pub struct Scheduler {
    enabled: bool,
    interval: Duration,
    idle_interval: Duration,
    hours: MarketHours,
}

impl Scheduler {
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self {
            enabled: config.enabled,
            interval: config.interval,
            idle_interval: IDLE_INTERVAL,
            hours: MarketHours::from_config(config),
        }
    }

    pub fn with_idle_interval(mut self, idle_interval: Duration) -> Self {
        self.idle_interval = idle_interval;
        self
    }

    pub fn hours(&self) -> &MarketHours {
        &self.hours
    }

    /// Run until Ctrl-C; returns the number of runs
    pub async fn run(&self, watch: &TrendWatch, symbols: &[String]) -> usize {
        self.run_until(watch, symbols, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes; returns the number of runs
    pub async fn run_until<F>(&self, watch: &TrendWatch, symbols: &[String], shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        if !self.enabled {
            info!("Scheduling disabled, running once");
            watch.run_all(symbols).await;
            return 1;
        }

        info!(
            "Scheduler started: every {}s between {} and {} ({})",
            self.interval.as_secs(),
            self.hours.start.format("%H:%M"),
            self.hours.stop.format("%H:%M"),
            self.hours.tz.name()
        );

        tokio::pin!(shutdown);
        let mut runs = 0;

        loop {
            let now = Utc::now();
            let wait = if self.hours.contains(now) {
                runs += 1;
                info!(
                    "Run #{} at {}",
                    runs,
                    now.with_timezone(&self.hours.tz).format("%Y-%m-%d %H:%M:%S %Z")
                );
                let summary = watch.run_all(symbols).await;
                if summary.failed > 0 {
                    warn!("{} of {} symbols failed", summary.failed, summary.total());
                }
                self.interval
            } else {
                debug!(
                    "Outside market hours ({}), next check in {}s",
                    now.with_timezone(&self.hours.tz).format("%H:%M"),
                    self.idle_interval.as_secs()
                );
                self.idle_interval
            };

            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                () = &mut shutdown => {
                    info!("Scheduler stopped after {} runs", runs);
                    break;
                }
            }
        }

        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hours() -> MarketHours {
        MarketHours::from_config(&ScheduleConfig::default())
    }

    #[test]
    fn test_contains_is_inclusive() {
        let hours = hours();
        // 2025-03-14 is after the US DST switch: Eastern = UTC-4
        let open = Utc.with_ymd_and_hms(2025, 3, 14, 13, 30, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2025, 3, 14, 20, 0, 0).unwrap();
        assert!(hours.contains(open));
        assert!(hours.contains(close));

        let last_second = Utc.with_ymd_and_hms(2025, 3, 14, 20, 0, 59).unwrap();
        assert!(hours.contains(last_second));
    }

    #[test]
    fn test_outside_hours() {
        let hours = hours();
        let before = Utc.with_ymd_and_hms(2025, 3, 14, 13, 29, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 14, 20, 1, 0).unwrap();
        assert!(!hours.contains(before));
        assert!(!hours.contains(after));
    }

    #[test]
    fn test_uses_local_wall_clock() {
        // 14:00 UTC is 14:00 GMT in January but 15:00 BST in July
        let hours = MarketHours::new(
            chrono_tz::Europe::London,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        );
        let winter = Utc.with_ymd_and_hms(2025, 1, 10, 14, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2025, 7, 10, 14, 0, 0).unwrap();
        assert!(hours.contains(winter));
        assert!(!hours.contains(summer));
    }

    #[test]
    fn test_from_config() {
        let scheduler = Scheduler::from_config(&ScheduleConfig::default());
        assert!(!scheduler.enabled);
        assert_eq!(scheduler.idle_interval, IDLE_INTERVAL);
        assert_eq!(scheduler.hours().tz, chrono_tz::US::Eastern);
    }
}
