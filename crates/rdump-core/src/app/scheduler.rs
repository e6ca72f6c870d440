use std::time::{Duration, Instant};

use rand::Rng;

use crate::config::ScheduleConfig;
use crate::error::Result;

/// Cycle timing resolved from config. The interval is measured from the
/// end of one cycle to the start of the next, so slow dumps never pile up.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    interval: Duration,
    jitter_seconds: u64,
    on_startup: bool,
}

impl Schedule {
    pub fn from_config(cfg: &ScheduleConfig) -> Result<Self> {
        Ok(Self {
            interval: cfg.every_duration()?,
            jitter_seconds: cfg.jitter_seconds,
            on_startup: cfg.on_startup,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn on_startup(&self) -> bool {
        self.on_startup
    }

    /// When the first cycle should run: immediately if `on_startup`,
    /// otherwise one full (jittered) interval from now.
    pub fn first_run(&self, now: Instant) -> Instant {
        if self.on_startup {
            now
        } else {
            self.next_run(now)
        }
    }

    /// When the next cycle should run, counted from `now` (normally the
    /// completion instant of the previous cycle).
    pub fn next_run(&self, now: Instant) -> Instant {
        now + self.interval + random_jitter(self.jitter_seconds)
    }
}

pub fn random_jitter(jitter_seconds: u64) -> Duration {
    if jitter_seconds == 0 {
        return Duration::ZERO;
    }
    let secs = rand::thread_rng().gen_range(0..=jitter_seconds);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_cfg(every: &str, on_startup: bool) -> ScheduleConfig {
        ScheduleConfig {
            every: every.to_string(),
            on_startup,
            jitter_seconds: 0,
        }
    }

    #[test]
    fn interval_resolves_from_config() {
        let sched = Schedule::from_config(&schedule_cfg("2h", true)).unwrap();
        assert_eq!(sched.interval().as_secs(), 2 * 3600);
    }

    #[test]
    fn invalid_interval_is_rejected() {
        assert!(Schedule::from_config(&schedule_cfg("soon", true)).is_err());
    }

    #[test]
    fn first_run_is_immediate_with_on_startup() {
        let sched = Schedule::from_config(&schedule_cfg("24h", true)).unwrap();
        let now = Instant::now();
        assert_eq!(sched.first_run(now), now);
    }

    #[test]
    fn first_run_waits_without_on_startup() {
        let sched = Schedule::from_config(&schedule_cfg("24h", false)).unwrap();
        let now = Instant::now();
        assert_eq!(sched.first_run(now), now + Duration::from_secs(24 * 3600));
    }

    #[test]
    fn next_run_counts_from_completion() {
        let sched = Schedule::from_config(&schedule_cfg("30m", true)).unwrap();
        let done = Instant::now();
        assert_eq!(sched.next_run(done), done + Duration::from_secs(30 * 60));
    }

    #[test]
    fn jitter_bounds_are_respected() {
        for _ in 0..64 {
            assert!(random_jitter(5).as_secs() <= 5);
        }
    }
}
