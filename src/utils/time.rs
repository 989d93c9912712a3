use chrono::{DateTime, Utc};
use std::time::{Duration, Instant, SystemTime};

/// Wall-clock timestamp paired with a monotonic instant
#[derive(Debug, Clone, Copy)]
pub struct PrecisionTimestamp {
    instant: Instant,
    system_time: SystemTime,
}

impl PrecisionTimestamp {
    pub fn now() -> Self {
        Self {
            instant: Instant::now(),
            system_time: SystemTime::now(),
        }
    }

    /// Monotonic duration since this timestamp
    pub fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        DateTime::from(self.system_time)
    }
}

/// Timer for measuring operation latency
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed duration
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}
