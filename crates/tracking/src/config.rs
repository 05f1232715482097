use std::{env, time::Duration};

use crate::position::Accuracy;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Delay after every fix attempt before the next one starts.
    pub sample_interval: Duration,
    /// Upper bound for acquiring a single fix.
    pub fix_timeout: Duration,
    pub accuracy: Accuracy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            fix_timeout: DEFAULT_FIX_TIMEOUT,
            accuracy: Accuracy::default(),
        }
    }
}

impl TrackerConfig {
    /// Defaults, overridden by `TRACKER_SAMPLE_INTERVAL_SECS`,
    /// `TRACKER_FIX_TIMEOUT_SECS` and `TRACKER_ACCURACY`. Returns `None` if
    /// one of them is set to an invalid value.
    pub fn from_env() -> Option<Self> {
        let mut config = Self::default();
        if let Ok(secs) = env::var("TRACKER_SAMPLE_INTERVAL_SECS") {
            config.sample_interval = Duration::from_secs(secs.parse().ok()?);
        }
        if let Ok(secs) = env::var("TRACKER_FIX_TIMEOUT_SECS") {
            config.fix_timeout = Duration::from_secs(secs.parse().ok()?);
        }
        if let Ok(accuracy) = env::var("TRACKER_ACCURACY") {
            config.accuracy = accuracy.parse().ok()?;
        }
        Some(config)
    }
}
