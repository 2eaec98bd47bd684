//! Polling cadences and timeouts
//!
//! All intervals the runtime schedules against live here so tests can shrink
//! them. Defaults reproduce the production cadences: orders are re-fetched
//! once a minute while idle, health sampling arms 5 s after a delivery
//! starts, takes its first reading 10 s later and then every 5 s.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ----------------------------------------------------------------------------
// Timings
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Pending-orders poll cadence while online and idle.
    pub order_poll_interval_secs: u64,
    /// Delay between entering the delivering state and arming the health loop.
    pub health_warmup_secs: u64,
    /// Delay between arming the health loop and the very first sample.
    pub health_first_sample_secs: u64,
    /// Health sample cadence once the loop is running.
    pub health_sample_interval_secs: u64,
    /// Delay before the completed order is uploaded to the ledger service.
    pub ledger_upload_delay_secs: u64,
    /// Connect timeout for the raw-TCP debug link.
    pub debug_connect_timeout_secs: u64,
    /// Request timeout applied to every HTTP call.
    pub http_timeout_secs: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            order_poll_interval_secs: 60,
            health_warmup_secs: 5,
            health_first_sample_secs: 10,
            health_sample_interval_secs: 5,
            ledger_upload_delay_secs: 20,
            debug_connect_timeout_secs: 10,
            http_timeout_secs: 15,
        }
    }
}

impl Timings {
    pub fn order_poll_interval(&self) -> Duration {
        Duration::from_secs(self.order_poll_interval_secs)
    }

    pub fn health_warmup(&self) -> Duration {
        Duration::from_secs(self.health_warmup_secs)
    }

    pub fn health_first_sample(&self) -> Duration {
        Duration::from_secs(self.health_first_sample_secs)
    }

    pub fn health_sample_interval(&self) -> Duration {
        Duration::from_secs(self.health_sample_interval_secs)
    }

    pub fn ledger_upload_delay(&self) -> Duration {
        Duration::from_secs(self.ledger_upload_delay_secs)
    }

    pub fn debug_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.debug_connect_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Reject configurations that would spin a poll loop.
    pub fn validate(&self) -> Result<(), String> {
        if self.order_poll_interval_secs == 0 {
            return Err("order poll interval must be greater than 0".to_string());
        }
        if self.health_sample_interval_secs == 0 {
            return Err("health sample interval must be greater than 0".to_string());
        }
        if self.http_timeout_secs == 0 {
            return Err("HTTP timeout must be greater than 0".to_string());
        }
        if self.debug_connect_timeout_secs == 0 {
            return Err("debug connect timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_cadences() {
        let t = Timings::default();
        assert_eq!(t.order_poll_interval(), Duration::from_secs(60));
        assert_eq!(t.health_warmup(), Duration::from_secs(5));
        assert_eq!(t.health_first_sample(), Duration::from_secs(10));
        assert_eq!(t.health_sample_interval(), Duration::from_secs(5));
        assert_eq!(t.ledger_upload_delay(), Duration::from_secs(20));
        assert_eq!(t.debug_connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let mut t = Timings::default();
        t.order_poll_interval_secs = 0;
        assert!(t.validate().is_err());

        let mut t = Timings::default();
        t.health_sample_interval_secs = 0;
        assert!(t.validate().is_err());
    }
}
