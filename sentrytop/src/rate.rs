//! Network rate handling: either trust the feed's bytes/sec or diff cumulative counters.

use std::{fmt, str::FromStr, time::Duration};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::RateError;
use crate::types::NetworkRateSample;

/// Shortest interval accepted between two cumulative samples.
pub const MIN_RATE_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMode {
    /// `sent`/`received` are already bytes/sec.
    #[default]
    Precomputed,
    /// `sent`/`received` are cumulative byte counters.
    Derived,
}

impl fmt::Display for RateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateMode::Precomputed => f.write_str("precomputed"),
            RateMode::Derived => f.write_str("derived"),
        }
    }
}

impl FromStr for RateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "precomputed" | "server" => Ok(RateMode::Precomputed),
            "derived" | "client" => Ok(RateMode::Derived),
            other => Err(format!(
                "invalid rate mode '{other}' (expected precomputed or derived)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    sent: f64,
    received: f64,
    at: DateTime<Local>,
}

/// Client-side rate derivation from cumulative counters.
#[derive(Debug, Clone, Default)]
pub struct RateDeriver {
    last: Option<Baseline>,
}

impl RateDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn cumulative counters into bytes/sec.
    ///
    /// The first sample only sets the baseline and yields a zero rate. A too-short
    /// interval is rejected and leaves the baseline untouched, so the next sample
    /// is measured against the older point.
    pub fn derive(
        &mut self,
        counters: NetworkRateSample,
        at: DateTime<Local>,
    ) -> Result<NetworkRateSample, RateError> {
        let Some(prev) = self.last else {
            self.rebase(counters, at);
            return Ok(NetworkRateSample::default());
        };

        let elapsed = at.signed_duration_since(prev.at);
        let secs = elapsed
            .to_std()
            .ok()
            .filter(|d| *d >= MIN_RATE_INTERVAL)
            .ok_or(RateError::IntervalTooShort {
                elapsed_ms: elapsed.num_milliseconds(),
            })?
            .as_secs_f64();

        // A counter that went backwards means the feed restarted; treat as no traffic.
        let rate = NetworkRateSample {
            sent: (counters.sent - prev.sent).max(0.0) / secs,
            received: (counters.received - prev.received).max(0.0) / secs,
        };
        self.rebase(counters, at);
        Ok(rate)
    }

    fn rebase(&mut self, counters: NetworkRateSample, at: DateTime<Local>) {
        self.last = Some(Baseline {
            sent: counters.sent,
            received: counters.received,
            at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn sample(sent: f64, received: f64) -> NetworkRateSample {
        NetworkRateSample { sent, received }
    }

    #[test]
    fn one_second_apart_gives_bytes_per_second() {
        let t0 = Local::now();
        let mut d = RateDeriver::new();
        assert_eq!(d.derive(sample(1000.0, 0.0), t0).unwrap(), sample(0.0, 0.0));
        let r = d
            .derive(sample(2000.0, 500.0), t0 + TimeDelta::seconds(1))
            .unwrap();
        assert_eq!(r, sample(1000.0, 500.0));
    }

    #[test]
    fn sub_millisecond_interval_is_rejected_and_baseline_kept() {
        let t0 = Local::now();
        let mut d = RateDeriver::new();
        d.derive(sample(1000.0, 1000.0), t0).unwrap();
        let err = d
            .derive(sample(5000.0, 5000.0), t0 + TimeDelta::microseconds(200))
            .unwrap_err();
        assert_eq!(err, RateError::IntervalTooShort { elapsed_ms: 0 });

        // Measured against the kept baseline, not the rejected sample.
        let r = d
            .derive(sample(3000.0, 1000.0), t0 + TimeDelta::seconds(2))
            .unwrap();
        assert_eq!(r, sample(1000.0, 0.0));
    }

    #[test]
    fn clock_stepping_back_is_rejected() {
        let t0 = Local::now();
        let mut d = RateDeriver::new();
        d.derive(sample(0.0, 0.0), t0).unwrap();
        assert!(d
            .derive(sample(10.0, 10.0), t0 - TimeDelta::seconds(3))
            .is_err());
    }

    #[test]
    fn counter_reset_yields_zero_and_rebases() {
        let t0 = Local::now();
        let mut d = RateDeriver::new();
        d.derive(sample(9000.0, 9000.0), t0).unwrap();
        let r = d
            .derive(sample(100.0, 100.0), t0 + TimeDelta::seconds(1))
            .unwrap();
        assert_eq!(r, sample(0.0, 0.0));
        let r = d
            .derive(sample(600.0, 100.0), t0 + TimeDelta::milliseconds(1500))
            .unwrap();
        assert_eq!(r, sample(1000.0, 0.0));
    }

    #[test]
    fn rate_mode_parses_and_displays() {
        assert_eq!("derived".parse::<RateMode>().unwrap(), RateMode::Derived);
        assert_eq!("Precomputed".parse::<RateMode>().unwrap(), RateMode::Precomputed);
        assert!("bogus".parse::<RateMode>().is_err());
        assert_eq!(RateMode::Derived.to_string(), "derived");
    }
}
