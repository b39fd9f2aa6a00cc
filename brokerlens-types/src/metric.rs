//! Small metric primitives shared by every snapshot kind.

/// A monotonically increasing counter paired with its current rate.
///
/// The management API reports most counters as `foo` plus an optional
/// `foo_details.rate`. Both halves are sourced independently, so either one
/// may be zero while the other is not.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RateMetric {
    /// Total count since the broker (or object) started.
    pub total: u64,

    /// Per-second rate over the broker's sampling window.
    pub rate: f64,
}

impl RateMetric {
    /// A metric with no activity.
    pub const ZERO: Self = Self {
        total: 0,
        rate: 0.0,
    };

    /// Create a metric from a total and a rate.
    pub const fn new(total: u64, rate: f64) -> Self {
        Self { total, rate }
    }

    /// Returns true if neither the total nor the rate carries any activity.
    pub fn is_idle(&self) -> bool {
        self.total == 0 && self.rate == 0.0
    }
}

/// A bounded resource: how much is in use and where the ceiling is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capacity {
    /// Amount currently in use.
    pub used: u64,

    /// Configured ceiling. Zero means the broker did not report one.
    pub limit: u64,
}

impl Capacity {
    /// Create a capacity reading.
    pub const fn new(used: u64, limit: u64) -> Self {
        Self { used, limit }
    }

    /// Fraction of the limit in use, in `0.0..=1.0` (may exceed 1.0 when
    /// the broker is over its limit). Returns 0.0 when no limit is known.
    pub fn utilization(&self) -> f64 {
        if self.limit == 0 {
            0.0
        } else {
            self.used as f64 / self.limit as f64
        }
    }

    /// Remaining headroom before the limit, saturating at zero.
    pub fn available(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }
}
