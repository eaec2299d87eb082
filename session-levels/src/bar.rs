use chrono::{DateTime, Utc};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// One OHLCV sample for a fixed interval (eg/ one minute).
///
/// Sequences of [`Bar`]s are expected in ascending `time` order.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, Constructor)]
pub struct Bar {
    /// Interval open time.
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Carried through from the source, unused by level calculations.
    pub volume: f64,
}

impl Bar {
    /// True when every price and the volume is a finite number.
    ///
    /// Bar sources use this to drop malformed rows before handing bars to the calculator.
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|value| value.is_finite())
    }
}
