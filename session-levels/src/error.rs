use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `session-levels`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
pub enum LevelError {
    #[error("no data: input bar sequence is empty")]
    NoData,

    #[error("invalid percentile tier {0}: must be within (0, 100]")]
    InvalidPercentile(f64),

    #[error("invalid session start: {0}")]
    InvalidSessionStart(String),
}

impl LevelError {
    /// Determine if this error means "nothing to compute" rather than a misconfiguration.
    ///
    /// Callers skip rendering and notification for the instrument in this case.
    pub fn is_no_data(&self) -> bool {
        matches!(self, LevelError::NoData)
    }
}
