use session_levels::LevelError;
use thiserror::Error;

/// All errors generated in `session-levels-notifier`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifierError {
    #[error("invalid configuration for {key}: {reason}")]
    Config { key: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP error status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("failed to render attachment: {0}")]
    Render(String),

    #[error("level calculation failed: {0}")]
    Levels(#[from] LevelError),
}

impl NotifierError {
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Determine if the instrument had no bars to compute levels from.
    pub fn is_no_data(&self) -> bool {
        matches!(self, NotifierError::Levels(error) if error.is_no_data())
    }
}

impl From<reqwest::Error> for NotifierError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                // Query strings may carry API keys
                url: value
                    .url()
                    .map(|url| {
                        let mut url = url.clone();
                        url.set_query(None);
                        url.to_string()
                    })
                    .unwrap_or_default(),
            },
            None if value.is_decode() => Self::Parse(value.without_url().to_string()),
            None => Self::Http(value.without_url().to_string()),
        }
    }
}

impl From<csv::Error> for NotifierError {
    fn from(value: csv::Error) -> Self {
        Self::Render(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_error_is_no_data() {
        struct TestCase {
            input: NotifierError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: empty bar series
                input: NotifierError::from(LevelError::NoData),
                expected: true,
            },
            TestCase {
                // TC1: other level errors are not a skip
                input: NotifierError::from(LevelError::InvalidPercentile(0.0)),
                expected: false,
            },
            TestCase {
                // TC2: transport failure
                input: NotifierError::Http("connection refused".to_string()),
                expected: false,
            },
            TestCase {
                // TC3: attachment rendering
                input: NotifierError::Render("io error".to_string()),
                expected: false,
            },
            TestCase {
                // TC4: bad status
                input: NotifierError::Status {
                    status: 429,
                    url: "https://example.com".to_string(),
                },
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_no_data();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_notifier_error_display() {
        assert_eq!(
            NotifierError::config("LEVELS_LOOKBACK", "not a number").to_string(),
            "invalid configuration for LEVELS_LOOKBACK: not a number"
        );
        assert_eq!(
            NotifierError::from(LevelError::NoData).to_string(),
            "level calculation failed: no data: input bar sequence is empty"
        );
    }
}
