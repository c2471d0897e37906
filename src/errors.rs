use std::fmt;

/// Application-specific error types.
///
/// Shape or consistency problems inside a single report are never raised as
/// errors; they are collected in `ValidationResult` so one bad document
/// cannot abort the pipeline. Only precondition violations that make the
/// requested computation meaningless surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Merge requested with fewer client reports than the policy minimum.
    InsufficientReports {
        /// Client the merge was requested for.
        client_id: String,
        /// How many reports were actually supplied.
        found: usize,
    },
    /// Invalid configuration value.
    InvalidConfig(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InsufficientReports { client_id, found } => write!(
                f,
                "Insufficient reports for client {}: found {}, need at least 2 to merge",
                client_id, found
            ),
            AppError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::InsufficientReports {
            client_id: "client-77".to_string(),
            found: 1,
        };
        let display = format!("{}", error);
        assert!(display.contains("client-77"));
        assert!(display.contains("found 1"));
    }
}
