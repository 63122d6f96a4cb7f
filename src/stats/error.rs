//! Error taxonomy for the stats pipeline.

/// Terminal failures of a stats request. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// `startDate` was supplied but is not a `YYYY-MM-DD` calendar date
    InvalidStartDate,
    /// `endDate` was supplied but is not a `YYYY-MM-DD` calendar date
    InvalidEndDate,
    /// Both bounds parsed but start falls after end
    InvalidRange,
    /// The raw-event feed could not be fetched or was not a JSON array.
    /// Carries the underlying cause.
    SourceUnavailable(String),
}

impl StatsError {
    /// Wraps any upstream failure, keeping its full context chain.
    pub fn source_unavailable(err: impl std::fmt::Display) -> Self {
        Self::SourceUnavailable(format!("{:#}", err))
    }
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStartDate => write!(f, "Invalid startDate"),
            Self::InvalidEndDate => write!(f, "Invalid endDate"),
            Self::InvalidRange => write!(f, "startDate cannot be after endDate"),
            Self::SourceUnavailable(cause) => {
                write!(f, "Failed to process statistics: {}", cause)
            }
        }
    }
}

impl std::error::Error for StatsError {}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_validation_messages() {
        assert_eq!(StatsError::InvalidStartDate.to_string(), "Invalid startDate");
        assert_eq!(StatsError::InvalidEndDate.to_string(), "Invalid endDate");
        assert_eq!(
            StatsError::InvalidRange.to_string(),
            "startDate cannot be after endDate"
        );
    }

    #[test]
    fn test_source_unavailable_keeps_cause_chain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("Network error"));
        let err = err.context("GET webstats.json failed").unwrap_err();

        let wrapped = StatsError::source_unavailable(&err);
        assert_eq!(
            wrapped.to_string(),
            "Failed to process statistics: GET webstats.json failed: Network error"
        );
    }
}
