// ⚠️ Error taxonomy for extraction runs
//
// A module failure never aborts the run: the pipeline records a failure status
// for that module and moves on to the next one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The course store could not be reached for this module
    #[error("source connection failed: {0}")]
    SourceConnection(String),

    /// Querying or reshaping the records failed
    #[error("aggregation failed in {module}: {reason}")]
    Aggregation { module: String, reason: String },

    /// The row sink rejected a write
    #[error("sink write failed for tab '{tab}': {reason}")]
    SinkWrite { tab: String, reason: String },
}

impl ExtractError {
    pub fn aggregation(module: &str, err: impl std::fmt::Display) -> Self {
        ExtractError::Aggregation {
            module: module.to_string(),
            reason: format!("{:#}", err),
        }
    }

    pub fn sink_write(tab: &str, err: impl std::fmt::Display) -> Self {
        ExtractError::SinkWrite {
            tab: tab.to_string(),
            reason: format!("{:#}", err),
        }
    }

    /// Short kind label used in logs and run reports
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::SourceConnection(_) => "source_connection",
            ExtractError::Aggregation { .. } => "aggregation",
            ExtractError::SinkWrite { .. } => "sink_write",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::aggregation("Disc-Spec", "bad document");
        assert_eq!(err.to_string(), "aggregation failed in Disc-Spec: bad document");
        assert_eq!(err.kind(), "aggregation");

        let err = ExtractError::sink_write("Status", anyhow::anyhow!("disk full"));
        assert!(err.to_string().contains("'Status'"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_anyhow_context_is_kept() {
        let inner = anyhow::anyhow!("no such table").context("Failed to query courses");
        let err = ExtractError::aggregation("Details", inner);
        assert!(err.to_string().contains("Failed to query courses"));
        assert!(err.to_string().contains("no such table"));
    }
}
