use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LusociteError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed response from {registry}: {detail}")]
    Malformed { registry: &'static str, detail: String },

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Network capabilities capped: domain not in allowlist for URL {0}")]
    Sandbox(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file {path} is not valid JSON: {source}")]
    CacheDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    // ── Precondition violations: logic bugs, never degraded ─────────────────
    #[error("{key} is resolved to {found}, refusing to fetch it from {expected}")]
    AgencyMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("{key} has unrecognised agency {agency}")]
    UnknownAgency { key: String, agency: String },

    #[error("{key} is not present in the DOI metadata map")]
    MissingRecord { key: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LusociteError {
    /// External faults that callers log and skip. Everything else aborts the run.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LusociteError::Http(_)
                | LusociteError::Status { .. }
                | LusociteError::Malformed { .. }
                | LusociteError::Xml(_)
        )
    }

    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LusociteError::AgencyMismatch { .. }
                | LusociteError::UnknownAgency { .. }
                | LusociteError::MissingRecord { .. }
        )
    }

    /// HTTP status carried by the error, if the registry answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            LusociteError::Status { status, .. } => Some(*status),
            LusociteError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn malformed(registry: &'static str, detail: impl Into<String>) -> Self {
        LusociteError::Malformed { registry, detail: detail.into() }
    }
}

pub type Result<T> = std::result::Result<T, LusociteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_are_transient() {
        let err = LusociteError::Status { url: "https://api.crossref.org/works/x".into(), status: 404 };
        assert!(err.is_transient());
        assert!(!err.is_precondition());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_agency_mismatch_is_a_precondition() {
        let err = LusociteError::AgencyMismatch {
            key: "10.1000/x".into(),
            expected: "crossref",
            found: "datacite".into(),
        };
        assert!(err.is_precondition());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("datacite"));
    }
}
