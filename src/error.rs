//! Unified error type for the analysis pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReachError>;

/// All errors that can occur while building call graphs and call entries.
#[derive(Error, Debug)]
pub enum ReachError {
    /// A line carries the record marker but does not follow the record grammar.
    /// Fatal: the log is corrupt and nothing after it can be trusted.
    #[error("Malformed call record at line {line_no}: {line}")]
    MalformedRecord { line_no: usize, line: String },

    /// A canonical method string that does not follow `type:name(args)`.
    #[error("Malformed method identifier: '{0}'")]
    MalformedMethod(String),

    /// The call log could not be opened or read
    #[error("Cannot read call log {}: {source}", .path.display())]
    CallLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact a command depends on has not been produced yet
    #[error("Artifact not found: {}. Run `testreach analyze` first", .0.display())]
    MissingArtifact(PathBuf),

    /// A cache artifact exists but has the wrong shape
    #[error("Invalid cache artifact {}: {message}", .path.display())]
    InvalidCache { path: PathBuf, message: String },

    /// The external test list is not a JSON array of `pkg.Class#method` strings
    #[error("Invalid test list {}: {message}", .path.display())]
    InvalidTestList { path: PathBuf, message: String },

    /// I/O error (log read, artifact read/write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary snapshot encode/decode error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_record_reports_line_verbatim() {
        let err = ReachError::MalformedRecord {
            line_no: 7,
            line: "M:a.B:foo(CDa.C:bar()".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("M:a.B:foo(CDa.C:bar()"));
    }

    #[test]
    fn test_invalid_cache_display() {
        let err = ReachError::InvalidCache {
            path: PathBuf::from("logs/unit_tests.json"),
            message: "expected a non-empty array".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("logs/unit_tests.json"));
        assert!(msg.contains("non-empty array"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing log");
        let err: ReachError = io_err.into();
        assert!(matches!(err, ReachError::Io(_)));
    }

    #[test]
    fn test_invalid_test_list_names_the_input() {
        let err = ReachError::InvalidTestList {
            path: PathBuf::from("data/test_methods.json"),
            message: "expected a JSON array".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid test list data/test_methods.json"));
        assert!(!msg.contains("cache"));
    }
}
