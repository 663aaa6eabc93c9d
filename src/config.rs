//! Run configuration, read from an optional TOML file.
//!
//! ```toml
//! call_log = "logs/test_source_call.log"
//! work_dir = "logs"
//! test_list = "data/test_methods.json"
//! project_prefix = "org.apache.commons.lang3"
//! traversal = "depth-first"
//!
//! [naming]
//! class_suffix = "Test"
//! method_prefix = "test"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::domain::entry_point::TestNaming;
use crate::domain::reachability::{TraversalConfig, TraversalStrategy};
use crate::error::Result;

/// Looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "testreach.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReachConfig {
    /// Call log produced by the call-graph tool
    pub call_log: PathBuf,
    /// Directory relative artifact paths resolve against
    pub work_dir: PathBuf,
    pub unit_test_cache: PathBuf,
    pub entry_snapshot: PathBuf,
    pub entry_json: PathBuf,
    /// Optional `pkg.Class#method` list replacing the naming convention
    pub test_list: Option<PathBuf>,
    pub naming: TestNaming,
    /// Fixed project prefix; extracted from the tests when unset
    pub project_prefix: Option<String>,
    pub traversal: TraversalStrategy,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            call_log: PathBuf::from("logs/test_source_call.log"),
            work_dir: PathBuf::from("logs"),
            unit_test_cache: PathBuf::from("unit_tests.json"),
            entry_snapshot: PathBuf::from("call_entries.bin"),
            entry_json: PathBuf::from("call_entries.json"),
            test_list: None,
            naming: TestNaming::default(),
            project_prefix: None,
            traversal: TraversalStrategy::default(),
        }
    }
}

impl ReachConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load `path` if given, else the default file if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(Path::new(DEFAULT_CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    fn in_work_dir(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    pub fn unit_test_cache_path(&self) -> PathBuf {
        self.in_work_dir(&self.unit_test_cache)
    }

    pub fn entry_snapshot_path(&self) -> PathBuf {
        self.in_work_dir(&self.entry_snapshot)
    }

    pub fn entry_json_path(&self) -> PathBuf {
        self.in_work_dir(&self.entry_json)
    }

    /// Traversal settings for a run whose tests yielded `extracted_prefix`.
    pub fn traversal_config(&self, extracted_prefix: String) -> TraversalConfig {
        TraversalConfig {
            project_prefix: self.project_prefix.clone().unwrap_or(extracted_prefix),
            strategy: self.traversal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReachError;

    #[test]
    fn test_defaults() {
        let config = ReachConfig::default();
        assert_eq!(config.unit_test_cache_path(), PathBuf::from("logs/unit_tests.json"));
        assert_eq!(config.entry_snapshot_path(), PathBuf::from("logs/call_entries.bin"));
        assert_eq!(config.naming, TestNaming::default());
        assert_eq!(config.traversal, TraversalStrategy::DepthFirst);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ReachConfig::from_toml_str(
            r#"
work_dir = "out"
traversal = "shortest-depth"
project_prefix = "org.acme"

[naming]
class_suffix = "Spec"
"#,
        )
        .unwrap();
        assert_eq!(config.entry_json_path(), PathBuf::from("out/call_entries.json"));
        assert_eq!(config.traversal, TraversalStrategy::ShortestDepth);
        assert_eq!(config.naming.class_suffix, "Spec");
        assert_eq!(config.naming.method_prefix, "test");
        assert_eq!(config.traversal_config("ignored".into()).project_prefix, "org.acme");
    }

    #[test]
    fn test_extracted_prefix_used_without_override() {
        let config = ReachConfig::default();
        assert_eq!(config.traversal_config("com.acme.".into()).project_prefix, "com.acme.");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = ReachConfig::from_toml_str("call_logs = \"x\"").unwrap_err();
        assert!(matches!(err, ReachError::Config(_)));
    }
}
