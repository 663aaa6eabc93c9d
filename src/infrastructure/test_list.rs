//! Loading test lists reported by the build (`pkg.Class#method` identifiers).

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{ReachError, Result};

/// Read a JSON array of test identifiers.
pub fn load_test_list(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(ReachError::MissingArtifact(path.to_path_buf()));
    }
    let ids: Vec<String> = serde_json::from_slice(&fs::read(path)?).map_err(|e| ReachError::InvalidTestList {
        path: path.to_path_buf(),
        message: format!("expected a JSON array of test identifiers: {e}"),
    })?;
    info!(path = %path.display(), tests = ids.len(), "test list loaded");
    Ok(ids)
}
