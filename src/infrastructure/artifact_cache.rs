/// Artifact Cache Module
///
/// One "load if present and valid, else compute and store" capability for
/// every artifact a run can reuse.
///
/// Cached artifacts:
/// - the unit-test selection - JSON array of canonical method strings
/// - the call-entry index - bincode snapshot
///
/// A missing artifact means "compute it". An artifact that exists but does
/// not decode is a configuration problem and fails the run.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::call_entry::CallEntryIndex;
use crate::domain::method::Method;
use crate::error::{ReachError, Result};

/// Whether a value came from disk or was computed this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Computed,
}

/// On-disk encoding of one artifact kind.
pub trait ArtifactCodec {
    type Value;

    /// Decode stored bytes, describing any shape problem in the error.
    fn decode(&self, bytes: &[u8]) -> std::result::Result<Self::Value, String>;

    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>>;

    /// Values that would not decode again are returned but never stored.
    fn is_storable(&self, _value: &Self::Value) -> bool {
        true
    }
}

/// A named file holding one cached value.
pub struct Artifact<C> {
    path: PathBuf,
    codec: C,
}

impl<C: ArtifactCodec> Artifact<C> {
    pub fn new(path: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the stored value; `Ok(None)` when nothing is stored yet.
    pub fn load(&self) -> Result<Option<C::Value>> {
        if !self.exists() {
            debug!(path = %self.path.display(), "no cached artifact");
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        let value = self.codec.decode(&bytes).map_err(|message| ReachError::InvalidCache {
            path: self.path.clone(),
            message,
        })?;
        info!(path = %self.path.display(), "reusing cached artifact");
        Ok(Some(value))
    }

    pub fn store(&self, value: &C::Value) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = self.codec.encode(value)?;
        let mut writer = BufWriter::new(fs::File::create(&self.path)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "artifact stored");
        Ok(())
    }

    pub fn load_or_compute<F>(&self, compute: F) -> Result<(C::Value, CacheStatus)>
    where
        F: FnOnce() -> Result<C::Value>,
    {
        if let Some(value) = self.load()? {
            return Ok((value, CacheStatus::Hit));
        }
        let value = compute()?;
        if self.codec.is_storable(&value) {
            self.store(&value)?;
        } else {
            warn!(path = %self.path.display(), "computed value not cached");
        }
        Ok((value, CacheStatus::Computed))
    }

    /// Remove the stored value, if any.
    pub fn invalidate(&self) -> Result<()> {
        if self.exists() {
            fs::remove_file(&self.path)?;
            info!(path = %self.path.display(), "cached artifact removed");
        }
        Ok(())
    }
}

/// Unit-test selection: a non-empty JSON array of canonical method strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodListCodec;

impl ArtifactCodec for MethodListCodec {
    type Value = Vec<Method>;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<Vec<Method>, String> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| format!("not valid JSON: {e}"))?;
        let items = value
            .as_array()
            .ok_or_else(|| "expected a JSON array of method strings".to_string())?;
        if items.is_empty() {
            return Err("expected a non-empty array of method strings".to_string());
        }
        items
            .iter()
            .map(|item| {
                let text = item
                    .as_str()
                    .ok_or_else(|| format!("expected a method string, found {item}"))?;
                text.parse::<Method>().map_err(|e| e.to_string())
            })
            .collect()
    }

    fn encode(&self, value: &Vec<Method>) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(value)?)
    }

    fn is_storable(&self, value: &Vec<Method>) -> bool {
        !value.is_empty()
    }
}

/// Call-entry index snapshot for exact reload.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotCodec;

impl ArtifactCodec for SnapshotCodec {
    type Value = CallEntryIndex;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<CallEntryIndex, String> {
        bincode::deserialize(bytes).map_err(|e| format!("snapshot does not decode: {e}"))
    }

    fn encode(&self, value: &CallEntryIndex) -> Result<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }
}
