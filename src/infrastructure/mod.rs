// Infrastructure for testreach: on-disk artifacts and call-log input.

pub mod artifact_cache;
pub mod test_list;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use artifact_cache::{Artifact, ArtifactCodec, CacheStatus, MethodListCodec, SnapshotCodec};
pub use test_list::load_test_list;

use crate::error::{ReachError, Result};

/// Open a call log for line-by-line reading.
pub fn open_call_log(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| ReachError::CallLog {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}
