use std::path::Path;

use crate::domain::call_entry::CallEntryIndex;
use crate::error::Result;

pub mod json_exporter;

pub use json_exporter::JsonExporter;

/// Writes a call-entry index in a form meant for people and tooling.
pub trait EntryIndexExporter {
    fn export(&self, index: &CallEntryIndex, path: &Path) -> Result<()>;
}
