//! JSON Exporter
//!
//! Writes the call-entry index as
//! `{ "<test>": [ { "callee": "<method>", "level": <n> }, ... ] }`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::domain::call_entry::CallEntryIndex;
use crate::error::Result;
use crate::ports::EntryIndexExporter;

pub struct JsonExporter;

impl EntryIndexExporter for JsonExporter {
    fn export(&self, index: &CallEntryIndex, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, index)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %path.display(), tests = index.len(), "call entries exported");
        Ok(())
    }
}
