//! Loading snapshot files through the [`ReportLoader`] seam.
//!
//! The on-disk format is picked from the file extension:
//!
//! | Extension        | Format |
//! |------------------|--------|
//! | `.json`          | JSON   |
//! | `.yaml` / `.yml` | YAML   |
//!
//! ```no_run
//! use rptdoc_core::ReportLoader;
//! use rptdoc_snapshot::SnapshotLoader;
//!
//! let model = SnapshotLoader::new().load("captures/orders.json".as_ref()).unwrap();
//! ```

use std::path::Path;

use rptdoc_core::{LoadError, ReportLoader};
use tracing::debug;

use crate::error::{Result, SnapshotError};
use crate::model::{ReportSnapshot, SnapshotModel};

/// Serialization format of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Detects the format from the file extension, ignoring ASCII case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some(other) => Err(SnapshotError::UnsupportedFormat(format!(".{other}"))),
            None => Err(SnapshotError::UnsupportedFormat(
                "missing file extension".to_string(),
            )),
        }
    }

    pub fn parse(self, content: &str) -> Result<ReportSnapshot> {
        match self {
            Self::Json => ReportSnapshot::from_json_str(content),
            Self::Yaml => ReportSnapshot::from_yaml_str(content),
        }
    }
}

/// Reads a snapshot file into a [`ReportSnapshot`].
pub fn read_snapshot(path: &Path) -> Result<ReportSnapshot> {
    let format = SnapshotFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}

/// [`ReportLoader`] for JSON and YAML snapshot files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotLoader;

impl SnapshotLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ReportLoader for SnapshotLoader {
    type Model = SnapshotModel;

    fn load(&self, path: &Path) -> std::result::Result<SnapshotModel, LoadError> {
        let snapshot = read_snapshot(path).map_err(|err| {
            let message = match &err {
                SnapshotError::IoError(_) => "could not read snapshot",
                SnapshotError::JsonError(_) | SnapshotError::YamlError(_) => {
                    "snapshot is not a valid report model"
                }
                SnapshotError::UnsupportedFormat(_) => "unsupported snapshot format",
            };
            LoadError::new(path, message).with_source(err)
        })?;
        debug!(
            path = %path.display(),
            loaded = snapshot.loaded,
            unavailable = snapshot.unavailable.len(),
            "loaded report snapshot"
        );
        Ok(SnapshotModel::new(snapshot))
    }
}
