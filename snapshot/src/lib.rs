//! Captured report models served through the `rptdoc-core` accessor traits.
//!
//! A snapshot is a JSON or YAML description of what a report engine returned
//! for each accessor, including which accessors failed. [`SnapshotLoader`]
//! turns a snapshot file into a [`SnapshotModel`] that the documenter can
//! walk like a live engine model.
//!
//! # Quick start
//!
//! ```no_run
//! use rptdoc_core::ReportLoader;
//! use rptdoc_snapshot::SnapshotLoader;
//!
//! let model = SnapshotLoader::new().load("orders.json".as_ref()).unwrap();
//! ```

mod error;
mod loader;
mod model;

pub use error::{Result, SnapshotError};
pub use loader::{SnapshotFormat, SnapshotLoader, read_snapshot};
pub use model::{InternalSourceSnapshot, ReportSnapshot, SnapshotModel, members};
