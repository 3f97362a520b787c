//! Accessor traits over an externally loaded report model.
//!
//! The model itself is produced by a [`ReportLoader`] outside this crate.
//! Everything here is read-only; every accessor is fallible because the
//! underlying object graph may hide or reshape members between engine
//! versions.

use std::path::Path;

use serde_json::Value;

use crate::error::{AccessResult, LoadError};
use crate::types::{DataSource, Formula, Group, Parameter, SortSpec};

/// Name of the command-text member on an internal data source.
pub const COMMAND_TEXT_PROPERTY: &str = "CommandText";

/// Read-only view of one loaded report.
pub trait ReportModel {
    /// Whether the model finished loading. Nothing else may be read when
    /// this is `false`.
    fn is_loaded(&self) -> bool;

    /// Top-level query text generated by the engine, if it exposes one.
    fn generated_query(&self) -> AccessResult<Option<String>>;

    /// Internal (non-contract) representation of the data sources.
    ///
    /// `Ok(None)` means the container is not present on this engine.
    fn internal_sources(&self) -> AccessResult<Option<Vec<&dyn InternalSource>>>;

    fn data_sources(&self) -> AccessResult<Vec<DataSource>>;

    fn parameters(&self) -> AccessResult<Vec<Parameter>>;

    fn record_selection_formula(&self) -> AccessResult<String>;

    fn group_selection_formula(&self) -> AccessResult<String>;

    fn formulas(&self) -> AccessResult<Vec<Formula>>;

    fn groups(&self) -> AccessResult<Vec<Group>>;

    fn sort_specs(&self) -> AccessResult<Vec<SortSpec>>;

    /// Releases engine resources. Called exactly once by the owner of the
    /// model; the default does nothing.
    fn close(&mut self) {}
}

/// One element of the internal data-source container.
pub trait InternalSource {
    /// Typed access to the command text, when this element has the
    /// expected shape.
    fn command_capability(&self) -> Option<&dyn HasCommandText>;

    /// Dynamic member lookup by name. `Ok(None)` means no such member.
    fn property(&self, name: &str) -> AccessResult<Option<Value>>;
}

/// Capability of an internal source that carries command text.
pub trait HasCommandText {
    fn command_text(&self) -> AccessResult<Option<String>>;
}

/// Produces a [`ReportModel`] from a report artifact on disk.
pub trait ReportLoader {
    type Model: ReportModel;

    /// Loads the artifact at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the artifact cannot be opened or parsed.
    /// A loader that fails must release anything it acquired itself.
    fn load(&self, path: &Path) -> Result<Self::Model, LoadError>;
}
