//! Best-effort documentation of report definitions.
//!
//! This crate walks a loaded [`ReportModel`] and produces a deterministic
//! plain-text document describing its structure. The model is a foreign
//! object graph whose contract may be broken or version-dependent, so:
//!
//! - the data-retrieval query is recovered through an ordered fallback chain
//!   ([`resolver::resolve_query`]) that never fails, and
//! - every section is extracted inside its own containment boundary
//!   ([`sections`]), so one unreadable facet becomes a diagnostic line
//!   instead of aborting the document.
//!
//! # Main entry points
//!
//! - [`ReportPipeline`]: validate the input, load the model through a
//!   [`ReportLoader`], document it and release it.
//! - [`document_model`]: document a model that is already loaded.
//!
//! # Document layout
//!
//! ```text
//! # REPORT DEFINITION: orders.rpt
//! # GENERATED ON: 2024-01-15 10:30:00
//! ====================================================================
//!
//! --- DATABASE & QUERY ---
//! ...
//!
//! --- PARAMETERS ---
//! ...
//!
//! --- SELECTION FORMULAS ---
//! ...
//!
//! --- CUSTOM FORMULAS ---
//! ...
//!
//! --- GROUPING ---
//! ...
//! ```
//!
//! [`ReportModel`]: rptdoc_core::ReportModel
//! [`ReportLoader`]: rptdoc_core::ReportLoader

pub mod config;
mod isolate;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod sections;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, DataSourceLayout, DocumenterConfig};
pub use pipeline::{
    Document, ModelHandle, PipelineError, ReportPipeline, RunState, document_model,
};
pub use report::RunReport;
pub use resolver::{QueryResolution, QueryResult, QueryTier, resolve_query};
pub use sections::{SectionFailure, SectionKind, TextSection};
