//! Read-only report model view shared by the documenter crates.
//!
//! This crate defines what the extraction pipeline consumes:
//!
//! - [`ReportModel`]: accessor trait over one loaded report (data sources,
//!   parameters, selection formulas, formulas, grouping and sorting).
//! - [`InternalSource`] and [`HasCommandText`]: the internal data-source
//!   representation, probed either through a typed capability or by member
//!   name.
//! - [`ReportLoader`]: the external collaborator that turns a report
//!   artifact into a model.
//! - Entity views ([`DataSource`], [`Parameter`], [`Group`], [`SortSpec`],
//!   [`Formula`], [`SelectionFormula`]).
//!
//! # Example
//!
//! ```
//! use rptdoc_core::*;
//!
//! let source = DataSource::table("Orders")
//!     .with_connection(ConnectionInfo::new("SQL", "db01", "Sales"));
//! assert_eq!(source.connection.database, "Sales");
//!
//! let sort = SortSpec::new("Region", SortDirection::Descending);
//! assert_eq!(sort.direction.to_string(), "Descending");
//! ```

mod access;
mod error;
mod types;

pub use access::{
    COMMAND_TEXT_PROPERTY, HasCommandText, InternalSource, ReportLoader, ReportModel,
};
pub use error::{AccessError, AccessResult, LoadError};
pub use types::*;
