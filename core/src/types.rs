//! Entity views exposed by a loaded report model.
//!
//! These are immutable snapshots handed out by a [`ReportModel`](crate::ReportModel)
//! accessor. They derive [`serde`] traits so captured models can be stored as
//! JSON or YAML and replayed through the same accessor traits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection descriptor attached to a data source.
///
/// # Examples
///
/// ```
/// use rptdoc_core::ConnectionInfo;
///
/// let conn = ConnectionInfo::new("SQL", "db01", "Sales");
/// assert_eq!(conn.server, "db01");
/// assert!(conn.provider.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection type as reported by the engine (e.g. "SQL", "CRQE").
    #[serde(default)]
    pub kind: String,
    /// Server or DSN name.
    #[serde(default)]
    pub server: String,
    /// Database (catalog) name.
    #[serde(default)]
    pub database: String,
    /// Data provider, when the engine exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ConnectionInfo {
    pub fn new(kind: &str, server: &str, database: &str) -> Self {
        Self {
            kind: kind.to_string(),
            server: server.to_string(),
            database: database.to_string(),
            provider: None,
        }
    }

    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = Some(provider.to_string());
        self
    }
}

/// A table, view, stored procedure or command used by the report.
///
/// # Examples
///
/// ```
/// use rptdoc_core::DataSource;
///
/// let table = DataSource::table("Orders");
/// assert!(!table.is_command());
///
/// let command = DataSource::command("Command", "SELECT * FROM Orders");
/// assert!(command.is_command());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    #[serde(default)]
    pub connection: ConnectionInfo,
    /// Embedded command text for command-based sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_text: Option<String>,
}

impl DataSource {
    /// Creates a linked table source.
    pub fn table(name: &str) -> Self {
        Self {
            name: name.to_string(),
            connection: ConnectionInfo::default(),
            command_text: None,
        }
    }

    /// Creates a command-based source carrying its own query text.
    pub fn command(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            connection: ConnectionInfo::default(),
            command_text: Some(text.to_string()),
        }
    }

    pub fn with_connection(mut self, connection: ConnectionInfo) -> Self {
        self.connection = connection;
        self
    }

    /// Returns `true` when the source carries non-blank command text.
    pub fn is_command(&self) -> bool {
        self.command_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty())
    }
}

/// A user-prompted input field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Declared value type as the engine names it (e.g. "StringParameter").
    #[serde(default)]
    pub value_type: String,
    #[serde(default)]
    pub prompt: String,
}

impl Parameter {
    pub fn new(name: &str, value_type: &str, prompt: &str) -> Self {
        Self {
            name: name.to_string(),
            value_type: value_type.to_string(),
            prompt: prompt.to_string(),
        }
    }
}

/// A grouping level over one field.
///
/// The ordinal defines report order; it does not have to be contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub ordinal: usize,
    pub field: String,
}

impl Group {
    pub fn new(ordinal: usize, field: &str) -> Self {
        Self {
            ordinal,
            field: field.to_string(),
        }
    }
}

/// Sort direction of a [`SortSpec`].
///
/// # Examples
///
/// ```
/// use rptdoc_core::SortDirection;
///
/// assert_eq!(SortDirection::Descending.to_string(), "Descending");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "Ascending"),
            Self::Descending => write!(f, "Descending"),
        }
    }
}

/// Sort direction bound to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: &str, direction: SortDirection) -> Self {
        Self {
            field: field.to_string(),
            direction,
        }
    }
}

/// A named computed-field definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    #[serde(default)]
    pub text: String,
}

impl Formula {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
        }
    }
}

/// Record-level and group-level filter expressions. Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionFormula {
    #[serde(default)]
    pub record: String,
    #[serde(default)]
    pub group: String,
}
