//! Serialized report model and its accessor implementation.
//!
//! # Example YAML
//!
//! ```yaml
//! generated_query: null
//! internal_sources:
//!   - typed: false
//!     properties:
//!       CommandText: "SELECT * FROM Orders"
//! data_sources:
//!   - name: Command
//!     connection: { kind: SQL, server: db01, database: Sales }
//! parameters:
//!   - { name: Region, value_type: StringParameter, prompt: "Pick a region" }
//! selection:
//!   record: "{Orders.Total} > 100"
//! groups:
//!   - { ordinal: 1, field: Region }
//! sort_specs:
//!   - { field: Region, direction: descending }
//! unavailable: [formulas]
//! ```

use rptdoc_core::{
    AccessError, AccessResult, COMMAND_TEXT_PROPERTY, DataSource, Formula, Group,
    HasCommandText, InternalSource, Parameter, ReportModel, SelectionFormula, SortSpec,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Accessor names accepted in [`ReportSnapshot::unavailable`].
pub mod members {
    pub const GENERATED_QUERY: &str = "generated_query";
    pub const INTERNAL_SOURCES: &str = "internal_sources";
    pub const DATA_SOURCES: &str = "data_sources";
    pub const PARAMETERS: &str = "parameters";
    pub const RECORD_SELECTION: &str = "record_selection_formula";
    pub const GROUP_SELECTION: &str = "group_selection_formula";
    pub const FORMULAS: &str = "formulas";
    pub const GROUPS: &str = "groups";
    pub const SORT_SPECS: &str = "sort_specs";
}

fn default_loaded() -> bool {
    true
}

/// One element of the captured internal data-source container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternalSourceSnapshot {
    /// Whether the engine exposed the typed command shape for this element.
    #[serde(default)]
    pub typed: bool,
    /// Raw members of the element, probed by name.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl InternalSourceSnapshot {
    pub fn typed_command(text: &str) -> Self {
        let mut properties = Map::new();
        properties.insert(COMMAND_TEXT_PROPERTY.to_string(), Value::from(text));
        Self {
            typed: true,
            properties,
        }
    }
}

impl InternalSource for InternalSourceSnapshot {
    fn command_capability(&self) -> Option<&dyn HasCommandText> {
        if self.typed {
            Some(self as &dyn HasCommandText)
        } else {
            None
        }
    }

    fn property(&self, name: &str) -> AccessResult<Option<Value>> {
        Ok(self.properties.get(name).cloned())
    }
}

impl HasCommandText for InternalSourceSnapshot {
    fn command_text(&self) -> AccessResult<Option<String>> {
        match self.properties.get(COMMAND_TEXT_PROPERTY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(other) => Err(AccessError::shape_mismatch(
                COMMAND_TEXT_PROPERTY,
                format!("expected text, found {other}"),
            )),
        }
    }
}

/// Captured state of one report model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    #[serde(default = "default_loaded")]
    pub loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_query: Option<String>,
    /// `None` when the engine had no internal container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_sources: Option<Vec<InternalSourceSnapshot>>,
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub selection: SelectionFormula,
    #[serde(default)]
    pub formulas: Vec<Formula>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub sort_specs: Vec<SortSpec>,
    /// Accessors that failed when the snapshot was captured; see [`members`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

impl Default for ReportSnapshot {
    fn default() -> Self {
        Self {
            loaded: true,
            generated_query: None,
            internal_sources: None,
            data_sources: Vec::new(),
            parameters: Vec::new(),
            selection: SelectionFormula::default(),
            formulas: Vec::new(),
            groups: Vec::new(),
            sort_specs: Vec::new(),
            unavailable: Vec::new(),
        }
    }
}

impl ReportSnapshot {
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml_str(yaml: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// [`ReportModel`] backed by a [`ReportSnapshot`].
///
/// # Examples
///
/// ```
/// use rptdoc_core::{DataSource, ReportModel};
/// use rptdoc_snapshot::{ReportSnapshot, SnapshotModel};
///
/// let mut snapshot = ReportSnapshot::default();
/// snapshot.data_sources.push(DataSource::table("Orders"));
/// snapshot.unavailable.push("parameters".into());
///
/// let model = SnapshotModel::new(snapshot);
/// assert_eq!(model.data_sources().unwrap().len(), 1);
/// assert!(model.parameters().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotModel {
    snapshot: ReportSnapshot,
    closed: bool,
}

impl SnapshotModel {
    pub fn new(snapshot: ReportSnapshot) -> Self {
        Self {
            snapshot,
            closed: false,
        }
    }

    pub fn snapshot(&self) -> &ReportSnapshot {
        &self.snapshot
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn member(&self, name: &str) -> AccessResult<()> {
        if self.closed {
            return Err(AccessError::Engine("report has been closed".to_string()));
        }
        if self.snapshot.unavailable.iter().any(|member| member == name) {
            return Err(AccessError::inaccessible(name));
        }
        Ok(())
    }
}

impl ReportModel for SnapshotModel {
    fn is_loaded(&self) -> bool {
        self.snapshot.loaded && !self.closed
    }

    fn generated_query(&self) -> AccessResult<Option<String>> {
        self.member(members::GENERATED_QUERY)?;
        Ok(self.snapshot.generated_query.clone())
    }

    fn internal_sources(&self) -> AccessResult<Option<Vec<&dyn InternalSource>>> {
        self.member(members::INTERNAL_SOURCES)?;
        Ok(self.snapshot.internal_sources.as_ref().map(|sources| {
            sources
                .iter()
                .map(|source| source as &dyn InternalSource)
                .collect()
        }))
    }

    fn data_sources(&self) -> AccessResult<Vec<DataSource>> {
        self.member(members::DATA_SOURCES)?;
        Ok(self.snapshot.data_sources.clone())
    }

    fn parameters(&self) -> AccessResult<Vec<Parameter>> {
        self.member(members::PARAMETERS)?;
        Ok(self.snapshot.parameters.clone())
    }

    fn record_selection_formula(&self) -> AccessResult<String> {
        self.member(members::RECORD_SELECTION)?;
        Ok(self.snapshot.selection.record.clone())
    }

    fn group_selection_formula(&self) -> AccessResult<String> {
        self.member(members::GROUP_SELECTION)?;
        Ok(self.snapshot.selection.group.clone())
    }

    fn formulas(&self) -> AccessResult<Vec<Formula>> {
        self.member(members::FORMULAS)?;
        Ok(self.snapshot.formulas.clone())
    }

    fn groups(&self) -> AccessResult<Vec<Group>> {
        self.member(members::GROUPS)?;
        Ok(self.snapshot.groups.clone())
    }

    fn sort_specs(&self) -> AccessResult<Vec<SortSpec>> {
        self.member(members::SORT_SPECS)?;
        Ok(self.snapshot.sort_specs.clone())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
