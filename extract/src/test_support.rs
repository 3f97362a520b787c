//! In-memory model with failure injection for unit tests.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rptdoc_core::{
    AccessError, AccessResult, DataSource, Formula, Group, HasCommandText, InternalSource,
    Parameter, ReportModel, SortSpec,
};
use serde_json::Value;

/// How a member misbehaves when read.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fault {
    Error,
    Panic,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeInternal {
    /// `None` hides the typed command shape.
    pub typed: Option<Option<String>>,
    pub typed_fails: bool,
    pub properties: BTreeMap<String, Value>,
    pub property_fails: bool,
}

impl FakeInternal {
    pub fn typed(text: &str) -> Self {
        Self {
            typed: Some(Some(text.to_string())),
            ..Self::default()
        }
    }

    pub fn untyped_with_property(name: &str, value: Value) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(name.to_string(), value);
        Self {
            typed: None,
            properties,
            ..Self::default()
        }
    }
}

impl InternalSource for FakeInternal {
    fn command_capability(&self) -> Option<&dyn HasCommandText> {
        if self.typed.is_some() {
            Some(self as &dyn HasCommandText)
        } else {
            None
        }
    }

    fn property(&self, name: &str) -> AccessResult<Option<Value>> {
        if self.property_fails {
            return Err(AccessError::Engine(format!("reflection denied for {name}")));
        }
        Ok(self.properties.get(name).cloned())
    }
}

impl HasCommandText for FakeInternal {
    fn command_text(&self) -> AccessResult<Option<String>> {
        if self.typed_fails {
            return Err(AccessError::shape_mismatch("CommandText", "field moved"));
        }
        Ok(self.typed.clone().flatten())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeModel {
    pub loaded: bool,
    pub generated_query: Option<String>,
    pub internal: Option<Vec<FakeInternal>>,
    pub data_sources: Vec<DataSource>,
    pub parameters: Vec<Parameter>,
    pub record_selection: String,
    pub group_selection: String,
    pub formulas: Vec<Formula>,
    pub groups: Vec<Group>,
    pub sort_specs: Vec<SortSpec>,
    pub faults: Vec<(&'static str, Fault)>,
    pub closes: Rc<Cell<usize>>,
    pub sort_lookups: Rc<Cell<usize>>,
}

impl Default for FakeModel {
    fn default() -> Self {
        Self {
            loaded: true,
            generated_query: None,
            internal: None,
            data_sources: Vec::new(),
            parameters: Vec::new(),
            record_selection: String::new(),
            group_selection: String::new(),
            formulas: Vec::new(),
            groups: Vec::new(),
            sort_specs: Vec::new(),
            faults: Vec::new(),
            closes: Rc::new(Cell::new(0)),
            sort_lookups: Rc::new(Cell::new(0)),
        }
    }
}

impl FakeModel {
    pub fn with_fault(mut self, member: &'static str, fault: Fault) -> Self {
        self.faults.push((member, fault));
        self
    }

    fn read(&self, member: &str) -> AccessResult<()> {
        match self.faults.iter().find(|(name, _)| *name == member) {
            None => Ok(()),
            Some((_, Fault::Panic)) => panic!("{member} blew up"),
            Some((_, Fault::Error)) => Err(AccessError::inaccessible(member)),
        }
    }
}

impl ReportModel for FakeModel {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn generated_query(&self) -> AccessResult<Option<String>> {
        self.read("generated_query")?;
        Ok(self.generated_query.clone())
    }

    fn internal_sources(&self) -> AccessResult<Option<Vec<&dyn InternalSource>>> {
        self.read("internal_sources")?;
        Ok(self.internal.as_ref().map(|sources| {
            sources
                .iter()
                .map(|source| source as &dyn InternalSource)
                .collect()
        }))
    }

    fn data_sources(&self) -> AccessResult<Vec<DataSource>> {
        self.read("data_sources")?;
        Ok(self.data_sources.clone())
    }

    fn parameters(&self) -> AccessResult<Vec<Parameter>> {
        self.read("parameters")?;
        Ok(self.parameters.clone())
    }

    fn record_selection_formula(&self) -> AccessResult<String> {
        self.read("record_selection_formula")?;
        Ok(self.record_selection.clone())
    }

    fn group_selection_formula(&self) -> AccessResult<String> {
        self.read("group_selection_formula")?;
        Ok(self.group_selection.clone())
    }

    fn formulas(&self) -> AccessResult<Vec<Formula>> {
        self.read("formulas")?;
        Ok(self.formulas.clone())
    }

    fn groups(&self) -> AccessResult<Vec<Group>> {
        self.read("groups")?;
        Ok(self.groups.clone())
    }

    fn sort_specs(&self) -> AccessResult<Vec<SortSpec>> {
        self.sort_lookups.set(self.sort_lookups.get() + 1);
        self.read("sort_specs")?;
        Ok(self.sort_specs.clone())
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}
