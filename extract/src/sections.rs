//! Fault-isolated section extractors.
//!
//! Each extractor reads one facet of the model into a [`TextSection`]. A
//! failure while reading (error or panic) is contained to that section: the
//! extractor returns a [`SectionFailure`] carrying whatever lines were
//! already written, and [`SectionFailure::into_section`] turns it into the
//! same section with one diagnostic line appended.

use std::fmt::Write as _;

use rptdoc_core::{AccessError, AccessResult, DataSource, ReportModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DataSourceLayout;
use crate::isolate::isolate;
use crate::resolver::{QueryResolution, QueryResult};

/// Line written when the report has no data sources.
pub const NO_TABLES: &str = "No database tables or procedures found in the report.";
pub const NO_PARAMETERS: &str = "No parameters found.";
pub const NO_FORMULAS: &str = "No custom formulas found.";
pub const NO_GROUPS: &str = "No groups found.";
pub const UNKNOWN_SORT: &str = "(unknown)";

/// Error text when the query section is requested as a plain facet.
pub const QUERY_NOT_EXTRACTABLE: &str = "query section is rendered from a query resolution";

/// Sections of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    DataSource,
    Query,
    Parameters,
    SelectionFormulas,
    Formulas,
    Grouping,
}

impl SectionKind {
    /// Sections that always follow the query section, in document order.
    pub const TRAILING: [SectionKind; 4] = [
        SectionKind::Parameters,
        SectionKind::SelectionFormulas,
        SectionKind::Formulas,
        SectionKind::Grouping,
    ];

    /// Delimiter title of the section.
    pub fn title(self) -> &'static str {
        match self {
            Self::DataSource => "DATA SOURCE",
            Self::Query => "DATABASE & QUERY",
            Self::Parameters => "PARAMETERS",
            Self::SelectionFormulas => "SELECTION FORMULAS",
            Self::Formulas => "CUSTOM FORMULAS",
            Self::Grouping => "GROUPING",
        }
    }

    /// Noun used in the diagnostic line of a failed section.
    pub fn subject(self) -> &'static str {
        match self {
            Self::DataSource => "data source info",
            Self::Query => "query definition",
            Self::Parameters => "parameters",
            Self::SelectionFormulas => "selection formulas",
            Self::Formulas => "custom formulas",
            Self::Grouping => "grouping info",
        }
    }
}

/// Titled block of output lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSection {
    pub kind: SectionKind,
    pub lines: Vec<String>,
}

impl TextSection {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Appends the section, preceded by a blank line and its delimiter.
    pub fn render_into(&self, out: &mut String) {
        let _ = writeln!(out, "\n--- {} ---", self.kind.title());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
}

/// A section whose extraction stopped on an accessor failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    /// Lines written before the failure.
    pub partial: TextSection,
    pub error: AccessError,
}

impl SectionFailure {
    /// Diagnostic line for this failure.
    pub fn diagnostic(&self) -> String {
        format!(
            "Could not retrieve {}. Error: {}",
            self.partial.kind.subject(),
            self.error
        )
    }

    /// The partial section with the diagnostic line appended.
    pub fn into_section(self) -> TextSection {
        let line = self.diagnostic();
        let mut section = self.partial;
        section.push(line);
        section
    }
}

/// Runs the extractor for `kind`.
///
/// [`SectionKind::Query`] has no standalone extractor; it is rendered from
/// a [`QueryResolution`] by [`query_section`], and asking for it here
/// fails without touching the model.
pub fn extract_section(
    kind: SectionKind,
    model: &dyn ReportModel,
) -> Result<TextSection, SectionFailure> {
    match kind {
        SectionKind::DataSource => extract_data_sources(model),
        SectionKind::Query => {
            warn!("Query section requested from extract_section");
            Err(SectionFailure {
                partial: TextSection::new(SectionKind::Query),
                error: AccessError::Engine(QUERY_NOT_EXTRACTABLE.to_string()),
            })
        }
        SectionKind::Parameters => extract_parameters(model),
        SectionKind::SelectionFormulas => extract_selection_formulas(model),
        SectionKind::Formulas => extract_formulas(model),
        SectionKind::Grouping => extract_grouping(model),
    }
}

fn run_extractor(
    kind: SectionKind,
    model: &dyn ReportModel,
    body: impl FnOnce(&dyn ReportModel, &mut TextSection) -> AccessResult<()>,
) -> Result<TextSection, SectionFailure> {
    let mut section = TextSection::new(kind);
    match isolate(|| body(model, &mut section)) {
        Ok(()) => {
            debug!(section = ?kind, lines = section.lines.len(), "Section extracted");
            Ok(section)
        }
        Err(error) => {
            warn!(section = ?kind, error = %error, "Section extraction failed");
            Err(SectionFailure {
                partial: section,
                error,
            })
        }
    }
}

fn push_connection(section: &mut TextSection, source: &DataSource) {
    let connection = &source.connection;
    section.push(format!("[Connection Type]: {}", connection.kind));
    section.push(format!("[Server Name]: {}", connection.server));
    section.push(format!("[Database Name]: {}", connection.database));
    if let Some(provider) = &connection.provider {
        section.push(format!("[Provider]: {provider}"));
    }
}

/// Connection facts of the first source, then every source name.
pub fn extract_data_sources(model: &dyn ReportModel) -> Result<TextSection, SectionFailure> {
    run_extractor(SectionKind::DataSource, model, |model, section| {
        let sources = model.data_sources()?;
        let Some(first) = sources.first() else {
            section.push(NO_TABLES);
            return Ok(());
        };

        push_connection(section, first);
        section.push("");
        section.push("[Sources Used (Tables, Views, or Stored Procedures)]:");
        for source in &sources {
            section.push(format!("- {}", source.name));
        }
        Ok(())
    })
}

/// One line per parameter in declaration order.
pub fn extract_parameters(model: &dyn ReportModel) -> Result<TextSection, SectionFailure> {
    run_extractor(SectionKind::Parameters, model, |model, section| {
        let parameters = model.parameters()?;
        if parameters.is_empty() {
            section.push(NO_PARAMETERS);
            return Ok(());
        }
        for parameter in parameters {
            section.push(format!(
                "Name: {}, Type: {}, Prompt: \"{}\"",
                parameter.name, parameter.value_type, parameter.prompt
            ));
        }
        Ok(())
    })
}

/// Record-level and group-level selection; always two lines.
pub fn extract_selection_formulas(
    model: &dyn ReportModel,
) -> Result<TextSection, SectionFailure> {
    run_extractor(SectionKind::SelectionFormulas, model, |model, section| {
        let record = model.record_selection_formula()?;
        section.push(format!("[Record Selection]: {record}"));
        let group = model.group_selection_formula()?;
        section.push(format!("[Group Selection]: {group}"));
        Ok(())
    })
}

pub fn extract_formulas(model: &dyn ReportModel) -> Result<TextSection, SectionFailure> {
    run_extractor(SectionKind::Formulas, model, |model, section| {
        let formulas = model.formulas()?;
        if formulas.is_empty() {
            section.push(NO_FORMULAS);
            return Ok(());
        }
        for formula in formulas {
            section.push("");
            section.push(format!("[Formula: {}]", formula.name));
            section.push(formula.text);
        }
        Ok(())
    })
}

/// Groups in ordinal order with the direction of the first sort spec on
/// the same field.
pub fn extract_grouping(model: &dyn ReportModel) -> Result<TextSection, SectionFailure> {
    run_extractor(SectionKind::Grouping, model, |model, section| {
        let mut groups = model.groups()?;
        if groups.is_empty() {
            section.push(NO_GROUPS);
            return Ok(());
        }
        groups.sort_by_key(|group| group.ordinal);

        let sort_specs = model.sort_specs()?;
        for (index, group) in groups.iter().enumerate() {
            let direction = sort_specs
                .iter()
                .find(|spec| spec.field == group.field)
                .map_or_else(|| UNKNOWN_SORT.to_string(), |spec| spec.direction.to_string());
            section.push(format!(
                "Group #{}: By Field [{}], Sort: {direction}",
                index + 1,
                group.field
            ));
        }
        Ok(())
    })
}

/// Renders the resolved query as the database & query section.
///
/// With [`DataSourceLayout::Folded`] the connection of the first source is
/// included and a linked-table result lists the tables here. With
/// [`DataSourceLayout::Separate`] both live in the data source section, so
/// only command text is shown. Connection lookup failures are reported
/// inline and never hide the query itself.
pub fn query_section(
    model: &dyn ReportModel,
    resolution: &QueryResolution,
    layout: DataSourceLayout,
) -> TextSection {
    let mut section = TextSection::new(SectionKind::Query);

    if layout == DataSourceLayout::Folded && has_sources(&resolution.result) {
        match isolate(|| model.data_sources()) {
            Ok(sources) => {
                if let Some(first) = sources.first() {
                    push_connection(&mut section, first);
                    section.push("");
                }
            }
            Err(error) => {
                warn!(error = %error, "Connection info unavailable");
                section.push(format!(
                    "Could not retrieve data source info. Error: {error}"
                ));
                section.push("");
            }
        }
    }

    match (&resolution.result, layout) {
        (QueryResult::CommandText(text), _) => {
            section.push("[Command Object]:");
            section.push(text.clone());
        }
        (QueryResult::LinkedTableList(names), DataSourceLayout::Folded) => {
            if names.is_empty() {
                section.push(NO_TABLES);
            } else {
                section.push("[Linked Tables]:");
                for name in names {
                    section.push(format!("- {name}"));
                }
            }
        }
        (QueryResult::LinkedTableList(_), DataSourceLayout::Separate) => {
            section.push("[Query]: No command object; linked tables are listed under DATA SOURCE.");
        }
        (QueryResult::Unavailable(reason), _) => {
            section.push(format!(
                "Could not retrieve {}. Reason: {reason}",
                SectionKind::Query.subject()
            ));
        }
    }

    section
}

/// Whether the resolution implies there is a first source to describe.
fn has_sources(result: &QueryResult) -> bool {
    match result {
        QueryResult::CommandText(_) => true,
        QueryResult::LinkedTableList(names) => !names.is_empty(),
        QueryResult::Unavailable(_) => false,
    }
}
