//! Report pipeline: load one model, walk it, and produce the document.
//!
//! A run moves through [`RunState`]:
//!
//! ```text
//! Idle -> Loading -> Loaded -> Extracting -> Done
//!                 \-> LoadFailed -> Aborted
//! ```
//!
//! Load failures are terminal for the run and produce no document. Failures
//! inside extraction never are; they surface as diagnostic lines.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rptdoc_core::{LoadError, ReportLoader, ReportModel};
use tracing::{debug, info, warn};

use crate::config::{DataSourceLayout, DocumenterConfig};
use crate::output::{assemble, format_timestamp, render_header};
use crate::report::{RunReport, SectionFailureReport, TierAttemptReport};
use crate::resolver::resolve_query;
use crate::sections::{
    SectionFailure, SectionKind, TextSection, extract_section, query_section,
};

/// Fatal failure of a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input artifact does not exist.
    #[error("input file not found at '{}'", .0.display())]
    InputNotFound(PathBuf),

    /// The loader could not produce a model.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The loader returned a model that never reached the loaded state.
    #[error("report '{}' did not finish loading", .0.display())]
    NotLoaded(PathBuf),
}

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Loading,
    Loaded,
    Extracting,
    Done,
    LoadFailed,
    Aborted,
}

/// Owns a loaded model and closes it exactly once when dropped.
pub struct ModelHandle<M: ReportModel> {
    model: M,
}

impl<M: ReportModel> ModelHandle<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: ReportModel> Deref for ModelHandle<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M: ReportModel> Drop for ModelHandle<M> {
    fn drop(&mut self) {
        debug!("Releasing report model");
        self.model.close();
    }
}

/// Generated document and its run report.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub source_name: String,
    pub generated_at: DateTime<Local>,
    pub report: RunReport,
}

/// Walks an already loaded model into a [`Document`].
///
/// Never fails: accessor failures become diagnostic lines in the affected
/// section and are listed in [`RunReport::section_failures`].
pub fn document_model(
    model: &dyn ReportModel,
    source_name: &str,
    generated_at: DateTime<Local>,
    config: &DocumenterConfig,
) -> Document {
    let header = render_header(
        source_name,
        &format_timestamp(&generated_at, &config.timestamp_format),
    );

    let mut sections: Vec<TextSection> = Vec::new();
    let mut failures: Vec<SectionFailureReport> = Vec::new();
    let mut collect = |result: Result<TextSection, SectionFailure>| match result {
        Ok(section) => sections.push(section),
        Err(failure) => {
            failures.push(SectionFailureReport::from(&failure));
            sections.push(failure.into_section());
        }
    };

    if config.layout == DataSourceLayout::Separate {
        collect(extract_section(SectionKind::DataSource, model));
    }

    let resolution = resolve_query(model);
    collect(Ok(query_section(model, &resolution, config.layout)));

    for kind in SectionKind::TRAILING {
        collect(extract_section(kind, model));
    }

    let report = RunReport {
        source_name: source_name.to_string(),
        generated_at: generated_at.to_rfc3339(),
        layout: config.layout,
        query_outcome: resolution.result.kind(),
        resolved_by: resolution.resolved_by(),
        tier_attempts: resolution
            .attempts
            .iter()
            .map(TierAttemptReport::from)
            .collect(),
        section_failures: failures,
    };

    Document {
        text: assemble(&header, &sections),
        source_name: source_name.to_string(),
        generated_at,
        report,
    }
}

/// Sequences loading and extraction for one report at a time.
///
/// # Examples
///
/// ```no_run
/// use rptdoc_extract::{DocumenterConfig, ReportPipeline};
/// # use rptdoc_core::ReportLoader;
/// # fn run<L: ReportLoader>(loader: L) -> Result<(), Box<dyn std::error::Error>> {
/// let mut pipeline = ReportPipeline::new(loader, DocumenterConfig::default());
/// let document = pipeline.run("orders.rpt")?;
/// std::fs::write("orders.txt", &document.text)?;
/// # Ok(())
/// # }
/// ```
pub struct ReportPipeline<L: ReportLoader> {
    loader: L,
    config: DocumenterConfig,
    state: RunState,
}

impl<L: ReportLoader> ReportPipeline<L> {
    pub fn new(loader: L, config: DocumenterConfig) -> Self {
        Self {
            loader,
            config,
            state: RunState::Idle,
        }
    }

    pub fn config(&self) -> &DocumenterConfig {
        &self.config
    }

    /// State reached by the most recent run.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the pipeline, stamping the document with the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when the input is missing or the model cannot
    /// be loaded. No document is produced in that case.
    pub fn run(&mut self, path: impl AsRef<Path>) -> Result<Document, PipelineError> {
        self.run_at(path, Local::now())
    }

    /// Runs the pipeline with an explicit generation timestamp.
    pub fn run_at(
        &mut self,
        path: impl AsRef<Path>,
        generated_at: DateTime<Local>,
    ) -> Result<Document, PipelineError> {
        let path = path.as_ref();
        self.state = RunState::Idle;

        if !path.exists() {
            warn!(path = %path.display(), "Input file not found");
            self.transition(RunState::Aborted);
            return Err(PipelineError::InputNotFound(path.to_path_buf()));
        }

        self.transition(RunState::Loading);
        let model = match self.loader.load(path) {
            Ok(model) => ModelHandle::new(model),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Report failed to load");
                self.abort_load();
                return Err(err.into());
            }
        };

        if !model.is_loaded() {
            warn!(path = %path.display(), "Report did not reach the loaded state");
            self.abort_load();
            return Err(PipelineError::NotLoaded(path.to_path_buf()));
        }
        self.transition(RunState::Loaded);

        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.transition(RunState::Extracting);
        let document = document_model(&*model, &source_name, generated_at, &self.config);
        self.transition(RunState::Done);

        info!(
            source = %source_name,
            query = ?document.report.query_outcome,
            section_failures = document.report.section_failures.len(),
            "Report documented"
        );
        Ok(document)
    }

    fn abort_load(&mut self) {
        self.transition(RunState::LoadFailed);
        self.transition(RunState::Aborted);
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Pipeline state change");
        self.state = next;
    }
}
