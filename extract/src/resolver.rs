//! Query resolution via an ordered fallback chain.
//!
//! The data-retrieval command of a report is not reliably exposed by the
//! public contract. Resolution tries the tiers below in order and
//! stops at the first one that yields non-blank text:
//!
//! 1. [`QueryTier::GeneratedQuery`]: the model's top-level generated query.
//! 2. [`QueryTier::InternalField`]: the typed command-text capability of the
//!    first internal data source.
//! 3. [`QueryTier::DynamicField`]: the same member probed by name, only when
//!    the typed access failed.
//! 4. [`QueryTier::SourceCommand`]: command text embedded in the first public
//!    data source, for command-based reports.
//! 5. [`QueryTier::TableEnumeration`]: the names of all data sources.
//!
//! No tier unwinds or returns an error past its own boundary; the outcome of
//! every attempted tier is kept in [`QueryResolution::attempts`].

use std::fmt;

use rptdoc_core::{AccessError, COMMAND_TEXT_PROPERTY, InternalSource, ReportModel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::isolate::isolate;

/// Reason reported when the model never reached the loaded state.
pub const NOT_LOADED: &str = "not loaded";

/// Final outcome of query resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Explicit command text recovered by one of the query tiers.
    CommandText(String),
    /// Names of the linked data sources; empty when the report has none.
    LinkedTableList(Vec<String>),
    /// Nothing could be recovered.
    Unavailable(String),
}

impl QueryResult {
    /// Short label used in run reports.
    pub fn kind(&self) -> QueryOutcomeKind {
        match self {
            Self::CommandText(_) => QueryOutcomeKind::CommandText,
            Self::LinkedTableList(_) => QueryOutcomeKind::LinkedTableList,
            Self::Unavailable(_) => QueryOutcomeKind::Unavailable,
        }
    }
}

/// Variant tag of a [`QueryResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcomeKind {
    CommandText,
    LinkedTableList,
    Unavailable,
}

/// One strategy of the fallback chain, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTier {
    GeneratedQuery,
    InternalField,
    DynamicField,
    SourceCommand,
    TableEnumeration,
}

impl fmt::Display for QueryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeneratedQuery => write!(f, "generated_query"),
            Self::InternalField => write!(f, "internal_field"),
            Self::DynamicField => write!(f, "dynamic_field"),
            Self::SourceCommand => write!(f, "source_command"),
            Self::TableEnumeration => write!(f, "table_enumeration"),
        }
    }
}

/// What a single tier produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierOutcome {
    /// The tier produced the final result.
    Yielded,
    /// The member was readable but blank or empty.
    Empty,
    /// The member or capability does not exist on this model.
    Absent,
    /// Reading the member raised an error or panicked.
    Failed,
}

/// Record of one attempted tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierAttempt {
    pub tier: QueryTier,
    pub outcome: TierOutcome,
    pub detail: Option<String>,
}

/// Query result together with the tiers that were tried to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResolution {
    pub result: QueryResult,
    pub attempts: Vec<TierAttempt>,
}

impl QueryResolution {
    /// Tier that produced the result, if any tier did.
    pub fn resolved_by(&self) -> Option<QueryTier> {
        self.attempts
            .iter()
            .find(|attempt| attempt.outcome == TierOutcome::Yielded)
            .map(|attempt| attempt.tier)
    }
}

/// Result of probing one text-producing tier.
enum Probe {
    Text(String),
    Empty,
    Absent(String),
    Failed(AccessError),
}

impl Probe {
    fn from_text(text: Option<String>, absent: &str) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => Self::Text(text),
            Some(_) => Self::Empty,
            None => Self::Absent(absent.to_string()),
        }
    }

    fn failed(&self) -> bool {
        matches!(self, Self::Absent(_) | Self::Failed(_))
    }
}

/// Records tier attempts and logs each one.
#[derive(Default)]
struct AttemptLog {
    attempts: Vec<TierAttempt>,
}

impl AttemptLog {
    fn push(&mut self, tier: QueryTier, outcome: TierOutcome, detail: Option<String>) {
        debug!(tier = %tier, outcome = ?outcome, detail = ?detail, "Query tier attempted");
        self.attempts.push(TierAttempt {
            tier,
            outcome,
            detail,
        });
    }

    /// Logs a text probe and returns the text when the tier yielded.
    fn record(&mut self, tier: QueryTier, probe: &Probe) -> Option<String> {
        match probe {
            Probe::Text(text) => {
                self.push(tier, TierOutcome::Yielded, None);
                Some(text.clone())
            }
            Probe::Empty => {
                self.push(tier, TierOutcome::Empty, None);
                None
            }
            Probe::Absent(reason) => {
                self.push(tier, TierOutcome::Absent, Some(reason.clone()));
                None
            }
            Probe::Failed(err) => {
                self.push(tier, TierOutcome::Failed, Some(err.to_string()));
                None
            }
        }
    }

    fn finish(self, result: QueryResult) -> QueryResolution {
        QueryResolution {
            result,
            attempts: self.attempts,
        }
    }
}

/// Resolves the report's data-retrieval query.
///
/// Never fails: the outcome is always one of the [`QueryResult`] variants.
pub fn resolve_query(model: &dyn ReportModel) -> QueryResolution {
    let mut log = AttemptLog::default();

    if !model.is_loaded() {
        debug!("Model not loaded; skipping query resolution");
        return log.finish(QueryResult::Unavailable(NOT_LOADED.to_string()));
    }

    let probe = probe_generated_query(model);
    if let Some(text) = log.record(QueryTier::GeneratedQuery, &probe) {
        return log.finish(QueryResult::CommandText(text));
    }

    if let Some(text) = probe_internal_sources(model, &mut log) {
        return log.finish(QueryResult::CommandText(text));
    }

    let probe = probe_source_command(model);
    if let Some(text) = log.record(QueryTier::SourceCommand, &probe) {
        return log.finish(QueryResult::CommandText(text));
    }

    let result = enumerate_tables(model, &mut log);
    log.finish(result)
}

fn probe_generated_query(model: &dyn ReportModel) -> Probe {
    match isolate(|| model.generated_query()) {
        Ok(text) => Probe::from_text(text, "no generated query exposed"),
        Err(err) => Probe::Failed(err),
    }
}

/// Tiers B and C share the internal container and its first element.
fn probe_internal_sources(model: &dyn ReportModel, log: &mut AttemptLog) -> Option<String> {
    let sources = match isolate(|| model.internal_sources()) {
        Ok(Some(sources)) => sources,
        Ok(None) => {
            log.push(
                QueryTier::InternalField,
                TierOutcome::Absent,
                Some("internal source container not present".to_string()),
            );
            return None;
        }
        Err(err) => {
            log.push(
                QueryTier::InternalField,
                TierOutcome::Failed,
                Some(err.to_string()),
            );
            return None;
        }
    };

    let Some(first) = sources.first().copied() else {
        log.push(
            QueryTier::InternalField,
            TierOutcome::Absent,
            Some("internal source container is empty".to_string()),
        );
        return None;
    };

    let typed = probe_typed_field(first);
    if let Some(text) = log.record(QueryTier::InternalField, &typed) {
        return Some(text);
    }
    if !typed.failed() {
        // Field was read and is blank: the source is table-based.
        return None;
    }

    let dynamic = probe_dynamic_field(first);
    log.record(QueryTier::DynamicField, &dynamic)
}

fn probe_typed_field(source: &dyn InternalSource) -> Probe {
    let Some(capability) = source.command_capability() else {
        return Probe::Absent("typed command shape not exposed".to_string());
    };
    match isolate(|| capability.command_text()) {
        // Unset counts as blank.
        Ok(text) => Probe::from_text(Some(text.unwrap_or_default()), ""),
        Err(err) => Probe::Failed(err),
    }
}

fn probe_dynamic_field(source: &dyn InternalSource) -> Probe {
    match isolate(|| source.property(COMMAND_TEXT_PROPERTY)) {
        Ok(Some(Value::String(text))) => Probe::from_text(Some(text), ""),
        Ok(Some(Value::Null)) | Ok(None) => {
            Probe::Absent(format!("no {COMMAND_TEXT_PROPERTY} member"))
        }
        Ok(Some(other)) => Probe::Absent(format!(
            "{COMMAND_TEXT_PROPERTY} member is {}, not text",
            value_kind(&other)
        )),
        Err(err) => Probe::Failed(err),
    }
}

/// Command text carried by the first public data source.
fn probe_source_command(model: &dyn ReportModel) -> Probe {
    match isolate(|| model.data_sources()) {
        Ok(sources) => match sources.into_iter().next() {
            Some(source) if source.is_command() => {
                Probe::Text(source.command_text.unwrap_or_default())
            }
            Some(source) => {
                Probe::from_text(source.command_text, "first data source is table-based")
            }
            None => Probe::Absent("no data sources".to_string()),
        },
        Err(err) => Probe::Failed(err),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn enumerate_tables(model: &dyn ReportModel, log: &mut AttemptLog) -> QueryResult {
    match isolate(|| model.data_sources()) {
        Ok(sources) => {
            let names: Vec<String> = sources.into_iter().map(|source| source.name).collect();
            let outcome = if names.is_empty() {
                TierOutcome::Empty
            } else {
                TierOutcome::Yielded
            };
            log.push(QueryTier::TableEnumeration, outcome, None);
            QueryResult::LinkedTableList(names)
        }
        Err(err) => {
            let reason = err.to_string();
            log.push(
                QueryTier::TableEnumeration,
                TierOutcome::Failed,
                Some(reason.clone()),
            );
            QueryResult::Unavailable(reason)
        }
    }
}
