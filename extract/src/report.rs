//! Structured run reporting alongside the text document.

use serde::{Deserialize, Serialize};

use crate::config::DataSourceLayout;
use crate::resolver::{QueryOutcomeKind, QueryTier, TierAttempt, TierOutcome};
use crate::sections::{SectionFailure, SectionKind};

/// One attempted query tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAttemptReport {
    pub tier: QueryTier,
    pub outcome: TierOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&TierAttempt> for TierAttemptReport {
    fn from(attempt: &TierAttempt) -> Self {
        Self {
            tier: attempt.tier,
            outcome: attempt.outcome,
            detail: attempt.detail.clone(),
        }
    }
}

/// A section that was rendered with a diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailureReport {
    pub section: SectionKind,
    pub error: String,
}

impl From<&SectionFailure> for SectionFailureReport {
    fn from(failure: &SectionFailure) -> Self {
        Self {
            section: failure.partial.kind,
            error: failure.error.to_string(),
        }
    }
}

/// Per-run extraction report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub source_name: String,
    /// RFC 3339 generation timestamp.
    pub generated_at: String,
    pub layout: DataSourceLayout,
    pub query_outcome: QueryOutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<QueryTier>,
    pub tier_attempts: Vec<TierAttemptReport>,
    pub section_failures: Vec<SectionFailureReport>,
}

impl RunReport {
    /// Whether every section was extracted without a diagnostic.
    pub fn is_clean(&self) -> bool {
        self.section_failures.is_empty()
    }
}
