//! Suite report types.
//!
//! A [`SuiteReport`] is built once per run and sealed when every spec has
//! reached a terminal state or the run was cancelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assertion::AssertionResult;
use crate::outcome::Outcome;

/// Terminal state of a single spec within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecState {
    /// Every assertion passed (and the outcome carried no transport error).
    Passed,
    /// An outcome was obtained but one or more assertions failed.
    Failed,
    /// No outcome could be obtained: transport failure after retries were
    /// exhausted, or a spec-local configuration error.
    Errored,
    /// Never started because the run was cancelled first.
    Skipped,
}

impl SpecState {
    /// True for states counted in pass/fail accounting.
    #[must_use]
    pub const fn is_terminal_result(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// One spec's entry in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecResult {
    /// Id of the spec this entry belongs to.
    pub spec_id: String,
    /// Terminal state.
    pub state: SpecState,
    /// Final outcome, absent for skipped and configuration-errored specs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Per-assertion results, empty when no outcome was evaluated.
    #[serde(default)]
    pub assertions: Vec<AssertionResult>,
    /// Retries used beyond the first attempt.
    pub retries_used: u32,
    /// Error description for errored specs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpecResult {
    /// Entry for a spec that was never started.
    #[must_use]
    pub fn skipped(spec_id: impl Into<String>) -> Self {
        Self {
            spec_id: spec_id.into(),
            state: SpecState::Skipped,
            outcome: None,
            assertions: Vec::new(),
            retries_used: 0,
            error: None,
        }
    }

    /// Entry for a spec that failed before any attempt could run.
    #[must_use]
    pub fn errored(spec_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            spec_id: spec_id.into(),
            state: SpecState::Errored,
            outcome: None,
            assertions: Vec::new(),
            retries_used: 0,
            error: Some(error.into()),
        }
    }
}

/// Aggregated results of one suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Name of the suite that ran.
    pub suite_name: String,
    /// Entries in suite insertion order, one per spec.
    pub results: Vec<SpecResult>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished or was cancelled.
    pub finished_at: DateTime<Utc>,
    /// Number of passed specs.
    pub pass_count: usize,
    /// Number of failed specs.
    pub fail_count: usize,
    /// Number of errored specs.
    pub error_count: usize,
    /// Number of skipped specs (excluded from pass/fail accounting).
    pub skip_count: usize,
}

impl SuiteReport {
    /// Seals a report from completed results, computing the counts.
    #[must_use]
    pub fn seal(
        suite_name: impl Into<String>,
        results: Vec<SpecResult>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let count = |state: SpecState| results.iter().filter(|r| r.state == state).count();
        let pass_count = count(SpecState::Passed);
        let fail_count = count(SpecState::Failed);
        let error_count = count(SpecState::Errored);
        let skip_count = count(SpecState::Skipped);

        Self {
            run_id: Uuid::now_v7(),
            suite_name: suite_name.into(),
            results,
            started_at,
            finished_at,
            pass_count,
            fail_count,
            error_count,
            skip_count,
        }
    }

    /// True when no spec failed or errored (skipped specs do not count).
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.fail_count == 0 && self.error_count == 0
    }

    /// Looks up a spec's entry by id.
    #[must_use]
    pub fn result_for(&self, spec_id: &str) -> Option<&SpecResult> {
        self.results.iter().find(|r| r.spec_id == spec_id)
    }
}
