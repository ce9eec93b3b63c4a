//! Suite orchestration.
//!
//! [`SuiteRunner`] dispatches a suite's specs through a bounded worker
//! pool, evaluates their assertions, and aggregates everything into a
//! [`SuiteReport`] whose entry order always matches suite insertion
//! order, independent of completion order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pactum_domain::{
    RequestSpec, RetryPolicy, SpecResult, SpecState, Suite, SuiteReport,
};

use crate::assertions::AssertionEngine;
use crate::error::{ExecutorError, RunnerError};
use crate::executor::HttpExecutor;
use crate::ports::{Clock, Transport};

/// Runs suites of request specs against a transport.
pub struct SuiteRunner<T: Transport + 'static, C: Clock> {
    executor: Arc<HttpExecutor<T>>,
    engine: AssertionEngine,
    policy: RetryPolicy,
    clock: C,
}

impl<T: Transport + 'static, C: Clock> SuiteRunner<T, C> {
    /// Creates a runner with the default retry policy.
    #[must_use]
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            executor: Arc::new(HttpExecutor::new(transport)),
            engine: AssertionEngine::new(),
            policy: RetryPolicy::default(),
            clock,
        }
    }

    /// Sets the retry policy applied to every spec (builder pattern).
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs every spec in the suite, up to `concurrency` at a time.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::InvalidSuite`] for blank or duplicate spec
    /// ids and [`RunnerError::ZeroConcurrency`] when `concurrency == 0`.
    pub async fn run(&self, suite: &Suite, concurrency: usize) -> Result<SuiteReport, RunnerError> {
        self.run_cancellable(suite, concurrency, CancellationToken::new())
            .await
    }

    /// Runs a suite with cooperative cancellation.
    ///
    /// When `cancel` fires, in-flight specs finish their current attempt
    /// and specs that have not started are marked skipped. Skipped specs
    /// are listed in the report but excluded from pass/fail counts.
    ///
    /// # Errors
    ///
    /// Same as [`SuiteRunner::run`].
    pub async fn run_cancellable(
        &self,
        suite: &Suite,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> Result<SuiteReport, RunnerError> {
        suite.validate()?;
        if concurrency == 0 {
            return Err(RunnerError::ZeroConcurrency);
        }

        let started_at = self.clock.now();
        info!(suite = %suite.name, specs = suite.len(), concurrency, "suite run started");

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut workers: JoinSet<(usize, SpecResult)> = JoinSet::new();

        for (index, spec) in suite.specs.iter().cloned().enumerate() {
            let executor = Arc::clone(&self.executor);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let engine = self.engine;
            let policy = self.policy.clone();

            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (index, SpecResult::skipped(spec.id));
                };
                if cancel.is_cancelled() {
                    debug!(spec_id = %spec.id, "skipped: run cancelled before start");
                    return (index, SpecResult::skipped(spec.id));
                }
                let result = run_spec(&executor, &engine, &spec, &policy, &cancel).await;
                (index, result)
            });
        }

        // Each worker owns exactly one pre-allocated slot, so collection
        // order does not matter.
        let mut slots: Vec<Option<SpecResult>> = vec![None; suite.len()];
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(error = %e, "suite worker task failed"),
            }
        }

        let results: Vec<SpecResult> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    SpecResult::errored(suite.specs[index].id.clone(), "worker task failed")
                })
            })
            .collect();

        let report = SuiteReport::seal(suite.name.clone(), results, started_at, self.clock.now());
        info!(
            suite = %report.suite_name,
            passed = report.pass_count,
            failed = report.fail_count,
            errored = report.error_count,
            skipped = report.skip_count,
            "suite run finished"
        );
        Ok(report)
    }
}

/// Runs one spec to its terminal state: Passed, Failed, or Errored.
async fn run_spec<T: Transport>(
    executor: &HttpExecutor<T>,
    engine: &AssertionEngine,
    spec: &RequestSpec,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> SpecResult {
    match executor.execute_cancellable(spec, policy, cancel).await {
        Ok(outcome) => {
            let retries_used = outcome.attempt.saturating_sub(1);

            if let Some(kind) = outcome.transport_error {
                debug!(spec_id = %spec.id, ?kind, "spec errored: no outcome obtained");
                return SpecResult {
                    spec_id: spec.id.clone(),
                    state: SpecState::Errored,
                    error: Some(format!("transport failure: {kind:?}")),
                    outcome: Some(outcome),
                    assertions: Vec::new(),
                    retries_used,
                };
            }

            let assertions = engine.evaluate(spec, &outcome);
            let state = if assertions.iter().all(|r| r.passed) {
                SpecState::Passed
            } else {
                SpecState::Failed
            };
            debug!(spec_id = %spec.id, ?state, retries_used, "spec finished");

            SpecResult {
                spec_id: spec.id.clone(),
                state,
                outcome: Some(outcome),
                assertions,
                retries_used,
                error: None,
            }
        }
        Err(ExecutorError::Configuration(e)) => {
            warn!(spec_id = %spec.id, error = %e, "spec errored: configuration");
            SpecResult::errored(spec.id.clone(), e.to_string())
        }
    }
}
