//! Spec execution with timeout and retry.
//!
//! [`HttpExecutor`] turns a [`RequestSpec`] into transport calls: it
//! resolves the URL template, bounds every attempt with the policy's
//! timeout, retries transport failures and retryable statuses with
//! exponential backoff, and returns the outcome of the last attempt.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pactum_domain::{
    Headers, Outcome, OutcomeBody, RequestSpec, RetryPolicy, TransportErrorKind,
};

use crate::error::ExecutorError;
use crate::ports::{Transport, TransportRequest, TransportResponse};
use crate::template::resolve_url;

/// Executes request specs through an injected transport.
pub struct HttpExecutor<T: Transport> {
    transport: T,
}

/// What the retry loop decided about one attempt.
enum Attempt {
    Done(Outcome),
    Retry(Outcome),
}

impl<T: Transport> HttpExecutor<T> {
    /// Creates an executor over the given transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Executes a spec to completion under the given policy.
    ///
    /// A transport failure after retries are exhausted is still an
    /// `Ok` outcome carrying the failure kind; only configuration
    /// problems (unresolved placeholder, invalid URL) are errors.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Configuration`] when the spec cannot be
    /// turned into a request.
    pub async fn execute(
        &self,
        spec: &RequestSpec,
        policy: &RetryPolicy,
    ) -> Result<Outcome, ExecutorError> {
        self.execute_cancellable(spec, policy, &CancellationToken::new())
            .await
    }

    /// Executes a spec, stopping between attempts if `cancel` fires.
    ///
    /// Cancellation is cooperative: an in-flight attempt always runs to
    /// completion, but no further attempt is started afterwards and a
    /// backoff in progress is cut short.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Configuration`] when the spec cannot be
    /// turned into a request.
    pub async fn execute_cancellable(
        &self,
        spec: &RequestSpec,
        policy: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Outcome, ExecutorError> {
        spec.validate().map_err(ExecutorError::Configuration)?;
        let url = resolve_url(spec)?;

        let request = TransportRequest {
            method: spec.method,
            url,
            headers: Vec::new(),
            body: spec.body.clone(),
        };

        let mut attempt: u32 = 1;
        loop {
            let outcome = match self.run_attempt(request.clone(), policy, attempt).await {
                Attempt::Done(outcome) => return Ok(outcome),
                Attempt::Retry(outcome) => outcome,
            };

            if !policy.allows_another_attempt(attempt) || cancel.is_cancelled() {
                return Ok(outcome);
            }

            let delay = policy.delay_after_attempt(attempt);
            warn!(
                spec_id = %spec.id,
                attempt,
                status = ?outcome.status,
                transport_error = ?outcome.transport_error,
                backoff_ms = delay.as_millis() as u64,
                "attempt failed, retrying"
            );
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel.cancelled() => return Ok(outcome),
            }
            attempt += 1;
        }
    }

    /// Runs a single bounded attempt and classifies its result.
    async fn run_attempt(
        &self,
        request: TransportRequest,
        policy: &RetryPolicy,
        attempt: u32,
    ) -> Attempt {
        let started = Instant::now();
        let sent = tokio::time::timeout(policy.timeout(), self.transport.send(request)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match sent {
            Ok(Ok(response)) => {
                let status = response.status;
                let outcome = build_outcome(response, attempt, elapsed_ms);
                if policy.is_retryable_status(status) {
                    Attempt::Retry(outcome)
                } else {
                    debug!(attempt, status, elapsed_ms, "attempt completed");
                    Attempt::Done(outcome)
                }
            }
            Ok(Err(failure)) => {
                let outcome =
                    Outcome::from_transport_error(failure.kind, attempt, elapsed_ms);
                if failure.kind.is_retryable() {
                    Attempt::Retry(outcome)
                } else {
                    debug!(attempt, kind = ?failure.kind, "non-retryable transport failure");
                    Attempt::Done(outcome)
                }
            }
            Err(_elapsed) => Attempt::Retry(Outcome::from_transport_error(
                TransportErrorKind::Timeout,
                attempt,
                elapsed_ms,
            )),
        }
    }
}

fn build_outcome(response: TransportResponse, attempt: u32, elapsed_ms: u64) -> Outcome {
    let headers: Headers = response.headers.into_iter().collect();
    let body = OutcomeBody::from_bytes(&response.body);
    Outcome::from_response(response.status, headers, body, attempt, elapsed_ms)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use pactum_domain::HttpMethod;

    use crate::ports::TransportFailure;

    /// Pops scripted results in order; repeats the last one when drained.
    struct ScriptedTransport {
        script: Mutex<Vec<Result<TransportResponse, TransportFailure>>>,
        delay: Option<Duration>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<TransportResponse, TransportFailure>>) -> Self {
            Self {
                script: Mutex::new(script),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            _request: TransportRequest,
        ) -> Result<TransportResponse, TransportFailure> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            }
        }
    }

    fn ok_response(status: u16) -> Result<TransportResponse, TransportFailure> {
        Ok(TransportResponse {
            status,
            headers: Vec::new(),
            body: b"{}".to_vec(),
        })
    }

    fn spec(url: &str) -> RequestSpec {
        RequestSpec::new("spec", HttpMethod::Get, url)
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default().with_base_delay_ms(0)
    }

    #[tokio::test]
    async fn non_retryable_status_returns_first_outcome() {
        let executor = HttpExecutor::new(ScriptedTransport::new(vec![ok_response(404)]));
        let outcome = executor
            .execute(&spec("https://api.test/x"), &fast_policy())
            .await
            .unwrap();
        assert_eq!(outcome.status, Some(404));
        assert_eq!(outcome.attempt, 1);
    }

    #[tokio::test]
    async fn retryable_status_consumes_attempts() {
        let executor = HttpExecutor::new(ScriptedTransport::new(vec![
            ok_response(503),
            ok_response(503),
            ok_response(200),
        ]));
        let outcome = executor
            .execute(&spec("https://api.test/x"), &fast_policy())
            .await
            .unwrap();
        assert_eq!(outcome.status, Some(200));
        assert_eq!(outcome.attempt, 3);
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_outcome() {
        let executor = HttpExecutor::new(ScriptedTransport::new(vec![ok_response(503)]));
        let outcome = executor
            .execute(&spec("https://api.test/x"), &fast_policy())
            .await
            .unwrap();
        assert_eq!(outcome.status, Some(503));
        assert_eq!(outcome.attempt, 3);
        assert!(outcome.transport_error.is_none());
    }

    #[tokio::test]
    async fn non_retryable_transport_failure_is_not_retried() {
        let executor = HttpExecutor::new(ScriptedTransport::new(vec![Err(
            TransportFailure::new(TransportErrorKind::DnsFailure, "no such host"),
        )]));
        let outcome = executor
            .execute(&spec("https://api.test/x"), &fast_policy())
            .await
            .unwrap();
        assert_eq!(outcome.transport_error, Some(TransportErrorKind::DnsFailure));
        assert_eq!(outcome.attempt, 1);
    }

    #[tokio::test]
    async fn slow_attempts_hit_the_per_attempt_timeout() {
        let transport = ScriptedTransport::new(vec![ok_response(200)])
            .with_delay(Duration::from_millis(50));
        let executor = HttpExecutor::new(transport);
        let policy = fast_policy().with_timeout_ms(5).with_max_attempts(2);

        let outcome = executor
            .execute(&spec("https://api.test/slow"), &policy)
            .await
            .unwrap();
        assert_eq!(outcome.transport_error, Some(TransportErrorKind::Timeout));
        assert_eq!(outcome.attempt, 2);
    }

    #[tokio::test]
    async fn cancellation_stops_further_attempts() {
        let executor = HttpExecutor::new(ScriptedTransport::new(vec![Err(
            TransportFailure::new(TransportErrorKind::ConnectionFailed, "reset"),
        )]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = executor
            .execute_cancellable(&spec("https://api.test/x"), &fast_policy(), &cancel)
            .await
            .unwrap();
        // first attempt ran to completion, no retry was started
        assert_eq!(outcome.attempt, 1);
    }

    #[tokio::test]
    async fn cancellation_cuts_backoff_short() {
        let executor = HttpExecutor::new(ScriptedTransport::new(vec![ok_response(503)]));
        let policy = RetryPolicy::default().with_base_delay_ms(5000);
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        // cancelling during the 5 s backoff must return well before it elapses
        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            executor.execute_cancellable(&spec("https://api.test/x"), &policy, &cancel),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(outcome.status, Some(503));
        assert_eq!(outcome.attempt, 1);
    }

    #[tokio::test]
    async fn unresolved_placeholder_is_a_configuration_error() {
        let executor = HttpExecutor::new(ScriptedTransport::new(vec![ok_response(200)]));
        let result = executor
            .execute(&spec("https://api.test/{{id}}"), &fast_policy())
            .await;
        assert!(matches!(result, Err(ExecutorError::Configuration(_))));
    }
}
