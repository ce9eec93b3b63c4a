//! Request spec model.
//!
//! A [`RequestSpec`] declares one HTTP call plus the assertions to run on
//! its result. Specs are defined before a run and read-only during it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assertion::Assertion;
use crate::error::{DomainError, DomainResult};
use crate::method::HttpMethod;

/// One declared HTTP call and its expected-behavior assertions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Identifier, unique within a suite.
    pub id: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// URL template with `{{name}}` placeholders.
    pub url_template: String,
    /// Parameters used to fill placeholders; unconsumed entries become
    /// query-string pairs.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Optional JSON request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Assertions to evaluate against the outcome, in order.
    #[serde(default)]
    pub expectations: Vec<Assertion>,
}

impl RequestSpec {
    /// Creates a new spec with no parameters, body, or expectations.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        method: HttpMethod,
        url_template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            method,
            url_template: url_template.into(),
            params: BTreeMap::new(),
            body: None,
            expectations: Vec::new(),
        }
    }

    /// Adds a parameter (builder pattern).
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the JSON body (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds an assertion (builder pattern).
    #[must_use]
    pub fn expect(mut self, assertion: Assertion) -> Self {
        self.expectations.push(assertion);
        self
    }

    /// Validates spec-local invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptySpecId`] when the id is blank.
    pub fn validate(&self) -> DomainResult<()> {
        if self.id.trim().is_empty() {
            return Err(DomainError::EmptySpecId);
        }
        Ok(())
    }
}
