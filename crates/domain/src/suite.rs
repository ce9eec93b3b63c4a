//! Suite definition.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::spec::RequestSpec;

/// An ordered collection of request specs run together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    /// Suite name, used in the report.
    pub name: String,
    /// Specs in execution/report order.
    #[serde(default)]
    pub specs: Vec<RequestSpec>,
}

impl Suite {
    /// Creates a new empty suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specs: Vec::new(),
        }
    }

    /// Adds a spec (builder pattern).
    #[must_use]
    pub fn with_spec(mut self, spec: RequestSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Adds a spec.
    pub fn add(&mut self, spec: RequestSpec) {
        self.specs.push(spec);
    }

    /// Number of specs in the suite.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true when the suite holds no specs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Validates suite-level invariants: each spec is valid and ids are
    /// unique within the suite.
    ///
    /// # Errors
    ///
    /// Returns the first [`DomainError`] found.
    pub fn validate(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for spec in &self.specs {
            spec.validate()?;
            if !seen.insert(spec.id.as_str()) {
                return Err(DomainError::DuplicateSpecId(spec.id.clone()));
            }
        }
        Ok(())
    }
}
