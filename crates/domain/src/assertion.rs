//! Declarative response assertions.
//!
//! This module defines the assertion vocabulary a spec can attach to a
//! request and the per-assertion result type produced when a suite runs.

use serde::{Deserialize, Serialize};

/// A declarative check to run against an executed request's outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    /// Response status code equals the expected code exactly.
    StatusEquals {
        /// Expected status code.
        expected: u16,
    },
    /// Response status code falls within an inclusive range.
    StatusInRange {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// A header is present (case-insensitive name match).
    HeaderPresent {
        /// Header name.
        name: String,
    },
    /// The response body is a JSON array.
    BodyIsArray,
    /// A property exists at the given path, optionally with an exact value.
    BodyHasProperty {
        /// Dotted/indexed path, e.g. `user.id` or `items[0].name`.
        path: String,
        /// Expected value (deep structural equality when given).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected: Option<serde_json::Value>,
    },
    /// Every key in the mapping exists in the body with an equal value.
    ///
    /// Extra keys in the body are ignored (subset semantics).
    BodyMatchesSubset {
        /// Required key/value pairs.
        expected: serde_json::Map<String, serde_json::Value>,
    },
    /// Every element of a JSON array body satisfies a property predicate.
    ArrayElementsSatisfy {
        /// Path into each element, e.g. `userId`.
        path: String,
        /// Comparison operator applied per element.
        operator: ComparisonOperator,
        /// Value to compare against.
        value: serde_json::Value,
    },
    /// The raw body text matches a regex pattern.
    BodyMatches {
        /// Regex pattern.
        pattern: String,
    },
}

impl Assertion {
    /// Get a human-readable description of this assertion.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusEquals { expected } => format!("Status code = {expected}"),
            Self::StatusInRange { min, max } => format!("Status code in {min}-{max}"),
            Self::HeaderPresent { name } => format!("Header '{name}' present"),
            Self::BodyIsArray => "Body is a JSON array".to_string(),
            Self::BodyHasProperty {
                path,
                expected: Some(v),
            } => format!("Body property '{path}' equals {v}"),
            Self::BodyHasProperty {
                path,
                expected: None,
            } => format!("Body property '{path}' exists"),
            Self::BodyMatchesSubset { expected } => {
                let keys: Vec<_> = expected.keys().map(String::as_str).collect();
                format!("Body contains fields [{}]", keys.join(", "))
            }
            Self::ArrayElementsSatisfy {
                path,
                operator,
                value,
            } => format!("Every element: '{path}' {} {value}", operator.symbol()),
            Self::BodyMatches { pattern } => format!("Body matches /{pattern}/"),
        }
    }
}

/// Comparison operators for element predicates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal to.
    LessThanOrEqual,
}

impl ComparisonOperator {
    /// Get the symbol for this operator.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
        }
    }
}

/// Result of running a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// The assertion that was run.
    pub assertion: Assertion,
    /// Whether the assertion passed.
    pub passed: bool,
    /// Actual value found (for display).
    pub actual: Option<String>,
    /// Mismatch description when failed.
    pub detail: Option<String>,
}

impl AssertionResult {
    /// Create a passed result.
    #[must_use]
    pub fn pass(assertion: Assertion) -> Self {
        Self {
            assertion,
            passed: true,
            actual: None,
            detail: None,
        }
    }

    /// Create a passed result with actual value.
    #[must_use]
    pub fn pass_with_value(assertion: Assertion, actual: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: true,
            actual: Some(actual.into()),
            detail: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(assertion: Assertion, detail: impl Into<String>) -> Self {
        Self {
            assertion,
            passed: false,
            actual: None,
            detail: Some(detail.into()),
        }
    }

    /// Create a failed result with actual value.
    #[must_use]
    pub fn fail_with_value(
        assertion: Assertion,
        actual: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            assertion,
            passed: false,
            actual: Some(actual.into()),
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_description() {
        let assertion = Assertion::StatusEquals { expected: 404 };
        assert_eq!(assertion.description(), "Status code = 404");

        let assertion = Assertion::BodyHasProperty {
            path: "id".to_string(),
            expected: Some(serde_json::json!(1)),
        };
        assert_eq!(assertion.description(), "Body property 'id' equals 1");

        let assertion = Assertion::ArrayElementsSatisfy {
            path: "userId".to_string(),
            operator: ComparisonOperator::Equals,
            value: serde_json::json!(1),
        };
        assert_eq!(assertion.description(), "Every element: 'userId' == 1");
    }

    #[test]
    fn test_assertion_serde_tagging() {
        let assertion = Assertion::HeaderPresent {
            name: "x-total-count".to_string(),
        };
        let json = serde_json::to_value(&assertion).expect("serializes");
        assert_eq!(json["type"], "header_present");
        assert_eq!(json["name"], "x-total-count");
    }

    #[test]
    fn test_result_constructors() {
        let passed = AssertionResult::pass(Assertion::BodyIsArray);
        assert!(passed.passed);
        assert!(passed.detail.is_none());

        let failed = AssertionResult::fail_with_value(
            Assertion::StatusEquals { expected: 200 },
            "404",
            "Expected status 200, got 404",
        );
        assert!(!failed.passed);
        assert_eq!(failed.actual.as_deref(), Some("404"));
    }
}
