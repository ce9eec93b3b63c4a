//! Assertion evaluation against executed-spec outcomes.
//!
//! Every assertion in a spec is evaluated independently: one failure
//! never short-circuits the rest, so a report carries every mismatch
//! rather than just the first.

use regex::Regex;
use serde_json::Value;

use pactum_domain::{
    Assertion, AssertionResult, ComparisonOperator, Outcome, RequestSpec,
};

/// Evaluates a spec's declarative assertions against an outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertionEngine;

impl AssertionEngine {
    /// Creates a new engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates every assertion in `spec.expectations` against the
    /// outcome, in order. Pure and idempotent.
    #[must_use]
    pub fn evaluate(&self, spec: &RequestSpec, outcome: &Outcome) -> Vec<AssertionResult> {
        spec.expectations
            .iter()
            .map(|assertion| self.evaluate_one(assertion, outcome))
            .collect()
    }

    /// Evaluates a single assertion against an outcome.
    #[must_use]
    pub fn evaluate_one(&self, assertion: &Assertion, outcome: &Outcome) -> AssertionResult {
        match assertion {
            Assertion::StatusEquals { expected } => {
                check_status(assertion, outcome, |status| status == *expected, || {
                    format!("Expected status {expected}")
                })
            }
            Assertion::StatusInRange { min, max } => check_status(
                assertion,
                outcome,
                |status| status >= *min && status <= *max,
                || format!("Expected status in {min}-{max}"),
            ),
            Assertion::HeaderPresent { name } => check_header_present(assertion, outcome, name),
            Assertion::BodyIsArray => check_body_is_array(assertion, outcome),
            Assertion::BodyHasProperty { path, expected } => {
                check_body_property(assertion, outcome, path, expected.as_ref())
            }
            Assertion::BodyMatchesSubset { expected } => {
                check_body_subset(assertion, outcome, expected)
            }
            Assertion::ArrayElementsSatisfy {
                path,
                operator,
                value,
            } => check_array_elements(assertion, outcome, path, *operator, value),
            Assertion::BodyMatches { pattern } => check_body_matches(assertion, outcome, pattern),
        }
    }
}

fn check_status(
    assertion: &Assertion,
    outcome: &Outcome,
    matches: impl Fn(u16) -> bool,
    expectation: impl Fn() -> String,
) -> AssertionResult {
    if let Some(kind) = outcome.transport_error {
        return AssertionResult::fail(
            assertion.clone(),
            format!("No status to compare: transport failed ({kind:?})"),
        );
    }
    match outcome.status {
        Some(status) if matches(status) => {
            AssertionResult::pass_with_value(assertion.clone(), status.to_string())
        }
        Some(status) => AssertionResult::fail_with_value(
            assertion.clone(),
            status.to_string(),
            format!("{}, got {status}", expectation()),
        ),
        None => AssertionResult::fail(assertion.clone(), "No status code in outcome".to_string()),
    }
}

fn check_header_present(assertion: &Assertion, outcome: &Outcome, name: &str) -> AssertionResult {
    match outcome.headers.get(name) {
        Some(value) => AssertionResult::pass_with_value(assertion.clone(), value.to_string()),
        None => AssertionResult::fail(assertion.clone(), format!("Header '{name}' not found")),
    }
}

fn check_body_is_array(assertion: &Assertion, outcome: &Outcome) -> AssertionResult {
    match require_json(assertion, outcome) {
        Ok(json) => {
            if json.is_array() {
                AssertionResult::pass(assertion.clone())
            } else {
                AssertionResult::fail_with_value(
                    assertion.clone(),
                    json_type_name(json),
                    format!("Expected a JSON array, got {}", json_type_name(json)),
                )
            }
        }
        Err(result) => result,
    }
}

fn check_body_property(
    assertion: &Assertion,
    outcome: &Outcome,
    path: &str,
    expected: Option<&Value>,
) -> AssertionResult {
    let json = match require_json(assertion, outcome) {
        Ok(json) => json,
        Err(result) => return result,
    };

    let Some(actual) = navigate_path(json, path) else {
        return AssertionResult::fail(
            assertion.clone(),
            format!("Body property '{path}' not found"),
        );
    };

    match expected {
        None => AssertionResult::pass_with_value(assertion.clone(), actual.to_string()),
        Some(expected) if actual == expected => {
            AssertionResult::pass_with_value(assertion.clone(), actual.to_string())
        }
        Some(expected) => AssertionResult::fail_with_value(
            assertion.clone(),
            actual.to_string(),
            equality_detail(&format!("Body property '{path}'"), actual, expected),
        ),
    }
}

fn check_body_subset(
    assertion: &Assertion,
    outcome: &Outcome,
    expected: &serde_json::Map<String, Value>,
) -> AssertionResult {
    let json = match require_json(assertion, outcome) {
        Ok(json) => json,
        Err(result) => return result,
    };

    let Some(object) = json.as_object() else {
        return AssertionResult::fail_with_value(
            assertion.clone(),
            json_type_name(json),
            format!("Expected a JSON object, got {}", json_type_name(json)),
        );
    };

    for (key, expected_value) in expected {
        match object.get(key) {
            None => {
                return AssertionResult::fail(
                    assertion.clone(),
                    format!("Body is missing field '{key}'"),
                );
            }
            Some(actual) if actual != expected_value => {
                return AssertionResult::fail_with_value(
                    assertion.clone(),
                    actual.to_string(),
                    equality_detail(&format!("Field '{key}'"), actual, expected_value),
                );
            }
            Some(_) => {}
        }
    }

    AssertionResult::pass(assertion.clone())
}

fn check_array_elements(
    assertion: &Assertion,
    outcome: &Outcome,
    path: &str,
    operator: ComparisonOperator,
    value: &Value,
) -> AssertionResult {
    let json = match require_json(assertion, outcome) {
        Ok(json) => json,
        Err(result) => return result,
    };

    let Some(elements) = json.as_array() else {
        return AssertionResult::fail_with_value(
            assertion.clone(),
            json_type_name(json),
            format!("Expected a JSON array, got {}", json_type_name(json)),
        );
    };

    for (index, element) in elements.iter().enumerate() {
        let Some(actual) = navigate_path(element, path) else {
            return AssertionResult::fail(
                assertion.clone(),
                format!("Element at index {index} has no property '{path}'"),
            );
        };
        if let Err(detail) = compare_values(actual, operator, value) {
            return AssertionResult::fail_with_value(
                assertion.clone(),
                actual.to_string(),
                format!("Element at index {index}: {detail}"),
            );
        }
    }

    AssertionResult::pass(assertion.clone())
}

fn check_body_matches(assertion: &Assertion, outcome: &Outcome, pattern: &str) -> AssertionResult {
    let Some(text) = outcome.body.as_text() else {
        return AssertionResult::fail(assertion.clone(), "Body is empty".to_string());
    };

    match Regex::new(pattern) {
        Ok(regex) => {
            if regex.is_match(&text) {
                AssertionResult::pass(assertion.clone())
            } else {
                let preview: String = text.chars().take(100).collect();
                AssertionResult::fail_with_value(
                    assertion.clone(),
                    preview,
                    format!("Body does not match pattern '{pattern}'"),
                )
            }
        }
        Err(e) => AssertionResult::fail(
            assertion.clone(),
            format!("Invalid regex pattern '{pattern}': {e}"),
        ),
    }
}

/// Fails the assertion when the outcome has no JSON body.
fn require_json<'a>(
    assertion: &Assertion,
    outcome: &'a Outcome,
) -> Result<&'a Value, AssertionResult> {
    if let Some(kind) = outcome.transport_error {
        return Err(AssertionResult::fail(
            assertion.clone(),
            format!("No body to inspect: transport failed ({kind:?})"),
        ));
    }
    outcome.body.as_json().ok_or_else(|| {
        AssertionResult::fail(assertion.clone(), "Body is not valid JSON".to_string())
    })
}

/// Navigates a dotted/indexed path through a JSON value.
///
/// Supports `field`, `field.nested`, `field[0]`, `[0].field`, and an
/// optional leading `$.`/`$`. Returns `None` if any segment is absent.
#[must_use]
pub fn navigate_path<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(json);
    }

    let mut current = json;
    for segment in split_path_segments(path) {
        if let Some((name, index)) = parse_array_access(&segment) {
            if !name.is_empty() {
                current = current.get(name)?;
            }
            current = current.get(index)?;
        } else {
            current = current.get(segment.as_str())?;
        }
    }

    Some(current)
}

/// Splits a path into segments, keeping `[idx]` attached to its field.
fn split_path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;

    for ch in path.chars() {
        match ch {
            '.' if !in_bracket => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                in_bracket = true;
                current.push(ch);
            }
            ']' => {
                in_bracket = false;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Parses array access like `field[0]` into (`field`, 0).
fn parse_array_access(segment: &str) -> Option<(&str, usize)> {
    let bracket_start = segment.find('[')?;
    if !segment.ends_with(']') {
        return None;
    }
    let name = &segment[..bracket_start];
    let index = segment[bracket_start + 1..segment.len() - 1].parse().ok()?;
    Some((name, index))
}

/// Compares two values under an operator. Equality is strict: no
/// coercion between types, so string `"1"` never equals number `1`.
fn compare_values(
    actual: &Value,
    operator: ComparisonOperator,
    expected: &Value,
) -> Result<(), String> {
    match operator {
        ComparisonOperator::Equals => {
            if actual == expected {
                Ok(())
            } else {
                Err(equality_detail("value", actual, expected))
            }
        }
        ComparisonOperator::NotEquals => {
            if actual == expected {
                Err(format!("expected a value other than {expected}"))
            } else {
                Ok(())
            }
        }
        ComparisonOperator::GreaterThan => compare_numeric(actual, expected, operator, |a, b| a > b),
        ComparisonOperator::GreaterThanOrEqual => {
            compare_numeric(actual, expected, operator, |a, b| a >= b)
        }
        ComparisonOperator::LessThan => compare_numeric(actual, expected, operator, |a, b| a < b),
        ComparisonOperator::LessThanOrEqual => {
            compare_numeric(actual, expected, operator, |a, b| a <= b)
        }
    }
}

fn compare_numeric<F>(
    actual: &Value,
    expected: &Value,
    operator: ComparisonOperator,
    cmp: F,
) -> Result<(), String>
where
    F: Fn(f64, f64) -> bool,
{
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) if cmp(a, b) => Ok(()),
        (Some(a), Some(b)) => Err(format!("{a} is not {} {b}", operator.symbol())),
        _ => Err(format!(
            "cannot compare {} with {} numerically",
            json_type_name(actual),
            json_type_name(expected)
        )),
    }
}

/// Builds a mismatch detail, naming both types when they differ.
fn equality_detail(subject: &str, actual: &Value, expected: &Value) -> String {
    let actual_type = json_type_name(actual);
    let expected_type = json_type_name(expected);
    if actual_type == expected_type {
        format!("{subject} mismatch: expected {expected}, got {actual}")
    } else {
        format!(
            "{subject} type mismatch: expected {expected_type} {expected}, got {actual_type} {actual}"
        )
    }
}

/// Names a JSON value's type for mismatch messages.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pactum_domain::{Headers, Outcome, OutcomeBody, TransportErrorKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn outcome_with_body(status: u16, body: Value) -> Outcome {
        Outcome::from_response(
            status,
            Headers::new(),
            OutcomeBody::Json { value: body },
            1,
            50,
        )
    }

    fn transport_failed_outcome() -> Outcome {
        Outcome::from_transport_error(TransportErrorKind::Timeout, 3, 5000)
    }

    #[test]
    fn test_status_equals() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(404, json!({}));

        let result =
            engine.evaluate_one(&Assertion::StatusEquals { expected: 404 }, &outcome);
        assert!(result.passed);

        let result =
            engine.evaluate_one(&Assertion::StatusEquals { expected: 200 }, &outcome);
        assert!(!result.passed);
        assert_eq!(result.actual.as_deref(), Some("404"));
    }

    #[test]
    fn test_status_fails_on_transport_error() {
        let engine = AssertionEngine::new();
        let outcome = transport_failed_outcome();
        let result =
            engine.evaluate_one(&Assertion::StatusEquals { expected: 200 }, &outcome);
        assert!(!result.passed);
        assert!(result.detail.unwrap().contains("transport failed"));
    }

    #[test]
    fn test_status_in_range() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(201, json!({}));
        let result = engine.evaluate_one(
            &Assertion::StatusInRange { min: 200, max: 299 },
            &outcome,
        );
        assert!(result.passed);
    }

    #[test]
    fn test_header_present_case_insensitive() {
        let engine = AssertionEngine::new();
        let mut headers = Headers::new();
        headers.insert("X-Total-Count", "100");
        let outcome =
            Outcome::from_response(200, headers, OutcomeBody::Empty, 1, 10);

        let result = engine.evaluate_one(
            &Assertion::HeaderPresent {
                name: "x-total-count".to_string(),
            },
            &outcome,
        );
        assert!(result.passed);
        assert_eq!(result.actual.as_deref(), Some("100"));
    }

    #[test]
    fn test_body_is_array() {
        let engine = AssertionEngine::new();

        let outcome = outcome_with_body(200, json!([1, 2, 3]));
        assert!(engine.evaluate_one(&Assertion::BodyIsArray, &outcome).passed);

        let outcome = outcome_with_body(200, json!({"a": 1}));
        let result = engine.evaluate_one(&Assertion::BodyIsArray, &outcome);
        assert!(!result.passed);
        assert!(result.detail.unwrap().contains("got object"));
    }

    #[test]
    fn test_body_has_property() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(200, json!({"userId": 1, "id": 1, "title": "x"}));

        let result = engine.evaluate_one(
            &Assertion::BodyHasProperty {
                path: "userId".to_string(),
                expected: None,
            },
            &outcome,
        );
        assert!(result.passed);

        let result = engine.evaluate_one(
            &Assertion::BodyHasProperty {
                path: "id".to_string(),
                expected: Some(json!(1)),
            },
            &outcome,
        );
        assert!(result.passed);

        let result = engine.evaluate_one(
            &Assertion::BodyHasProperty {
                path: "missing".to_string(),
                expected: None,
            },
            &outcome,
        );
        assert!(!result.passed);
    }

    #[test]
    fn test_no_type_coercion() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(200, json!({"id": "1"}));

        let result = engine.evaluate_one(
            &Assertion::BodyHasProperty {
                path: "id".to_string(),
                expected: Some(json!(1)),
            },
            &outcome,
        );
        assert!(!result.passed);
        let detail = result.detail.unwrap();
        assert!(detail.contains("expected number"));
        assert!(detail.contains("got string"));
    }

    #[test]
    fn test_nested_and_indexed_paths() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(200, json!({"items": [{"id": 7}]}));

        let result = engine.evaluate_one(
            &Assertion::BodyHasProperty {
                path: "items[0].id".to_string(),
                expected: Some(json!(7)),
            },
            &outcome,
        );
        assert!(result.passed);

        let result = engine.evaluate_one(
            &Assertion::BodyHasProperty {
                path: "$.items[0].id".to_string(),
                expected: Some(json!(7)),
            },
            &outcome,
        );
        assert!(result.passed);
    }

    #[test]
    fn test_body_matches_subset() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(
            200,
            json!({"title": "Nuevo Post", "body": "Contenido", "userId": 1, "id": 101}),
        );

        let expected = json!({"title": "Nuevo Post", "userId": 1});
        let Value::Object(map) = expected else {
            unreachable!()
        };
        let result = engine.evaluate_one(&Assertion::BodyMatchesSubset { expected: map }, &outcome);
        assert!(result.passed);

        let expected = json!({"title": "Otro"});
        let Value::Object(map) = expected else {
            unreachable!()
        };
        let result = engine.evaluate_one(&Assertion::BodyMatchesSubset { expected: map }, &outcome);
        assert!(!result.passed);
    }

    #[test]
    fn test_array_elements_satisfy_reports_first_failing_index() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(200, json!([{"userId": 1}, {"userId": 2}]));

        let result = engine.evaluate_one(
            &Assertion::ArrayElementsSatisfy {
                path: "userId".to_string(),
                operator: ComparisonOperator::Equals,
                value: json!(1),
            },
            &outcome,
        );
        assert!(!result.passed);
        let detail = result.detail.unwrap();
        assert!(detail.contains("index 1"));
        assert_eq!(result.actual.as_deref(), Some("2"));
    }

    #[test]
    fn test_array_elements_satisfy_all_pass() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(200, json!([{"userId": 1}, {"userId": 1}]));

        let result = engine.evaluate_one(
            &Assertion::ArrayElementsSatisfy {
                path: "userId".to_string(),
                operator: ComparisonOperator::Equals,
                value: json!(1),
            },
            &outcome,
        );
        assert!(result.passed);
    }

    #[test]
    fn test_array_elements_numeric_operator() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(200, json!([{"count": 5}, {"count": 10}]));

        let result = engine.evaluate_one(
            &Assertion::ArrayElementsSatisfy {
                path: "count".to_string(),
                operator: ComparisonOperator::GreaterThan,
                value: json!(3),
            },
            &outcome,
        );
        assert!(result.passed);
    }

    #[test]
    fn test_body_matches_regex() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(200, json!({"id": 12345}));

        let result = engine.evaluate_one(
            &Assertion::BodyMatches {
                pattern: r#""id":\d+"#.to_string(),
            },
            &outcome,
        );
        assert!(result.passed);
    }

    #[test]
    fn test_evaluation_is_independent_and_complete() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(500, json!({"ok": false}));

        let spec = pactum_domain::RequestSpec::new(
            "multi",
            pactum_domain::HttpMethod::Get,
            "https://x",
        )
        .expect(Assertion::StatusEquals { expected: 200 })
        .expect(Assertion::BodyHasProperty {
            path: "ok".to_string(),
            expected: Some(json!(false)),
        })
        .expect(Assertion::BodyIsArray);

        let results = engine.evaluate(&spec, &outcome);
        // all three evaluated despite the first failing
        assert_eq!(results.len(), 3);
        assert!(!results[0].passed);
        assert!(results[1].passed);
        assert!(!results[2].passed);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let engine = AssertionEngine::new();
        let outcome = outcome_with_body(200, json!({"id": 1}));
        let assertion = Assertion::BodyHasProperty {
            path: "id".to_string(),
            expected: Some(json!(1)),
        };

        let first = engine.evaluate_one(&assertion, &outcome);
        let second = engine.evaluate_one(&assertion, &outcome);
        assert_eq!(first, second);
    }
}
