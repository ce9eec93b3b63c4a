//! URL template resolution for `{{placeholder}}` syntax.
//!
//! A spec's `url_template` is resolved against its params: each
//! `{{name}}` is replaced by the matching param value, and params not
//! consumed by a placeholder are appended as query-string pairs.

use std::collections::HashSet;

use pactum_domain::{DomainError, DomainResult, RequestSpec};
use url::Url;

/// Scans a template and extracts placeholder names in order of
/// appearance. Unterminated `{{` sequences are ignored.
#[must_use]
pub fn placeholder_names(input: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = input;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        let name = after[..close].trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
        rest = &after[close + 2..];
    }

    names
}

/// Resolves a spec's URL template into a concrete URL.
///
/// Placeholders are substituted from `spec.params`; params not consumed
/// by any placeholder become query parameters, in the order the spec
/// declares them.
///
/// # Errors
///
/// - [`DomainError::UnresolvedPlaceholder`] when a placeholder has no
///   matching param.
/// - [`DomainError::InvalidUrl`] when the substituted string is not a
///   valid absolute URL.
pub fn resolve_url(spec: &RequestSpec) -> DomainResult<String> {
    let mut resolved = spec.url_template.clone();
    let mut consumed = HashSet::new();

    for name in placeholder_names(&spec.url_template) {
        let Some(value) = spec.params.get(&name) else {
            return Err(DomainError::UnresolvedPlaceholder {
                spec_id: spec.id.clone(),
                name,
            });
        };
        // Whitespace inside braces is tolerated, so replace by scanning
        // rather than assuming an exact "{{name}}" spelling.
        resolved = replace_placeholder(&resolved, &name, value);
        consumed.insert(name);
    }

    let mut url =
        Url::parse(&resolved).map_err(|e| DomainError::InvalidUrl(format!("{e}: {resolved}")))?;

    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &spec.params {
            if !consumed.contains(name) {
                pairs.append_pair(name, value);
            }
        }
    }

    // query_pairs_mut leaves a trailing '?' when nothing was appended
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url.into())
}

fn replace_placeholder(input: &str, name: &str, value: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        if after[..close].trim() == name {
            out.push_str(&rest[..open]);
            out.push_str(value);
        } else {
            out.push_str(&rest[..open + 2 + close + 2]);
        }
        rest = &after[close + 2..];
    }

    out.push_str(rest);
    out
}
