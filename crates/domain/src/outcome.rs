//! Executed-attempt outcome types.
//!
//! An [`Outcome`] captures everything observed about one executed request
//! spec: status, headers, parsed body, transport failure if any, which
//! attempt produced it, and how long that attempt took.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response headers with case-insensitive name lookup.
///
/// Names are normalized to lowercase on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    entries: HashMap<String, String>,
}

impl Headers {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Looks up a header value by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns true if a header with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no headers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over (name, value) pairs; names are lowercase.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Response body as observed by the executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeBody {
    /// No body was received.
    #[default]
    Empty,
    /// Body parsed as JSON.
    Json {
        /// The parsed JSON value.
        value: serde_json::Value,
    },
    /// Body that did not parse as JSON, kept as raw bytes.
    Raw {
        /// The raw body bytes.
        bytes: Vec<u8>,
    },
}

impl OutcomeBody {
    /// Parses raw bytes, preferring JSON when they decode as such.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => Self::Json { value },
            Err(_) => Self::Raw {
                bytes: bytes.to_vec(),
            },
        }
    }

    /// Returns the JSON value if the body parsed as JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json { value } => Some(value),
            _ => None,
        }
    }

    /// Returns the body as text for display or regex matching.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Json { value } => Some(value.to_string()),
            Self::Raw { bytes } => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The attempt exceeded its timeout.
    Timeout,
    /// The remote host actively refused the connection.
    ConnectionRefused,
    /// The connection failed or was reset mid-flight.
    ConnectionFailed,
    /// Host name resolution failed.
    DnsFailure,
    /// Any other transport-level error.
    Other,
}

impl TransportErrorKind {
    /// Whether this failure class is eligible for automatic retry.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::ConnectionRefused | Self::ConnectionFailed
        )
    }
}

/// The observed result of executing a spec's final attempt.
///
/// Created only by the executor; handed by value to the assertion engine
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Status code, absent when the transport failed.
    pub status: Option<u16>,
    /// Response headers (case-insensitive lookup).
    pub headers: Headers,
    /// Response body.
    pub body: OutcomeBody,
    /// Transport failure classification, if the attempt failed.
    pub transport_error: Option<TransportErrorKind>,
    /// 1-based attempt number that produced this outcome.
    pub attempt: u32,
    /// Elapsed time of the producing attempt, in milliseconds.
    pub elapsed_ms: u64,
}

impl Outcome {
    /// Builds an outcome from a received response.
    #[must_use]
    pub fn from_response(
        status: u16,
        headers: Headers,
        body: OutcomeBody,
        attempt: u32,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            status: Some(status),
            headers,
            body,
            transport_error: None,
            attempt,
            elapsed_ms,
        }
    }

    /// Builds an outcome for a failed transport attempt.
    #[must_use]
    pub fn from_transport_error(kind: TransportErrorKind, attempt: u32, elapsed_ms: u64) -> Self {
        Self {
            status: None,
            headers: Headers::new(),
            body: OutcomeBody::Empty,
            transport_error: Some(kind),
            attempt,
            elapsed_ms,
        }
    }

    /// Returns true when the outcome carries a response rather than a
    /// transport failure.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        self.transport_error.is_none()
    }
}
