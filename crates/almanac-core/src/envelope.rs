//! Response envelope wrapping every command result.
//!
//! `meta` says where the series came from and how it was analysed, `data`
//! holds the command payload, and `errors` is non-empty only when the series
//! could not be obtained.

use serde::Serialize;

use crate::{SourceError, SourceId, Tolerance, UtcDateTime, ValidationError};

/// Version of the envelope layout.
pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Error code for a series that could not be obtained.
pub const SERIES_UNAVAILABLE: &str = "series_unavailable";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

/// Overall outcome of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    /// Analysed without remarks.
    Ok,
    /// Analysed, but the input was degenerate.
    Warning,
    /// The series was unavailable.
    Error,
}

impl EnvelopeStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl<T> Envelope<T> {
    pub fn new(meta: EnvelopeMeta, data: T, errors: Vec<EnvelopeError>) -> Self {
        Self { meta, data, errors }
    }

    pub fn status(&self) -> EnvelopeStatus {
        if !self.errors.is_empty() {
            EnvelopeStatus::Error
        } else if !self.meta.warnings.is_empty() {
            EnvelopeStatus::Warning
        } else {
            EnvelopeStatus::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub trace_id: String,
    pub schema_version: &'static str,
    pub generated_at: UtcDateTime,
    /// Sources that produced the series, in read order.
    pub source_chain: Vec<SourceId>,
    #[serde(rename = "tolerance_pct", skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<Tolerance>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    /// Fails when `source_chain` is empty: every envelope names its series' origin.
    pub fn new(
        request_id: impl Into<String>,
        trace_id: impl Into<String>,
        source_chain: Vec<SourceId>,
    ) -> Result<Self, ValidationError> {
        if source_chain.is_empty() {
            return Err(ValidationError::EmptySourceChain);
        }

        Ok(Self {
            request_id: request_id.into(),
            trace_id: trace_id.into(),
            schema_version: SCHEMA_VERSION,
            generated_at: UtcDateTime::now(),
            source_chain,
            tolerance: None,
            latency_ms: 0,
            warnings: Vec::new(),
        })
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeError {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
    pub source: SourceId,
}

impl EnvelopeError {
    /// `series_unavailable` error describing why `error`'s source could not be read.
    pub fn series_unavailable(error: &SourceError) -> Self {
        Self {
            code: SERIES_UNAVAILABLE,
            message: error.to_string(),
            retryable: error.retryable(),
            source: error.origin(),
        }
    }
}
