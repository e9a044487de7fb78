use std::fmt::{Display, Formatter};

use almanac_core::{EnvelopeMeta, SourceId, ValidationError};
use uuid::Uuid;

/// Request identifier (UUID v4) for end-to-end request tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// W3C-style 16-byte hex trace id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceId(String);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TraceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers minted once per invocation and stamped on its envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub request_id: RequestId,
    pub trace_id: TraceId,
}

impl Metadata {
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new_v4(),
            trace_id: TraceId::new(),
        }
    }

    pub fn into_envelope_meta(
        self,
        source_chain: Vec<SourceId>,
    ) -> Result<EnvelopeMeta, ValidationError> {
        EnvelopeMeta::new(
            self.request_id.to_string(),
            self.trace_id.to_string(),
            source_chain,
        )
    }
}
