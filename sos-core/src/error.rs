use std::{fmt, time::Duration};

use thiserror::Error;

/// Level of the station → offering → property cascade an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Station,
    Offering,
    Property,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Station => "station",
            IndexKind::Offering => "offering",
            IndexKind::Property => "observed property",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw server payload attached to a failure for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseBody {
    /// The server sent nothing (or the request never produced a body).
    #[default]
    Empty,
    Raw(String),
}

impl ResponseBody {
    pub fn from_text(body: &str) -> Self {
        if body.trim().is_empty() {
            ResponseBody::Empty
        } else {
            ResponseBody::Raw(body.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Empty => None,
            ResponseBody::Raw(body) => Some(body),
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Empty => f.write_str("<empty response>"),
            ResponseBody::Raw(body) => f.write_str(body),
        }
    }
}

#[derive(Debug, Error)]
pub enum SosError {
    #[error("{kind} index {index} is out of range ({len} available)")]
    Index { kind: IndexKind, index: usize, len: usize },

    #[error("request timed out{}", format_timeout(.timeout))]
    Timeout { timeout: Option<Duration> },

    #[error("GetObservation failed: {message}")]
    Query { message: String, body: ResponseBody },

    #[error("GetCapabilities failed: {message}")]
    Capabilities { message: String, body: ResponseBody },

    #[error(
        "query was built against metadata generation {query}, but the current generation is {current}; reload the selection"
    )]
    StaleSnapshot { query: u64, current: u64 },

    #[error("no service metadata loaded yet")]
    NoMetadata,
}

impl SosError {
    pub fn query(message: impl Into<String>, body: &str) -> Self {
        SosError::Query { message: message.into(), body: ResponseBody::from_text(body) }
    }

    pub fn capabilities(message: impl Into<String>, body: &str) -> Self {
        SosError::Capabilities { message: message.into(), body: ResponseBody::from_text(body) }
    }

    /// Payload returned by the server, when the failure carries one.
    pub fn response_body(&self) -> Option<&ResponseBody> {
        match self {
            SosError::Query { body, .. } | SosError::Capabilities { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Timeouts are worth retrying with a different limit; everything else is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SosError::Timeout { .. })
    }
}

fn format_timeout(timeout: &Option<Duration>) -> String {
    match timeout {
        Some(d) => format!(" after {}s", d.as_secs()),
        None => String::new(),
    }
}
