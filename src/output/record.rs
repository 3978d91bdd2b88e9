//! Page records: the unit of crawl output
//!
//! On the wire a record is one of
//! `{"domain", "path", "body"}`, `{"domain", "path", "status"}` or
//! `{"domain", "path", "error"}`.

use serde::{Deserialize, Serialize};
use std::fmt;

const OUT_OF_SCOPE: &str = "out of scope";

/// Why a page produced a failure record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Response status outside 2xx
    Status(u16),
    /// Network failure after retries, deadline, or unreadable body
    FetchError(String),
    /// The page resolved to a host outside the crawl's domain scope
    OutOfScope,
}

impl FailureReason {
    /// Short name of the reason class, used in statistics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status(_) => "http-status",
            Self::FetchError(_) => "fetch-error",
            Self::OutOfScope => "out-of-scope",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{}", code),
            Self::FetchError(error) => f.write_str(error),
            Self::OutOfScope => f.write_str(OUT_OF_SCOPE),
        }
    }
}

/// One immutable crawl result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RawRecord", try_from = "RawRecord")]
pub enum PageRecord {
    Success {
        domain: String,
        path: String,
        body: String,
    },
    Failure {
        domain: String,
        path: String,
        reason: FailureReason,
    },
}

impl PageRecord {
    pub fn success(domain: impl Into<String>, path: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Success {
            domain: domain.into(),
            path: path.into(),
            body: body.into(),
        }
    }

    pub fn failure(domain: impl Into<String>, path: impl Into<String>, reason: FailureReason) -> Self {
        Self::Failure {
            domain: domain.into(),
            path: path.into(),
            reason,
        }
    }

    pub fn domain(&self) -> &str {
        match self {
            Self::Success { domain, .. } | Self::Failure { domain, .. } => domain,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Success { path, .. } | Self::Failure { path, .. } => path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Serialize, Deserialize)]
struct RawRecord {
    domain: String,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<PageRecord> for RawRecord {
    fn from(record: PageRecord) -> Self {
        match record {
            PageRecord::Success { domain, path, body } => RawRecord {
                domain,
                path,
                body: Some(body),
                status: None,
                error: None,
            },
            PageRecord::Failure {
                domain,
                path,
                reason,
            } => {
                let (status, error) = match reason {
                    FailureReason::Status(code) => (Some(code), None),
                    other => (None, Some(other.to_string())),
                };
                RawRecord {
                    domain,
                    path,
                    body: None,
                    status,
                    error,
                }
            }
        }
    }
}

impl TryFrom<RawRecord> for PageRecord {
    type Error = String;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let RawRecord {
            domain,
            path,
            body,
            status,
            error,
        } = raw;

        match (body, status, error) {
            (Some(body), None, None) => Ok(PageRecord::Success { domain, path, body }),
            (None, Some(code), None) => Ok(PageRecord::failure(domain, path, FailureReason::Status(code))),
            (None, None, Some(error)) => {
                let reason = if error == OUT_OF_SCOPE {
                    FailureReason::OutOfScope
                } else {
                    FailureReason::FetchError(error)
                };
                Ok(PageRecord::failure(domain, path, reason))
            }
            _ => Err(format!(
                "record for {}{} must have exactly one of body, status, error",
                domain, path
            )),
        }
    }
}
