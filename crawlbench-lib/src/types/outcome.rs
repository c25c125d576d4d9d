use std::fmt::Display;

use http::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::{ErrorKind, Target};

/// Terminal result of fetching one target.
///
/// Exactly one outcome is produced per target per strategy invocation and
/// it is immutable afterwards. A `Success` carries the response body and
/// status code; a `Failure` carries the structured error, which includes
/// the last raw error encountered.
///
/// Note that a `Failure` keeps the original input string as its target,
/// since malformed inputs never become a validated [`Target`].
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The target was fetched and the server answered with an accepted
    /// status code
    Success {
        /// The validated target which was fetched
        target: Target,
        /// HTTP status code of the response
        status: StatusCode,
        /// Raw response body; encoding and size are the concern of
        /// downstream consumers
        body: String,
    },
    /// The target could not be fetched
    Failure {
        /// The target as given by the caller
        target: String,
        /// What went wrong, including the last raw error
        error: ErrorKind,
    },
}

impl Outcome {
    /// The target this outcome belongs to, as a string.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Success { target, .. } => target.as_str(),
            Self::Failure { target, .. } => target,
        }
    }

    #[inline]
    #[must_use]
    /// Returns `true` if the fetch was successful
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Return the HTTP status code (if any)
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Success { status, .. } => Some(*status),
            Self::Failure { error, .. } => match error {
                ErrorKind::RejectedStatusCode(code) => Some(*code),
                _ => error.reqwest_error().and_then(reqwest::Error::status),
            },
        }
    }

    /// Return the response body (if any)
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Failure { .. } => None,
        }
    }

    /// Return the error (if any)
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { target, status, .. } => write!(f, "✔ [{status}] {target}"),
            Self::Failure { target, error } => write!(f, "✗ {target} | {error}"),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Success {
                target,
                status,
                body,
            } => {
                let mut s = serializer.serialize_struct("Outcome", 3)?;
                s.serialize_field("target", target.as_str())?;
                s.serialize_field("status", &status.as_u16())?;
                s.serialize_field("body", body)?;
                s.end()
            }
            Self::Failure { target, error } => {
                let mut s = serializer.serialize_struct("Outcome", 3)?;
                s.serialize_field("target", target)?;
                s.serialize_field("error_kind", error.label())?;
                s.serialize_field("message", &error.to_string())?;
                s.end()
            }
        }
    }
}
