//! Structured error type returned by handlers, parameter sources, and the resolution pipeline.
//!
//! [`RpcError`] carries:
//! - a [`Code`] deciding the HTTP status and the wire `"code"` field
//! - a public message (the only text a client ever sees)
//! - an optional cause, kept for diagnostics and never serialized to the client
//! - a detail bag of arbitrary JSON values
//! - a [`Traceback`] captured where the error was built
//!
//! Building an error around a cause that already is an `RpcError` hands back that same
//! error untouched; see [`RpcError::with_cause`].
//!
//! # Examples
//!
//! ```
//! use rpc_rail::{Code, RpcError};
//!
//! let err = RpcError::new(Code::NotFound, "user not found")
//!     .add("user_id", 42)
//!     .add("user_id", 7);
//!
//! assert_eq!(err.to_string(), "user not found");
//! assert_eq!(err.details()["user_id"], 42);
//! assert_eq!(err.http_status(), http::StatusCode::NOT_FOUND);
//! ```
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Code, Traceback};

mod wrap;

/// Type-erased error used for causes and handler failures.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Diagnostic key/value pairs attached to an error.
pub type ErrorDetails = BTreeMap<String, Value>;

/// Error value with a status code, public message, private cause, details, and traceback.
#[must_use]
#[derive(Debug)]
pub struct RpcError {
    code: Code,
    message: Cow<'static, str>,
    cause: Option<BoxError>,
    details: ErrorDetails,
    traceback: Traceback,
}

impl RpcError {
    /// Creates an error without a cause.
    ///
    /// An empty `message` makes the error display as the code name.
    #[inline(never)]
    pub fn new(code: Code, message: impl Into<Cow<'static, str>>) -> Self {
        Self::build(code, message.into(), None)
    }

    /// Creates an error wrapping `cause`.
    ///
    /// If `cause` already is an `RpcError`, it is returned unchanged: its code, message,
    /// details and traceback win over the ones given here.
    ///
    /// ```
    /// use rpc_rail::{Code, RpcError};
    ///
    /// let first = RpcError::new(Code::InvalidArgument, "something is missing");
    /// let again = RpcError::with_cause(Code::Unavailable, "not sure what", first);
    ///
    /// assert_eq!(again.code(), Code::InvalidArgument);
    /// assert_eq!(again.to_string(), "something is missing");
    /// ```
    #[inline(never)]
    pub fn with_cause<E>(code: Code, message: impl Into<Cow<'static, str>>, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        wrap::compose(code, message.into(), cause.into())
    }

    /// Wraps an arbitrary error as [`Code::Unknown`] with no public message.
    #[inline(never)]
    pub fn wrap<E>(cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        wrap::compose(Code::Unknown, Cow::Borrowed(""), cause.into())
    }

    pub(crate) fn build(code: Code, message: Cow<'static, str>, cause: Option<BoxError>) -> Self {
        Self { code, message, cause, details: ErrorDetails::new(), traceback: Traceback::capture() }
    }

    /// Returns the status code.
    #[inline]
    pub fn code(&self) -> Code {
        self.code
    }

    /// Returns the public message as given, possibly empty.
    ///
    /// Use `to_string()` for the text shown to clients.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the private cause, if any.
    #[inline]
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns the diagnostic details.
    #[inline]
    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    /// Returns a single detail value.
    #[inline]
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// Adds a detail unless `key` is already present (first write wins).
    ///
    /// Values that fail to serialize are recorded as a string describing the failure.
    pub fn add<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize,
    {
        self.insert_detail(key, value);
        self
    }

    /// In-place form of [`add`](Self::add); returns `false` when `key` was already set.
    pub fn insert_detail<K, V>(&mut self, key: K, value: V) -> bool
    where
        K: Into<String>,
        V: Serialize,
    {
        use std::collections::btree_map::Entry;

        match self.details.entry(key.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let value = serde_json::to_value(value)
                    .unwrap_or_else(|err| Value::String(format!("<unserializable: {err}>")));
                slot.insert(value);
                true
            },
        }
    }

    /// Numeric code in the standard (base) code space.
    #[inline]
    pub fn grpc_code(&self) -> u32 {
        self.code.base().ordinal()
    }

    /// HTTP status derived from the base code.
    #[inline]
    pub fn http_status(&self) -> StatusCode {
        self.code.base().http_status()
    }

    /// Traceback captured at construction, without a handler boundary.
    #[inline]
    pub fn raw_traceback(&self) -> &Traceback {
        &self.traceback
    }

    /// Traceback re-scoped to stop at `handler_name`.
    pub fn traceback<N>(&self, handler_name: N) -> Traceback
    where
        N: Into<Cow<'static, str>>,
    {
        self.traceback.scoped(handler_name)
    }

    /// Client-facing representation: code name and public text, nothing else.
    pub fn body(&self) -> ErrorBody {
        ErrorBody { code: self.code, error: self.to_string() }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(self.code.name())
        } else {
            f.write_str(&self.message)
        }
    }
}

impl Error for RpcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

/// JSON body written for failed calls: `{"code": "<Name>", "error": "<text>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: Code,
    pub error: String,
}
