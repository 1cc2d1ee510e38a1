//! Successful handler output.
//!
//! A [`Response`] holds the payload, extra headers, and an optional redirect. How each
//! payload kind is written:
//!
//! | Payload | Body | Content type |
//! |---------|------|--------------|
//! | [`Payload::Empty`] | `{}` | JSON |
//! | [`Payload::Json`] | encoded value | JSON |
//! | [`Payload::Text`] / [`Payload::Bytes`] | verbatim | plain text |
//! | [`Payload::Unencodable`] | empty | JSON |
//!
//! # Examples
//!
//! ```
//! use rpc_rail::Response;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u64,
//!     name: &'static str,
//! }
//!
//! let res = Response::json(&User { id: 1, name: "June" })
//!     .with_header(http::header::CACHE_CONTROL, http::HeaderValue::from_static("no-store"));
//! assert!(res.redirect_target().is_none());
//! ```
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Response payload kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No payload; written as `{}`.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// Text written verbatim.
    Text(String),
    /// Bytes written verbatim.
    Bytes(Bytes),
    /// Data that failed to encode; written as an empty body. Holds the encoder error text.
    Unencodable(String),
}

/// Redirect target and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    path: String,
    status: StatusCode,
}

impl Redirect {
    /// Status used when none is given.
    pub const DEFAULT_STATUS: StatusCode = StatusCode::SEE_OTHER;

    /// Location the client is sent to.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Redirect status code.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Output of a successful handler call.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct Response {
    payload: Payload,
    headers: HeaderMap,
    redirect: Option<Redirect>,
}

impl Response {
    /// Response with no payload.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Encodes `data` as JSON.
    ///
    /// Encoding errors do not fail here; the response is written with an empty body.
    pub fn json<T>(data: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        let payload = match serde_json::to_value(data) {
            Ok(value) => Payload::Json(value),
            Err(err) => Payload::Unencodable(err.to_string()),
        };
        Self::from_payload(payload)
    }

    /// Text payload written verbatim.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_payload(Payload::Text(text.into()))
    }

    /// Byte payload written verbatim.
    #[inline]
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::from_payload(Payload::Bytes(bytes.into()))
    }

    /// Redirect to `path` with `303 See Other`.
    #[inline]
    pub fn redirect(path: impl Into<String>) -> Self {
        Self::redirect_with(path, Redirect::DEFAULT_STATUS)
    }

    /// Redirect to `path` with the given status.
    pub fn redirect_with(path: impl Into<String>, status: StatusCode) -> Self {
        Self { redirect: Some(Redirect { path: path.into(), status }), ..Self::default() }
    }

    /// Response carrying `payload`.
    #[inline]
    pub fn from_payload(payload: Payload) -> Self {
        Self { payload, ..Self::default() }
    }

    /// Appends a header; existing values for `name` are kept.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Returns the payload.
    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the extra headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the extra headers for in-place edits.
    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the redirect, if one is set.
    #[inline]
    pub fn redirect_target(&self) -> Option<&Redirect> {
        self.redirect.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Payload, HeaderMap, Option<Redirect>) {
        (self.payload, self.headers, self.redirect)
    }
}

impl From<Value> for Response {
    #[inline]
    fn from(value: Value) -> Self {
        Self::from_payload(Payload::Json(value))
    }
}
