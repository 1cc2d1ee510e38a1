//! Typed parameter resolution over an ordered list of sources.
//!
//! Every getter walks the given sources in order and stops at the first one that either
//! finds the key or rejects its value; a type error from an earlier source is never masked
//! by a later one. An empty source list means the request's default sources.
//!
//! When no source has the key, plain getters fail with [`Code::MissingArgument`]
//! (`missing '<key>'`) and the `*_default` getters return the given default.
//!
//! ```
//! use rpc_rail::source::{FromBody, FromForm};
//! use rpc_rail::{Code, Request};
//! use serde_json::json;
//!
//! let req = Request::builder()
//!     .uri("/search?count=5")
//!     .json(&json!({ "count": "many" }))
//!     .build()
//!     .unwrap();
//!
//! // The body rejects the value before the form is consulted.
//! let err = req.get_int("count", &[&FromBody, &FromForm]).unwrap_err();
//! assert_eq!(err.code(), Code::InvalidArgument);
//!
//! assert_eq!(req.get_int("count", &[&FromForm, &FromBody]).unwrap(), 5);
//! assert_eq!(req.get_int_default("page", 1, &[&FromBody, &FromForm]).unwrap(), 1);
//! ```
use std::any::type_name;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Request;
use crate::source::{expect, invalid_with_cause};
use crate::traits::{ParamInput, ParamSource};
use crate::types::{BoxError, Code, RpcError, RpcResult};
use crate::Timestamp;

fn missing(key: &str) -> RpcError {
    RpcError::new(Code::MissingArgument, format!("missing '{key}'"))
}

fn first_match<'s, T, G>(
    sources: impl Iterator<Item = &'s dyn ParamSource>,
    input: &dyn ParamInput,
    key: &str,
    get: G,
) -> RpcResult<Option<T>>
where
    G: Fn(&dyn ParamSource, &dyn ParamInput, &str) -> RpcResult<Option<T>>,
{
    for source in sources {
        if let Some(value) = get(source, input, key)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

macro_rules! typed_getters {
    ($($(#[$doc:meta])* $get:ident, $get_default:ident => $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $get(&self, key: &str, sources: &[&dyn ParamSource]) -> RpcResult<$ty> {
                self.lookup(key, sources, |s, r, k| s.$get(r, k))?.ok_or_else(|| missing(key))
            }

            #[doc = concat!("Like [`", stringify!($get), "`](Self::", stringify!($get), "), returning `default` when no source has the key.")]
            pub fn $get_default(
                &self,
                key: &str,
                default: $ty,
                sources: &[&dyn ParamSource],
            ) -> RpcResult<$ty> {
                Ok(self.lookup(key, sources, |s, r, k| s.$get(r, k))?.unwrap_or(default))
            }
        )*
    };
}

impl Request {
    /// Walks `sources` (or the defaults when empty) and returns the first value found.
    pub fn lookup<T, G>(&self, key: &str, sources: &[&dyn ParamSource], get: G) -> RpcResult<Option<T>>
    where
        G: Fn(&dyn ParamSource, &dyn ParamInput, &str) -> RpcResult<Option<T>>,
    {
        let found = if sources.is_empty() {
            let defaults = self.default_sources().iter().map(|source| source.as_ref() as &dyn ParamSource);
            first_match(defaults, self, key, get)
        } else {
            first_match(sources.iter().copied(), self, key, get)
        };
        if let Err(err) = &found {
            tracing::debug!(handler = self.handler_name(), key, code = %err.code(), "parameter rejected");
        }
        found
    }

    typed_getters! {
        /// Non-empty string parameter.
        get_string, get_string_default => String;
        /// List-of-strings parameter.
        get_string_list, get_string_list_default => Vec<String>;
        /// Integer parameter; floating-point values are truncated toward zero.
        get_int, get_int_default => i64;
        /// Floating-point parameter.
        get_float, get_float_default => f64;
        /// Boolean parameter.
        get_bool, get_bool_default => bool;
        /// RFC 3339 timestamp parameter.
        get_time, get_time_default => Timestamp;
    }

    /// Structured parameter decoded with serde.
    ///
    /// A JSON `null` (what [`FromEmpty`](crate::source::FromEmpty) yields) decodes to
    /// `T::default()`. Values that do not decode fail with [`Code::InvalidArgument`].
    pub fn get_object<T>(&self, key: &str, sources: &[&dyn ParamSource]) -> RpcResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.lookup(key, sources, |s, r, k| s.get_object(r, k))? {
            None => Err(missing(key)),
            Some(Value::Null) => Ok(T::default()),
            Some(value) => decode_object(key, value, |value| serde_json::from_value(value)),
        }
    }

    /// Like [`get_object`](Self::get_object), returning `default` when no source has the key
    /// or a source yields `null`.
    pub fn get_object_default<T>(&self, key: &str, default: T, sources: &[&dyn ParamSource]) -> RpcResult<T>
    where
        T: DeserializeOwned,
    {
        match self.lookup(key, sources, |s, r, k| s.get_object(r, k))? {
            None | Some(Value::Null) => Ok(default),
            Some(value) => decode_object(key, value, |value| serde_json::from_value(value)),
        }
    }

    /// Structured parameter decoded by `decoder`.
    ///
    /// The decoder sees the raw JSON value, `null` included.
    ///
    /// ```
    /// use rpc_rail::source::FromBody;
    /// use rpc_rail::Request;
    /// use serde_json::{json, Value};
    ///
    /// let req = Request::builder().json(&json!({ "tags": ["a", "b"] })).build().unwrap();
    /// let count = req
    ///     .get_object_with("tags", |value: Value| match value {
    ///         Value::Array(items) => Ok(items.len()),
    ///         _ => Err("not a list"),
    ///     }, &[&FromBody])
    ///     .unwrap();
    /// assert_eq!(count, 2);
    /// ```
    pub fn get_object_with<T, F, E>(&self, key: &str, decoder: F, sources: &[&dyn ParamSource]) -> RpcResult<T>
    where
        F: FnOnce(Value) -> Result<T, E>,
        E: Into<BoxError>,
    {
        let value = self.lookup(key, sources, |s, r, k| s.get_object(r, k))?.ok_or_else(|| missing(key))?;
        decode_object(key, value, decoder)
    }
}

fn decode_object<T, F, E>(key: &str, value: Value, decoder: F) -> RpcResult<T>
where
    F: FnOnce(Value) -> Result<T, E>,
    E: Into<BoxError>,
{
    let raw = value.clone();
    decoder(value).map_err(|err| invalid_with_cause(key, expect::OBJECT, raw, err).add("type", type_name::<T>()))
}
