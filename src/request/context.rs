//! Request-scoped key/value storage read by [`FromContext`](crate::source::FromContext).
//!
//! Middleware stores a [`RequestContext`] in the `http::Request` extensions (or lets
//! [`ContextLayer`](crate::tower::ContextLayer) do it); the dispatcher carries it over into
//! the [`Request`](super::Request) it builds.
use std::collections::HashMap;
use std::net::SocketAddr;

use serde::Serialize;
use serde_json::Value;

use crate::Timestamp;

/// Typed value kept in a [`RequestContext`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    String(String),
    Bytes(Vec<u8>),
    StringList(Vec<String>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Time(Timestamp),
    /// Anything else; no getter coerces it.
    Json(Value),
}

macro_rules! context_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ContextValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    ContextValue::$variant(value.into())
                }
            }
        )*
    };
}

context_value_from! {
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    Vec<String> => StringList,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    f64 => Float,
    f32 => Float,
    bool => Bool,
    Timestamp => Time,
    Value => Json,
}

/// Request-scoped values, keyed by name.
///
/// ```
/// use rpc_rail::{ContextValue, RequestContext};
///
/// let ctx = RequestContext::new().with("user_id", 42).with("role", "admin");
/// assert_eq!(ctx.get("user_id"), Some(&ContextValue::Int(42)));
/// assert_eq!(ctx.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    values: HashMap<String, ContextValue>,
}

impl RequestContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ContextValue>,
    ) -> Option<ContextValue> {
        self.values.insert(key.into(), value.into())
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.values.remove(key)
    }

    /// Copies every entry of `other` into `self`, overwriting equal keys.
    pub fn extend(&mut self, other: RequestContext) {
        self.values.extend(other.values);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for RequestContext
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Peer address of the connection, stored in the `http::Request` extensions by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);
