//! Built-in parameter sources and source lists.
//!
//! | Source | Medium | Objects |
//! |--------|--------|---------|
//! | [`FromBody`] | decoded JSON body | yes |
//! | [`FromForm`] | form fields and query string, text only | no |
//! | [`FromContext`] | request-scoped [`RequestContext`](crate::RequestContext) | no |
//! | [`FromEmpty`] | nothing; always yields the zero value | yes (`null`) |
//!
//! Placing [`FromEmpty`] last in a source list makes a parameter optional: lookups that
//! every other source reports absent resolve to the zero value instead of failing with
//! [`Code::MissingArgument`].
//!
//! # Examples
//!
//! ```
//! use rpc_rail::source::{SourceKind, SourceList};
//!
//! let sources: SourceList = [SourceKind::Body, SourceKind::Empty].into_iter().map(SourceKind::source).collect();
//! assert_eq!(sources[0].name(), "body");
//! assert_eq!(sources[1].name(), "empty");
//! ```
use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::traits::ParamSource;
use crate::types::{Code, RpcError};

pub mod body;
pub mod context;
pub mod empty;
pub mod form;

pub use body::FromBody;
pub use context::FromContext;
pub use empty::FromEmpty;
pub use form::FromForm;

/// Ordered list of sources, tried first to last.
///
/// Keeps up to 4 entries inline, which covers every ordering of the built-in sources.
pub type SourceList = SmallVec<[Arc<dyn ParamSource>; 4]>;

/// Names of the built-in sources, as used in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Body,
    Form,
    Context,
    Empty,
}

impl SourceKind {
    /// Instantiates the source this kind names.
    #[must_use]
    pub fn source(self) -> Arc<dyn ParamSource> {
        match self {
            SourceKind::Body => Arc::new(FromBody),
            SourceKind::Form => Arc::new(FromForm),
            SourceKind::Context => Arc::new(FromContext),
            SourceKind::Empty => Arc::new(FromEmpty),
        }
    }
}

/// Source list used when nothing else is configured: body, then form, then context.
#[must_use]
pub fn default_sources() -> SourceList {
    [SourceKind::Body, SourceKind::Form, SourceKind::Context]
        .into_iter()
        .map(SourceKind::source)
        .collect()
}

/// Type descriptions used in `invalid '<key>', must be <type>` messages.
pub mod expect {
    pub const STRING: &str = "string";
    pub const STRING_LIST: &str = "array of strings";
    pub const INT: &str = "integer";
    pub const FLOAT: &str = "float";
    pub const BOOL: &str = "true or false";
    pub const TIME: &str = "RFC3339 time string";
    pub const OBJECT: &str = "a compatible object";
}

/// Coercion failure for a present value: `invalid '<key>', must be <expected>`.
pub fn invalid<V>(key: &str, expected: &str, value: V) -> RpcError
where
    V: Serialize,
{
    RpcError::new(Code::InvalidArgument, invalid_message(key, expected)).add("value", value)
}

/// Like [`invalid`], keeping the parser error as the cause.
pub fn invalid_with_cause<V, E>(key: &str, expected: &str, value: V, cause: E) -> RpcError
where
    V: Serialize,
    E: Into<crate::types::BoxError>,
{
    RpcError::with_cause(Code::InvalidArgument, invalid_message(key, expected), cause)
        .add("value", value)
}

fn invalid_message(key: &str, expected: &str) -> Cow<'static, str> {
    Cow::Owned(format!("invalid '{key}', must be {expected}"))
}
