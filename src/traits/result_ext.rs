//! Extension trait for turning any `Result` into an [`RpcResult`].
//!
//! This module provides [`ResultExt`], which replaces `.map_err(|e| RpcError::with_cause(..))`
//! chains at the point where a failure is first observed.
//!
//! # Examples
//!
//! ```
//! use rpc_rail::traits::ResultExt;
//! use rpc_rail::{Code, RpcResult};
//!
//! fn parse_limit(raw: &str) -> RpcResult<u32> {
//!     raw.parse::<u32>().rpc_err(Code::InvalidArgument, "limit must be a positive number")
//! }
//!
//! let err = parse_limit("ten").unwrap_err();
//! assert_eq!(err.code(), Code::InvalidArgument);
//! assert!(err.cause().is_some());
//! ```
use std::borrow::Cow;

use crate::types::{BoxError, Code, RpcError, RpcResult};

/// Extension trait for wrapping errors as [`RpcError`] ergonomically.
///
/// Wrapping follows [`RpcError::with_cause`]: an error that already is an `RpcError`
/// passes through unchanged.
pub trait ResultExt<T> {
    /// Wraps the error with `code` and a public `message`.
    fn rpc_err<M>(self, code: Code, message: M) -> RpcResult<T>
    where
        M: Into<Cow<'static, str>>;

    /// Wraps the error with a lazily-built public message.
    ///
    /// The closure only runs on the error path.
    fn rpc_err_with<F, M>(self, code: Code, f: F) -> RpcResult<T>
    where
        F: FnOnce() -> M,
        M: Into<Cow<'static, str>>;

    /// Wraps the error as [`Code::Internal`] without a public message.
    fn rpc_internal(self) -> RpcResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    #[inline]
    fn rpc_err<M>(self, code: Code, message: M) -> RpcResult<T>
    where
        M: Into<Cow<'static, str>>,
    {
        self.map_err(|e| RpcError::with_cause(code, message, e))
    }

    #[inline]
    fn rpc_err_with<F, M>(self, code: Code, f: F) -> RpcResult<T>
    where
        F: FnOnce() -> M,
        M: Into<Cow<'static, str>>,
    {
        self.map_err(|e| RpcError::with_cause(code, f(), e))
    }

    #[inline]
    fn rpc_internal(self) -> RpcResult<T> {
        self.map_err(|e| RpcError::with_cause(Code::Internal, "", e))
    }
}

/// Extension trait for `Option`, treating `None` as a failure with the given code.
pub trait OptionExt<T> {
    /// Converts `None` into an error with `code` and `message`.
    ///
    /// ```
    /// use rpc_rail::traits::OptionExt;
    /// use rpc_rail::Code;
    ///
    /// let users = ["june", "may"];
    /// let err = users.iter().find(|u| **u == "april").or_rpc(Code::NotFound, "no such user");
    /// assert_eq!(err.unwrap_err().code(), Code::NotFound);
    /// ```
    fn or_rpc<M>(self, code: Code, message: M) -> RpcResult<T>
    where
        M: Into<Cow<'static, str>>;
}

impl<T> OptionExt<T> for Option<T> {
    #[inline]
    fn or_rpc<M>(self, code: Code, message: M) -> RpcResult<T>
    where
        M: Into<Cow<'static, str>>,
    {
        self.ok_or_else(|| RpcError::new(code, message))
    }
}
