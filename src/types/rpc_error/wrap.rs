//! Policy for building an [`RpcError`] around a cause.
//!
//! Every constructor taking a cause goes through [`compose`]. The current rule is
//! "first structured failure wins": when the cause already is an `RpcError`, the new code
//! and message are dropped and the original error comes back as-is, with its traceback
//! still pointing at the original failure site.
use std::borrow::Cow;

use super::{BoxError, RpcError};
use crate::types::Code;

pub(super) fn compose(code: Code, message: Cow<'static, str>, cause: BoxError) -> RpcError {
    match cause.downcast::<RpcError>() {
        Ok(existing) => *existing,
        Err(cause) => RpcError::build(code, message, Some(cause)),
    }
}
