//! Helpers for asserting on errors in tests.
use std::error::Error;

use thiserror::Error;

use crate::types::{Code, RpcError};

/// Difference between an expected and an actual error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected_code} error {expected_message:?}, got {actual_code} error {actual_message:?}")]
pub struct ErrorMismatch {
    pub expected_code: Code,
    pub expected_message: String,
    pub actual_code: Code,
    pub actual_message: String,
}

/// Checks that `err` has `code` and displays as `message`.
///
/// A non-RPC error is treated as [`Code::Unknown`] with its `Display` text.
///
/// ```
/// use rpc_rail::testing::check_rpc_error;
/// use rpc_rail::{Code, RpcError};
///
/// let err = RpcError::new(Code::MissingArgument, "missing 'id'");
/// assert!(check_rpc_error(&err, Code::MissingArgument, "missing 'id'").is_ok());
/// assert!(check_rpc_error(&err, Code::InvalidArgument, "missing 'id'").is_err());
/// ```
pub fn check_rpc_error(
    err: &(dyn Error + 'static),
    code: Code,
    message: &str,
) -> Result<(), ErrorMismatch> {
    let (actual_code, actual_message) = match err.downcast_ref::<RpcError>() {
        Some(rpc) => (rpc.code(), rpc.to_string()),
        None => (Code::Unknown, err.to_string()),
    };
    if actual_code == code && actual_message == message {
        return Ok(());
    }
    Err(ErrorMismatch {
        expected_code: code,
        expected_message: message.to_owned(),
        actual_code,
        actual_message,
    })
}
