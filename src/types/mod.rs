//! Value types: status codes, structured errors, tracebacks, and responses.
//!
//! # Examples
//!
//! ```
//! use rpc_rail::{Code, RpcError};
//!
//! let err = RpcError::new(Code::PermissionDenied, "")
//!     .add("resource", "invoice/17");
//!
//! assert_eq!(err.to_string(), "PermissionDenied");
//! assert_eq!(err.http_status().as_u16(), 403);
//! ```
pub mod code;
pub mod response;
pub mod rpc_error;
pub mod traceback;

pub use code::Code;
pub use response::{Payload, Redirect, Response};
pub use rpc_error::{BoxError, ErrorBody, ErrorDetails, RpcError};
pub use traceback::{Traceback, TracebackRecord};

/// Result alias used throughout the crate.
pub type RpcResult<T> = Result<T, RpcError>;

/// Timestamp type produced by time-typed parameters (RFC 3339, offset preserved).
pub type Timestamp = chrono::DateTime<chrono::FixedOffset>;
