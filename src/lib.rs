//! Structured errors, typed parameter resolution, and handler dispatch for HTTP RPC services.
//!
//! The crate is organised around three pieces:
//!
//! - [`RpcError`]: an error carrying a [`Code`], a public message, a private cause, a detail
//!   bag, and a lazily-resolved [`Traceback`]
//! - [`Request`] with [`ParamSource`]s: typed parameter lookup across the JSON body, form
//!   fields, request-scoped context, or a zero-value fallback
//! - [`Dispatcher`](dispatch::Dispatcher): adapts an async handler to HTTP, recovering panics
//!   and rendering errors as `{"code": .., "error": ..}`
//!
//! # Examples
//!
//! ## Building Errors
//!
//! ```
//! use rpc_rail::{Code, RpcError};
//!
//! let err = RpcError::new(Code::PermissionDenied, "")
//!     .add("role", "viewer");
//!
//! assert_eq!(err.to_string(), "PermissionDenied");
//! assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
//! ```
//!
//! ## Resolving Parameters
//!
//! ```
//! use rpc_rail::source::{FromBody, FromEmpty};
//! use rpc_rail::Request;
//! use serde_json::json;
//!
//! let req = Request::builder().json(&json!({ "count": 14.15 })).build().unwrap();
//!
//! assert_eq!(req.get_int("count", &[&FromBody]).unwrap(), 14);
//! assert_eq!(req.get_bool("dry_run", &[&FromBody, &FromEmpty]).unwrap(), false);
//! ```
//!
//! ## Dispatching
//!
//! ```
//! use bytes::Bytes;
//! use http_body_util::{BodyExt, Full};
//! use rpc_rail::dispatch::{DispatchConfig, Dispatcher};
//! use rpc_rail::{Code, Request, Response, RpcError};
//!
//! async fn lookup(_req: Request) -> Result<Response, RpcError> {
//!     Err(RpcError::new(Code::NotFound, "no such order"))
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let dispatcher = Dispatcher::new(lookup, DispatchConfig::default());
//! let res = dispatcher.dispatch(http::Request::new(Full::new(Bytes::new()))).await;
//!
//! assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
//! let body = res.into_body().collect().await.unwrap().to_bytes();
//! assert_eq!(&body[..], br#"{"code":"NotFound","error":"no such order"}"#);
//! # });
//! ```

/// Handler dispatch, configuration, and error hooks
pub mod dispatch;
/// Error construction and assertion macros
pub mod macros;
/// Convenience re-exports for quick starts
pub mod prelude;
/// Per-call request object and parameter resolution
pub mod request;
/// Built-in parameter sources
pub mod source;
/// Helpers for asserting on errors in tests
pub mod testing;
/// Core traits: parameter sources and result extensions
pub mod traits;
/// Codes, errors, tracebacks, and responses
pub mod types;

/// Tower integration - Service and Layer implementations (requires `tower` feature)
#[cfg(feature = "tower")]
pub mod tower;

pub use request::{ContextValue, RemoteAddr, Request, RequestContext};
pub use traits::*;
pub use types::{
    BoxError, Code, ErrorBody, ErrorDetails, Payload, Redirect, Response, RpcError, RpcResult,
    Timestamp, Traceback, TracebackRecord,
};
