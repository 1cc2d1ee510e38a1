//! Convenience re-exports for common usage patterns.
//!
//! ```
//! use rpc_rail::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Macros**: [`rpc_error!`], [`assert_rpc_error!`]
//! - **Types**: [`Code`], [`RpcError`], [`Request`], [`Response`], [`Dispatcher`], [`DispatchConfig`]
//! - **Sources**: [`FromBody`], [`FromForm`], [`FromContext`], [`FromEmpty`]
//! - **Traits**: [`ResultExt`], [`OptionExt`], [`ParamSource`]
//!
//! # Examples
//!
//! ```
//! use rpc_rail::prelude::*;
//!
//! async fn get_order(req: Request) -> RpcResult<Response> {
//!     let id = req.get_int("id", &[&FromBody, &FromForm])?;
//!     let note = req.get_string_default("note", String::new(), &[&FromBody])?;
//!     if id <= 0 {
//!         return Err(rpc_error!(Code::InvalidArgument, "id must be positive"; "id" => id));
//!     }
//!     Ok(Response::json(&serde_json::json!({ "id": id, "note": note })))
//! }
//!
//! let _dispatcher = Dispatcher::new(get_order, DispatchConfig::default());
//! ```

// Macros
pub use crate::{assert_rpc_error, rpc_error};

// Core types
pub use crate::dispatch::{DispatchConfig, Dispatcher};
pub use crate::request::Request;
pub use crate::types::{Code, Response, RpcError, RpcResult};

// Sources
pub use crate::source::{FromBody, FromContext, FromEmpty, FromForm};

// Traits
pub use crate::traits::{OptionExt, ParamSource, ResultExt};
