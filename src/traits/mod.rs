//! Seams of the crate.
//!
//! - [`ParamSource`] / [`ParamInput`]: how a parameter is read from one medium of a request
//! - [`ResultExt`] / [`OptionExt`]: wrapping foreign failures into [`RpcError`](crate::RpcError)
//!
//! The handler and error-hook seams live next to the dispatcher, see
//! [`Handler`](crate::dispatch::Handler) and [`ErrorHook`](crate::dispatch::ErrorHook).

pub mod param_source;
pub mod result_ext;

pub use param_source::{ParamInput, ParamSource};
pub use result_ext::{OptionExt, ResultExt};
