//! Strategy trait for reading one named parameter from one medium.
//!
//! A [`ParamSource`] looks a key up in its medium (JSON body, form fields, request-scoped
//! context, or nothing at all) and coerces it to the requested type. Every getter reports
//! one of three outcomes:
//!
//! - `Ok(Some(value))`: the key is present and coerced
//! - `Ok(None)`: the key is absent here; the caller should try the next source
//! - `Err(_)`: the key is present but has the wrong shape, as
//!   [`Code::InvalidArgument`](crate::Code::InvalidArgument) with the message
//!   `invalid '<key>', must be <type>` and the raw value in the `"value"` detail
//!
//! Sources read the request through [`ParamInput`], so they can be exercised against any
//! carrier, not only [`Request`](crate::Request).
//!
//! # Implementing a custom source
//!
//! ```
//! use rpc_rail::traits::{ParamInput, ParamSource};
//! use rpc_rail::{RpcResult, Timestamp};
//!
//! /// Serves a fixed tenant id, whatever the request says.
//! struct FixedTenant;
//!
//! impl ParamSource for FixedTenant {
//!     fn name(&self) -> &'static str {
//!         "fixed-tenant"
//!     }
//!
//!     fn get_string(&self, _req: &dyn ParamInput, key: &str) -> RpcResult<Option<String>> {
//!         Ok((key == "tenant").then(|| "acme".to_owned()))
//!     }
//!
//!     fn get_string_list(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<Vec<String>>> {
//!         Ok(None)
//!     }
//!
//!     fn get_int(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<i64>> {
//!         Ok(None)
//!     }
//!
//!     fn get_float(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<f64>> {
//!         Ok(None)
//!     }
//!
//!     fn get_bool(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<bool>> {
//!         Ok(None)
//!     }
//!
//!     fn get_time(&self, _: &dyn ParamInput, _: &str) -> RpcResult<Option<Timestamp>> {
//!         Ok(None)
//!     }
//! }
//! ```
use serde_json::{Map, Value};

use crate::request::ContextValue;
use crate::types::RpcResult;
use crate::Timestamp;

/// Read access to the media a request carries parameters in.
pub trait ParamInput {
    /// Decoded JSON body; an empty map when the body is empty or not a JSON object.
    fn body_map(&self) -> RpcResult<&Map<String, Value>>;

    /// First value of a form field (body form fields first, then the query string).
    fn form_value(&self, key: &str) -> Option<&str>;

    /// Value stored in request-scoped context storage.
    fn context_value(&self, key: &str) -> Option<&ContextValue>;
}

/// Extracts and coerces a named value from one medium.
pub trait ParamSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Non-empty text.
    fn get_string(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<String>>;

    /// List of strings.
    fn get_string_list(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Vec<String>>>;

    /// Integer; floating-point values are truncated toward zero.
    fn get_int(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<i64>>;

    /// Floating-point number; integers are widened.
    fn get_float(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<f64>>;

    /// Boolean.
    fn get_bool(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<bool>>;

    /// RFC 3339 timestamp.
    fn get_time(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Timestamp>>;

    /// Structural value, decoded by the caller.
    ///
    /// Sources without structured data keep the default, which reports nothing.
    fn get_object(&self, req: &dyn ParamInput, key: &str) -> RpcResult<Option<Value>> {
        let _ = (req, key);
        Ok(None)
    }
}
