//! Ergonomic macros for building and checking [`RpcError`](crate::RpcError)s.
//!
//! - [`macro@crate::rpc_error`] - Builds an error from a code, an optional formatted
//!   public message, and optional details.
//! - [`macro@crate::assert_rpc_error`] - Asserts that an error carries the expected code and
//!   public message.
//!
//! # Examples
//!
//! ```
//! use rpc_rail::{assert_rpc_error, rpc_error, Code};
//!
//! let user_id = 42;
//! let err = rpc_error!(Code::NotFound, "user {user_id} not found"; "user_id" => user_id);
//!
//! assert_rpc_error!(err, Code::NotFound, "user 42 not found");
//! assert_eq!(err.details()["user_id"], 42);
//! ```

/// Builds an [`RpcError`](crate::RpcError).
///
/// # Syntax
///
/// - `rpc_error!(code)` - no public message; displays as the code name
/// - `rpc_error!(code, "fmt", args..)` - formatted public message
/// - `rpc_error!(code, "fmt", args..; key => value, ..)` - with details (first write wins)
///
/// # Examples
///
/// ```
/// use rpc_rail::{rpc_error, Code};
///
/// let err = rpc_error!(Code::Unavailable);
/// assert_eq!(err.to_string(), "Unavailable");
///
/// let err = rpc_error!(Code::ResourceLocked, "order {} is being edited", 7; "order" => 7, "by" => "june");
/// assert_eq!(err.to_string(), "order 7 is being edited");
/// assert_eq!(err.details()["by"], "june");
/// ```
#[macro_export]
macro_rules! rpc_error {
    ($code:expr $(,)?) => {
        $crate::RpcError::new($code, "")
    };
    ($code:expr, $fmt:literal $(, $arg:expr)* $(; $($key:expr => $value:expr),+ $(,)?)?) => {{
        let err = $crate::RpcError::new($code, ::std::format!($fmt $(, $arg)*));
        $($(let err = err.add($key, $value);)+)?
        err
    }};
}

/// Asserts that an error has the expected code and public message.
///
/// Errors that are not [`RpcError`](crate::RpcError)s only match
/// [`Code::Unknown`](crate::Code::Unknown) with their `Display` text. Panics with both
/// sides on mismatch; see [`check_rpc_error`](crate::testing::check_rpc_error) for the
/// non-panicking form.
///
/// ```
/// use rpc_rail::{assert_rpc_error, Code};
///
/// let err = "42x".parse::<i32>().unwrap_err();
/// assert_rpc_error!(err, Code::Unknown, "invalid digit found in string");
/// ```
#[macro_export]
macro_rules! assert_rpc_error {
    ($err:expr, $code:expr, $message:expr $(,)?) => {
        if let ::std::result::Result::Err(mismatch) =
            $crate::testing::check_rpc_error(&$err, $code, $message)
        {
            ::std::panic!("{}", mismatch);
        }
    };
}
