//! Status code taxonomy shared by errors, HTTP responses, and gRPC-style wire formats.
//!
//! [`Code`] is the closed set of gRPC status codes (minus `OK`) extended with two
//! domain codes, [`Code::MissingArgument`] and [`Code::ResourceLocked`]. Every code has a
//! canonical name used both in logs and in the `"code"` field of error response bodies.
//!
//! Extension codes collapse onto a *base* code for consumers that only understand the
//! standard code space:
//!
//! | Extension | Base |
//! |-----------|------|
//! | `MissingArgument` | `InvalidArgument` |
//! | `ResourceLocked` | `Aborted` |
//!
//! # Examples
//!
//! ```
//! use rpc_rail::Code;
//! use http::StatusCode;
//!
//! assert_eq!(Code::MissingArgument.name(), "MissingArgument");
//! assert_eq!(Code::MissingArgument.base(), Code::InvalidArgument);
//! assert_eq!(Code::MissingArgument.http_status(), StatusCode::BAD_REQUEST);
//! assert_eq!(rpc_rail::types::code::ordinal_name(42), "Code(42)");
//! ```
use core::fmt;
use core::str::FromStr;
use std::borrow::Cow;

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status code carried by every [`RpcError`](crate::RpcError).
///
/// Discriminants follow the gRPC numbering; the extensions continue after `Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Code {
    Canceled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
    /// A required input parameter was not given by any source, or was given empty.
    MissingArgument = 17,
    /// The resource is busy or temporarily locked by another request.
    ResourceLocked = 18,
}

impl Code {
    /// Every code, in ordinal order.
    pub const ALL: [Code; 18] = [
        Code::Canceled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
        Code::MissingArgument,
        Code::ResourceLocked,
    ];

    /// Canonical name, as written to logs and to the `"code"` field on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Code::Canceled => "Canceled",
            Code::Unknown => "Unknown",
            Code::InvalidArgument => "InvalidArgument",
            Code::DeadlineExceeded => "DeadlineExceeded",
            Code::NotFound => "NotFound",
            Code::AlreadyExists => "AlreadyExists",
            Code::PermissionDenied => "PermissionDenied",
            Code::ResourceExhausted => "ResourceExhausted",
            Code::FailedPrecondition => "FailedPrecondition",
            Code::Aborted => "Aborted",
            Code::OutOfRange => "OutOfRange",
            Code::Unimplemented => "Unimplemented",
            Code::Internal => "Internal",
            Code::Unavailable => "Unavailable",
            Code::DataLoss => "DataLoss",
            Code::Unauthenticated => "Unauthenticated",
            Code::MissingArgument => "MissingArgument",
            Code::ResourceLocked => "ResourceLocked",
        }
    }

    /// Numeric ordinal of the code.
    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> u32 {
        self as u32
    }

    /// Maps extension codes onto the standard code they are compatible with.
    ///
    /// Standard codes map to themselves.
    #[must_use]
    pub const fn base(self) -> Code {
        match self {
            Code::MissingArgument => Code::InvalidArgument,
            Code::ResourceLocked => Code::Aborted,
            other => other,
        }
    }

    /// HTTP status an error with this code is reported with.
    #[must_use]
    pub const fn http_status(self) -> StatusCode {
        match self {
            Code::InvalidArgument | Code::OutOfRange | Code::MissingArgument => {
                StatusCode::BAD_REQUEST
            },
            Code::Unauthenticated => StatusCode::UNAUTHORIZED,
            Code::PermissionDenied | Code::ResourceExhausted => StatusCode::FORBIDDEN,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::Canceled | Code::DeadlineExceeded => StatusCode::REQUEST_TIMEOUT,
            Code::AlreadyExists | Code::Aborted | Code::ResourceLocked => StatusCode::CONFLICT,
            Code::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
            Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Code::Unknown | Code::Internal | Code::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Looks a code up by ordinal.
    #[must_use]
    pub fn from_ordinal(ordinal: u32) -> Option<Code> {
        Code::ALL.iter().copied().find(|code| code.ordinal() == ordinal)
    }

    /// Looks a code up by canonical name (case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Code> {
        Code::ALL.iter().copied().find(|code| code.name() == name)
    }
}

/// Name for a raw ordinal, degrading to `Code(N)` outside the known range.
///
/// Never fails, so that logging a corrupt code value can not itself fail.
#[must_use]
pub fn ordinal_name(ordinal: u32) -> Cow<'static, str> {
    match Code::from_ordinal(ordinal) {
        Some(code) => Cow::Borrowed(code.name()),
        None => Cow::Owned(format!("Code({ordinal})")),
    }
}

/// HTTP status for a raw ordinal; unknown ordinals map to `500`.
#[must_use]
pub fn ordinal_http_status(ordinal: u32) -> StatusCode {
    Code::from_ordinal(ordinal)
        .map_or(StatusCode::INTERNAL_SERVER_ERROR, |code| code.base().http_status())
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown code name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status code name '{0}'")]
pub struct UnknownCode(pub String);

impl FromStr for Code {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Code::from_name(s).ok_or_else(|| UnknownCode(s.to_owned()))
    }
}

impl TryFrom<u32> for Code {
    type Error = u32;

    #[inline]
    fn try_from(ordinal: u32) -> Result<Self, Self::Error> {
        Code::from_ordinal(ordinal).ok_or(ordinal)
    }
}

impl From<Code> for u32 {
    #[inline]
    fn from(code: Code) -> Self {
        code.ordinal()
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = Cow::<'de, str>::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
