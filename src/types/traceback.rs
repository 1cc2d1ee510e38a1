//! Call-stack snapshots attached to every [`RpcError`](crate::RpcError).
//!
//! A [`Traceback`] records raw instruction pointers when the error is built and only
//! resolves them to symbols when [`Traceback::records`] is first called. Resolution can be
//! scoped to a handler boundary: frames are collected from the point of failure up to and
//! including the first frame belonging to that handler, so a handler's diagnostics never
//! show the dispatch machinery above it.
//!
//! # Examples
//!
//! ```
//! use rpc_rail::Traceback;
//!
//! let traceback = Traceback::capture();
//! assert!(!traceback.callers().is_empty());
//! for record in traceback.records() {
//!     let _ = (record.file(), record.function(), record.line());
//! }
//! ```
use std::borrow::Cow;
use std::ffi::c_void;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::Serialize;

/// Upper bound on raw frames captured per traceback.
pub const MAX_DEPTH: usize = 64;

/// Leading frames under these paths belong to the capture machinery and are dropped.
const INTERNAL_PATHS: [&str; 6] = [
    "backtrace::",
    "rpc_rail::types::traceback::",
    "rpc_rail::types::rpc_error::",
    "rpc_rail::traits::result_ext::",
    "core::result::Result<",
    "core::option::Option<",
];

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TracebackRecord {
    file: String,
    function: String,
    #[serde(rename = "functionLocal")]
    function_local: String,
    line: u32,
}

impl TracebackRecord {
    /// Builds a record from already-resolved parts.
    pub fn new(file: impl Into<String>, function: impl Into<String>, line: u32) -> Self {
        let function = function.into();
        let function_local = local_function_name(&function).to_owned();
        Self { file: file.into(), function, function_local, line }
    }

    /// Source file of the frame, empty when debug info is unavailable.
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Fully-qualified function path, e.g. `my_service::users::get_user`.
    #[inline]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Last path segment of [`function`](Self::function).
    #[inline]
    pub fn function_local(&self) -> &str {
        &self.function_local
    }

    /// Source line, `0` when unknown.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }
}

/// Returns the last `::`-separated segment of a function path, skipping closure markers.
///
/// An empty path yields an empty string.
///
/// ```
/// use rpc_rail::types::traceback::local_function_name;
///
/// assert_eq!(local_function_name("svc::users::get_user"), "get_user");
/// assert_eq!(local_function_name("svc::users::get_user::{{closure}}"), "get_user");
/// assert_eq!(local_function_name(""), "");
/// ```
#[must_use]
pub fn local_function_name(function: &str) -> &str {
    function
        .rsplit("::")
        .find(|segment| !segment.is_empty() && !segment.starts_with("{{"))
        .unwrap_or("")
}

/// Lazily-resolved call stack captured at error construction.
///
/// Cloning is cheap: raw frames are shared, and the resolution cache is copied.
#[derive(Clone)]
pub struct Traceback {
    callers: Arc<[usize]>,
    handler_name: Option<Cow<'static, str>>,
    records: OnceLock<Arc<[TracebackRecord]>>,
}

impl Traceback {
    /// Captures the current call stack, up to [`MAX_DEPTH`] frames.
    #[inline(never)]
    #[must_use]
    pub fn capture() -> Self {
        let mut callers = Vec::with_capacity(16);
        backtrace::trace(|frame| {
            callers.push(frame.ip() as usize);
            callers.len() < MAX_DEPTH
        });
        Self::from_callers(callers)
    }

    /// Wraps an already-captured instruction-pointer sequence.
    #[must_use]
    pub fn from_callers(callers: Vec<usize>) -> Self {
        Self { callers: callers.into(), handler_name: None, records: OnceLock::new() }
    }

    /// Raw instruction pointers, innermost first.
    #[inline]
    pub fn callers(&self) -> &[usize] {
        &self.callers
    }

    /// Handler boundary resolution stops at, if any.
    #[inline]
    pub fn handler_name(&self) -> Option<&str> {
        self.handler_name.as_deref()
    }

    /// Re-scopes resolution to stop at `handler_name`.
    ///
    /// Changing the boundary drops any cached records.
    pub fn set_handler_name<N>(&mut self, handler_name: N)
    where
        N: Into<Cow<'static, str>>,
    {
        self.rescope(Some(handler_name.into()));
    }

    /// Removes the handler boundary so the full captured depth resolves.
    pub fn clear_handler_name(&mut self) {
        self.rescope(None);
    }

    /// Returns a copy of this traceback scoped to `handler_name`.
    #[must_use]
    pub fn scoped<N>(&self, handler_name: N) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        let mut scoped = self.clone();
        scoped.set_handler_name(handler_name);
        scoped
    }

    fn rescope(&mut self, handler_name: Option<Cow<'static, str>>) {
        if handler_name != self.handler_name {
            self.handler_name = handler_name;
            self.records = OnceLock::new();
        }
    }

    /// Resolved frames, innermost first, truncated at the handler boundary.
    ///
    /// Resolution runs once per boundary; frames without a symbol are skipped.
    pub fn records(&self) -> &[TracebackRecord] {
        self.records.get_or_init(|| self.resolve().into())
    }

    fn resolve(&self) -> Vec<TracebackRecord> {
        let mut records = Vec::with_capacity(self.callers.len());
        let mut leading = true;
        for &ip in self.callers.iter() {
            let Some(record) = resolve_ip(ip) else {
                continue;
            };
            if leading && INTERNAL_PATHS.iter().any(|p| record.function.contains(p)) {
                continue;
            }
            leading = false;
            let at_boundary = self
                .handler_name
                .as_deref()
                .is_some_and(|handler| is_handler_frame(&record.function, handler));
            records.push(record);
            if at_boundary {
                break;
            }
        }
        records
    }
}

/// True when `function` is the handler itself or its async body.
///
/// Closures nested deeper (`handler::{{closure}}::{{closure}}`) are not the boundary.
fn is_handler_frame(function: &str, handler: &str) -> bool {
    matches!(function.strip_prefix(handler), Some("" | "::{{closure}}"))
}

fn resolve_ip(ip: usize) -> Option<TracebackRecord> {
    let mut record = None;
    backtrace::resolve(ip as *mut c_void, |symbol| {
        if record.is_some() {
            return;
        }
        let Some(name) = symbol.name() else {
            return;
        };
        let function = format!("{name:#}");
        if function.is_empty() {
            return;
        }
        let file = symbol.filename().map(|p| p.display().to_string()).unwrap_or_default();
        record = Some(TracebackRecord::new(file, function, symbol.lineno().unwrap_or(0)));
    });
    record
}

impl fmt::Debug for Traceback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traceback")
            .field("depth", &self.callers.len())
            .field("handler_name", &self.handler_name)
            .field("resolved", &self.records.get().is_some())
            .finish()
    }
}

impl Serialize for Traceback {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records().serialize(serializer)
    }
}
