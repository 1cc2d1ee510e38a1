//! Side-channel reporting of failed calls.
use tracing::Level;

use crate::request::Request;
use crate::types::RpcError;

/// Called once per failed call, after the response is computed.
///
/// Hooks cannot change the response. A panicking hook is caught and logged.
///
/// Any `Fn(&Request, &RpcError)` closure is a hook:
///
/// ```
/// use rpc_rail::dispatch::DispatchConfig;
/// use rpc_rail::{Request, RpcError};
///
/// let config = DispatchConfig::builder()
///     .error_hook(|req: &Request, err: &RpcError| eprintln!("{} failed: {err}", req.handler_name()))
///     .build()
///     .unwrap();
/// # let _ = config;
/// ```
pub trait ErrorHook: Send + Sync {
    fn on_error(&self, req: &Request, err: &RpcError);
}

impl<F> ErrorHook for F
where
    F: Fn(&Request, &RpcError) + Send + Sync,
{
    #[inline]
    fn on_error(&self, req: &Request, err: &RpcError) {
        self(req, err)
    }
}

/// Default hook: logs through `tracing`.
///
/// 5xx errors log at `ERROR`, the rest at `WARN`. The handler-scoped traceback follows at
/// `DEBUG`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorHook;

impl ErrorHook for TracingErrorHook {
    fn on_error(&self, req: &Request, err: &RpcError) {
        let handler = req.handler_name();
        let cause = err.cause().map(ToString::to_string);
        let details = serde_json::to_string(err.details()).unwrap_or_default();

        if err.http_status().is_server_error() {
            tracing::error!(
                handler,
                code = %err.code(),
                message = err.message(),
                cause = cause.as_deref(),
                details = %details,
                "rpc call failed"
            );
        } else {
            tracing::warn!(
                handler,
                code = %err.code(),
                message = err.message(),
                cause = cause.as_deref(),
                details = %details,
                "rpc call failed"
            );
        }

        if tracing::enabled!(Level::DEBUG) {
            let traceback = err.traceback(handler.to_owned());
            let records = serde_json::to_string(&traceback).unwrap_or_default();
            tracing::debug!(handler, traceback = %records, "rpc error traceback");
        }
    }
}
