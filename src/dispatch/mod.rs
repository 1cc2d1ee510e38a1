//! Adapts async handlers to HTTP.
//!
//! A [`Dispatcher`] serves one handler. Each call goes through:
//!
//! 1. **Received**: the body is read (up to the configured limit) and the form parsed.
//!    Failures here are plain-text `400` responses; no structured error is built.
//! 2. **Parsed**: a [`Request`] bound to the handler's [`HandlerDescriptor`] is created and
//!    the handler runs inside an `rpc` tracing span.
//! 3. **Failed**: returned errors, panics, and empty outcomes become an [`RpcError`] that is
//!    rendered as `{"code": .., "error": ..}` and then handed to the [`ErrorHook`].
//! 4. **Succeeded**: the [`Response`] is rendered (redirect, JSON, or verbatim text).
//!
//! # Examples
//!
//! ```
//! use rpc_rail::dispatch::{DispatchConfig, Dispatcher};
//! use rpc_rail::source::FromBody;
//! use rpc_rail::{Request, Response, RpcResult};
//! use serde_json::json;
//!
//! async fn greet(req: Request) -> RpcResult<Response> {
//!     let name = req.get_string("name", &[&FromBody])?;
//!     Ok(Response::json(&json!({ "greeting": format!("hello {name}") })))
//! }
//!
//! let dispatcher = Dispatcher::new(greet, DispatchConfig::default());
//! assert!(dispatcher.descriptor().name().ends_with("greet"));
//! ```
use std::any::type_name;
use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::StatusCode;
use http_body::Body;
use http_body_util::{BodyExt, Limited};
use pin_project_lite::pin_project;
use thiserror::Error;
use tracing::Instrument;

use crate::request::Request;
use crate::types::{BoxError, Code, Response, RpcError};

pub mod config;
pub mod hook;
pub mod panic;
pub mod respond;

pub use config::{ConfigError, DispatchConfig, DispatchConfigBuilder, DispatchSettings};
pub use hook::{ErrorHook, TracingErrorHook};
pub use panic::{CatchUnwind, PanicError};
pub use respond::HttpResponse;

/// What a handler produced: a response, nothing, or an error.
pub type Outcome = Result<Option<Response>, BoxError>;

/// Identity of a registered handler.
///
/// The name is the handler's fully-qualified Rust path; tracebacks of errors raised while
/// serving the handler stop at its frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerDescriptor {
    name: Cow<'static, str>,
}

impl HandlerDescriptor {
    /// Descriptor named after the type `H`.
    ///
    /// For a function item that is the function's path, e.g. `my_service::users::get_user`.
    pub fn of<H: ?Sized>() -> Self {
        Self { name: Cow::Borrowed(type_name::<H>()) }
    }

    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Handler return values the dispatcher understands.
///
/// Implemented for `Result<Response, E>` and `Result<Option<Response>, E>`; `Ok(None)`
/// is reported as an internal error.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl<E> IntoOutcome for Result<Response, E>
where
    E: Into<BoxError>,
{
    #[inline]
    fn into_outcome(self) -> Outcome {
        self.map(Some).map_err(Into::into)
    }
}

impl<E> IntoOutcome for Result<Option<Response>, E>
where
    E: Into<BoxError>,
{
    #[inline]
    fn into_outcome(self) -> Outcome {
        self.map_err(Into::into)
    }
}

/// Async request handler.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = R>` where `R: IntoOutcome`,
/// so plain `async fn`s are handlers.
pub trait Handler: Send + Sync + 'static {
    type Future: Future<Output = Outcome> + Send + 'static;

    fn call(&self, req: Request) -> Self::Future;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoOutcome,
{
    type Future = OutcomeFuture<Fut>;

    #[inline]
    fn call(&self, req: Request) -> Self::Future {
        OutcomeFuture { inner: self(req) }
    }
}

pin_project! {
    /// Future returned by function handlers; converts the output with [`IntoOutcome`].
    #[must_use = "futures do nothing unless polled"]
    pub struct OutcomeFuture<F> {
        #[pin]
        inner: F,
    }
}

impl<F> Future for OutcomeFuture<F>
where
    F: Future,
    F::Output: IntoOutcome,
{
    type Output = Outcome;

    #[inline]
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().inner.poll(cx).map(IntoOutcome::into_outcome)
    }
}

/// Cause reported when a handler returns `Ok(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("handler returned no response and no error")]
pub struct EmptyOutcome;

/// Serves one handler over HTTP.
///
/// Cloning is cheap; the handler and configuration are shared.
pub struct Dispatcher<H> {
    handler: Arc<H>,
    descriptor: Arc<HandlerDescriptor>,
    config: Arc<DispatchConfig>,
}

impl<H> Clone for Dispatcher<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            descriptor: Arc::clone(&self.descriptor),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H> std::fmt::Debug for Dispatcher<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handler", &self.descriptor.name())
            .field("config", &self.config)
            .finish()
    }
}

impl<H> Dispatcher<H>
where
    H: Handler,
{
    /// Registers `handler`, naming it after its type.
    pub fn new(handler: H, config: impl Into<Arc<DispatchConfig>>) -> Self {
        Self::with_descriptor(handler, HandlerDescriptor::of::<H>(), config)
    }

    /// Registers `handler` under an explicit descriptor.
    pub fn with_descriptor(
        handler: H,
        descriptor: HandlerDescriptor,
        config: impl Into<Arc<DispatchConfig>>,
    ) -> Self {
        tracing::debug!(handler = descriptor.name(), "registered rpc handler");
        Self { handler: Arc::new(handler), descriptor: Arc::new(descriptor), config: config.into() }
    }

    #[inline]
    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Serves one HTTP request.
    pub async fn dispatch<B>(&self, req: http::Request<B>) -> HttpResponse
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let span = tracing::info_span!("rpc", handler = self.descriptor.name());
        self.serve(req).instrument(span).await
    }

    async fn serve<B>(&self, req: http::Request<B>) -> HttpResponse
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let body = match Limited::new(body, self.config.max_body_bytes()).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                tracing::debug!(error = %err, "rejecting request: body could not be read");
                return respond::plain_text(StatusCode::BAD_REQUEST, "error in reading request body");
            },
        };

        let sources = self.config.default_sources().clone();
        let request = match Request::from_parts(parts, body, Some(Arc::clone(&self.descriptor)), sources) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(error = %err, "rejecting request: form could not be parsed");
                return respond::plain_text(StatusCode::BAD_REQUEST, "error in parsing form");
            },
        };

        match self.invoke(request.clone()).await {
            Ok(response) => respond::success(response, self.descriptor.name()),
            Err(err) => {
                let response = respond::failure(&err);
                self.report(&request, &err);
                response
            },
        }
    }

    /// Runs the handler on an already-built request, recovering panics.
    ///
    /// Every failure comes back as an [`RpcError`]: non-RPC errors are wrapped as
    /// [`Code::Unknown`], panics and `Ok(None)` become [`Code::Internal`].
    pub async fn invoke(&self, req: Request) -> Result<Response, RpcError> {
        let future = match panic::catch(|| self.handler.call(req)) {
            Ok(future) => future,
            Err(payload) => return Err(self.panicked(payload)),
        };
        match CatchUnwind::new(future).await {
            Ok(Ok(Some(response))) => Ok(response),
            Ok(Ok(None)) => Err(RpcError::with_cause(Code::Internal, "", EmptyOutcome)),
            Ok(Err(err)) => Err(self.structured(err)),
            Err(payload) => Err(self.panicked(payload)),
        }
    }

    fn structured(&self, err: BoxError) -> RpcError {
        if !err.is::<RpcError>() {
            tracing::warn!(handler = self.descriptor.name(), error = %err, "handler returned a non-rpc error");
        }
        RpcError::wrap(err)
    }

    fn panicked(&self, payload: panic::PanicPayload) -> RpcError {
        let cause = PanicError::from_payload(self.descriptor.name(), payload.as_ref());
        tracing::error!(handler = self.descriptor.name(), panic = cause.message(), "handler panicked");
        RpcError::with_cause(Code::Internal, "", cause)
    }

    fn report(&self, req: &Request, err: &RpcError) {
        let hook = self.config.hook();
        if panic::catch(|| hook.on_error(req, err)).is_err() {
            tracing::error!(handler = self.descriptor.name(), "error hook panicked");
        }
    }
}
