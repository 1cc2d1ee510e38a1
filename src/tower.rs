//! Tower integration for rpc-rail.
//!
//! This module provides:
//! - a [`Service`] implementation for [`Dispatcher`], so a handler can be mounted in any
//!   tower-based server
//! - [`ContextLayer`], which seeds the [`RequestContext`] read by
//!   [`FromContext`](crate::source::FromContext)
//!
//! # Feature Flag
//!
//! Requires the `tower` feature:
//!
//! ```toml
//! [dependencies]
//! rpc-rail = { version = "0.1", features = ["tower"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rpc_rail::dispatch::{DispatchConfig, Dispatcher};
//! use rpc_rail::tower::ContextLayer;
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(ContextLayer::new(|parts: &http::request::Parts| {
//!         RequestContext::new().with("path", parts.uri.path())
//!     }))
//!     .service(Dispatcher::new(get_user, DispatchConfig::default()));
//! ```

use core::convert::Infallible;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use http::request::Parts;
use http_body::Body;
use tower::{Layer, Service};

use crate::dispatch::{Dispatcher, Handler, HttpResponse};
use crate::request::RequestContext;
use crate::types::BoxError;

/// Boxed future returned by the [`Dispatcher`] service.
pub type DispatchFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Infallible>> + Send>>;

impl<H, B> Service<http::Request<B>> for Dispatcher<H>
where
    H: Handler,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = HttpResponse;
    type Error = Infallible;
    type Future = DispatchFuture;

    #[inline]
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { Ok(dispatcher.dispatch(req).await) })
    }
}

/// A Tower [`Layer`] that stores a [`RequestContext`] in each request's extensions.
///
/// `seed` builds the values from the request head. They are merged into any context an
/// outer layer already stored, overwriting equal keys.
#[derive(Clone, Debug)]
pub struct ContextLayer<F> {
    seed: F,
}

impl<F> ContextLayer<F>
where
    F: Fn(&Parts) -> RequestContext + Clone,
{
    #[inline]
    pub const fn new(seed: F) -> Self {
        Self { seed }
    }
}

impl ContextLayer<()> {
    /// Layer storing the same values on every request.
    pub fn fixed(context: RequestContext) -> ContextLayer<impl Fn(&Parts) -> RequestContext + Clone> {
        ContextLayer::new(move |_: &Parts| context.clone())
    }
}

impl<S, F: Clone> Layer<S> for ContextLayer<F> {
    type Service = ContextService<S, F>;

    #[inline]
    fn layer(&self, inner: S) -> Self::Service {
        ContextService { inner, seed: self.seed.clone() }
    }
}

/// A Tower [`Service`] that seeds the [`RequestContext`]; created by [`ContextLayer`].
#[derive(Clone, Debug)]
pub struct ContextService<S, F> {
    inner: S,
    seed: F,
}

impl<S, F> ContextService<S, F> {
    /// Returns a reference to the inner service.
    #[inline]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Consumes the wrapper and returns the inner service.
    #[inline]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, F, B> Service<http::Request<B>> for ContextService<S, F>
where
    S: Service<http::Request<B>>,
    F: Fn(&Parts) -> RequestContext,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let (mut parts, body) = req.into_parts();
        let seeded = (self.seed)(&parts);
        match parts.extensions.get_mut::<RequestContext>() {
            Some(existing) => existing.extend(seeded),
            None => {
                parts.extensions.insert(seeded);
            },
        }
        self.inner.call(http::Request::from_parts(parts, body))
    }
}
