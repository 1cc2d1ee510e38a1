//! Panic recovery around handler execution.
use core::any::Any;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::panic::{catch_unwind, AssertUnwindSafe};

use futures_core::future::FusedFuture;
use pin_project_lite::pin_project;
use thiserror::Error;

/// Payload of a caught panic.
pub type PanicPayload = Box<dyn Any + Send + 'static>;

/// Cause attached to the `Internal` error reported for a panicking handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("handler {handler} panicked: {message}")]
pub struct PanicError {
    handler: String,
    message: String,
}

impl PanicError {
    pub fn new(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self { handler: handler.into(), message: message.into() }
    }

    /// Describes `payload`, which is usually a `&str` or `String` from `panic!`.
    pub fn from_payload(handler: impl Into<String>, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_owned()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::new(handler, message)
    }

    #[inline]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Text of the panic payload.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Runs `f`, turning a panic into `Err(payload)`.
pub(crate) fn catch<T>(f: impl FnOnce() -> T) -> Result<T, PanicPayload> {
    catch_unwind(AssertUnwindSafe(f))
}

pin_project! {
    /// Future that resolves to `Err(payload)` if polling the inner future panics.
    #[must_use = "futures do nothing unless polled"]
    pub struct CatchUnwind<F> {
        #[pin]
        inner: F,
        done: bool,
    }
}

impl<F> CatchUnwind<F> {
    #[inline]
    pub fn new(inner: F) -> Self {
        Self { inner, done: false }
    }
}

impl<F> Future for CatchUnwind<F>
where
    F: Future,
{
    type Output = Result<F::Output, PanicPayload>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let inner = this.inner;
        match catch(move || inner.poll(cx)) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(output)) => {
                *this.done = true;
                Poll::Ready(Ok(output))
            },
            Err(payload) => {
                *this.done = true;
                Poll::Ready(Err(payload))
            },
        }
    }
}

impl<F> FusedFuture for CatchUnwind<F>
where
    F: Future,
{
    #[inline]
    fn is_terminated(&self) -> bool {
        self.done
    }
}
