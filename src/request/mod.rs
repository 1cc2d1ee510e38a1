//! Per-call request object handed to handlers.
//!
//! A [`Request`] owns everything read off the wire for one call: the HTTP head, the full
//! body, the parsed form fields, the request-scoped [`RequestContext`], and the
//! [`HandlerDescriptor`] of the handler it is dispatched to. Cloning is cheap; all state
//! is shared behind an `Arc`.
//!
//! Typed parameters are resolved through [`ParamSource`]s; see the `get_*` methods in
//! [`resolve`].
//!
//! # Examples
//!
//! ```
//! use rpc_rail::source::{FromBody, FromForm};
//! use rpc_rail::Request;
//! use serde_json::json;
//!
//! let req = Request::builder()
//!     .uri("/users?limit=20")
//!     .json(&json!({ "name": "June" }))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(req.get_string("name", &[&FromBody, &FromForm]).unwrap(), "June");
//! assert_eq!(req.get_int("limit", &[&FromBody, &FromForm]).unwrap(), 20);
//! ```
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE, HOST};
use http::request::Parts;
use http::{Extensions, Method, Uri};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::dispatch::HandlerDescriptor;
use crate::source::{default_sources, SourceList};
use crate::traits::{ParamInput, ParamSource};
use crate::types::{BoxError, Code, RpcError, RpcResult};

pub mod context;
pub mod resolve;

pub use context::{ContextValue, RemoteAddr, RequestContext};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Failures while turning an HTTP request into a [`Request`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("error in parsing form")]
    Form(#[source] serde_urlencoded::de::Error),
    #[error("invalid request: {0}")]
    Http(#[from] http::Error),
    #[error("error in encoding request body")]
    Encode(#[source] BoxError),
}

/// One inbound call, as seen by a handler.
#[derive(Clone)]
pub struct Request {
    inner: Arc<Inner>,
}

struct Inner {
    parts: Parts,
    body: Bytes,
    form: Vec<(String, String)>,
    body_map: OnceLock<Map<String, Value>>,
    context: RequestContext,
    handler: Option<Arc<HandlerDescriptor>>,
    default_sources: SourceList,
}

impl Request {
    /// Starts building a request by hand, e.g. for tests.
    #[inline]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Builds a request from an HTTP head and its fully-read body.
    ///
    /// Form fields come from a `application/x-www-form-urlencoded` body first, then from
    /// the query string. A [`RequestContext`] found in the extensions is moved into the
    /// request.
    pub fn from_parts(
        mut parts: Parts,
        body: Bytes,
        handler: Option<Arc<HandlerDescriptor>>,
        default_sources: SourceList,
    ) -> Result<Self, RequestError> {
        let form = parse_form(&parts, &body).map_err(RequestError::Form)?;
        let context = parts.extensions.remove::<RequestContext>().unwrap_or_default();
        let inner = Inner {
            parts,
            body,
            form,
            body_map: OnceLock::new(),
            context,
            handler,
            default_sources,
        };
        Ok(Self { inner: Arc::new(inner) })
    }

    /// Fully-qualified name of the handler serving this call; empty outside dispatch.
    pub fn handler_name(&self) -> &str {
        self.inner.handler.as_deref().map(HandlerDescriptor::name).unwrap_or("")
    }

    /// Descriptor of the handler serving this call.
    #[inline]
    pub fn handler(&self) -> Option<&HandlerDescriptor> {
        self.inner.handler.as_deref()
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.inner.parts.method
    }

    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.inner.parts.uri
    }

    /// Host from the `Host` header, falling back to the URI authority.
    pub fn host(&self) -> Option<&str> {
        self.header(HOST.as_str()).or_else(|| self.inner.parts.uri.host())
    }

    /// IP of the peer, when the server recorded a [`RemoteAddr`].
    pub fn remote_ip(&self) -> Option<IpAddr> {
        self.inner.parts.extensions.get::<RemoteAddr>().map(|addr| addr.0.ip())
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.parts.headers
    }

    /// First value of header `name`, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.parts.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Names of the headers present, each listed once.
    pub fn header_keys(&self) -> Vec<&str> {
        self.inner.parts.headers.keys().map(HeaderName::as_str).collect()
    }

    /// Value of cookie `name`.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies().find_map(|(key, value)| (key == name).then_some(value))
    }

    /// Names of the cookies sent, in header order.
    pub fn cookie_names(&self) -> Vec<&str> {
        self.cookies().map(|(key, _)| key).collect()
    }

    fn cookies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|line| line.split(';'))
            .filter_map(|pair| {
                let (key, value) = pair.trim().split_once('=')?;
                Some((key.trim(), value.trim().trim_matches('"')))
            })
    }

    /// Raw request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.inner.body
    }

    /// Body decoded as a JSON object, decoded once.
    ///
    /// An empty body, a body that is not JSON, and a JSON value that is not an object all
    /// give an empty map. Use [`body_to`](Self::body_to) for strict decoding.
    pub fn body_map(&self) -> &Map<String, Value> {
        self.inner.body_map.get_or_init(|| {
            if self.inner.body.is_empty() {
                return Map::new();
            }
            match serde_json::from_slice::<Value>(&self.inner.body) {
                Ok(Value::Object(map)) => map,
                Ok(_) => Map::new(),
                Err(err) => {
                    tracing::debug!(handler = self.handler_name(), error = %err, "request body is not a JSON object");
                    Map::new()
                },
            }
        })
    }

    /// Decodes the whole body into `T`.
    ///
    /// # Errors
    ///
    /// [`Code::InvalidArgument`] with `request body is not a valid json` when decoding fails.
    pub fn body_to<T>(&self) -> RpcResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(&self.inner.body).map_err(|err| {
            RpcError::with_cause(Code::InvalidArgument, "request body is not a valid json", err)
        })
    }

    /// First value of form field `key` (body fields before query parameters).
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.inner.form.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    /// Every form field, body fields first.
    #[inline]
    pub fn form(&self) -> &[(String, String)] {
        &self.inner.form
    }

    /// Request-scoped values.
    #[inline]
    pub fn context(&self) -> &RequestContext {
        &self.inner.context
    }

    #[inline]
    pub fn extensions(&self) -> &Extensions {
        &self.inner.parts.extensions
    }

    /// Sources used when a `get_*` call passes an empty source list.
    #[inline]
    pub fn default_sources(&self) -> &[Arc<dyn ParamSource>] {
        &self.inner.default_sources
    }

    /// Diagnostic snapshot of the request with the `Authorization` header redacted.
    ///
    /// Keys: `url`, `header`, `form`, `bodyMap`, `remoteIP`.
    pub fn full_map(&self) -> Value {
        let mut header = Map::new();
        for name in self.inner.parts.headers.keys() {
            let value = if *name == AUTHORIZATION {
                Value::from("[REMOVED]")
            } else {
                self.inner
                    .parts
                    .headers
                    .get_all(name)
                    .iter()
                    .map(|value| Value::from(String::from_utf8_lossy(value.as_bytes()).into_owned()))
                    .collect()
            };
            header.insert(name.as_str().to_owned(), value);
        }

        let mut form = Map::new();
        for (key, value) in &self.inner.form {
            let entry = form.entry(key.clone()).or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(values) = entry {
                values.push(Value::from(value.as_str()));
            }
        }

        let remote_ip = self.remote_ip().map(|ip| ip.to_string()).unwrap_or_default();
        serde_json::json!({
            "url": self.inner.parts.uri.to_string(),
            "header": header,
            "form": form,
            "bodyMap": self.body_map(),
            "remoteIP": remote_ip,
        })
    }
}

impl ParamInput for Request {
    fn body_map(&self) -> RpcResult<&Map<String, Value>> {
        Ok(Request::body_map(self))
    }

    fn form_value(&self, key: &str) -> Option<&str> {
        Request::form_value(self, key)
    }

    fn context_value(&self, key: &str) -> Option<&ContextValue> {
        self.inner.context.get(key)
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("handler", &self.handler_name())
            .field("method", &self.inner.parts.method)
            .field("uri", &self.inner.parts.uri)
            .field("body_len", &self.inner.body.len())
            .finish()
    }
}

fn is_form_body(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn parse_form(parts: &Parts, body: &Bytes) -> Result<Vec<(String, String)>, serde_urlencoded::de::Error> {
    let mut form = Vec::new();
    if is_form_body(&parts.headers) {
        form.extend(serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)?);
    }
    if let Some(query) = parts.uri.query() {
        form.extend(serde_urlencoded::from_str::<Vec<(String, String)>>(query)?);
    }
    Ok(form)
}

/// Hand-built [`Request`], mainly for tests and tools.
///
/// Head fields go through [`http::request::Builder`], so invalid values surface from
/// [`build`](Self::build).
#[derive(Default)]
pub struct RequestBuilder {
    head: http::request::Builder,
    body: Bytes,
    context: Option<RequestContext>,
    handler: Option<Arc<HandlerDescriptor>>,
    default_sources: Option<SourceList>,
    error: Option<RequestError>,
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Option<Vec<&str>> =
            self.default_sources.as_ref().map(|list| list.iter().map(|s| s.name()).collect());
        f.debug_struct("RequestBuilder")
            .field("head", &self.head)
            .field("body_len", &self.body.len())
            .field("context", &self.context)
            .field("handler", &self.handler.as_ref().map(|h| h.name()))
            .field("default_sources", &sources)
            .field("error", &self.error)
            .finish()
    }
}

impl RequestBuilder {
    pub fn method<T>(mut self, method: T) -> Self
    where
        Method: TryFrom<T>,
        <Method as TryFrom<T>>::Error: Into<http::Error>,
    {
        self.head = self.head.method(method);
        self
    }

    pub fn uri<T>(mut self, uri: T) -> Self
    where
        Uri: TryFrom<T>,
        <Uri as TryFrom<T>>::Error: Into<http::Error>,
    {
        self.head = self.head.uri(uri);
        self
    }

    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.head = self.head.header(key, value);
        self
    }

    /// Raw body, sent as-is.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// JSON-encodes `data` as the body and sets the content type.
    pub fn json<T>(mut self, data: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_vec(data) {
            Ok(body) => self.body = body.into(),
            Err(err) => self.error = Some(RequestError::Encode(err.into())),
        }
        self.header(CONTENT_TYPE, "application/json")
    }

    /// URL-encodes `fields` as a form body and sets the content type.
    pub fn form<T>(mut self, fields: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        match serde_urlencoded::to_string(fields) {
            Ok(body) => self.body = body.into(),
            Err(err) => self.error = Some(RequestError::Encode(err.into())),
        }
        self.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
    }

    /// Request-scoped values read by the context source.
    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.head = self.head.extension(RemoteAddr(addr));
        self
    }

    /// Binds the request to a handler, as dispatch would.
    pub fn handler(mut self, handler: HandlerDescriptor) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Overrides the fallback sources (body, form, context).
    pub fn default_sources(mut self, sources: SourceList) -> Self {
        self.default_sources = Some(sources);
        self
    }

    pub fn build(self) -> Result<Request, RequestError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let (mut parts, ()) = self.head.body(())?.into_parts();
        if let Some(context) = self.context {
            parts.extensions.insert(context);
        }
        let sources = self.default_sources.unwrap_or_else(default_sources);
        Request::from_parts(parts, self.body, self.handler, sources)
    }
}
