//! Rendering of call outcomes as HTTP responses.
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use http::StatusCode;
use http_body_util::Full;

use crate::types::{Payload, Response, RpcError};

/// HTTP response produced by dispatch.
pub type HttpResponse = http::Response<Full<Bytes>>;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

fn with_body(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> HttpResponse {
    let mut response = HttpResponse::new(Full::new(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Transport-level rejection: plain-text body, no structured error.
pub fn plain_text(status: StatusCode, text: &'static str) -> HttpResponse {
    with_body(status, TEXT_CONTENT_TYPE, Bytes::from_static(text.as_bytes()))
}

/// Error response: `{"code": "<Name>", "error": "<text>"}` with the code's HTTP status.
pub fn failure(err: &RpcError) -> HttpResponse {
    let body = match serde_json::to_vec(&err.body()) {
        Ok(body) => body,
        Err(encode_err) => {
            tracing::warn!(error = %encode_err, "failed to encode error body");
            Vec::new()
        },
    };
    with_body(err.http_status(), JSON_CONTENT_TYPE, body)
}

/// Success response: extra headers, then either the redirect or the payload.
pub fn success(response: Response, handler: &str) -> HttpResponse {
    let (payload, headers, redirect) = response.into_parts();

    let mut out = if let Some(redirect) = redirect {
        match HeaderValue::try_from(redirect.path()) {
            Ok(location) => {
                let mut out = HttpResponse::new(Full::default());
                *out.status_mut() = redirect.status();
                out.headers_mut().insert(LOCATION, location);
                out
            },
            Err(err) => {
                tracing::warn!(handler, path = redirect.path(), error = %err, "invalid redirect location");
                let mut out = HttpResponse::new(Full::default());
                *out.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                out
            },
        }
    } else {
        render_payload(payload, handler)
    };

    let target = out.headers_mut();
    for (name, value) in headers.iter() {
        if *name == CONTENT_TYPE {
            target.insert(name, value.clone());
        } else {
            target.append(name, value.clone());
        }
    }
    out
}

fn render_payload(payload: Payload, handler: &str) -> HttpResponse {
    match payload {
        Payload::Empty => with_body(StatusCode::OK, JSON_CONTENT_TYPE, Bytes::from_static(b"{}")),
        Payload::Json(value) => match serde_json::to_vec(&value) {
            Ok(body) => with_body(StatusCode::OK, JSON_CONTENT_TYPE, body),
            Err(err) => {
                tracing::warn!(handler, error = %err, "failed to encode response payload");
                with_body(StatusCode::OK, JSON_CONTENT_TYPE, Bytes::new())
            },
        },
        Payload::Text(text) => with_body(StatusCode::OK, TEXT_CONTENT_TYPE, text),
        Payload::Bytes(bytes) => with_body(StatusCode::OK, TEXT_CONTENT_TYPE, bytes),
        Payload::Unencodable(reason) => {
            tracing::warn!(handler, error = %reason, "failed to encode response payload");
            with_body(StatusCode::OK, JSON_CONTENT_TYPE, Bytes::new())
        },
    }
}
