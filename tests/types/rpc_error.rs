use std::error::Error;
use std::io;

use rpc_rail::{Code, RpcError};
use serde_json::json;

#[test]
fn display_prefers_public_message() {
    let err = RpcError::new(Code::NotFound, "order not found");
    assert_eq!(err.to_string(), "order not found");
    assert_eq!(err.message(), "order not found");

    let err = RpcError::new(Code::NotFound, "");
    assert_eq!(err.to_string(), "NotFound");
    assert_eq!(err.message(), "");
}

#[test]
fn wrapping_a_structured_error_returns_it_unchanged() {
    let inner = RpcError::new(Code::InvalidArgument, "something is missing").add("field", "email");
    let callers = inner.raw_traceback().callers().to_vec();

    let outer = RpcError::with_cause(Code::Unavailable, "not sure what", inner);

    assert_eq!(outer.code(), Code::InvalidArgument);
    assert_eq!(outer.to_string(), "something is missing");
    assert_eq!(outer.details()["field"], "email");
    assert_eq!(outer.raw_traceback().callers(), callers.as_slice());
    assert!(outer.cause().is_none());
}

#[test]
fn wrapping_a_boxed_structured_error_unboxes_it() {
    let inner: Box<dyn Error + Send + Sync> = Box::new(RpcError::new(Code::AlreadyExists, "taken"));
    let outer = RpcError::wrap(inner);

    assert_eq!(outer.code(), Code::AlreadyExists);
    assert_eq!(outer.to_string(), "taken");
}

#[test]
fn wrapping_a_plain_error_keeps_it_as_cause() {
    let outer = RpcError::with_cause(Code::Unavailable, "", io::Error::other("connection reset"));

    assert_eq!(outer.code(), Code::Unavailable);
    assert_eq!(outer.to_string(), "Unavailable");
    assert_eq!(outer.cause().unwrap().to_string(), "connection reset");
    assert_eq!(outer.source().unwrap().to_string(), "connection reset");
}

#[test]
fn wrap_defaults_to_unknown() {
    let err = RpcError::wrap(io::Error::other("boom"));
    assert_eq!(err.code(), Code::Unknown);
    assert_eq!(err.to_string(), "Unknown");
}

#[test]
fn add_keeps_first_value() {
    let err = RpcError::new(Code::Internal, "").add("attempt", 1).add("attempt", 2).add("host", "db-1");

    assert_eq!(err.details()["attempt"], 1);
    assert_eq!(err.detail("host"), Some(&json!("db-1")));
    assert_eq!(err.details().len(), 2);
}

#[test]
fn insert_detail_reports_whether_it_wrote() {
    let mut err = RpcError::new(Code::Internal, "");
    assert!(err.insert_detail("k", vec![1, 2]));
    assert!(!err.insert_detail("k", "other"));
    assert_eq!(err.details()["k"], json!([1, 2]));
}

#[test]
fn grpc_code_uses_base_code() {
    assert_eq!(RpcError::new(Code::MissingArgument, "").grpc_code(), 3);
    assert_eq!(RpcError::new(Code::ResourceLocked, "").grpc_code(), 10);
    assert_eq!(RpcError::new(Code::NotFound, "").grpc_code(), 5);
}

#[test]
fn http_status_uses_base_code() {
    assert_eq!(RpcError::new(Code::ResourceLocked, "").http_status().as_u16(), 409);
    assert_eq!(RpcError::new(Code::MissingArgument, "").http_status().as_u16(), 400);
}

#[test]
fn traceback_is_scoped_per_call() {
    let err = RpcError::new(Code::Internal, "");
    let scoped = err.traceback("svc::handlers::create_order");

    assert_eq!(scoped.handler_name(), Some("svc::handlers::create_order"));
    assert_eq!(err.raw_traceback().handler_name(), None);
    assert_eq!(scoped.callers(), err.raw_traceback().callers());
}
