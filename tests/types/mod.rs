use rpc_rail::{Code, RpcError};

pub mod code;
pub mod response;
pub mod rpc_error;

#[test]
fn error_body_shows_code_name_for_empty_message() {
    let err = RpcError::new(Code::Unavailable, "");
    let body = serde_json::to_string(&err.body()).unwrap();

    assert_eq!(body, r#"{"code":"Unavailable","error":"Unavailable"}"#);
}

#[test]
fn error_body_never_contains_cause() {
    let cause = std::io::Error::other("disk /dev/sda1 is full");
    let err = RpcError::with_cause(Code::Internal, "", cause);
    let body = serde_json::to_string(&err.body()).unwrap();

    assert_eq!(body, r#"{"code":"Internal","error":"Internal"}"#);
    assert!(!body.contains("sda1"));
}
