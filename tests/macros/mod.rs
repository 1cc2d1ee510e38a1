use rpc_rail::testing::{check_rpc_error, ErrorMismatch};
use rpc_rail::{assert_rpc_error, rpc_error, Code, RpcError};

#[test]
fn rpc_error_with_code_only() {
    let err = rpc_error!(Code::PermissionDenied);

    assert_eq!(err.code(), Code::PermissionDenied);
    assert_eq!(err.message(), "");
    assert_eq!(err.to_string(), "PermissionDenied");
    assert!(err.details().is_empty());
}

#[test]
fn rpc_error_formats_message() {
    let limit = 10;
    let err = rpc_error!(Code::OutOfRange, "page size above {limit}");
    assert_eq!(err.message(), "page size above 10");

    let err = rpc_error!(Code::OutOfRange, "page size {} above {}", 50, limit);
    assert_eq!(err.message(), "page size 50 above 10");
}

#[test]
fn rpc_error_collects_details() {
    let err = rpc_error!(Code::InvalidArgument, "bad email"; "field" => "email", "field" => "other", "attempt" => 3);

    assert_eq!(err.details()["field"], "email");
    assert_eq!(err.details()["attempt"], 3);
    assert_eq!(err.details().len(), 2);
}

#[test]
fn assert_rpc_error_accepts_plain_errors() {
    let err = std::io::Error::other("disk full");
    assert_rpc_error!(err, Code::Unknown, "disk full");
}

#[test]
#[should_panic(expected = "expected NotFound error \"gone\", got Internal error \"Internal\"")]
fn assert_rpc_error_panics_on_mismatch() {
    let err = RpcError::new(Code::Internal, "");
    assert_rpc_error!(err, Code::NotFound, "gone");
}

#[test]
fn check_rpc_error_reports_both_sides() {
    let err = rpc_error!(Code::Unavailable, "try later");

    let mismatch = check_rpc_error(&err, Code::Unavailable, "try again").unwrap_err();
    assert_eq!(
        mismatch,
        ErrorMismatch {
            expected_code: Code::Unavailable,
            expected_message: "try again".to_owned(),
            actual_code: Code::Unavailable,
            actual_message: "try later".to_owned(),
        }
    );
}
