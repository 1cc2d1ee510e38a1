use http::StatusCode;
use rpc_rail::types::code::{ordinal_http_status, ordinal_name};
use rpc_rail::Code;

#[test]
fn http_status_table_matches_wire_contract() {
    let expected = [
        (Code::Canceled, 408),
        (Code::Unknown, 500),
        (Code::InvalidArgument, 400),
        (Code::DeadlineExceeded, 408),
        (Code::NotFound, 404),
        (Code::AlreadyExists, 409),
        (Code::PermissionDenied, 403),
        (Code::ResourceExhausted, 403),
        (Code::FailedPrecondition, 412),
        (Code::Aborted, 409),
        (Code::OutOfRange, 400),
        (Code::Unimplemented, 501),
        (Code::Internal, 500),
        (Code::Unavailable, 503),
        (Code::DataLoss, 500),
        (Code::Unauthenticated, 401),
        (Code::MissingArgument, 400),
        (Code::ResourceLocked, 409),
    ];

    for (code, status) in expected {
        assert_eq!(code.base().http_status().as_u16(), status, "{code}");
    }
}

#[test]
fn extension_codes_map_to_base_codes() {
    assert_eq!(Code::MissingArgument.base(), Code::InvalidArgument);
    assert_eq!(Code::ResourceLocked.base(), Code::Aborted);
    for code in Code::ALL.iter().filter(|c| c.ordinal() <= 16) {
        assert_eq!(code.base(), *code);
    }
}

#[test]
fn names_round_trip_through_from_str() {
    for code in Code::ALL {
        assert_eq!(code.name().parse::<Code>().unwrap(), code);
        assert_eq!(code.to_string(), code.name());
    }
    assert!("NotACode".parse::<Code>().is_err());
    assert!("notfound".parse::<Code>().is_err());
}

#[test]
fn out_of_range_ordinals_degrade_gracefully() {
    assert_eq!(ordinal_name(5), "NotFound");
    assert_eq!(ordinal_name(0), "Code(0)");
    assert_eq!(ordinal_name(99), "Code(99)");
    assert_eq!(ordinal_http_status(99), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ordinal_http_status(17), StatusCode::BAD_REQUEST);
    assert!(Code::try_from(0u32).is_err());
    assert_eq!(Code::try_from(18u32), Ok(Code::ResourceLocked));
}

#[test]
fn serde_uses_canonical_names() {
    assert_eq!(serde_json::to_string(&Code::MissingArgument).unwrap(), r#""MissingArgument""#);
    let code: Code = serde_json::from_str(r#""PermissionDenied""#).unwrap();
    assert_eq!(code, Code::PermissionDenied);
    assert!(serde_json::from_str::<Code>(r#""Teapot""#).is_err());
}
