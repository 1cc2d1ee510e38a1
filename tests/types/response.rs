use http::header::{CACHE_CONTROL, SET_COOKIE};
use http::{HeaderValue, StatusCode};
use rpc_rail::{Payload, Redirect, Response};
use serde::ser::{Error as _, Serializer};
use serde::Serialize;
use serde_json::json;

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("cannot encode"))
    }
}

#[test]
fn json_payload_holds_encoded_value() {
    let res = Response::json(&json!({ "id": 7 }));
    assert_eq!(res.payload(), &Payload::Json(json!({ "id": 7 })));
    assert!(res.redirect_target().is_none());
}

#[test]
fn unencodable_data_is_recorded_not_raised() {
    let res = Response::json(&Unserializable);
    match res.payload() {
        Payload::Unencodable(reason) => assert!(reason.contains("cannot encode")),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn redirect_defaults_to_see_other() {
    let res = Response::redirect("/login");
    let redirect = res.redirect_target().unwrap();

    assert_eq!(redirect.path(), "/login");
    assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
    assert_eq!(Redirect::DEFAULT_STATUS, StatusCode::SEE_OTHER);

    let res = Response::redirect_with("/moved", StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.redirect_target().unwrap().status(), StatusCode::MOVED_PERMANENTLY);
}

#[test]
fn headers_accumulate() {
    let res = Response::empty()
        .with_header(SET_COOKIE, HeaderValue::from_static("a=1"))
        .with_header(SET_COOKIE, HeaderValue::from_static("b=2"))
        .with_header(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    assert_eq!(res.headers().get_all(SET_COOKIE).iter().count(), 2);
    assert_eq!(res.payload(), &Payload::Empty);
}
