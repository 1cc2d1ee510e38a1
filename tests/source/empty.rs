use rpc_rail::source::{FromEmpty, SourceKind};
use rpc_rail::traits::ParamSource;
use rpc_rail::{Request, Timestamp};
use serde_json::Value;

#[test]
fn every_getter_returns_zero_value() {
    let req = Request::builder().build().unwrap();

    assert_eq!(FromEmpty.get_string(&req, "k").unwrap(), Some(String::new()));
    assert_eq!(FromEmpty.get_string_list(&req, "k").unwrap(), Some(Vec::new()));
    assert_eq!(FromEmpty.get_int(&req, "k").unwrap(), Some(0));
    assert_eq!(FromEmpty.get_float(&req, "k").unwrap(), Some(0.0));
    assert_eq!(FromEmpty.get_bool(&req, "k").unwrap(), Some(false));
    assert_eq!(FromEmpty.get_time(&req, "k").unwrap(), Some(Timestamp::default()));
    assert_eq!(FromEmpty.get_object(&req, "k").unwrap(), Some(Value::Null));
}

#[test]
fn source_kinds_deserialize_lowercase() {
    let kinds: Vec<SourceKind> = serde_json::from_str(r#"["body", "form", "context", "empty"]"#).unwrap();
    let names: Vec<&str> = kinds.into_iter().map(|kind| kind.source().name()).collect();

    assert_eq!(names, ["body", "form", "context", "empty"]);
}
