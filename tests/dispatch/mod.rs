use std::any::type_name_of_val;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use http::{HeaderValue, StatusCode};
use http_body_util::{BodyExt, Full};
use rpc_rail::dispatch::{DispatchConfig, Dispatcher, HandlerDescriptor, HttpResponse, PanicError};
use rpc_rail::source::FromBody;
use rpc_rail::{Code, Request, Response, RpcError, RpcResult};
use serde_json::{json, Value};


type Seen = Arc<Mutex<Vec<(String, Code, String)>>>;

fn recording_config() -> (DispatchConfig, Seen) {
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    let config = DispatchConfig::builder()
        .error_hook(move |req: &Request, err: &RpcError| {
            let cause = err.cause().map(ToString::to_string).unwrap_or_default();
            sink.lock().unwrap().push((req.handler_name().to_owned(), err.code(), cause));
        })
        .build()
        .unwrap();
    (config, seen)
}

fn json_call(body: Value) -> http::Request<Full<Bytes>> {
    http::Request::builder()
        .method("POST")
        .uri("/rpc")
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn empty_call() -> http::Request<Full<Bytes>> {
    http::Request::new(Full::new(Bytes::new()))
}

async fn body_of(res: HttpResponse) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn content_type(res: &HttpResponse) -> &str {
    res.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap()
}

async fn create_order(req: Request) -> RpcResult<Response> {
    let item = req.get_string("item", &[&FromBody])?;
    let quantity = req.get_int_default("quantity", 1, &[&FromBody])?;
    Ok(Response::json(&json!({ "item": item, "quantity": quantity, "handler": req.handler_name() })))
}

async fn boom(_req: Request) -> RpcResult<Response> {
    panic!("boom");
}

async fn nothing(_req: Request) -> RpcResult<Option<Response>> {
    Ok(None)
}

async fn plain_failure(_req: Request) -> Result<Response, std::io::Error> {
    Err(std::io::Error::other("socket closed"))
}

fn sync_panic(_req: Request) -> std::future::Ready<RpcResult<Response>> {
    panic!("before the future");
}

#[tokio::test]
async fn success_renders_json() {
    let dispatcher = Dispatcher::new(create_order, DispatchConfig::default());
    let res = dispatcher.dispatch(json_call(json!({ "item": "book", "quantity": 2 }))).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), "application/json; charset=utf-8");
    let body: Value = serde_json::from_str(&body_of(res).await).unwrap();
    assert_eq!(body["item"], "book");
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["handler"], type_name_of_val(&create_order));
}

#[tokio::test]
async fn handler_is_named_after_its_path() {
    let dispatcher = Dispatcher::new(create_order, DispatchConfig::default());
    assert_eq!(dispatcher.descriptor().name(), type_name_of_val(&create_order));
    assert!(dispatcher.descriptor().name().ends_with("::create_order"));
}

#[tokio::test]
async fn missing_parameter_is_a_client_error() {
    let (config, seen) = recording_config();
    let dispatcher = Dispatcher::new(create_order, config);
    let res = dispatcher.dispatch(json_call(json!({}))).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_of(res).await, r#"{"code":"MissingArgument","error":"missing 'item'"}"#);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, type_name_of_val(&create_order));
    assert_eq!(seen[0].1, Code::MissingArgument);
}

#[tokio::test]
async fn panic_becomes_internal_error() {
    let (config, seen) = recording_config();
    let dispatcher = Dispatcher::new(boom, config);
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type(&res), "application/json; charset=utf-8");
    assert_eq!(body_of(res).await, r#"{"code":"Internal","error":"Internal"}"#);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, Code::Internal);
    assert!(seen[0].2.contains("boom"));
    assert!(seen[0].2.contains(type_name_of_val(&boom)));
}

#[tokio::test]
async fn panic_before_future_is_recovered() {
    let dispatcher = Dispatcher::new(sync_panic, DispatchConfig::default());
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(res).await, r#"{"code":"Internal","error":"Internal"}"#);
}

#[tokio::test]
async fn invoke_exposes_panic_cause() {
    let dispatcher = Dispatcher::new(boom, DispatchConfig::default());
    let req = Request::builder().build().unwrap();

    let err = dispatcher.invoke(req).await.unwrap_err();
    let cause = err.cause().unwrap().downcast_ref::<PanicError>().unwrap();
    assert_eq!(cause.message(), "boom");
    assert_eq!(cause.handler(), type_name_of_val(&boom));
}

#[tokio::test]
async fn empty_outcome_is_internal_error() {
    let dispatcher = Dispatcher::new(nothing, DispatchConfig::default());
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(res).await, r#"{"code":"Internal","error":"Internal"}"#);
}

#[tokio::test]
async fn plain_errors_are_wrapped_as_unknown() {
    let (config, seen) = recording_config();
    let dispatcher = Dispatcher::new(plain_failure, config);
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_of(res).await, r#"{"code":"Unknown","error":"Unknown"}"#);
    assert_eq!(seen.lock().unwrap()[0].2, "socket closed");
}

#[tokio::test]
async fn structured_errors_keep_their_code() {
    let dispatcher = Dispatcher::new(
        |_req: Request| async { Err::<Response, _>(RpcError::new(Code::ResourceLocked, "order is being edited")) },
        DispatchConfig::default(),
    );
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(body_of(res).await, r#"{"code":"ResourceLocked","error":"order is being edited"}"#);
}

#[tokio::test]
async fn empty_payload_renders_empty_object() {
    let dispatcher = Dispatcher::new(|_req: Request| async { Ok::<_, RpcError>(Response::empty()) }, DispatchConfig::default());
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_of(res).await, "{}");
}

#[tokio::test]
async fn text_payload_is_verbatim() {
    let dispatcher = Dispatcher::new(
        |_req: Request| async { Ok::<_, RpcError>(Response::text("pong")) },
        DispatchConfig::default(),
    );
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(content_type(&res), "text/plain; charset=utf-8");
    assert_eq!(body_of(res).await, "pong");

    let dispatcher = Dispatcher::new(
        |_req: Request| async { Ok::<_, RpcError>(Response::bytes(&b"\x00raw"[..])) },
        DispatchConfig::default(),
    );
    let res = dispatcher.dispatch(empty_call()).await;
    assert_eq!(content_type(&res), "text/plain; charset=utf-8");
    assert_eq!(res.into_body().collect().await.unwrap().to_bytes().as_ref(), b"\x00raw");
}

#[tokio::test]
async fn redirect_sets_location() {
    let dispatcher = Dispatcher::new(
        |_req: Request| async {
            Ok::<_, RpcError>(
                Response::redirect("/login").with_header(SET_COOKIE, HeaderValue::from_static("session=; Max-Age=0")),
            )
        },
        DispatchConfig::default(),
    );
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/login");
    assert_eq!(res.headers()[SET_COOKIE], "session=; Max-Age=0");
}

#[tokio::test]
async fn response_headers_are_merged() {
    let dispatcher = Dispatcher::new(
        |_req: Request| async {
            Ok::<_, RpcError>(
                Response::json(&json!([1, 2]))
                    .with_header(SET_COOKIE, HeaderValue::from_static("a=1"))
                    .with_header(SET_COOKIE, HeaderValue::from_static("b=2")),
            )
        },
        DispatchConfig::default(),
    );
    let res = dispatcher.dispatch(empty_call()).await;

    assert_eq!(res.headers().get_all(SET_COOKIE).iter().count(), 2);
    assert_eq!(content_type(&res), "application/json; charset=utf-8");
    assert_eq!(body_of(res).await, "[1,2]");
}

#[tokio::test]
async fn oversized_body_is_rejected_as_plain_text() {
    let config = DispatchConfig::builder().max_body_bytes(8).build().unwrap();
    let dispatcher = Dispatcher::new(create_order, config);
    let res = dispatcher.dispatch(json_call(json!({ "item": "a very long item name" }))).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(content_type(&res), "text/plain; charset=utf-8");
    assert_eq!(body_of(res).await, "error in reading request body");
}

#[tokio::test]
async fn panicking_hook_does_not_change_response() {
    let config = DispatchConfig::builder()
        .error_hook(|_req: &Request, _err: &RpcError| panic!("hook exploded"))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(create_order, config);
    let res = dispatcher.dispatch(json_call(json!({}))).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_of(res).await, r#"{"code":"MissingArgument","error":"missing 'item'"}"#);
}

#[tokio::test]
async fn hook_is_not_called_on_success() {
    let (config, seen) = recording_config();
    let dispatcher = Dispatcher::new(create_order, config);
    let res = dispatcher.dispatch(json_call(json!({ "item": "pen" }))).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn explicit_descriptor_names_the_handler() {
    let (config, seen) = recording_config();
    let dispatcher =
        Dispatcher::with_descriptor(create_order, HandlerDescriptor::named("orders.create"), config);
    let _ = dispatcher.dispatch(json_call(json!({}))).await;

    assert_eq!(seen.lock().unwrap()[0].0, "orders.create");
}

#[tokio::test]
async fn form_requests_feed_form_source() {
    let dispatcher = Dispatcher::new(
        |req: Request| async move {
            let page = req.get_int("page", &[])?;
            let name = req.get_string("name", &[])?;
            Ok::<_, RpcError>(Response::json(&json!({ "page": page, "name": name })))
        },
        DispatchConfig::default(),
    );
    let call = http::Request::builder()
        .method("POST")
        .uri("/rpc?page=2")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Full::new(Bytes::from_static(b"name=June")))
        .unwrap();
    let res = dispatcher.dispatch(call).await;

    assert_eq!(body_of(res).await, r#"{"name":"June","page":2}"#);
}

#[inline(never)]
fn lookup_order(id: i64) -> RpcError {
    RpcError::new(Code::NotFound, "order not found").add("order", id)
}

async fn archive_order(_req: Request) -> RpcResult<Response> {
    Err(lookup_order(7))
}

async fn archive_batch(_req: Request) -> RpcResult<Response> {
    let mut failures = [6].into_iter().map(|id| lookup_order(id + 1));
    Err(failures.next().unwrap_or_else(|| RpcError::new(Code::Internal, "")))
}

fn tracing_frames() -> (DispatchConfig, Arc<Mutex<Vec<String>>>) {
    let frames: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&frames);
    let config = DispatchConfig::builder()
        .error_hook(move |req: &Request, err: &RpcError| {
            let scoped = err.traceback(req.handler_name().to_owned());
            *sink.lock().unwrap() = scoped.records().iter().map(|r| r.function().to_owned()).collect();
        })
        .build()
        .unwrap();
    (config, frames)
}

#[tokio::test]
async fn traceback_stops_at_async_handler_body() {
    let (config, frames) = tracing_frames();
    let dispatcher = Dispatcher::new(archive_order, config);
    let res = dispatcher.dispatch(empty_call()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let frames = frames.lock().unwrap();
    let handler = type_name_of_val(&archive_order);
    assert_eq!(frames.first().map(String::as_str), Some(type_name_of_val(&lookup_order)), "{frames:#?}");
    assert_eq!(frames.last(), Some(&format!("{handler}::{{{{closure}}}}")), "{frames:#?}");
    assert!(frames.iter().all(|f| !f.contains("rpc_rail::dispatch")), "{frames:#?}");
}

#[tokio::test]
async fn traceback_passes_closures_inside_handler() {
    let (config, frames) = tracing_frames();
    let dispatcher = Dispatcher::new(archive_batch, config);
    let _ = dispatcher.dispatch(empty_call()).await;

    let frames = frames.lock().unwrap();
    let handler = type_name_of_val(&archive_batch);
    let inner = format!("{handler}::{{{{closure}}}}::{{{{closure}}}}");
    assert!(frames.iter().any(|f| f.starts_with(&inner)), "{frames:#?}");
    assert_eq!(frames.last(), Some(&format!("{handler}::{{{{closure}}}}")), "{frames:#?}");
}
