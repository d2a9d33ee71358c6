use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{HeaderName, Request, StatusCode},
    Router,
};
use ed25519_dalek::{Signer, SigningKey};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tollgate::{
    gateway::{router, INDEX_TEXT},
    interaction::dispatch::UNKNOWN_COMMAND,
    prelude::*,
    signature::{SignatureGate, SIGNATURE_HEADER, TIMESTAMP_HEADER},
    Dispatcher,
};
use tower::ServiceExt;

const TIMESTAMP: &str = "1700000000";

type Log = Arc<Mutex<Vec<String>>>;

fn key() -> SigningKey { SigningKey::from_bytes(&[7; 32]) }

fn app(registry: Registry) -> Router {
    router(
        SignatureGate::new(key().verifying_key()),
        Dispatcher::new(registry),
        false,
    )
}

fn signed(body: &Value) -> Request<Body> {
    let body = serde_json::to_vec(body).unwrap();
    let mut message = TIMESTAMP.as_bytes().to_vec();
    message.extend_from_slice(&body);
    let signature = hex::encode(key().sign(&message).to_bytes());

    Request::post("/interaction")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .header(TIMESTAMP_HEADER, TIMESTAMP)
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn send_json(app: Router, body: &Value) -> Value {
    let (status, body) = send(app, signed(body)).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

fn logger(log: &Log) -> impl Fn(Event, Arc<Interaction>) -> std::future::Ready<anyhow::Result<()>>
       + Send
       + Sync
       + 'static {
    let log = Arc::clone(log);
    move |event, _| {
        log.lock().unwrap().push(event.to_string());
        std::future::ready(Ok(()))
    }
}

#[tokio::test]
async fn index_is_reachable() {
    let req = Request::get("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(Registry::new()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX_TEXT.as_bytes());
}

#[tokio::test]
async fn unsigned_requests_are_rejected() {
    let req = Request::post("/interaction")
        .body(Body::from(r#"{"type":1}"#))
        .unwrap();
    let (status, _) = send(app(Registry::new()), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut req = signed(&json!({ "type": 1 }));
    req.headers_mut().insert(
        HeaderName::try_from(TIMESTAMP_HEADER).unwrap(),
        "1700000001".parse().unwrap(),
    );
    let (status, _) = send(app(Registry::new()), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ping_gets_exact_pong() {
    let (status, body) = send(app(Registry::new()), signed(&json!({ "type": 1 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, br#"{"type":1}"#);
}

#[tokio::test]
async fn bad_payloads_are_rejected() {
    let (status, _) = send(app(Registry::new()), signed(&json!({ "type": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app(Registry::new()), signed(&json!({ "kind": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app(Registry::new()), signed(&json!({ "type": 2 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn commands_are_routed() {
    let mut registry = Registry::new();
    registry.command("greet", |_, args: Args| async move {
        let who = args.str("who").unwrap_or("stranger").to_owned();
        HandlerResult::Ok(Reply::plain(format!("Hello, {who}!")).build()?)
    });
    let app = app(registry);

    let res = send_json(
        app.clone(),
        &json!({
            "type": 2,
            "id": "10",
            "data": {
                "id": "11",
                "name": "greet",
                "options": [{ "name": "who", "type": 3, "value": "Ferris" }],
            },
        }),
    )
    .await;
    assert_eq!(
        res,
        json!({ "type": 4, "data": { "content": "Hello, Ferris!", "attachments": [] } })
    );

    let res = send_json(app, &json!({ "type": 2, "data": { "name": "nope" } })).await;
    assert_eq!(res["type"], 4);
    assert_eq!(res["data"]["content"], UNKNOWN_COMMAND);
    assert_eq!(res["data"]["flags"], 64);
}

#[tokio::test]
async fn listeners_run_before_handlers() {
    let log = Log::default();
    let mut registry = Registry::new();

    registry
        .listen(Event::ButtonClick, logger(&log))
        .listen(Event::InteractionReceive, logger(&log))
        .button("wave", {
            let log = Arc::clone(&log);
            move |_| {
                log.lock().unwrap().push("handler".into());
                std::future::ready(HandlerResult::Ok(Response::ephemeral("hi")))
            }
        });
    let app = app(registry);

    send_json(
        app.clone(),
        &json!({ "type": 3, "data": { "custom_id": "wave", "component_type": 2 } }),
    )
    .await;
    assert_eq!(*log.lock().unwrap(), [
        "interaction_receive",
        "button_click",
        "handler"
    ]);

    log.lock().unwrap().clear();
    let res = send_json(
        app,
        &json!({ "type": 3, "data": { "custom_id": "unknown", "component_type": 2 } }),
    )
    .await;
    assert_eq!(res["data"]["flags"], 64);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn menus_get_values() {
    let mut registry = Registry::new();
    registry.menu("flavour", |_, values: Vec<String>| async move {
        HandlerResult::Ok(Reply::plain(values.join(",")).build()?)
    });

    let res = send_json(
        app(registry),
        &json!({
            "type": 3,
            "data": {
                "custom_id": "flavour",
                "component_type": 3,
                "values": ["mint", "lemon"],
            },
        }),
    )
    .await;

    assert_eq!(res["data"]["content"], "mint,lemon");
}
