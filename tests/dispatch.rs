use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use webbind::handler::handle_request;
use webbind::{AppState, Config, RouteRegistry};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u32,
    items: Vec<String>,
    total: f64,
}

webbind::typed_dto!(Order);

fn app() -> Arc<AppState> {
    let mut config = Config::load_from("tests/does-not-exist").unwrap();
    config.logging.access_log = false;

    let mut builder = RouteRegistry::builder();
    builder.api_prefix("/api/");
    builder
        .register("/orders", Method::POST, "/echo", |o: Order| o, &[])
        .unwrap()
        .register(
            "/orders",
            Method::GET,
            "/find",
            |id: u32| -> Result<Order, String> {
                if id == 7 {
                    Ok(Order {
                        id,
                        items: vec!["tea".to_string()],
                        total: 3.5,
                    })
                } else {
                    Err(format!("order {id} not found"))
                }
            },
            &["id"],
        )
        .unwrap()
        .register(
            "/orders",
            Method::POST,
            "/tag",
            |id: u32, tag: String| format!("{id}:{tag}"),
            &["id", "tag"],
        )
        .unwrap()
        .register("/orders", Method::GET, "/count", || 3_usize, &[])
        .unwrap()
        .register(
            "/orders",
            Method::GET,
            "/totals",
            || HashMap::from([("tea".to_string(), 3.5_f64)]),
            &[],
        )
        .unwrap();
    Arc::new(AppState::new(&config, builder.build()))
}

async fn send(req: Request<Full<Bytes>>) -> (u16, String) {
    let resp: Response<Full<Bytes>> = handle_request(req, app()).await.unwrap();
    let status = resp.status().as_u16();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn post(uri: &str, content_type: &str, body: &str) -> Request<Full<Bytes>> {
    Request::post(uri)
        .header("Content-Type", content_type)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn get(uri: &str) -> Request<Full<Bytes>> {
    Request::get(uri).body(Full::new(Bytes::new())).unwrap()
}

#[tokio::test]
async fn json_dto_round_trips() {
    let order = Order {
        id: 12,
        items: vec!["a".to_string(), "b".to_string()],
        total: 9.25,
    };
    let body = serde_json::to_string(&order).unwrap();
    let (status, text) = send(post("/api/orders/echo", "application/json", &body)).await;

    assert_eq!(status, 200);
    let echoed: Order = serde_json::from_str(&text).unwrap();
    assert_eq!(echoed, order);
}

#[tokio::test]
async fn malformed_json_binds_zero_value() {
    let (status, text) = send(post("/api/orders/echo", "application/json", "not json")).await;
    assert_eq!(status, 200);
    assert_eq!(text, r#"{"id":0,"items":[],"total":0.0}"#);
}

#[tokio::test]
async fn result_action_encodes_first_value() {
    let (_, text) = send(get("/api/orders/find?id=7")).await;
    assert_eq!(text, r#"{"id":7,"items":["tea"],"total":3.5}"#);

    // The error string is the second value and never reaches the body
    let (status, text) = send(get("/api/orders/find?id=1")).await;
    assert_eq!(status, 200);
    assert_eq!(text, r#"{"id":0,"items":[],"total":0.0}"#);
}

#[tokio::test]
async fn form_fields_bind_by_name() {
    let req = post(
        "/api/orders/tag?id=99",
        "application/x-www-form-urlencoded",
        "ID=5&tag=gift+wrap",
    );
    let (_, text) = send(req).await;
    assert_eq!(text, "5:gift wrap");
}

#[tokio::test]
async fn scalar_and_collection_returns() {
    let (_, text) = send(get("/api/orders/count")).await;
    assert_eq!(text, "3");

    let (_, text) = send(get("/api/orders/totals")).await;
    assert_eq!(text, r#"{"tea":3.5}"#);
}

#[tokio::test]
async fn unknown_routes() {
    assert_eq!(send(get("/api/orders/missing")).await.0, 404);
    assert_eq!(send(get("/api/orders/echo")).await.0, 405);
}
