//! Drives the axum router in-process.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use eatsimple_ledger::{
    config::{LedgerAppState, LedgerConfig},
    server::router,
    BlockStore, Ledger,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let cfg = LedgerConfig::from_toml(r#"
        listen = "127.0.0.1:0"
        db_path = "unused"
    "#).unwrap();
    let ledger = Ledger::open(BlockStore::temporary().unwrap(), cfg.difficulty).unwrap();
    router(LedgerAppState { cfg, ledger: Arc::new(ledger) })
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn order_body(order_id: u64) -> Value {
    json!({
        "order_id": order_id,
        "customer_id": 7,
        "customer_name": "Astrid",
        "restaurant_id": 3,
        "restaurant_name": "Pizzeria Napoli",
        "total_amount": 23.50,
        "items": [{ "item_name": "Margherita", "quantity": 1, "price": 23.50 }],
        "timestamp": "2025-03-01 18:22:05.112233",
        "payment_method": "card",
        "delivery_address": "Storgatan 12, Stockholm"
    })
}

fn post_block(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/blocks")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn append_returns_a_mined_confirmation() {
    let app = test_app();

    let response = app.clone().oneshot(post_block(&order_body(1))).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["index"], 1);
    assert!(first["current_hash"].as_str().unwrap().starts_with("00"));

    let response = app.clone().oneshot(post_block(&order_body(2))).await.unwrap();
    let second = body_json(response).await;
    assert_eq!(second["previous_hash"], first["current_hash"]);

    let tip = body_json(app.oneshot(get("/chain/tip")).await.unwrap()).await;
    assert_eq!(tip["height"], 2);
    assert_eq!(tip["current_hash"], second["current_hash"]);
    assert_eq!(tip["difficulty"], 2);
}

#[tokio::test]
async fn verify_reports_every_block() {
    let app = test_app();
    app.clone().oneshot(post_block(&order_body(1))).await.unwrap();

    let response = app.oneshot(get("/verify")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["overall_valid"], true);
    assert_eq!(report["per_block"].as_array().unwrap().len(), 2);
    assert_eq!(report["per_block"][1]["order_id"], 1);
    assert_eq!(report["per_block"][1]["status"], "VALID");
    assert_eq!(report["per_block"][1]["issues"], json!([]));
}

#[tokio::test]
async fn blocks_are_listed_and_fetched() {
    let app = test_app();
    for id in 1..=3 {
        app.clone().oneshot(post_block(&order_body(id))).await.unwrap();
    }

    let list = body_json(app.clone().oneshot(get("/blocks?start=1&limit=2")).await.unwrap()).await;
    let ids: Vec<u64> = list.as_array().unwrap().iter().map(|b| b["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2]);

    let block = body_json(app.clone().oneshot(get("/block?id=2")).await.unwrap()).await;
    assert_eq!(block["payload"]["restaurant_name"], "Pizzeria Napoli");

    let by_order = body_json(app.clone().oneshot(get("/block/by_order?order_id=3")).await.unwrap()).await;
    assert_eq!(by_order["id"], 3);

    let missing = app.oneshot(get("/block?id=99")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payload_without_required_fields_is_rejected() {
    let app = test_app();
    let response = app.clone().oneshot(post_block(&json!({ "order_id": 1 }))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let tip = body_json(app.oneshot(get("/chain/tip")).await.unwrap()).await;
    assert_eq!(tip["height"], 0);
}
