//! REST inspection endpoints against a running server.

#![allow(clippy::panic)]

mod common;

use chat_relay::api::dto::StatsResponse;
use chat_relay::domain::ChatMessage;
use common::{Client, start_server};

#[tokio::test]
async fn health_reports_healthy() {
    let addr = start_server().await;
    let Ok(resp) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let Ok(body) = resp.json::<serde_json::Value>().await else {
        panic!("json body expected");
    };
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sessions"], 0);
    assert_eq!(body["joined"], 0);
}

#[tokio::test]
async fn user_sessions_and_stats_follow_joins() {
    let addr = start_server().await;

    let missing = reqwest::get(format!("http://{addr}/api/v1/users/dave/sessions")).await;
    let Ok(missing) = missing else {
        panic!("request failed");
    };
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let mut dave = Client::connect(addr).await;
    dave.subscribe("t", "/topic/public").await;
    dave.send("/app/chat.addUser", &ChatMessage::join("dave"))
        .await;

    let Ok(found) = reqwest::get(format!("http://{addr}/api/v1/users/dave/sessions")).await else {
        panic!("request failed");
    };
    assert_eq!(found.status(), reqwest::StatusCode::OK);
    let Ok(body) = found.json::<serde_json::Value>().await else {
        panic!("json body expected");
    };
    assert_eq!(body["total"], 1);
    assert_eq!(body["sessions"][0]["username"], "dave");
    assert_eq!(body["sessions"][0]["state"], "active");

    let Ok(stats) = reqwest::get(format!("http://{addr}/api/v1/stats")).await else {
        panic!("request failed");
    };
    let Ok(stats) = stats.json::<StatsResponse>().await else {
        panic!("stats body expected");
    };
    assert_eq!(stats.sessions, 1);
    assert_eq!(stats.joined, 1);
    assert_eq!(stats.subscribers.get("/topic/public"), Some(&1));
    assert_eq!(stats.shared_topic, "/topic/public");
    assert_eq!(stats.inbound_destinations.len(), 3);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let addr = start_server().await;
    let Ok(resp) = reqwest::get(format!("http://{addr}/api-docs/openapi.json")).await else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let Ok(doc) = resp.json::<serde_json::Value>().await else {
        panic!("json body expected");
    };
    assert!(doc["paths"]["/api/v1/stats"].is_object());
}
