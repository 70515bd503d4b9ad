mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{read_json, TestApp};

#[tokio::test]
async fn batch_commits_successes_alongside_failures() {
    let app = TestApp::new().await;
    app.seed_entrance(100, "2025-03-01T08:00:00", 5, &[("A1", 3)])
        .await;

    let payload = json!({
        "items": [
            {"folio": 100, "quantity": 2},
            {"folio": 999, "quantity": 1},
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/entrances/exits/batch", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = read_json(response).await;

    assert_eq!(outcome["total_items"], 2);
    assert_eq!(outcome["succeeded"], 1);
    assert_eq!(outcome["failed"], 1);
    assert!(!outcome["exit_date"].is_null());

    let results = outcome["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    let success = &results[0];
    assert_eq!(success["folio"], "100");
    assert_eq!(success["success"], true);
    assert_eq!(success["previous_platforms"], 5);
    assert_eq!(success["current_platforms"], 3);

    let failure = &results[1];
    assert_eq!(failure["folio"], "999");
    assert_eq!(failure["success"], false);
    assert!(failure["message"].as_str().unwrap().contains("not found"));

    // The successful mutation committed despite the failed item.
    let response = app.request(Method::GET, "/api/v1/entrances", None).await;
    let list = read_json(response).await;
    let entrance = &list.as_array().unwrap()[0];
    assert_eq!(entrance["platforms"], 3);
    assert!(!entrance["exit_date"].is_null());
}

#[tokio::test]
async fn over_quantity_item_fails_without_mutating() {
    let app = TestApp::new().await;
    let id = app
        .seed_entrance(200, "2025-03-01T08:00:00", 3, &[("A1", 3)])
        .await;

    let payload = json!({"items": [{"folio": 200, "quantity": 10}]});
    let response = app
        .request(Method::POST, "/api/v1/entrances/exits/batch", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = read_json(response).await;

    assert_eq!(outcome["succeeded"], 0);
    assert_eq!(outcome["failed"], 1);
    let message = outcome["results"][0]["message"].as_str().unwrap();
    assert!(message.contains("10"));
    assert!(message.contains("3"));
    assert!(message.contains("exceeds"));

    let response = app
        .request(Method::GET, &format!("/api/v1/entrances/{id}"), None)
        .await;
    let detail = read_json(response).await;
    assert_eq!(detail["platforms"], 3);
    assert!(detail["exit_date"].is_null());
}

#[tokio::test]
async fn empty_batch_is_a_client_error() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/entrances/exits/batch",
            Some(json!({"items": []})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::POST, "/api/v1/entrances/exits/batch", Some(json!({})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_folio_items_consume_serially_within_one_batch() {
    let app = TestApp::new().await;
    let id = app
        .seed_entrance(300, "2025-03-01T08:00:00", 3, &[("A1", 3)])
        .await;

    let payload = json!({
        "items": [
            {"folio": 300, "quantity": 2},
            {"folio": 300, "quantity": 2},
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/entrances/exits/batch", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = read_json(response).await;

    let results = outcome["results"].as_array().unwrap();
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["current_platforms"], 1);
    // The second item sees the count already consumed by the first.
    assert_eq!(results[1]["success"], false);
    assert!(results[1]["message"]
        .as_str()
        .unwrap()
        .contains("available pallets (1)"));

    let response = app
        .request(Method::GET, &format!("/api/v1/entrances/{id}"), None)
        .await;
    let detail = read_json(response).await;
    assert_eq!(detail["platforms"], 1);
}

#[tokio::test]
async fn non_positive_quantity_is_an_item_failure() {
    let app = TestApp::new().await;
    let id = app
        .seed_entrance(400, "2025-03-01T08:00:00", 2, &[("A1", 2)])
        .await;

    let payload = json!({"items": [{"folio": 400, "quantity": 0}]});
    let response = app
        .request(Method::POST, "/api/v1/entrances/exits/batch", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = read_json(response).await;
    assert_eq!(outcome["failed"], 1);
    assert!(outcome["results"][0]["message"]
        .as_str()
        .unwrap()
        .contains("positive"));

    let response = app
        .request(Method::GET, &format!("/api/v1/entrances/{id}"), None)
        .await;
    let detail = read_json(response).await;
    assert_eq!(detail["platforms"], 2);
    assert!(detail["exit_date"].is_null());
}

#[tokio::test]
async fn exhausted_entrance_is_reported_as_unavailable() {
    let app = TestApp::new().await;
    app.seed_entrance(500, "2025-03-01T08:00:00", 2, &[("A1", 2)])
        .await;

    // Drain the entrance completely.
    let payload = json!({"items": [{"folio": 500, "quantity": 2}]});
    let response = app
        .request(Method::POST, "/api/v1/entrances/exits/batch", Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Pallets are exhausted now, so the folio no longer resolves.
    let payload = json!({"items": [{"folio": 500, "quantity": 1}]});
    let response = app
        .request(Method::POST, "/api/v1/entrances/exits/batch", Some(payload))
        .await;
    let outcome = read_json(response).await;
    assert_eq!(outcome["failed"], 1);
    assert!(outcome["results"][0]["message"]
        .as_str()
        .unwrap()
        .contains("no pallets available"));
}
