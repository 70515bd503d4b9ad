// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, Response},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use stagetrack_api::{app, config::AppConfig, db, handlers::AppServices, AppState};

/// Test harness: the full application router backed by an in-memory SQLite
/// database. Each instance gets a fresh schema.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:");
        // A single pooled connection so every request sees the same
        // in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let db_arc = Arc::new(pool);
        let services = AppServices::new(db_arc.clone());
        let state = Arc::new(AppState {
            db: db_arc,
            config: cfg,
            services,
        });
        let router = app(state.clone());
        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).expect("request built"))
            .await
            .expect("request handled")
    }

    /// Create an entrance and return its id.
    pub async fn seed_entrance(
        &self,
        folio: i32,
        entry_date: &str,
        platforms: i32,
        lines: &[(&str, i32)],
    ) -> i32 {
        let payload = json!({
            "folio": folio,
            "entry_date": entry_date,
            "platforms": platforms,
            "part_numbers": lines
                .iter()
                .map(|(part_number, quantity)| json!({
                    "part_number": part_number,
                    "quantity": quantity,
                }))
                .collect::<Vec<_>>(),
        });
        let response = self
            .request(Method::POST, "/api/v1/entrances", Some(payload))
            .await;
        assert_eq!(response.status(), 201, "seeding entrance {folio} failed");
        let body = read_json(response).await;
        body["id"].as_i64().expect("created id") as i32
    }
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}

pub async fn read_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
        .to_vec()
}
