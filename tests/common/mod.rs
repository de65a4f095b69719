use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use sitestock_api::{
    config::AppConfig,
    db,
    entities::{product, site},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // Minimal configuration suitable for tests. A single pooled
        // connection keeps every query on the same in-memory database.
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", sitestock_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a JSON request against the router.
    #[allow(dead_code)]
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed one catalog product through the product service.
    #[allow(dead_code)]
    pub async fn seed_product(
        &self,
        name: &str,
        unit: &str,
        rate_per_unit: Decimal,
        stock_quantity: Decimal,
    ) -> product::Model {
        self.state
            .services
            .products
            .create_product(
                name.to_string(),
                unit.to_string(),
                rate_per_unit,
                stock_quantity,
                None,
            )
            .await
            .expect("seed product for tests")
    }

    /// Seed one construction site through the site service.
    #[allow(dead_code)]
    pub async fn seed_site(&self, name: &str) -> site::Model {
        self.state
            .services
            .sites
            .create_site(
                name.to_string(),
                "Test Location".to_string(),
                NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date"),
                None,
                Some("Test Supervisor".to_string()),
                None,
                None,
            )
            .await
            .expect("seed site for tests")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Read a response body into parsed JSON.
#[allow(dead_code)]
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not valid json")
}
