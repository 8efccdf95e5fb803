//! Stub of the JMA forecast endpoint for tests, served by axum on an
//! ephemeral local port.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::config::{Config, ForecastMode};

#[derive(Default)]
struct MockState {
    payloads: Mutex<HashMap<String, Value>>,
    statuses: Mutex<HashMap<String, StatusCode>>,
    hits: AtomicUsize,
}

pub struct MockJmaServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockJmaServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/forecast/:file", get(serve_forecast))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn set_payload(&self, office_code: &str, payload: Value) {
        self.state
            .payloads
            .lock()
            .unwrap()
            .insert(office_code.to_string(), payload);
    }

    pub fn set_status(&self, office_code: &str, status: StatusCode) {
        self.state
            .statuses
            .lock()
            .unwrap()
            .insert(office_code.to_string(), status);
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> Config {
        Config {
            areas_path: "jma/areas.json".to_string(),
            forecast_base_url: format!("http://{}/forecast", self.addr),
            forecast_mode: ForecastMode::History,
            http_timeout_secs: 5,
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

impl Drop for MockJmaServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_forecast(State(state): State<Arc<MockState>>, Path(file): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let office_code = file.trim_end_matches(".json");

    if let Some(status) = state.statuses.lock().unwrap().get(office_code) {
        return (*status, "stubbed failure").into_response();
    }

    match state.payloads.lock().unwrap().get(office_code) {
        Some(payload) => Json(payload.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A two-report payload shaped like the real `130000.json`: a short-term
/// report with three areas and a weekly report whose areas carry no `weathers`.
pub fn tokyo_payload(report_datetime: &str) -> Value {
    serde_json::json!([
        {
            "publishingOffice": "気象庁",
            "reportDatetime": report_datetime,
            "timeSeries": [
                {
                    "timeDefines": ["2024-05-01T11:00:00+09:00", "2024-05-02T00:00:00+09:00"],
                    "areas": [
                        {"area": {"name": "東京地方", "code": "130010"}, "weathers": ["晴れ", "くもり"]},
                        {"area": {"name": "伊豆諸島北部", "code": "130020"}, "weathers": ["くもり 時々 雨"]},
                        {"area": {"name": "小笠原諸島", "code": "130040"}, "weathers": ["晴れ"]}
                    ]
                }
            ]
        },
        {
            "publishingOffice": "気象庁",
            "reportDatetime": report_datetime,
            "timeSeries": [
                {
                    "areas": [
                        {"area": {"name": "東京地方", "code": "130010"}, "weatherCodes": ["100", "200"]}
                    ]
                }
            ]
        }
    ])
}
