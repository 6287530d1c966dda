//! Test utilities for CLI testing
//!
//! Provides an in-process mock of the REG.RU API2 for client tests.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Form, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Credentials the mock accepts.
pub const VALID_USERNAME: &str = "demo-user";
pub const VALID_PASSWORD: &str = "demo-pass";

/// A request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub form: HashMap<String, String>,
}

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockServerState {
    /// Every request received, in order
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Account services returned by `service/get_list`
    pub services: Arc<Mutex<Vec<Value>>>,
    /// Resource records per domain
    pub records: Arc<Mutex<HashMap<String, Vec<Value>>>>,
}

impl Default for MockServerState {
    fn default() -> Self {
        let services = vec![
            json!({"service_id": 1001, "dname": "example.ru", "servtype": "domain",
                   "state": "A", "expiration_date": "2027-03-01"}),
            json!({"service_id": 1002, "dname": "example.com", "servtype": "domain",
                   "state": "A", "expiration_date": "2026-11-15"}),
            json!({"service_id": 2001, "dname": "example.ru", "servtype": "srv_hosting_ispmgr",
                   "state": "S", "expiration_date": "2026-12-31"}),
        ];

        let mut records = HashMap::new();
        records.insert(
            "example.ru".to_string(),
            vec![
                json!({"rectype": "A", "subname": "@", "content": "192.0.2.10", "prio": 0}),
                json!({"rectype": "TXT", "subname": "@", "content": "v=spf1 -all", "prio": 0}),
            ],
        );

        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            services: Arc::new(Mutex::new(services)),
            records: Arc::new(Mutex::new(records)),
        }
    }
}

/// Mock server implementation
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a new mock server
    pub fn new() -> Self {
        Self {
            state: MockServerState::default(),
            port: 0, // Will be assigned when server starts
        }
    }

    /// Start the mock server and return it with its endpoint URL
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let endpoint = format!("http://127.0.0.1:{}/api/regru2", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        // Give the server a moment to start and verify it's running
        for _ in 0..20 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Ok((self, endpoint))
    }

    /// Get the server port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get a reference to the server state
    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    fn create_router(&self) -> Router {
        Router::new()
            .route("/api/regru2/*method", post(api_handler))
            .with_state(self.state.clone())
    }
}

fn api_error(code: &str, text: &str) -> Response {
    Json(json!({"result": "error", "error_code": code, "error_text": text})).into_response()
}

fn api_success(answer: Value) -> Response {
    Json(json!({"result": "success", "answer": answer})).into_response()
}

async fn api_handler(
    State(state): State<MockServerState>,
    Path(method): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let method = method.trim_start_matches('/').to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        form: form.clone(),
    });

    if method == "broken/html" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").into_response();
    }

    let username = form.get("username").map(String::as_str);
    let password = form.get("password").map(String::as_str);
    let login = match (username, password) {
        (Some(VALID_USERNAME), Some(VALID_PASSWORD)) => VALID_USERNAME,
        // The public test account of the real API
        (Some("test"), Some("test")) => "test",
        (None, _) | (_, None) => return api_error("NO_USERNAME", "No username given"),
        _ => return api_error("PASSWORD_AUTH_FAILED", "Username/password Incorrect"),
    };

    let domain = form.get("domain_name").cloned().unwrap_or_default();

    match method.as_str() {
        "nop" => api_success(json!({"login": login, "user_id": 42})),
        "service/get_list" => {
            let services: Vec<Value> = state
                .services
                .lock()
                .unwrap()
                .iter()
                .filter(|s| {
                    form.get("servtype")
                        .map_or(true, |t| s["servtype"] == Value::from(t.as_str()))
                })
                .filter(|s| {
                    form.get("state")
                        .map_or(true, |st| s["state"] == Value::from(st.as_str()))
                })
                .cloned()
                .collect();
            api_success(json!({"services": services}))
        }
        "zone/get_resource_records" => {
            let rrs = state
                .records
                .lock()
                .unwrap()
                .get(&domain)
                .cloned()
                .unwrap_or_default();
            api_success(json!({"domains": [{"dname": domain, "result": "success"}], "rrs": rrs}))
        }
        "zone/clear" => {
            state.records.lock().unwrap().remove(&domain);
            api_success(json!({"domains": [{"dname": domain, "result": "success"}]}))
        }
        m if m.starts_with("zone/add_") || m == "zone/remove_record" || m == "zone/update_records" => {
            api_success(json!({"domains": [{"dname": domain, "result": "success"}]}))
        }
        _ => api_error("NO_SUCH_COMMAND", "No such command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_startup() {
        let server = MockServer::new();
        let (server_instance, url) = server.start().await.unwrap();

        assert!(url.starts_with("http://127.0.0.1:"));
        assert!(url.ends_with("/api/regru2"));
        assert!(server_instance.port() > 0);
    }

    #[tokio::test]
    async fn test_mock_server_rejects_bad_credentials() {
        let (server, url) = MockServer::new().start().await.unwrap();

        let client = reqwest::Client::new();
        let body: Value = client
            .post(format!("{}/nop", url))
            .form(&[("username", "demo-user"), ("password", "nope")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["result"], "error");
        assert_eq!(body["error_code"], "PASSWORD_AUTH_FAILED");
        assert_eq!(server.state().requests.lock().unwrap()[0].method, "nop");
    }
}
