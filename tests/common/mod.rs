//! Common test utilities
//!
//! An in-process stand-in for the administration API: it records every request
//! and answers with canned status/body pairs.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use library_console::{
    api::{ApiClient, ApiClients},
    config::ApiConfig,
    session::Session,
};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), (StatusCode, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockServer {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("No local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock server crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Answer `method path` with `status` and `body` from now on
    pub fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).expect("Invalid status");
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body.into()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| &r.method == method && r.path == path)
            .collect()
    }

    pub fn clients(&self, session: Session) -> ApiClients {
        ApiClients::new(self.api_client(session))
    }

    pub fn api_client(&self, session: Session) -> ApiClient {
        ApiClient::new(
            &ApiConfig {
                base_url: self.base_url.clone(),
            },
            session,
        )
        .expect("Invalid mock base URL")
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        authorization: header_value("authorization"),
        content_type: header_value("content-type"),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let canned = state
        .routes
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();

    match canned {
        Some((status, body)) => {
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        None => (StatusCode::NOT_FOUND, "no canned response").into_response(),
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: i64,
    email: String,
    exp: i64,
}

/// HS256 token whose expiry is `exp_offset_secs` away from now
pub fn signed_token(exp_offset_secs: i64) -> String {
    let claims = TestClaims {
        sub: 1,
        email: "admin@library.test".to_string(),
        exp: Utc::now().timestamp() + exp_offset_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("Failed to sign token")
}

/// Session already holding a valid token
pub fn logged_in_session() -> (Session, String) {
    let session = Session::in_memory();
    let token = signed_token(3600);
    session.login(&token).expect("Failed to store token");
    (session, token)
}
