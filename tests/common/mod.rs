// ABOUTME: In-process mock of the Zulip REST endpoints used by guanaco
// ABOUTME: Serves unread messages, records sends and read flags, can fail sends on demand

#![allow(dead_code)]

use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use guanaco::config::ZulipConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BOT_USER_ID: u64 = 99;

#[derive(Default)]
pub struct ZulipState {
    pub unread: Vec<Value>,
    pub sent: Vec<HashMap<String, String>>,
    pub flag_requests: Vec<HashMap<String, String>>,
    pub message_queries: Vec<HashMap<String, String>>,
    pub auth_headers: Vec<String>,
    pub fail_sends_with: Option<String>,
}

#[derive(Clone)]
pub struct MockZulip {
    pub url: String,
    pub state: Arc<Mutex<ZulipState>>,
}

impl MockZulip {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(ZulipState::default()));
        let app = Router::new()
            .route("/api/v1/messages", get(get_messages).post(send_message))
            .route("/api/v1/messages/flags", post(update_flags))
            .route("/api/v1/users/me", get(users_me))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> ZulipConfig {
        ZulipConfig {
            site: self.url.clone(),
            email: "bot@example.com".into(),
            api_key: Some("secret-key".into()),
            timeout_secs: 5,
        }
    }

    /// Queue an unread stream message
    pub fn add_unread(&self, id: u64, stream_id: u64, topic: &str, content: &str, sender_id: u64) {
        self.state.lock().unwrap().unread.push(json!({
            "id": id,
            "type": "stream",
            "stream_id": stream_id,
            "subject": topic,
            "content": content,
            "sender_id": sender_id,
            "sender_full_name": format!("User {}", sender_id),
            "timestamp": 1_700_000_000 + id,
        }));
    }

    pub fn fail_sends(&self, msg: &str) {
        self.state.lock().unwrap().fail_sends_with = Some(msg.to_string());
    }

    pub fn sent(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn flag_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().flag_requests.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.state.lock().unwrap().unread.len()
    }
}

type Shared = State<Arc<Mutex<ZulipState>>>;

fn record_auth(state: &mut ZulipState, headers: &HeaderMap) {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.auth_headers.push(value.to_string());
    }
}

async fn get_messages(
    State(state): Shared,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    record_auth(&mut state, &headers);
    state.message_queries.push(query);
    Json(json!({"result": "success", "msg": "", "messages": state.unread.clone()}))
}

async fn send_message(
    State(state): Shared,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    record_auth(&mut state, &headers);
    if let Some(msg) = state.fail_sends_with.clone() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"result": "error", "msg": msg, "code": "BAD_REQUEST"})),
        );
    }
    state.sent.push(form);
    let id = state.sent.len();
    (StatusCode::OK, Json(json!({"result": "success", "msg": "", "id": id})))
}

async fn update_flags(
    State(state): Shared,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    record_auth(&mut state, &headers);

    let ids: Vec<u64> = form
        .get("messages")
        .and_then(|m| serde_json::from_str(m).ok())
        .unwrap_or_default();
    if form.get("flag").map(String::as_str) == Some("read") {
        state
            .unread
            .retain(|m| !ids.contains(&m["id"].as_u64().unwrap_or_default()));
    }
    state.flag_requests.push(form);

    Json(json!({"result": "success", "msg": "", "messages": ids}))
}

async fn users_me(State(state): Shared, headers: HeaderMap) -> Json<Value> {
    record_auth(&mut state.lock().unwrap(), &headers);
    Json(json!({
        "result": "success",
        "msg": "",
        "user_id": BOT_USER_ID,
        "email": "bot@example.com",
        "full_name": "Guanaco Bot",
    }))
}
