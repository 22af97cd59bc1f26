#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{header, redirect::Policy, Client, Response};
use serde_json::{json, Value};
use shift_desk::{config::AppConfig, routes, state::AppState};
use tokio::{net::TcpListener, sync::Mutex};

/// 假的 shift 後端，記錄收到的 bearer token
#[derive(Default)]
pub struct MockShiftBackend {
    pub shifts: Mutex<Vec<Value>>,
    pub tokens: Mutex<Vec<Option<String>>>,
    pub fail: AtomicBool,
    next_id: AtomicUsize,
}

type Backend = Arc<MockShiftBackend>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn record(backend: &Backend, headers: &HeaderMap) -> Result<(), StatusCode> {
    backend.tokens.lock().await.push(bearer(headers));
    if backend.fail.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(())
}

fn same_id(shift: &Value, id: &str) -> bool {
    match &shift["_id"] {
        Value::String(text) => text == id,
        other => other.to_string() == id,
    }
}

async fn list(State(backend): State<Backend>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    record(&backend, &headers).await?;
    Ok(Json(Value::Array(backend.shifts.lock().await.clone())))
}

async fn create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    record(&backend, &headers).await?;
    let id = format!("shift-{}", backend.next_id.fetch_add(1, Ordering::SeqCst) + 1);
    body["_id"] = json!(id);
    body["createdAt"] = json!("2024-03-01T14:05:00Z");
    body["__v"] = json!(0);
    backend.shifts.lock().await.push(body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    record(&backend, &headers).await?;
    let mut shifts = backend.shifts.lock().await;
    let slot = shifts
        .iter_mut()
        .find(|shift| same_id(shift, &id))
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = body.clone();
    Ok(Json(body))
}

async fn remove(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    record(&backend, &headers).await?;
    let mut shifts = backend.shifts.lock().await;
    let before = shifts.len();
    shifts.retain(|shift| !same_id(shift, &id));
    if shifts.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({ "message": "Shift deleted" })))
}

pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub async fn spawn_shift_backend(backend: Backend) -> String {
    let router = Router::new()
        .route("/api/", get(list).post(create))
        .route("/api/single/{id}", put(update).delete(remove))
        .with_state(backend);
    spawn(router).await
}

/// 以 key/value 組設定後啟動整個 app
pub async fn spawn_app(vars: &[(&str, String)]) -> String {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    let config = AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let state = AppState::new(config).unwrap();
    spawn(routes::app(state)).await
}

pub fn sign_token(aud: &str, nonce: Option<&str>) -> String {
    let claims = json!({
        "sub": "user-1",
        "aud": aud,
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
        "email": "coordinator@example.com",
        "nonce": nonce,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test")).unwrap()
}

/// 不跟隨轉址、手動帶 session cookie 的瀏覽器
pub struct Browser {
    client: Client,
    base: String,
    cookie: Option<String>,
}

impl Browser {
    pub fn new(base: &str) -> Self {
        Browser {
            client: Client::builder().redirect(Policy::none()).build().unwrap(),
            base: base.to_string(),
            cookie: None,
        }
    }

    fn remember(&mut self, response: &Response) {
        if let Some(cookie) = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with("shift_desk_sid="))
        {
            let pair = cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn get(&mut self, path: &str) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = request.send().await.unwrap();
        self.remember(&response);
        response
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> Response {
        let mut request = self.client.post(self.url(path)).form(form);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = request.send().await.unwrap();
        self.remember(&response);
        response
    }

    pub async fn page(&mut self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
