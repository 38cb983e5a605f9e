//! Mock Pasteor API for session tests.
//!
//! A search term prefixed with `slow:` delays that listing response, which
//! lets tests force out-of-order completions for the stale-response guard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

pub const TEST_TOKEN: &str = "session-token";
pub const SLOW_PREFIX: &str = "slow:";
const SLOW_RESPONSE_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone)]
struct StoredPaste {
    id: String,
    title: String,
    language: String,
    content: String,
    views: u64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MockApi {
    pastes: Mutex<Vec<StoredPaste>>,
    next_id: AtomicU64,
    create_calls: AtomicU64,
}

impl MockApi {
    pub fn seed_paste(&self, title: &str, language: &str, content: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("p{n}");
        self.pastes.lock().expect("pastes lock").push(StoredPaste {
            id: id.clone(),
            title: title.to_string(),
            language: language.to_string(),
            content: content.to_string(),
            views: 0,
            created_at: Utc::now() + chrono::Duration::seconds(n as i64),
        });
        id
    }

    /// How many create requests actually reached the server.
    pub fn create_calls(&self) -> u64 {
        self.create_calls.load(Ordering::SeqCst)
    }
}

pub struct MockServer {
    pub base_url: String,
    pub api: Arc<MockApi>,
}

pub async fn spawn_mock() -> MockServer {
    let api = Arc::new(MockApi::default());
    let app = router(api.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock api");
    });
    MockServer {
        base_url: format!("http://{addr}"),
        api,
    }
}

fn router(api: Arc<MockApi>) -> Router {
    Router::new()
        .route("/api/pastes", axum::routing::post(create_paste))
        .route("/api/pastes/recent", get(recent_pastes))
        .route("/api/pastes/my", get(my_pastes))
        .route(
            "/api/pastes/:id",
            axum::routing::put(update_paste).delete(delete_paste),
        )
        .route("/api/stats/me", get(user_stats))
        .route("/api/stats/public", get(public_stats))
        .route("/api/users/me/languages", get(user_languages))
        .with_state(api)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        == Some(TEST_TOKEN)
}

fn error_body(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    error_body(StatusCode::UNAUTHORIZED, "Authentication required")
}

fn summary_json(paste: &StoredPaste) -> Value {
    json!({
        "id": paste.id,
        "title": paste.title,
        "language": paste.language,
        "createdAt": paste.created_at,
        "views": paste.views,
        "preview": paste.content.chars().take(100).collect::<String>(),
    })
}

#[derive(Debug, Deserialize)]
struct CreateBody {
    content: String,
    title: Option<String>,
    language: Option<String>,
}

async fn create_paste(
    State(api): State<Arc<MockApi>>,
    Json(body): Json<CreateBody>,
) -> impl IntoResponse {
    api.create_calls.fetch_add(1, Ordering::SeqCst);
    if body.content.trim().is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "Content cannot be empty").into_response();
    }
    let n = api.next_id.fetch_add(1, Ordering::SeqCst);
    let id = format!("p{n}");
    let paste = StoredPaste {
        id: id.clone(),
        title: body.title.unwrap_or_default(),
        language: body.language.unwrap_or_else(|| "plaintext".to_string()),
        content: body.content,
        views: 0,
        created_at: Utc::now() + chrono::Duration::seconds(n as i64),
    };
    let response = json!({
        "id": paste.id,
        "title": paste.title,
        "language": paste.language,
        "createdAt": paste.created_at,
        "url": format!("http://paste.example/{id}"),
    });
    api.pastes.lock().expect("pastes lock").push(paste);
    Json(response).into_response()
}

#[derive(Debug, Deserialize)]
struct RecentParams {
    limit: Option<usize>,
}

async fn recent_pastes(
    State(api): State<Arc<MockApi>>,
    Query(params): Query<RecentParams>,
) -> impl IntoResponse {
    let items: Vec<Value> = {
        let pastes = api.pastes.lock().expect("pastes lock");
        let mut all: Vec<&StoredPaste> = pastes.iter().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.iter()
            .take(params.limit.unwrap_or(10))
            .map(|paste| summary_json(paste))
            .collect()
    };
    Json(items)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    search: Option<String>,
    language: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn my_pastes(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return unauthorized().into_response();
    }

    let mut search = params.search.unwrap_or_default();
    if let Some(rest) = search.strip_prefix(SLOW_PREFIX) {
        search = rest.to_string();
        tokio::time::sleep(SLOW_RESPONSE_DELAY).await;
    }
    let search = search.to_lowercase();

    let body = {
        let pastes = api.pastes.lock().expect("pastes lock");
        let mut matches: Vec<&StoredPaste> = pastes
            .iter()
            .filter(|paste| {
                search.is_empty()
                    || paste.title.to_lowercase().contains(&search)
                    || paste.content.to_lowercase().contains(&search)
            })
            .filter(|paste| {
                params
                    .language
                    .as_deref()
                    .map(|language| paste.language == language)
                    .unwrap_or(true)
            })
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = params.page.unwrap_or(1).max(1);
        let page_size = params.page_size.unwrap_or(20).max(1) as usize;
        let total_count = matches.len();
        let total_pages = total_count.div_ceil(page_size) as u32;
        let items: Vec<Value> = matches
            .iter()
            .skip((page as usize - 1) * page_size)
            .take(page_size)
            .map(|paste| summary_json(paste))
            .collect();

        json!({
            "pastes": items,
            "totalCount": total_count,
            "page": page,
            "totalPages": total_pages,
        })
    };
    Json(body).into_response()
}

#[derive(Debug, Deserialize)]
struct UpdateBody {
    content: Option<String>,
    title: Option<String>,
    language: Option<String>,
}

async fn update_paste(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateBody>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return unauthorized().into_response();
    }
    let mut pastes = api.pastes.lock().expect("pastes lock");
    let Some(paste) = pastes.iter_mut().find(|paste| paste.id == id) else {
        return error_body(StatusCode::NOT_FOUND, "Paste not found").into_response();
    };
    if let Some(content) = body.content {
        paste.content = content;
    }
    if let Some(title) = body.title {
        paste.title = title;
    }
    if let Some(language) = body.language {
        paste.language = language;
    }
    Json(json!({
        "id": paste.id,
        "title": paste.title,
        "language": paste.language,
        "createdAt": paste.created_at,
    }))
    .into_response()
}

async fn delete_paste(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return unauthorized().into_response();
    }
    let mut pastes = api.pastes.lock().expect("pastes lock");
    match pastes.iter().position(|paste| paste.id == id) {
        Some(index) => {
            pastes.remove(index);
            Json(json!({ "success": true })).into_response()
        }
        None => error_body(StatusCode::NOT_FOUND, "Paste not found").into_response(),
    }
}

async fn user_stats(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return unauthorized().into_response();
    }
    let pastes = api.pastes.lock().expect("pastes lock");
    Json(json!({
        "totalPastes": pastes.len(),
        "totalViews": pastes.iter().map(|paste| paste.views).sum::<u64>(),
        "activePastes": pastes.len(),
        "mostViewedPaste": pastes.iter().max_by_key(|paste| paste.views).map(|paste| paste.id.clone()),
    }))
    .into_response()
}

async fn user_languages(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return unauthorized().into_response();
    }
    let pastes = api.pastes.lock().expect("pastes lock");
    let mut languages: Vec<String> = pastes.iter().map(|paste| paste.language.clone()).collect();
    languages.sort();
    languages.dedup();
    Json(languages).into_response()
}

async fn public_stats(State(api): State<Arc<MockApi>>) -> impl IntoResponse {
    let pastes = api.pastes.lock().expect("pastes lock");
    let mut counts: Vec<(String, u64)> = Vec::new();
    for paste in pastes.iter() {
        match counts.iter_mut().find(|(lang, _)| *lang == paste.language) {
            Some((_, count)) => *count += 1,
            None => counts.push((paste.language.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Json(json!({
        "totalPastes": pastes.len(),
        "totalViews": pastes.iter().map(|paste| paste.views).sum::<u64>(),
        "topLanguages": counts
            .iter()
            .take(5)
            .map(|(language, count)| json!({ "language": language, "count": count }))
            .collect::<Vec<Value>>(),
        "popularPastes": [],
    }))
}
