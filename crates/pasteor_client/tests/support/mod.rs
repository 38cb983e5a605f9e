//! In-process mock of the Pasteor API for integration tests.
//!
//! Speaks just enough of the wire contract to exercise the client: bearer
//! auth, the filtered/paginated owner listing, and `{"error": ...}` bodies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

pub const TEST_TOKEN: &str = "integration-token";

#[derive(Debug, Clone)]
pub struct StoredPaste {
    pub id: String,
    pub title: Option<String>,
    pub language: String,
    pub content: String,
    pub views: u64,
    pub owned: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MockApi {
    pastes: Mutex<Vec<StoredPaste>>,
    next_id: AtomicU64,
}

impl MockApi {
    pub fn seed_paste(
        &self,
        title: &str,
        language: &str,
        content: &str,
        owned: bool,
        views: u64,
    ) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("p{n}");
        self.pastes.lock().expect("pastes lock").push(StoredPaste {
            id: id.clone(),
            title: Some(title.to_string()),
            language: language.to_string(),
            content: content.to_string(),
            views,
            owned,
            created_at: Utc::now() + Duration::seconds(n as i64),
        });
        id
    }

    pub fn paste_count(&self) -> usize {
        self.pastes.lock().expect("pastes lock").len()
    }
}

pub struct MockServer {
    pub base_url: String,
    pub api: Arc<MockApi>,
}

/// Bind the mock API on an ephemeral port and serve it in the background.
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
            get(get_paste).put(update_paste).delete(delete_paste),
        )
        .route("/api/pastes/:id/raw", get(get_raw))
        .route("/api/stats/me", get(user_stats))
        .route("/api/stats/public", get(public_stats))
        .route("/api/users/me/languages", get(user_languages))
        .route("/api/auth/me", get(auth_me))
        .with_state(api)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn is_owner(headers: &HeaderMap) -> bool {
    bearer_token(headers) == Some(TEST_TOKEN)
}

fn error_body(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    error_body(StatusCode::UNAUTHORIZED, "Authentication required")
}

fn summary_json(paste: &StoredPaste) -> Value {
    let preview: String = paste.content.chars().take(100).collect();
    json!({
        "id": paste.id,
        "title": paste.title,
        "language": paste.language,
        "createdAt": paste.created_at,
        "views": paste.views,
        "preview": preview,
    })
}

#[derive(Debug, Deserialize)]
struct CreateBody {
    content: String,
    title: Option<String>,
    language: Option<String>,
    #[serde(rename = "expiresIn")]
    #[allow(dead_code)]
    expires_in: Option<String>,
}

async fn create_paste(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> impl IntoResponse {
    if body.content.trim().is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "Content cannot be empty").into_response();
    }
    let n = api.next_id.fetch_add(1, Ordering::SeqCst);
    let id = format!("p{n}");
    let paste = StoredPaste {
        id: id.clone(),
        title: body.title,
        language: body.language.unwrap_or_else(|| "plaintext".to_string()),
        content: body.content,
        views: 0,
        owned: is_owner(&headers),
        created_at: Utc::now() + Duration::seconds(n as i64),
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
    let pastes = api.pastes.lock().expect("pastes lock");
    let mut all: Vec<&StoredPaste> = pastes.iter().collect();
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let items: Vec<Value> = all
        .iter()
        .take(params.limit.unwrap_or(10))
        .map(|paste| summary_json(paste))
        .collect();
    Json(items)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    search: Option<String>,
    language: Option<String>,
    sort_by: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn my_pastes(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    if !is_owner(&headers) {
        return unauthorized().into_response();
    }
    let pastes = api.pastes.lock().expect("pastes lock");
    let search = params.search.unwrap_or_default().to_lowercase();
    let mut matches: Vec<&StoredPaste> = pastes
        .iter()
        .filter(|paste| paste.owned)
        .filter(|paste| {
            search.is_empty()
                || paste
                    .title
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&search)
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

    match params.sort_by.as_deref().unwrap_or("date") {
        "views" => matches.sort_by(|a, b| b.views.cmp(&a.views)),
        "title" => matches.sort_by(|a, b| a.title.cmp(&b.title)),
        _ => matches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).max(1) as usize;
    let total_count = matches.len();
    let total_pages = total_count.div_ceil(page_size) as u32;
    let start = (page as usize - 1) * page_size;
    let items: Vec<Value> = matches
        .iter()
        .skip(start)
        .take(page_size)
        .map(|paste| summary_json(paste))
        .collect();

    Json(json!({
        "pastes": items,
        "totalCount": total_count,
        "page": page,
        "totalPages": total_pages,
    }))
    .into_response()
}

async fn get_paste(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut pastes = api.pastes.lock().expect("pastes lock");
    let Some(paste) = pastes.iter_mut().find(|paste| paste.id == id) else {
        return error_body(StatusCode::NOT_FOUND, "Paste not found").into_response();
    };
    paste.views += 1;
    Json(json!({
        "id": paste.id,
        "content": paste.content,
        "title": paste.title,
        "language": paste.language,
        "createdAt": paste.created_at,
        "views": paste.views,
        "isOwner": paste.owned && is_owner(&headers),
    }))
    .into_response()
}

async fn get_raw(State(api): State<Arc<MockApi>>, Path(id): Path<String>) -> impl IntoResponse {
    let pastes = api.pastes.lock().expect("pastes lock");
    match pastes.iter().find(|paste| paste.id == id) {
        Some(paste) => paste.content.clone().into_response(),
        None => error_body(StatusCode::NOT_FOUND, "Paste not found").into_response(),
    }
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
    if bearer_token(&headers).is_none() {
        return unauthorized().into_response();
    }
    let mut pastes = api.pastes.lock().expect("pastes lock");
    let Some(paste) = pastes.iter_mut().find(|paste| paste.id == id) else {
        return error_body(StatusCode::NOT_FOUND, "Paste not found").into_response();
    };
    if !(paste.owned && is_owner(&headers)) {
        return error_body(StatusCode::FORBIDDEN, "You can only edit your own pastes")
            .into_response();
    }
    if let Some(content) = body.content {
        paste.content = content;
    }
    if let Some(title) = body.title {
        paste.title = Some(title);
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
    if bearer_token(&headers).is_none() {
        return unauthorized().into_response();
    }
    let mut pastes = api.pastes.lock().expect("pastes lock");
    let Some(index) = pastes.iter().position(|paste| paste.id == id) else {
        return error_body(StatusCode::NOT_FOUND, "Paste not found").into_response();
    };
    if !(pastes[index].owned && is_owner(&headers)) {
        return error_body(StatusCode::FORBIDDEN, "You can only delete your own pastes")
            .into_response();
    }
    pastes.remove(index);
    Json(json!({ "success": true })).into_response()
}

async fn user_stats(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> impl IntoResponse {
    if !is_owner(&headers) {
        return unauthorized().into_response();
    }
    let pastes = api.pastes.lock().expect("pastes lock");
    let owned: Vec<&StoredPaste> = pastes.iter().filter(|paste| paste.owned).collect();
    let most_viewed = owned
        .iter()
        .max_by_key(|paste| paste.views)
        .map(|paste| paste.id.clone());
    Json(json!({
        "totalPastes": owned.len(),
        "totalViews": owned.iter().map(|paste| paste.views).sum::<u64>(),
        "activePastes": owned.len(),
        "mostViewedPaste": most_viewed,
    }))
    .into_response()
}

async fn user_languages(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> impl IntoResponse {
    if !is_owner(&headers) {
        return unauthorized().into_response();
    }
    let pastes = api.pastes.lock().expect("pastes lock");
    let mut languages: Vec<String> = pastes
        .iter()
        .filter(|paste| paste.owned)
        .map(|paste| paste.language.clone())
        .collect();
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
    let top_languages: Vec<Value> = counts
        .iter()
        .take(5)
        .map(|(language, count)| json!({ "language": language, "count": count }))
        .collect();
    let mut popular: Vec<&StoredPaste> = pastes.iter().collect();
    popular.sort_by(|a, b| b.views.cmp(&a.views));
    let popular_pastes: Vec<Value> = popular
        .iter()
        .take(3)
        .map(|paste| summary_json(paste))
        .collect();
    Json(json!({
        "totalPastes": pastes.len(),
        "totalViews": pastes.iter().map(|paste| paste.views).sum::<u64>(),
        "topLanguages": top_languages,
        "popularPastes": popular_pastes,
    }))
}

async fn auth_me(headers: HeaderMap) -> impl IntoResponse {
    if !is_owner(&headers) {
        return unauthorized().into_response();
    }
    Json(json!({
        "id": 1,
        "email": "dev@example.com",
        "name": "Dev",
        "provider": "github",
    }))
    .into_response()
}
