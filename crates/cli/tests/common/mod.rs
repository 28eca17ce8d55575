//! In-process mock of the portal's sharing REST API.
//!
//! Serves `generateToken`, `search`, item data and item details from a
//! shared [`PortalState`] on an ephemeral local port, so tests drive the
//! real client over HTTP.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use mapaudit_portal::{Credentials, PortalOptions, RetryPolicy};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "Secret";
pub const ORG_ID: &str = "org123";

type Params = HashMap<String, String>;
type Shared = Arc<Mutex<PortalState>>;

/// Everything the mock serves, plus counters the tests assert on.
#[derive(Default)]
pub struct PortalState {
    /// Search results, paged by `start`/`num`.
    pub maps: Vec<Value>,
    /// Item data keyed by map id.
    pub item_data: HashMap<String, Value>,
    /// Item details keyed by item id.
    pub items: HashMap<String, Value>,
    /// Reject requests without a token.
    pub require_token: bool,
    /// Reject every token, including freshly issued ones.
    pub reject_all_tokens: bool,
    /// Always report another search page.
    pub endless_search: bool,
    /// Status codes returned by the next search requests, before any results.
    pub search_failures: VecDeque<u16>,
    /// `start` value answered with an embedded error instead of results.
    pub search_error_at: Option<usize>,
    /// Item ids whose details need a token even when `require_token` is off.
    pub private_items: HashSet<String>,

    pub valid_tokens: HashSet<String>,
    pub tokens_issued: usize,
    pub token_requests: usize,
    pub last_token_form: Option<Params>,
    pub search_requests: usize,
    pub last_search_params: Option<Params>,
    pub data_requests: usize,
    pub detail_requests: usize,
}

pub struct MockPortal {
    pub url: String,
    state: Shared,
}

impl MockPortal {
    /// Bind to an ephemeral port and serve `state` in the background.
    pub async fn start(state: PortalState) -> Self {
        let state = Arc::new(Mutex::new(state));

        let app = Router::new()
            .route("/sharing/rest/generateToken", post(generate_token))
            .route("/sharing/rest/search", get(search))
            .route("/sharing/rest/content/items/{id}", get(item_details))
            .route("/sharing/rest/content/items/{id}/data", get(item_data))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, PortalState> {
        self.state.lock().unwrap()
    }

    /// Invalidate every token issued so far.
    pub fn expire_tokens(&self) {
        self.state().valid_tokens.clear();
    }

    /// Client options for this portal: anonymous, no transport retries.
    pub fn options(&self) -> PortalOptions {
        PortalOptions {
            portal_url: self.url.clone(),
            org_id: ORG_ID.to_string(),
            request_timeout: Duration::from_secs(5),
            retry: RetryPolicy::none(),
            ..Default::default()
        }
    }

    pub fn authenticated_options(&self) -> PortalOptions {
        PortalOptions {
            credentials: Some(Credentials::new(USERNAME, PASSWORD)),
            ..self.options()
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn map_result(id: &str, title: &str, views: i64) -> Value {
    json!({
        "id": id,
        "title": title,
        "numViews": views,
        "owner": "gis_admin",
        "type": "Web Map",
    })
}

/// Web map data whose operational layers reference the given items.
pub fn web_map(item_ids: &[&str]) -> Value {
    let layers: Vec<Value> = item_ids
        .iter()
        .map(|item_id| {
            json!({
                "id": format!("layer-{item_id}"),
                "itemId": item_id,
                "title": format!("Layer {item_id}"),
                "layerType": "ArcGISFeatureLayer",
            })
        })
        .collect();
    json!({ "operationalLayers": layers, "version": "2.28" })
}

pub fn layer_item(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "url": format!("https://services.example.com/{id}/FeatureServer"),
        "type": "Feature Service",
        "owner": "gis_admin",
    })
}

/// `count` search results named `m1`, `m2`, ...
pub fn numbered_maps(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|n| map_result(&format!("m{n}"), &format!("Map {n}"), n as i64))
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn token_error(state: &PortalState, params: &Params) -> Option<Value> {
    match params.get("token") {
        Some(token) if state.reject_all_tokens || !state.valid_tokens.contains(token) => {
            Some(json!({"error": {"code": 498, "message": "Invalid token.", "details": []}}))
        }
        None if state.require_token => {
            Some(json!({"error": {"code": 499, "message": "Token Required", "details": []}}))
        }
        _ => None,
    }
}

fn not_found() -> Value {
    json!({"error": {"code": 400, "messageCode": "CONT_0001", "message": "Item does not exist or is inaccessible.", "details": []}})
}

async fn generate_token(State(state): State<Shared>, Form(form): Form<Params>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.token_requests += 1;
    let accepted = form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD);
    state.last_token_form = Some(form);

    if !accepted {
        return Json(json!({"error": {"code": 400, "message": "Unable to generate token.", "details": ["Invalid username or password."]}}));
    }

    state.tokens_issued += 1;
    let token = format!("token-{}", state.tokens_issued);
    state.valid_tokens.insert(token.clone());
    Json(json!({"token": token, "expires": 1_700_000_000_000_i64, "ssl": true}))
}

async fn search(State(state): State<Shared>, Query(params): Query<Params>) -> Response {
    let mut state = state.lock().unwrap();
    state.search_requests += 1;
    state.last_search_params = Some(params.clone());

    if let Some(status) = state.search_failures.pop_front() {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "upstream unavailable").into_response();
    }
    if let Some(error) = token_error(&state, &params) {
        return Json(error).into_response();
    }

    let start: usize = params.get("start").and_then(|s| s.parse().ok()).unwrap_or(1);
    let num: usize = params.get("num").and_then(|s| s.parse().ok()).unwrap_or(10);
    if state.search_error_at == Some(start) {
        return Json(json!({"error": {"code": 400, "message": "Unable to perform query.", "details": []}}))
            .into_response();
    }
    let total = state.maps.len();
    let from = (start - 1).min(total);
    let to = (from + num).min(total);
    let next_start: i64 = if state.endless_search {
        (start + num) as i64
    } else if to < total {
        (to + 1) as i64
    } else {
        -1
    };

    Json(json!({
        "query": params.get("q"),
        "total": total,
        "start": start,
        "num": num,
        "nextStart": next_start,
        "results": state.maps[from..to],
    }))
    .into_response()
}

async fn item_data(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.data_requests += 1;
    if let Some(error) = token_error(&state, &params) {
        return Json(error);
    }
    Json(state.item_data.get(&id).cloned().unwrap_or_else(not_found))
}

async fn item_details(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.detail_requests += 1;
    if let Some(error) = token_error(&state, &params) {
        return Json(error);
    }
    if state.private_items.contains(&id) && !params.contains_key("token") {
        return Json(json!({"error": {"code": 499, "message": "Token Required", "details": []}}));
    }
    Json(state.items.get(&id).cloned().unwrap_or_else(not_found))
}
