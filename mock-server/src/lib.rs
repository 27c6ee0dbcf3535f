use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub public_repos: i64,
    pub followers: i64,
    pub following: i64,
}

/// What `/echo` saw, returned verbatim so clients can assert on the wire
/// request they produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Deserialize)]
pub struct Paging {
    pub per_page: Option<usize>,
    pub since: Option<i64>,
}

pub type Db = Arc<Vec<UserDetail>>;

pub const DEFAULT_PER_PAGE: usize = 30;

fn seed() -> Vec<UserDetail> {
    ["octocat", "hubot", "monalisa", "defunkt", "mojombo"]
        .iter()
        .enumerate()
        .map(|(idx, login)| {
            let id = idx as i64 + 1;
            UserDetail {
                user: User {
                    id,
                    login: login.to_string(),
                    avatar_url: format!("https://avatars.example.com/u/{id}"),
                    html_url: format!("https://github.example.com/{login}"),
                },
                name: (idx % 2 == 0).then(|| format!("The {login}")),
                company: None,
                location: Some("Earth".to_string()),
                public_repos: id * 3,
                followers: id * 10,
                following: id,
            }
        })
        .collect()
}

pub fn app() -> Router {
    let db: Db = Arc::new(seed());
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{login}", get(get_user))
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/malformed", get(malformed))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_users(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Vec<User>> {
    let since = paging.since.unwrap_or(0);
    let per_page = paging.per_page.unwrap_or(DEFAULT_PER_PAGE);
    Json(
        db.iter()
            .filter(|d| d.user.id > since)
            .take(per_page)
            .map(|d| d.user.clone())
            .collect(),
    )
}

async fn get_user(
    State(db): State<Db>,
    Path(login): Path<String>,
) -> Result<Json<UserDetail>, StatusCode> {
    db.iter()
        .find(|d| d.user.login == login)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {}", status.as_u16()))
}

async fn malformed() -> &'static str {
    "this is not json"
}
