//! GitHub-style users API built on `NetworkService`.
//!
//! Response DTOs mirror the wire format; `User` and `UserDetail` are the
//! domain values handed to callers. Missing optional fields collapse to
//! empty strings or zero.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::NetworkService;
use crate::error::Error;
use crate::target::{Target, Task};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub login: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetailResponse {
    pub id: i64,
    pub login: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub public_repos: Option<i64>,
    pub public_gists: Option<i64>,
    pub followers: Option<i64>,
    pub following: Option<i64>,
}

/// A user as listed by the API.
///
/// Two users are equal when their ids and logins match; avatar and profile
/// links are presentation details.
#[derive(Debug, Clone, Eq)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.login == other.login
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetail {
    pub id: i64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    pub name: String,
    pub company: String,
    pub blog: String,
    pub location: String,
    pub email: String,
    pub bio: String,
    pub public_repos: i64,
    pub public_gists: i64,
    pub followers: i64,
    pub following: i64,
}

/// Stable UUID for a numeric API id: eight zero bytes followed by the id in
/// big-endian order.
pub fn uuid_from_api_id(id: i64) -> Uuid {
    Uuid::from_u128(u128::from(id as u64))
}

impl From<UserResponse> for User {
    fn from(r: UserResponse) -> Self {
        Self {
            id: uuid_from_api_id(r.id),
            login: r.login.unwrap_or_default(),
            avatar_url: r.avatar_url.unwrap_or_default(),
            html_url: r.html_url.unwrap_or_default(),
        }
    }
}

impl From<UserDetailResponse> for UserDetail {
    fn from(r: UserDetailResponse) -> Self {
        Self {
            id: r.id,
            login: r.login.unwrap_or_default(),
            avatar_url: r.avatar_url.unwrap_or_default(),
            html_url: r.html_url.unwrap_or_default(),
            name: r.name.unwrap_or_default(),
            company: r.company.unwrap_or_default(),
            blog: r.blog.unwrap_or_default(),
            location: r.location.unwrap_or_default(),
            email: r.email.unwrap_or_default(),
            bio: r.bio.unwrap_or_default(),
            public_repos: r.public_repos.unwrap_or_default(),
            public_gists: r.public_gists.unwrap_or_default(),
            followers: r.followers.unwrap_or_default(),
            following: r.following.unwrap_or_default(),
        }
    }
}

/// Endpoints of the users API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsersTarget {
    List { per_page: u32, since: u64 },
    Detail { username: String },
}

impl From<UsersTarget> for Target {
    fn from(target: UsersTarget) -> Self {
        match target {
            UsersTarget::List { per_page, since } => Target::get("/users")
                .with_task(Task::parameters([("per_page", u64::from(per_page)), ("since", since)])),
            UsersTarget::Detail { username } => Target::get(format!("/users/{username}")),
        }
    }
}

/// Users data access over any `NetworkService`.
#[derive(Debug, Clone)]
pub struct UserRepository<S> {
    service: S,
}

impl<S: NetworkService> UserRepository<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn list_users(&self, per_page: u32, since: u64) -> Result<Vec<User>, Error> {
        let target: Target = UsersTarget::List { per_page, since }.into();
        let users: Vec<UserResponse> = self.service.request(&target).await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn get_user(&self, username: &str) -> Result<UserDetail, Error> {
        let target: Target = UsersTarget::Detail {
            username: username.to_string(),
        }
        .into();
        let detail: UserDetailResponse = self.service.request(&target).await?;
        Ok(detail.into())
    }
}
