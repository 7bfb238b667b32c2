//! Server-side sessions and the authentication gate.
//!
//! The client only ever holds an opaque random token in a cookie; the user id
//! it maps to lives in an in-process cache with idle expiry.

use std::time::Duration;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
    response::Redirect,
};
use cookie::{Cookie, SameSite};
use moka::future::Cache;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::schemas::AppState;

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/login";

#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Cache<String, i32>,
    cookie_name: String,
}

impl SessionStore {
    pub fn new(cookie_name: String, max_sessions: u64, idle_timeout: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(idle_timeout)
            .build();
        Self {
            sessions,
            cookie_name,
        }
    }

    /// Start a session for `user_id` and return its token.
    pub async fn create(&self, user_id: i32) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user_id).await;
        debug!("Session created for user ID {}", user_id);
        token
    }

    pub async fn user_id(&self, token: &str) -> Option<i32> {
        self.sessions.get(token).await
    }

    pub async fn destroy(&self, token: &str) {
        self.sessions.invalidate(token).await;
        trace!("Session destroyed");
    }

    /// Drop the session named by the request's cookie, if any.
    pub async fn clear(&self, headers: &HeaderMap) {
        if let Some(token) = self.token_from(headers) {
            self.destroy(&token).await;
        }
    }

    /// Extract this store's session token from the request cookies.
    pub fn token_from(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value))
            .filter_map(Result::ok)
            .find(|c| c.name() == self.cookie_name && !c.value().is_empty())
            .map(|c| c.value().to_string())
    }

    /// `Set-Cookie` value carrying a session token.
    pub fn session_cookie(&self, token: &str) -> String {
        Cookie::build((self.cookie_name.clone(), token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
            .to_string()
    }

    /// `Set-Cookie` value that makes the client forget its token.
    pub fn removal_cookie(&self) -> String {
        let mut cookie = Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        cookie.make_removal();
        cookie.to_string()
    }
}

/// The authenticated user behind a request.
///
/// Extracting it is the authentication gate: requests without a live session
/// are redirected to the login page before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = state.sessions.token_from(&parts.headers) else {
            trace!("No session cookie on {}, redirecting to login", parts.uri.path());
            return Err(Redirect::to(LOGIN_PATH));
        };

        match state.sessions.user_id(&token).await {
            Some(user_id) => Ok(AuthUser { user_id, token }),
            None => {
                debug!("Unknown or expired session on {}", parts.uri.path());
                Err(Redirect::to(LOGIN_PATH))
            }
        }
    }
}
