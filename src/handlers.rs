pub mod auth;
pub mod health;
pub mod password;
pub mod portfolio;
pub mod quote;
pub mod trade;

use axum::{
    extract::FromRequest,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect},
};

use crate::error::AppError;

/// Form body whose extraction failures (wrong content type, duplicated or
/// undecodable fields) become the usual apology instead of a bare 4xx.
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct FormInput<T>(pub T);

/// Redirect after a successful form post, optionally replacing the session cookie.
pub(crate) fn redirect_with_cookie(to: &str, cookie: Option<String>) -> impl IntoResponse {
    let headers: Vec<(_, String)> = cookie.into_iter().map(|c| (SET_COOKIE, c)).collect();
    (AppendHeaders(headers), Redirect::to(to))
}
