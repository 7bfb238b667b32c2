//! Registration, login and logout.
//!
//! Each of these first drops whatever session the client already had, so a
//! browser never carries two identities at once.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use common::FormView;
use tracing::{debug, info, instrument, trace};

use super::{FormInput, redirect_with_cookie};
use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, LoginForm, RegisterForm};

/// Describe the login form
#[utoipa::path(
    get,
    path = "/login",
    tag = "auth",
    responses((status = 200, description = "Login form", body = ApiResponse<FormView>))
)]
#[instrument(skip_all)]
pub async fn login_form(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.sessions.clear(&headers).await;
    Json(ApiResponse::ok(
        FormView::new("login", &["username", "password"]),
        "Log in",
    ))
}

/// Log in and start a session
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, session cookie set, redirect to the portfolio"),
        (status = 403, description = "Missing fields or invalid credentials", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    FormInput(form): FormInput<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    trace!("Entering login function");
    state.sessions.clear(&headers).await;

    let username = form.username.unwrap_or_default();
    let password = form.password.unwrap_or_default();
    let user = trading::accounts::authenticate(&state.db, &username, &password).await?;

    let token = state.sessions.create(user.id).await;
    info!("User '{}' logged in", user.username);
    Ok(redirect_with_cookie("/", Some(state.sessions.session_cookie(&token))))
}

/// Forget the session and return to the login page
#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    responses((status = 303, description = "Session cleared, redirect to /"))
)]
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    state.sessions.clear(&headers).await;
    debug!("Logged out");
    redirect_with_cookie("/", Some(state.sessions.removal_cookie()))
}

/// Describe the registration form
#[utoipa::path(
    get,
    path = "/register",
    tag = "auth",
    responses((status = 200, description = "Registration form", body = ApiResponse<FormView>))
)]
#[instrument(skip_all)]
pub async fn register_form() -> Json<ApiResponse<FormView>> {
    Json(ApiResponse::ok(
        FormView::new("register", &["username", "password", "confirmation"]),
        "Register",
    ))
}

/// Create an account and log it in
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered and logged in, redirect to the portfolio"),
        (status = 403, description = "Missing fields, mismatched passwords or username taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    FormInput(form): FormInput<RegisterForm>,
) -> Result<impl IntoResponse, AppError> {
    trace!("Entering register function");
    state.sessions.clear(&headers).await;

    let username = form.username.unwrap_or_default();
    let user = trading::accounts::register(
        &state.db,
        &username,
        form.password.as_deref().unwrap_or_default(),
        form.confirmation.as_deref().unwrap_or_default(),
        state.starting_cash,
    )
    .await?;

    let token = state.sessions.create(user.id).await;
    info!("Registered and logged in user '{}' (ID {})", user.username, user.id);
    Ok(redirect_with_cookie("/", Some(state.sessions.session_cookie(&token))))
}
