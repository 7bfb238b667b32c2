use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use common::FormView;
use tracing::{info, instrument, trace};

use super::{FormInput, redirect_with_cookie};
use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, PasswordForm};
use crate::session::{AuthUser, LOGIN_PATH};

/// Describe the password change form
#[utoipa::path(
    get,
    path = "/password",
    tag = "account",
    responses(
        (status = 200, description = "Password change form", body = ApiResponse<FormView>),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn password_form(user: AuthUser) -> Json<ApiResponse<FormView>> {
    Json(ApiResponse::ok(
        FormView::new("password", &["oldpass", "newpass", "confirm"]),
        "Change password",
    ))
}

/// Change the password; the current session ends and the user must log in again
#[utoipa::path(
    post,
    path = "/password",
    tag = "account",
    request_body(content = PasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Password changed, session ended, redirect to /login"),
        (status = 403, description = "Missing fields, wrong old password or mismatched confirmation", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    FormInput(form): FormInput<PasswordForm>,
) -> Result<impl IntoResponse, AppError> {
    trace!("Entering change_password function");

    trading::accounts::change_password(
        &state.db,
        user.user_id,
        form.oldpass.as_deref().unwrap_or_default(),
        form.newpass.as_deref().unwrap_or_default(),
        form.confirm.as_deref().unwrap_or_default(),
    )
    .await?;

    state.sessions.destroy(&user.token).await;
    info!("Password changed, session ended");
    Ok(redirect_with_cookie(LOGIN_PATH, Some(state.sessions.removal_cookie())))
}
