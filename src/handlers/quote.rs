use axum::{
    extract::State,
    response::Json,
};
use common::{FormView, QuoteView};
use tracing::{debug, info, instrument, trace};

use super::FormInput;
use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, QuoteForm};
use crate::session::AuthUser;

/// Describe the quote lookup form
#[utoipa::path(
    get,
    path = "/quote",
    tag = "quote",
    responses(
        (status = 200, description = "Quote form", body = ApiResponse<FormView>),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn quote_form(user: AuthUser) -> Json<ApiResponse<FormView>> {
    Json(ApiResponse::ok(FormView::new("quote", &["symbol"]), "Enter a stock symbol"))
}

/// Look up the current price of a symbol
#[utoipa::path(
    post,
    path = "/quote",
    tag = "quote",
    request_body(content = QuoteForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Quote found", body = ApiResponse<QuoteView>),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 403, description = "Missing or unknown symbol", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn quote(
    State(state): State<AppState>,
    user: AuthUser,
    FormInput(form): FormInput<QuoteForm>,
) -> Result<Json<ApiResponse<QuoteView>>, AppError> {
    trace!("Entering quote function");

    let symbol = form.symbol.unwrap_or_default();
    if symbol.trim().is_empty() {
        debug!("Quote requested without a symbol");
        return Err(AppError::Validation("must provide stock symbol".to_string()));
    }

    let view = trading::quote::get_quote(state.quotes.as_ref(), &symbol).await?;
    info!("Quoted {} at {}", view.symbol, view.price_usd);

    let message = format!("A share of {} ({}) costs {}.", view.name, view.symbol, view.price_usd);
    Ok(Json(ApiResponse::ok(view, message)))
}
