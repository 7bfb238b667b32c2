use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use common::FormView;
use tracing::{info, instrument, trace};

use super::{FormInput, redirect_with_cookie};
use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, TradeForm};
use crate::session::AuthUser;

/// Describe the buy form
#[utoipa::path(
    get,
    path = "/buy",
    tag = "trade",
    responses(
        (status = 200, description = "Buy form", body = ApiResponse<FormView>),
        (status = 303, description = "Not logged in, redirect to /login")
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn buy_form(user: AuthUser) -> Json<ApiResponse<FormView>> {
    Json(ApiResponse::ok(
        FormView::new("buy", &["symbol", "shares"]),
        "Enter a symbol and number of shares to buy",
    ))
}

/// Buy shares at the current price
#[utoipa::path(
    post,
    path = "/buy",
    tag = "trade",
    request_body(content = TradeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Bought, redirect to the portfolio"),
        (status = 403, description = "Invalid input, unknown symbol or insufficient funds", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn buy(
    State(state): State<AppState>,
    user: AuthUser,
    FormInput(form): FormInput<TradeForm>,
) -> Result<impl IntoResponse, AppError> {
    trace!("Entering buy function");

    let symbol = form.symbol.unwrap_or_default();
    let receipt = trading::trade::buy(
        &state.db,
        state.quotes.as_ref(),
        user.user_id,
        &symbol,
        form.shares.as_deref(),
    )
    .await?;

    info!(
        "Bought {} x {} for {}, cash now {}",
        receipt.shares, receipt.symbol, receipt.amount, receipt.cash_after
    );
    Ok(redirect_with_cookie("/", None))
}

/// Describe the sell form, listing the symbols that can be sold
#[utoipa::path(
    get,
    path = "/sell",
    tag = "trade",
    responses(
        (status = 200, description = "Sell form with current holdings", body = ApiResponse<FormView>),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn sell_form(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<FormView>>, AppError> {
    let holdings = trading::portfolio::held_symbols(&state.db, user.user_id).await?;
    let form = FormView::new("sell", &["symbol", "shares"]).with_holdings(holdings);
    Ok(Json(ApiResponse::ok(form, "Choose a holding and number of shares to sell")))
}

/// Sell shares at the current price
#[utoipa::path(
    post,
    path = "/sell",
    tag = "trade",
    request_body(content = TradeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Sold, redirect to the portfolio"),
        (status = 403, description = "Invalid input, symbol not held or too many shares", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn sell(
    State(state): State<AppState>,
    user: AuthUser,
    FormInput(form): FormInput<TradeForm>,
) -> Result<impl IntoResponse, AppError> {
    trace!("Entering sell function");

    let symbol = form.symbol.unwrap_or_default();
    let receipt = trading::trade::sell(
        &state.db,
        state.quotes.as_ref(),
        user.user_id,
        &symbol,
        form.shares.as_deref(),
    )
    .await?;

    info!(
        "Sold {} x {} for {}, cash now {}",
        -receipt.shares, receipt.symbol, receipt.amount, receipt.cash_after
    );
    Ok(redirect_with_cookie("/", None))
}
