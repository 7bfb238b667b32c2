use axum::{extract::State, response::Json};
use common::{HistoryRow, PortfolioView};
use tracing::{debug, info, instrument, trace};

use crate::error::AppError;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use crate::session::AuthUser;

/// Current holdings valued at live prices, plus cash and grand total
#[utoipa::path(
    get,
    path = "/",
    tag = "portfolio",
    responses(
        (status = 200, description = "Portfolio retrieved successfully", body = ApiResponse<PortfolioView>),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn index(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<PortfolioView>>, AppError> {
    trace!("Entering index function");

    let view = trading::portfolio::portfolio(&state.db, state.quotes.as_ref(), user.user_id).await?;
    debug!(
        "Portfolio has {} rows, total value {}",
        view.rows.len(),
        view.total_value
    );

    Ok(Json(ApiResponse::ok(view, "Portfolio retrieved successfully")))
}

/// Every trade the user has made, oldest first
#[utoipa::path(
    get,
    path = "/history",
    tag = "portfolio",
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<HistoryRow>>),
        (status = 303, description = "Not logged in, redirect to /login"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = user.user_id))]
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<HistoryRow>>>, AppError> {
    trace!("Entering history function");

    let rows = trading::portfolio::history(&state.db, user.user_id).await?;
    info!("Retrieved {} history entries", rows.len());

    Ok(Json(ApiResponse::ok(rows, "History retrieved successfully")))
}
