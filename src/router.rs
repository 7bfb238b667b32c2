use crate::error::{panic_apology, route_not_found};
use crate::handlers::{
    auth::{login, login_form, logout, register, register_form},
    health::health_check,
    password::{change_password, password_form},
    portfolio::{history, index},
    quote::{quote, quote_form},
    trade::{buy, buy_form, sell, sell_form},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    http::{
        HeaderValue,
        header::{CACHE_CONTROL, EXPIRES, PRAGMA},
    },
    routing::get,
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer,
    set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Portfolio
        .route("/", get(index))
        .route("/history", get(history))
        // Quotes and trading
        .route("/quote", get(quote_form).post(quote))
        .route("/buy", get(buy_form).post(buy))
        .route("/sell", get(sell_form).post(sell))
        // Accounts
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_form).post(register))
        .route("/password", get(password_form).post(change_password))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Responses reflect per-user state and must never be cached
                .layer(SetResponseHeaderLayer::overriding(
                    CACHE_CONTROL,
                    HeaderValue::from_static("no-cache, no-store, must-revalidate"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    EXPIRES,
                    HeaderValue::from_static("0"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    PRAGMA,
                    HeaderValue::from_static("no-cache"),
                ))
                .layer(CatchPanicLayer::custom(panic_apology))
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30))),
        )
        .with_state(state)
}
