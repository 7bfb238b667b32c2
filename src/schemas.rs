use std::fmt;
use std::sync::Arc;

use common::{FormView, HeldSymbol, HistoryRow, PortfolioRow, PortfolioView, QuoteView};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use trading::QuoteProvider;
use utoipa::{OpenApi, ToSchema};

use crate::session::SessionStore;

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Logged-in sessions
    pub sessions: SessionStore,
    /// Source of current share prices
    pub quotes: Arc<dyn QuoteProvider>,
    /// Cash credited to new accounts
    pub starting_cash: Decimal,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("sessions", &self.sessions)
            .field("quotes", &self.quotes.id())
            .field("starting_cash", &self.starting_cash)
            .finish()
    }
}

/// Login form submission
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Registration form submission
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Must repeat `password`
    #[serde(default)]
    pub confirmation: Option<String>,
}

/// Quote lookup form submission
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct QuoteForm {
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Buy or sell form submission
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TradeForm {
    #[serde(default)]
    pub symbol: Option<String>,
    /// Positive whole number of shares
    #[serde(default)]
    pub shares: Option<String>,
}

/// Password change form submission
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PasswordForm {
    #[serde(default)]
    pub oldpass: Option<String>,
    #[serde(default)]
    pub newpass: Option<String>,
    #[serde(default)]
    pub confirm: Option<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Apology message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::portfolio::index,
        crate::handlers::portfolio::history,
        crate::handlers::quote::quote_form,
        crate::handlers::quote::quote,
        crate::handlers::trade::buy_form,
        crate::handlers::trade::buy,
        crate::handlers::trade::sell_form,
        crate::handlers::trade::sell,
        crate::handlers::auth::login_form,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::register_form,
        crate::handlers::auth::register,
        crate::handlers::password::password_form,
        crate::handlers::password::change_password,
    ),
    components(
        schemas(
            ApiResponse<PortfolioView>,
            ApiResponse<Vec<HistoryRow>>,
            ApiResponse<QuoteView>,
            ApiResponse<FormView>,
            PortfolioView,
            PortfolioRow,
            HistoryRow,
            QuoteView,
            FormView,
            HeldSymbol,
            LoginForm,
            RegisterForm,
            QuoteForm,
            TradeForm,
            PasswordForm,
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "portfolio", description = "Holdings and trade history"),
        (name = "quote", description = "Share price lookup"),
        (name = "trade", description = "Buying and selling shares"),
        (name = "auth", description = "Registration, login and logout"),
        (name = "account", description = "Account settings"),
    ),
    info(
        title = "Finance API",
        description = "Stock trading simulator: look up quotes, buy and sell shares with virtual cash",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
