#[cfg(test)]
pub mod test_utils {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::session::SessionStore;
    use axum::Router;
    use axum_test::{TestServer, TestServerConfig};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
    use tracing::Level;
    use trading::StaticQuoteProvider;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Quotes used by the HTTP tests: AAPL at 150.00, MSFT at 250.00.
    pub fn test_quotes() -> Arc<StaticQuoteProvider> {
        Arc::new(
            StaticQuoteProvider::new()
                .with_quote("AAPL", "Apple Inc.", Decimal::new(15_000, 2))
                .with_quote("MSFT", "Microsoft Corporation", Decimal::new(25_000, 2)),
        )
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state(quotes: Arc<StaticQuoteProvider>) -> AppState {
        let db = setup_test_db().await;

        AppState {
            db,
            sessions: SessionStore::new("session".to_string(), 100, Duration::from_secs(600)),
            quotes,
            starting_cash: Decimal::new(10_000, 0),
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG, defaulting to WARN.
    pub fn init_test_tracing() {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Create axum app for testing
    pub async fn setup_test_app(quotes: Arc<StaticQuoteProvider>) -> Router {
        init_test_tracing();
        let state = setup_test_app_state(quotes).await;
        create_router(state)
    }

    /// Test server that keeps cookies between requests, like a browser,
    /// together with a handle on its quote table.
    pub async fn setup_test_server() -> (TestServer, Arc<StaticQuoteProvider>) {
        let quotes = test_quotes();
        let app = setup_test_app(quotes.clone()).await;
        let config = TestServerConfig {
            save_cookies: true,
            ..TestServerConfig::default()
        };
        let server = TestServer::new_with_config(app, config).expect("Failed to start test server");
        (server, quotes)
    }
}
