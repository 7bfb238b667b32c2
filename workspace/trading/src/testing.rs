//! Shared fixtures for the trading tests: an in-memory database with the
//! schema applied and a static quote table.

use migration::{Migrator, MigratorTrait};
use model::entities::user;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use crate::accounts::{default_starting_cash, register};
use crate::quote::StaticQuoteProvider;

pub async fn setup_db() -> DatabaseConnection {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::WARN)
        .try_init();

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

/// A pooled database in a file under `dir`, so that several connections can
/// run transactions against it at the same time.
pub async fn setup_file_db(dir: &std::path::Path) -> DatabaseConnection {
    let url = format!("sqlite://{}?mode=rwc", dir.join("trading.db").display());
    let db = Database::connect(url)
        .await
        .expect("Failed to open file database");
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Register a user with password "pw" and the default starting cash.
pub async fn create_user(db: &DatabaseConnection, username: &str) -> user::Model {
    register(db, username, "pw", "pw", default_starting_cash())
        .await
        .expect("Failed to create test user")
}

/// AAPL at 150.00 and MSFT at 250.00.
pub fn test_quotes() -> StaticQuoteProvider {
    StaticQuoteProvider::new()
        .with_quote("AAPL", "Apple Inc.", Decimal::new(15_000, 2))
        .with_quote("MSFT", "Microsoft Corporation", Decimal::new(25_000, 2))
}
