//! SeaORM entities backing the trading simulator: users with their cash
//! balance, per-symbol holdings and the append-only trade history.

pub mod history_entry;
pub mod holding;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::history_entry::Entity as HistoryEntry;
    pub use super::holding::Entity as Holding;
    pub use super::user::Entity as User;
}
