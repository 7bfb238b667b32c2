//! Registration, login and password changes.

use model::entities::user;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{Result, TradingError};
use crate::password::{hash_password, verify_password};

/// Cash credited to every new account.
pub fn default_starting_cash() -> Decimal {
    Decimal::new(10_000, 0)
}

/// Message shared by every failed login so that an unknown username cannot
/// be told apart from a wrong password.
pub const INVALID_CREDENTIALS: &str = "invalid username and/or password";

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Create a new user with a hashed password and the starting balance.
#[instrument(skip(db, password, confirmation))]
pub async fn register(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    confirmation: &str,
    starting_cash: Decimal,
) -> Result<user::Model> {
    trace!("Entering register function");

    if is_blank(username) {
        return Err(TradingError::validation("must provide username"));
    }
    if password.is_empty() {
        return Err(TradingError::validation("must provide password"));
    }
    if password != confirmation {
        return Err(TradingError::validation("passwords do not match"));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        warn!("Registration rejected, username '{}' is taken", username);
        return Err(TradingError::business_rule("username is already taken"));
    }

    let hash = hash_password(password)?;
    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        hash: Set(hash),
        cash: Set(starting_cash),
        ..Default::default()
    };

    // A concurrent registration can still win the race past the lookup above.
    match new_user.insert(db).await {
        Ok(model) => {
            info!("Registered user '{}' with ID {}", model.username, model.id);
            Ok(model)
        }
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                warn!("Registration lost a race for username '{}'", username);
                Err(TradingError::business_rule("username is already taken"))
            }
            _ => Err(e.into()),
        },
    }
}

/// Check a username/password pair and return the matching user.
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    trace!("Entering authenticate function");

    if is_blank(username) {
        return Err(TradingError::validation("must provide username"));
    }
    if password.is_empty() {
        return Err(TradingError::validation("must provide password"));
    }

    let Some(found) = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
    else {
        debug!("Login failed, no user named '{}'", username);
        return Err(TradingError::Auth(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(password, &found.hash)? {
        debug!("Login failed, wrong password for '{}'", username);
        return Err(TradingError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    info!("User '{}' (ID {}) authenticated", found.username, found.id);
    Ok(found)
}

/// Replace a user's password after checking the current one.
#[instrument(skip(db, old_password, new_password, confirmation))]
pub async fn change_password(
    db: &DatabaseConnection,
    user_id: i32,
    old_password: &str,
    new_password: &str,
    confirmation: &str,
) -> Result<()> {
    trace!("Entering change_password function for user_id: {}", user_id);

    if old_password.is_empty() || new_password.is_empty() || confirmation.is_empty() {
        return Err(TradingError::validation("missing old or new password"));
    }

    let txn = db.begin().await?;

    let Some(current) = user::Entity::find_by_id(user_id).one(&txn).await? else {
        warn!("Password change for missing user ID {}", user_id);
        return Err(TradingError::Auth("user no longer exists".to_string()));
    };

    if !verify_password(old_password, &current.hash)? {
        debug!("Password change rejected for user ID {}: old password mismatch", user_id);
        return Err(TradingError::Auth("old password incorrect".to_string()));
    }

    if new_password != confirmation {
        return Err(TradingError::validation("new passwords do not match"));
    }

    let mut active: user::ActiveModel = current.into();
    active.hash = Set(hash_password(new_password)?);
    active.update(&txn).await?;

    txn.commit().await?;
    info!("Password changed for user ID {}", user_id);
    Ok(())
}
