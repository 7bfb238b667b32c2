use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::Hash))
                    .col(decimal_len(Users::Cash, 16, 4).default(10000))
                    .to_owned(),
            )
            .await?;

        // Create holdings table, one row per (user, symbol)
        manager
            .create_table(
                Table::create()
                    .table(Holdings::Table)
                    .if_not_exists()
                    .col(integer(Holdings::UserId))
                    .col(string(Holdings::Symbol))
                    .col(big_integer(Holdings::Shares))
                    .primary_key(
                        Index::create()
                            .name("pk_holdings")
                            .col(Holdings::UserId)
                            .col(Holdings::Symbol),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_holdings_user")
                            .from(Holdings::Table, Holdings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create history table
        manager
            .create_table(
                Table::create()
                    .table(History::Table)
                    .if_not_exists()
                    .col(pk_auto(History::Id))
                    .col(integer(History::UserId))
                    .col(string(History::Symbol))
                    .col(big_integer(History::Shares))
                    .col(string_len(History::Method, 8))
                    .col(decimal_len(History::Price, 16, 4))
                    .col(
                        timestamp_with_time_zone(History::TransactedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_history_user")
                            .from(History::Table, History::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_history_user_id")
                    .table(History::Table)
                    .col(History::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(History::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Holdings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Hash,
    Cash,
}

#[derive(DeriveIden)]
enum Holdings {
    Table,
    UserId,
    Symbol,
    Shares,
}

#[derive(DeriveIden)]
enum History {
    Table,
    Id,
    UserId,
    Symbol,
    Shares,
    Method,
    Price,
    TransactedAt,
}
