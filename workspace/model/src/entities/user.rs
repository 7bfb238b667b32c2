use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A registered trader.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Login name, compared case-sensitively.
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string.
    pub hash: String,
    /// Virtual cash available for purchases.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub cash: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::holding::Entity")]
    Holding,
    #[sea_orm(has_many = "super::history_entry::Entity")]
    HistoryEntry,
}

impl Related<super::holding::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Holding.def()
    }
}

impl Related<super::history_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HistoryEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
