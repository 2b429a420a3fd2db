//! Sponsor transaction entity - Append-only audit trail of balance-affecting events.
//!
//! The `amount` is always positive; the direction is implied by `type`.
//! Allocation creation is not recorded here, only top-ups, adjustments and refunds.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of ledger entry, stored as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Administrative funding of the account
    #[sea_orm(string_value = "top_up")]
    TopUp,
    /// Administrative correction that adds funds
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// Funds returned from a reduced or deleted allocation
    #[sea_orm(string_value = "refund")]
    Refund,
}

/// Sponsor transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sponsor_transactions")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sponsor whose balance was affected
    pub sponsor_id: i64,
    /// Kind of event
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Positive amount credited to the sponsor
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    /// Short reference (e.g. `"Initial funding"`, `"Allocation #4 deleted"`)
    pub reference: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// When the entry was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `SponsorTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one sponsor
    #[sea_orm(
        belongs_to = "super::sponsor::Entity",
        from = "Column::SponsorId",
        to = "super::sponsor::Column::Id"
    )]
    Sponsor,
}

impl Related<super::sponsor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sponsor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
