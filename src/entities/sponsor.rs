//! Sponsor entity - An external donor account with a spendable balance.
//!
//! `initial_amount` is fixed at creation; `current_amount` is only ever written by
//! the ledger's balance primitive. Sponsors are soft-deleted through `deleted_at`
//! so their allocations and ledger entries stay auditable.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sponsor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sponsors")]
pub struct Model {
    /// Unique identifier for the sponsor
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the donor
    pub full_name: String,
    /// Login email, unique across all sponsors including deleted ones
    #[sea_orm(unique)]
    pub email: String,
    /// Optional contact phone number
    pub phone: Option<String>,
    /// Funding the account was opened with
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub initial_amount: Decimal,
    /// Spendable balance
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub current_amount: Decimal,
    /// Argon2 PHC hash of the portal password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Forces a password change on next portal login
    pub must_change_password: bool,
    /// When the sponsor last chose their own password
    pub password_changed_at: Option<DateTimeUtc>,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the profile or balance last changed
    pub updated_at: DateTimeUtc,
    /// Soft delete marker - set means the sponsor is hidden but data is preserved
    pub deleted_at: Option<DateTimeUtc>,
}

impl Model {
    /// Whether the sponsor has been soft-deleted
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Defines relationships between Sponsor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One sponsor has many allocations
    #[sea_orm(has_many = "super::allocation::Entity")]
    Allocations,
    /// One sponsor has many ledger entries
    #[sea_orm(has_many = "super::sponsor_transaction::Entity")]
    Transactions,
}

impl Related<super::allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl Related<super::sponsor_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
