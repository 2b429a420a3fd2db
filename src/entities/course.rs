//! Course entity - The slice of the public catalog the ledger needs.
//!
//! Allocations reference courses by id; title and description are the fields the
//! translation overlay can override per locale.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    /// Unique identifier for the course
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title in the base locale
    pub title: String,
    /// Description in the base locale
    pub description: Option<String>,
    /// Link to the third-party course page
    pub external_url: Option<String>,
    /// When the course was created
    pub created_at: DateTimeUtc,
    /// When the course was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Course and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One course may be referenced by many allocations
    #[sea_orm(has_many = "super::allocation::Entity")]
    Allocations,
}

impl Related<super::allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
