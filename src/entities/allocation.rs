//! Allocation entity - Funds earmarked by a sponsor for one named recipient.
//!
//! An allocation may point at a catalog course, or carry a free-text external URL
//! when no catalog course applies. The course link is a weak reference: deleting
//! the course nulls `course_id` and leaves the allocation in place.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Allocation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sponsor_allocations")]
pub struct Model {
    /// Unique identifier for the allocation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning sponsor
    pub sponsor_id: i64,
    /// Full name of the person receiving the funds
    pub recipient_full_name: String,
    /// Catalog course the funds pay for, if any
    pub course_id: Option<i64>,
    /// Course link used when the course is not in the catalog
    pub course_external_url: Option<String>,
    /// Earmarked amount, always positive
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    /// Internal note visible to admins only
    pub admin_note: Option<String>,
    /// When the allocation was created
    pub created_at: DateTimeUtc,
    /// When the allocation was last corrected
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Allocation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each allocation belongs to one sponsor
    #[sea_orm(
        belongs_to = "super::sponsor::Entity",
        from = "Column::SponsorId",
        to = "super::sponsor::Column::Id"
    )]
    Sponsor,
    /// Each allocation may reference one course
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_delete = "SetNull"
    )]
    Course,
}

impl Related<super::sponsor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sponsor.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
