//! Translation entity - Per-entity, per-field, per-locale override values.
//! A missing row means the base column is shown.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Translation override database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "translations")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Kind of entity being translated (e.g. `"course"`)
    pub translatable_type: String,
    /// Primary key of the translated row
    pub translatable_id: i64,
    /// Column name being overridden
    pub field: String,
    /// Locale code (e.g. `"ar"`)
    pub locale: String,
    /// Localized value
    pub value: String,
    /// When this override was last written
    pub updated_at: DateTimeUtc,
}

/// Translations are keyed polymorphically and have no declared relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
