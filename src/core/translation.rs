//! Translation overlay - Per-locale overrides for text columns.
//!
//! Base columns hold the English text. Other locales are stored as rows in the
//! `translations` table keyed by entity type, entity id, field and locale, and are
//! read explicitly through [`get_localized_field`]. A missing override falls back
//! to the base column.

use crate::{
    entities::{Translation, course, translation},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

/// Supported content locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English, the locale of the base columns
    En,
    /// Arabic
    Ar,
}

impl Locale {
    /// Locale stored in the entity's own columns
    pub const BASE: Self = Self::En;

    /// Two-letter locale code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ar" => Ok(Self::Ar),
            other => Err(Error::validation("locale", format!("unsupported locale '{other}'"))),
        }
    }
}

/// An entity whose text fields can be overridden per locale
pub trait Translatable {
    /// Key stored in `translations.translatable_type`
    const TRANSLATABLE_TYPE: &'static str;

    /// Primary key of this row
    fn translatable_id(&self) -> i64;

    /// Base-locale value of `field`; the outer `None` means the field is not translatable.
    fn base_field(&self, field: &str) -> Option<Option<String>>;
}

impl Translatable for course::Model {
    const TRANSLATABLE_TYPE: &'static str = "course";

    fn translatable_id(&self) -> i64 {
        self.id
    }

    fn base_field(&self, field: &str) -> Option<Option<String>> {
        match field {
            "title" => Some(Some(self.title.clone())),
            "description" => Some(self.description.clone()),
            _ => None,
        }
    }
}

fn base_value<T: Translatable>(entity: &T, field: &str) -> Result<Option<String>> {
    entity.base_field(field).ok_or_else(|| {
        Error::validation(
            "field",
            format!("'{field}' is not translatable on {}", T::TRANSLATABLE_TYPE),
        )
    })
}

async fn find_override<C, T>(
    db: &C,
    entity: &T,
    field: &str,
    locale: Locale,
) -> Result<Option<translation::Model>>
where
    C: ConnectionTrait,
    T: Translatable,
{
    Translation::find()
        .filter(translation::Column::TranslatableType.eq(T::TRANSLATABLE_TYPE))
        .filter(translation::Column::TranslatableId.eq(entity.translatable_id()))
        .filter(translation::Column::Field.eq(field))
        .filter(translation::Column::Locale.eq(locale.code()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Reads `field` of `entity` in `locale`, falling back to the base column.
pub async fn get_localized_field<C, T>(
    db: &C,
    entity: &T,
    field: &str,
    locale: Locale,
) -> Result<Option<String>>
where
    C: ConnectionTrait,
    T: Translatable,
{
    let base = base_value(entity, field)?;
    if locale == Locale::BASE {
        return Ok(base);
    }

    Ok(find_override(db, entity, field, locale)
        .await?
        .map(|row| row.value)
        .or(base))
}

/// Stores (or replaces) the `locale` override for `field` of `entity`.
///
/// The base locale cannot be overridden; edit the entity itself instead.
pub async fn set_localized_field<C, T>(
    db: &C,
    entity: &T,
    field: &str,
    locale: Locale,
    value: String,
) -> Result<translation::Model>
where
    C: ConnectionTrait,
    T: Translatable,
{
    base_value(entity, field)?;
    if locale == Locale::BASE {
        return Err(Error::validation(
            "locale",
            "the base locale is stored on the entity itself",
        ));
    }

    let now = Utc::now();
    let saved = if let Some(existing) = find_override(db, entity, field, locale).await? {
        let mut active_model: translation::ActiveModel = existing.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?
    } else {
        translation::ActiveModel {
            translatable_type: Set(T::TRANSLATABLE_TYPE.to_string()),
            translatable_id: Set(entity.translatable_id()),
            field: Set(field.to_string()),
            locale: Set(locale.code().to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?
    };

    debug!(
        translatable_type = T::TRANSLATABLE_TYPE,
        id = entity.translatable_id(),
        field,
        %locale,
        "Translation saved"
    );
    Ok(saved)
}

/// Removes the `locale` override for `field`, if any.
///
/// # Returns
/// Whether an override existed
pub async fn clear_localized_field<C, T>(
    db: &C,
    entity: &T,
    field: &str,
    locale: Locale,
) -> Result<bool>
where
    C: ConnectionTrait,
    T: Translatable,
{
    base_value(entity, field)?;
    match find_override(db, entity, field, locale).await? {
        Some(existing) => {
            existing.delete(db).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}
