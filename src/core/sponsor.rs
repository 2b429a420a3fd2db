//! Sponsor business logic - Accounts, profiles and the balance primitive.
//!
//! [`apply_balance_delta`] is the only function that writes `current_amount`.
//! Every caller runs it inside a database transaction together with the
//! allocation or ledger write it belongs to.

use crate::{
    core::{
        credentials::hash_password,
        money::{Money, with_cents},
        normalize_optional_text,
        transaction::record_entry,
    },
    entities::{Sponsor, TransactionType, sponsor},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument, warn};

/// Reference written on the opening `top_up` entry
pub const INITIAL_FUNDING_REFERENCE: &str = "Initial funding";

/// Shortest accepted portal password
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Everything needed to open a sponsor account
#[derive(Debug, Clone)]
pub struct NewSponsor {
    /// Display name
    pub full_name: String,
    /// Login email
    pub email: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Opening funding, logged as a `top_up`
    pub initial_amount: Decimal,
    /// Spendable balance at creation (may differ from `initial_amount`)
    pub current_amount: Decimal,
    /// Temporary portal password
    pub password: String,
}

/// Editable profile fields; balances are deliberately absent
#[derive(Debug, Clone)]
pub struct SponsorProfile {
    /// Display name
    pub full_name: String,
    /// Login email
    pub email: String,
    /// Optional phone number
    pub phone: Option<String>,
}

fn validate_full_name(full_name: &str) -> Result<String> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("full_name", "name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(email: &str) -> Result<String> {
    let normalized = email.trim().to_lowercase();
    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(normalized),
        _ => Err(Error::validation("email", "not a valid email address")),
    }
}

pub(crate) fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Checks that no other sponsor, deleted or not, uses `email`.
async fn ensure_email_available<C>(db: &C, email: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Sponsor::find().filter(sponsor::Column::Email.eq(email));
    if let Some(id) = except_id {
        query = query.filter(sponsor::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::DuplicateEmail {
            email: email.to_string(),
        });
    }
    Ok(())
}

/// Opens a sponsor account and logs its initial funding.
///
/// `initial_amount` and `current_amount` are stored as given. When the initial
/// amount is positive, one `top_up` entry referencing "Initial funding" is written
/// in the same database transaction.
#[instrument(skip(db, new_sponsor), fields(email = %new_sponsor.email))]
pub async fn create_sponsor(
    db: &DatabaseConnection,
    new_sponsor: NewSponsor,
) -> Result<sponsor::Model> {
    let full_name = validate_full_name(&new_sponsor.full_name)?;
    let email = normalize_email(&new_sponsor.email)?;
    let initial_amount = Money::non_negative(new_sponsor.initial_amount)?;
    let current_amount = Money::non_negative(new_sponsor.current_amount)?;
    validate_password(&new_sponsor.password)?;
    let password_hash = hash_password(&new_sponsor.password)?;

    let txn = db.begin().await?;

    ensure_email_available(&txn, &email, None).await?;

    let now = Utc::now();
    let sponsor = sponsor::ActiveModel {
        full_name: Set(full_name),
        email: Set(email),
        phone: Set(normalize_optional_text(new_sponsor.phone)),
        initial_amount: Set(initial_amount.amount()),
        current_amount: Set(current_amount.amount()),
        password_hash: Set(password_hash),
        must_change_password: Set(true),
        password_changed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if initial_amount > Money::ZERO {
        record_entry(
            &txn,
            sponsor.id,
            TransactionType::TopUp,
            initial_amount,
            Some(INITIAL_FUNDING_REFERENCE.to_string()),
            None,
        )
        .await?;
    }

    txn.commit().await?;
    info!(sponsor_id = sponsor.id, %initial_amount, %current_amount, "Sponsor created");

    Ok(sponsor)
}

/// Finds an active (non-deleted) sponsor by ID.
pub async fn get_sponsor_by_id(
    db: &DatabaseConnection,
    sponsor_id: i64,
) -> Result<Option<sponsor::Model>> {
    Sponsor::find_by_id(sponsor_id)
        .filter(sponsor::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active sponsor by login email (case-insensitive).
pub async fn get_sponsor_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<sponsor::Model>> {
    Sponsor::find()
        .filter(sponsor::Column::Email.eq(email.trim().to_lowercase()))
        .filter(sponsor::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all active sponsors, ordered alphabetically by name.
pub async fn get_all_active_sponsors(db: &DatabaseConnection) -> Result<Vec<sponsor::Model>> {
    Sponsor::find()
        .filter(sponsor::Column::DeletedAt.is_null())
        .order_by_asc(sponsor::Column::FullName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads an active sponsor or fails with [`Error::SponsorNotFound`].
pub(crate) async fn require_active_sponsor<C>(db: &C, sponsor_id: i64) -> Result<sponsor::Model>
where
    C: ConnectionTrait,
{
    Sponsor::find_by_id(sponsor_id)
        .filter(sponsor::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(Error::SponsorNotFound { id: sponsor_id })
}

/// Updates name, email and phone. Balances are never touched here.
#[instrument(skip(db, profile))]
pub async fn update_sponsor_profile(
    db: &DatabaseConnection,
    sponsor_id: i64,
    profile: SponsorProfile,
) -> Result<sponsor::Model> {
    let full_name = validate_full_name(&profile.full_name)?;
    let email = normalize_email(&profile.email)?;

    let txn = db.begin().await?;

    let existing = require_active_sponsor(&txn, sponsor_id).await?;
    ensure_email_available(&txn, &email, Some(sponsor_id)).await?;

    let mut active_model: sponsor::ActiveModel = existing.into();
    active_model.full_name = Set(full_name);
    active_model.email = Set(email);
    active_model.phone = Set(normalize_optional_text(profile.phone));
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;
    debug!(sponsor_id, "Sponsor profile updated");

    Ok(updated)
}

/// Soft-deletes a sponsor. Allocations and ledger entries are kept for audit.
#[instrument(skip(db))]
pub async fn soft_delete_sponsor(
    db: &DatabaseConnection,
    sponsor_id: i64,
) -> Result<sponsor::Model> {
    let existing = require_active_sponsor(db, sponsor_id).await?;

    let now = Utc::now();
    let mut active_model: sponsor::ActiveModel = existing.into();
    active_model.deleted_at = Set(Some(now));
    active_model.updated_at = Set(now);
    let deleted = active_model.update(db).await?;

    info!(sponsor_id, "Sponsor soft-deleted");
    Ok(deleted)
}

/// Adds `delta` (negative to debit) to a sponsor's balance.
///
/// The sponsor row is read with an exclusive row lock on backends that support
/// it, the new balance is computed in decimal arithmetic, and the write is a
/// compare-and-swap on the value that was read:
/// `UPDATE sponsors SET current_amount = ? WHERE id = ? AND current_amount = ?`.
/// A balance that would go negative fails with [`Error::InsufficientBalance`]
/// and one above [`Money::MAX`] with [`Error::InvalidAmount`], both before
/// anything is written. A lost race fails with [`Error::BalanceConflict`].
///
/// # Arguments
/// * `db` - An open database transaction (or connection)
/// * `sponsor_id` - Sponsor whose balance changes
/// * `delta` - Signed amount to add
///
/// # Returns
/// The sponsor as it is after the update
pub(crate) async fn apply_balance_delta<C>(
    db: &C,
    sponsor_id: i64,
    delta: Decimal,
) -> Result<sponsor::Model>
where
    C: ConnectionTrait,
{
    let sponsor = Sponsor::find_by_id(sponsor_id)
        .filter(sponsor::Column::DeletedAt.is_null())
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or(Error::SponsorNotFound { id: sponsor_id })?;

    let available = with_cents(sponsor.current_amount);
    let new_balance = with_cents(available + delta);
    if new_balance < Decimal::ZERO {
        let requested = with_cents(-delta);
        warn!(sponsor_id, %available, %requested, "Rejected overdraft");
        return Err(Error::InsufficientBalance {
            available,
            requested,
        });
    }
    if new_balance > Money::MAX.amount() {
        warn!(sponsor_id, %available, %delta, "Rejected balance above maximum");
        return Err(Error::InvalidAmount {
            value: new_balance.to_string(),
            reason: "balance would exceed maximum".to_string(),
        });
    }

    let now = Utc::now();
    let result = Sponsor::update_many()
        .col_expr(sponsor::Column::CurrentAmount, Expr::value(new_balance))
        .col_expr(sponsor::Column::UpdatedAt, Expr::value(now))
        .filter(sponsor::Column::Id.eq(sponsor_id))
        .filter(sponsor::Column::CurrentAmount.eq(sponsor.current_amount))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        warn!(sponsor_id, "Balance changed between read and write");
        return Err(Error::BalanceConflict { sponsor_id });
    }

    debug!(sponsor_id, %delta, %new_balance, "Balance updated");
    Ok(sponsor::Model {
        current_amount: new_balance,
        updated_at: now,
        ..sponsor
    })
}
