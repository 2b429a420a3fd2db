//! Allocation business logic - Earmarking sponsor funds for recipients.
//!
//! Every operation runs in one database transaction. Creating an allocation or
//! raising its amount debits the sponsor; lowering or deleting it credits the
//! sponsor back and appends a `refund` ledger entry for the exact amount returned.
//! Creating an allocation writes no ledger entry: allocations describe themselves.

use crate::{
    core::{
        money::{Money, deserialize_decimal_string},
        normalize_optional_text,
        sponsor::{apply_balance_delta, require_active_sponsor},
        transaction::record_entry,
    },
    entities::{Allocation, Course, TransactionType, allocation},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::cmp::Ordering;
use tracing::{info, instrument, warn};

/// Payload for creating or updating an allocation
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationInput {
    /// Full name of the person receiving the funds
    pub recipient_full_name: String,
    /// Catalog course, if the funds pay for one
    #[serde(default)]
    pub course_id: Option<i64>,
    /// Course link when no catalog course applies
    #[serde(default)]
    pub course_external_url: Option<String>,
    /// Amount to earmark, as a decimal string
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub amount: Decimal,
    /// Internal note
    #[serde(default)]
    pub admin_note: Option<String>,
}

/// Input after validation, ready to persist
struct ValidatedAllocation {
    recipient_full_name: String,
    course_id: Option<i64>,
    course_external_url: Option<String>,
    amount: Money,
    admin_note: Option<String>,
}

/// Accepts only absolute `http`/`https` links.
pub(crate) fn validate_external_url(url: Option<String>) -> Result<Option<String>> {
    match url {
        Some(u) if !(u.starts_with("https://") || u.starts_with("http://")) => Err(
            Error::validation("course_external_url", "must be an http or https URL"),
        ),
        other => Ok(other),
    }
}

fn validate_input(input: AllocationInput) -> Result<ValidatedAllocation> {
    let amount = Money::positive(input.amount)?;
    let recipient_full_name = input.recipient_full_name.trim().to_string();
    if recipient_full_name.is_empty() {
        return Err(Error::validation(
            "recipient_full_name",
            "recipient name cannot be empty",
        ));
    }
    let course_external_url =
        validate_external_url(normalize_optional_text(input.course_external_url))?;

    Ok(ValidatedAllocation {
        recipient_full_name,
        course_id: input.course_id,
        course_external_url,
        amount,
        admin_note: normalize_optional_text(input.admin_note),
    })
}

async fn ensure_course_exists<C>(db: &C, course_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(id) = course_id {
        Course::find_by_id(id)
            .one(db)
            .await?
            .ok_or(Error::CourseNotFound { id })?;
    }
    Ok(())
}

/// Loads an allocation and checks that `sponsor_id` owns it.
///
/// A mismatch is reported exactly like a missing allocation.
async fn require_owned_allocation<C>(
    db: &C,
    sponsor_id: i64,
    allocation_id: i64,
) -> Result<allocation::Model>
where
    C: ConnectionTrait,
{
    let allocation = Allocation::find_by_id(allocation_id)
        .one(db)
        .await?
        .ok_or(Error::AllocationNotFound { id: allocation_id })?;

    if allocation.sponsor_id != sponsor_id {
        warn!(
            sponsor_id,
            allocation_id,
            owner_id = allocation.sponsor_id,
            "Allocation accessed through the wrong sponsor"
        );
        return Err(Error::AllocationNotFound { id: allocation_id });
    }
    Ok(allocation)
}

/// Earmarks funds for a recipient and debits the sponsor by the same amount.
///
/// Fails with [`Error::InsufficientBalance`] when the amount exceeds the
/// sponsor's current balance. No ledger entry is written.
#[instrument(skip(db, input), fields(amount = %input.amount))]
pub async fn create_allocation(
    db: &DatabaseConnection,
    sponsor_id: i64,
    input: AllocationInput,
) -> Result<allocation::Model> {
    let valid = validate_input(input)?;

    let txn = db.begin().await?;

    ensure_course_exists(&txn, valid.course_id).await?;
    let sponsor = apply_balance_delta(&txn, sponsor_id, -valid.amount.amount()).await?;

    let now = Utc::now();
    let allocation = allocation::ActiveModel {
        sponsor_id: Set(sponsor_id),
        recipient_full_name: Set(valid.recipient_full_name),
        course_id: Set(valid.course_id),
        course_external_url: Set(valid.course_external_url),
        amount: Set(valid.amount.amount()),
        admin_note: Set(valid.admin_note),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(
        sponsor_id,
        allocation_id = allocation.id,
        balance = %sponsor.current_amount,
        "Allocation created"
    );

    Ok(allocation)
}

/// Corrects an allocation's recipient, course, note and amount.
///
/// With `delta = new - old`: a positive delta debits the sponsor (and must fit in
/// the balance), a negative delta credits `|delta|` back and logs a `refund`
/// entry for it, and a zero delta changes fields only.
#[instrument(skip(db, input), fields(amount = %input.amount))]
pub async fn update_allocation(
    db: &DatabaseConnection,
    sponsor_id: i64,
    allocation_id: i64,
    input: AllocationInput,
) -> Result<allocation::Model> {
    let valid = validate_input(input)?;

    let txn = db.begin().await?;

    require_active_sponsor(&txn, sponsor_id).await?;
    let existing = require_owned_allocation(&txn, sponsor_id, allocation_id).await?;
    ensure_course_exists(&txn, valid.course_id).await?;

    let delta = valid.amount.amount() - existing.amount;
    match delta.cmp(&Decimal::ZERO) {
        Ordering::Greater => {
            apply_balance_delta(&txn, sponsor_id, -delta).await?;
        }
        Ordering::Less => {
            let refund = Money::positive(-delta)?;
            apply_balance_delta(&txn, sponsor_id, refund.amount()).await?;
            record_entry(
                &txn,
                sponsor_id,
                TransactionType::Refund,
                refund,
                Some(format!("Allocation #{allocation_id} decrease")),
                None,
            )
            .await?;
        }
        Ordering::Equal => {}
    }

    let mut active_model: allocation::ActiveModel = existing.into();
    active_model.recipient_full_name = Set(valid.recipient_full_name);
    active_model.course_id = Set(valid.course_id);
    active_model.course_external_url = Set(valid.course_external_url);
    active_model.amount = Set(valid.amount.amount());
    active_model.admin_note = Set(valid.admin_note);
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;
    info!(sponsor_id, allocation_id, %delta, "Allocation updated");

    Ok(updated)
}

/// Reverses an allocation: credits its full amount back to the sponsor, logs a
/// `refund` entry, and deletes the allocation row.
#[instrument(skip(db))]
pub async fn delete_allocation(
    db: &DatabaseConnection,
    sponsor_id: i64,
    allocation_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    require_active_sponsor(&txn, sponsor_id).await?;
    let existing = require_owned_allocation(&txn, sponsor_id, allocation_id).await?;
    let refund = Money::positive(existing.amount)?;

    apply_balance_delta(&txn, sponsor_id, refund.amount()).await?;
    record_entry(
        &txn,
        sponsor_id,
        TransactionType::Refund,
        refund,
        Some(format!("Allocation #{allocation_id} deleted")),
        None,
    )
    .await?;
    existing.delete(&txn).await?;

    txn.commit().await?;
    info!(sponsor_id, allocation_id, %refund, "Allocation deleted and refunded");

    Ok(())
}

/// Finds an allocation by its unique ID.
pub async fn get_allocation_by_id(
    db: &DatabaseConnection,
    allocation_id: i64,
) -> Result<Option<allocation::Model>> {
    Allocation::find_by_id(allocation_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a sponsor's outstanding allocations, newest first.
pub async fn get_allocations_for_sponsor(
    db: &DatabaseConnection,
    sponsor_id: i64,
) -> Result<Vec<allocation::Model>> {
    Allocation::find()
        .filter(allocation::Column::SponsorId.eq(sponsor_id))
        .order_by_desc(allocation::Column::CreatedAt)
        .order_by_desc(allocation::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
