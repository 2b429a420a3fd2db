//! Ledger entry business logic - Funding and the append-only audit trail.
//!
//! Ledger entries are only ever inserted. Funding operations credit the sponsor
//! balance and append the matching entry inside one database transaction, so a
//! failure leaves neither the balance change nor the entry behind. Refund entries
//! are written by the allocation module through [`record_entry`].

use crate::{
    core::{
        money::{Money, deserialize_decimal_string},
        normalize_optional_text,
        sponsor::apply_balance_delta,
    },
    entities::{SponsorTransaction, TransactionType, sponsor_transaction},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Largest page size the history view will return
pub const MAX_PAGE_SIZE: u64 = 100;

/// Ways an administrator can add funds to a sponsor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingType {
    /// Regular top-up
    TopUp,
    /// Correction in the sponsor's favour
    Adjustment,
}

impl From<FundingType> for TransactionType {
    fn from(value: FundingType) -> Self {
        match value {
            FundingType::TopUp => Self::TopUp,
            FundingType::Adjustment => Self::Adjustment,
        }
    }
}

/// Payload for [`add_funds`]
#[derive(Debug, Clone, Deserialize)]
pub struct FundingInput {
    /// Kind of funding
    #[serde(rename = "type")]
    pub kind: FundingType,
    /// Amount to credit, as a decimal string
    #[serde(deserialize_with = "deserialize_decimal_string")]
    pub amount: Decimal,
    /// Optional short reference (e.g. a bank transfer id)
    #[serde(default)]
    pub reference: Option<String>,
    /// Optional notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// One page of a sponsor's ledger history
#[derive(Debug, Clone)]
pub struct TransactionPage {
    /// Entries on this page, newest first
    pub items: Vec<sponsor_transaction::Model>,
    /// Zero-based page index
    pub page: u64,
    /// Page size actually used
    pub per_page: u64,
    /// Number of entries across all pages
    pub total_items: u64,
    /// Number of pages
    pub total_pages: u64,
}

/// Appends one ledger entry. Callers run this inside their own database transaction.
pub(crate) async fn record_entry<C>(
    db: &C,
    sponsor_id: i64,
    transaction_type: TransactionType,
    amount: Money,
    reference: Option<String>,
    notes: Option<String>,
) -> Result<sponsor_transaction::Model>
where
    C: ConnectionTrait,
{
    let entry = sponsor_transaction::ActiveModel {
        sponsor_id: Set(sponsor_id),
        transaction_type: Set(transaction_type),
        amount: Set(amount.amount()),
        reference: Set(reference),
        notes: Set(notes),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// Credits a sponsor's balance and records a `top_up` or `adjustment` entry.
///
/// The amount must be a positive [`Money`] value; the balance change and the
/// ledger entry are committed together.
#[instrument(skip(db, input), fields(kind = ?input.kind, amount = %input.amount))]
pub async fn add_funds(
    db: &DatabaseConnection,
    sponsor_id: i64,
    input: FundingInput,
) -> Result<sponsor_transaction::Model> {
    let amount = Money::positive(input.amount)?;
    let reference = normalize_optional_text(input.reference);
    let notes = normalize_optional_text(input.notes);

    let txn = db.begin().await?;

    apply_balance_delta(&txn, sponsor_id, amount.amount()).await?;
    let entry = record_entry(
        &txn,
        sponsor_id,
        input.kind.into(),
        amount,
        reference,
        notes,
    )
    .await?;

    txn.commit().await?;
    info!(sponsor_id, entry_id = entry.id, "Funds added");

    Ok(entry)
}

/// Retrieves all ledger entries for a sponsor, newest first.
pub async fn get_transactions_for_sponsor(
    db: &DatabaseConnection,
    sponsor_id: i64,
) -> Result<Vec<sponsor_transaction::Model>> {
    SponsorTransaction::find()
        .filter(sponsor_transaction::Column::SponsorId.eq(sponsor_id))
        .order_by_desc(sponsor_transaction::Column::CreatedAt)
        .order_by_desc(sponsor_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves one page of a sponsor's ledger history for the sponsor portal.
///
/// `page` is zero-based; `per_page` is clamped to `1..=MAX_PAGE_SIZE`.
pub async fn get_transactions_page(
    db: &DatabaseConnection,
    sponsor_id: i64,
    page: u64,
    per_page: u64,
) -> Result<TransactionPage> {
    let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
    let paginator = SponsorTransaction::find()
        .filter(sponsor_transaction::Column::SponsorId.eq(sponsor_id))
        .order_by_desc(sponsor_transaction::Column::CreatedAt)
        .order_by_desc(sponsor_transaction::Column::Id)
        .paginate(db, per_page);

    let totals = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(page).await?;

    Ok(TransactionPage {
        items,
        page,
        per_page,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// Retrieves a specific ledger entry by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<sponsor_transaction::Model>> {
    SponsorTransaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_transaction_by_id`], but a missing entry is an error.
pub async fn require_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<sponsor_transaction::Model> {
    get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::sponsor::get_sponsor_by_id;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn funding(kind: FundingType, amount: &str) -> FundingInput {
        FundingInput {
            kind,
            amount: money(amount),
            reference: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_add_funds_validation() -> Result<()> {
        // Validation fails before any query, so an empty mock is enough
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = add_funds(&db, 1, funding(FundingType::TopUp, "0")).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = add_funds(&db, 1, funding(FundingType::TopUp, "-10.00")).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = add_funds(&db, 1, funding(FundingType::Adjustment, "1.001")).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_funds_top_up() -> Result<()> {
        let (db, sponsor) = setup_with_sponsor("1000.00").await?;

        let mut input = funding(FundingType::TopUp, "250.50");
        input.reference = Some("  Wire 7781 ".to_string());
        input.notes = Some("   ".to_string());
        let entry = add_funds(&db, sponsor.id, input).await?;

        assert_eq!(entry.transaction_type, TransactionType::TopUp);
        assert_eq!(entry.amount, money("250.50"));
        assert_eq!(entry.reference.as_deref(), Some("Wire 7781"));
        assert_eq!(entry.notes, None);

        let sponsor = get_sponsor_by_id(&db, sponsor.id).await?.unwrap();
        assert_eq!(sponsor.current_amount, money("1250.50"));
        assert_eq!(sponsor.initial_amount, money("1000.00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_funds_adjustment_is_logged_with_its_type() -> Result<()> {
        let (db, sponsor) = setup_with_sponsor("100.00").await?;

        add_funds(&db, sponsor.id, funding(FundingType::Adjustment, "5.25")).await?;

        let entries = get_transactions_for_sponsor(&db, sponsor.id).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].transaction_type, TransactionType::Adjustment);
        assert_eq!(entries[0].amount, money("5.25"));
        assert_eq!(entries[1].transaction_type, TransactionType::TopUp);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_funds_rejects_balance_above_maximum() -> Result<()> {
        let (db, sponsor) = setup_with_sponsor("9999999999.99").await?;

        let result = add_funds(&db, sponsor.id, funding(FundingType::TopUp, "0.01")).await;
        assert!(matches!(
            result,
            Err(Error::InvalidAmount { reason, .. }) if reason == "balance would exceed maximum"
        ));

        let stored = get_sponsor_by_id(&db, sponsor.id).await?.unwrap();
        assert_eq!(stored.current_amount, money("9999999999.99"));
        assert_eq!(get_transactions_for_sponsor(&db, sponsor.id).await?.len(), 1);

        Ok(())
    }

    #[test]
    fn test_funding_input_amount_must_be_a_string() {
        let input: FundingInput =
            serde_json::from_str(r#"{"type": "top_up", "amount": "12.50"}"#).unwrap();
        assert_eq!(input.kind, FundingType::TopUp);
        assert_eq!(input.amount, money("12.50"));
        assert_eq!(input.reference, None);

        let float = r#"{"type": "top_up", "amount": 12.5}"#;
        assert!(serde_json::from_str::<FundingInput>(float).is_err());
        // Refunds only come from allocation changes
        let refund = r#"{"type": "refund", "amount": "1.00"}"#;
        assert!(serde_json::from_str::<FundingInput>(refund).is_err());
    }

    #[tokio::test]
    async fn test_add_funds_unknown_sponsor_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let result = add_funds(&db, 999, funding(FundingType::TopUp, "10.00")).await;
        assert!(matches!(result, Err(Error::SponsorNotFound { id: 999 })));

        let entries = get_transactions_for_sponsor(&db, 999).await?;
        assert!(entries.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_transactions_are_scoped_per_sponsor() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_sponsor(&db, "first@example.com", "10.00").await?;
        let second = create_test_sponsor(&db, "second@example.com", "20.00").await?;

        add_funds(&db, first.id, funding(FundingType::TopUp, "1.00")).await?;

        assert_eq!(get_transactions_for_sponsor(&db, first.id).await?.len(), 2);
        assert_eq!(get_transactions_for_sponsor(&db, second.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_transactions_page() -> Result<()> {
        let (db, sponsor) = setup_with_sponsor("100.00").await?;
        for _ in 0..4 {
            add_funds(&db, sponsor.id, funding(FundingType::TopUp, "1.00")).await?;
        }

        let first = get_transactions_page(&db, sponsor.id, 0, 2).await?;
        assert_eq!(first.total_items, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items.len(), 2);

        let last = get_transactions_page(&db, sponsor.id, 2, 2).await?;
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].reference.as_deref(), Some("Initial funding"));

        // Oversized pages are clamped
        let clamped = get_transactions_page(&db, sponsor.id, 0, 10_000).await?;
        assert_eq!(clamped.per_page, MAX_PAGE_SIZE);
        assert_eq!(clamped.items.len(), 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_transaction_by_id() -> Result<()> {
        let (db, sponsor) = setup_with_sponsor("100.00").await?;
        let entry = add_funds(&db, sponsor.id, funding(FundingType::TopUp, "3.00")).await?;

        let found = get_transaction_by_id(&db, entry.id).await?;
        assert_eq!(found, Some(entry));

        assert!(get_transaction_by_id(&db, 999).await?.is_none());
        assert!(matches!(
            require_transaction(&db, 999).await,
            Err(Error::TransactionNotFound { id: 999 })
        ));

        Ok(())
    }
}
