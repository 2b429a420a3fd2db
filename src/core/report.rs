//! Sponsor statements and balance reconciliation.
//!
//! This module builds the read-side view of the sponsor portal (balance, open
//! allocations, recent ledger entries) and checks that a sponsor's stored
//! balance agrees with what the ledger and the allocation table imply.

use crate::{
    core::{allocation, sponsor::require_active_sponsor, transaction},
    entities::{TransactionType, allocation as allocation_entity, sponsor, sponsor_transaction},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Number of ledger entries a statement shows when no limit is given
pub const DEFAULT_TRANSACTION_LIMIT: u64 = 10;

/// Totals derived from a sponsor's ledger and allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    /// Sum of `top_up` and `adjustment` entries
    pub total_funded: Decimal,
    /// Sum of `refund` entries
    pub total_refunded: Decimal,
    /// Sum of outstanding allocations
    pub total_allocated: Decimal,
}

impl LedgerTotals {
    fn from_rows(
        entries: &[sponsor_transaction::Model],
        allocations: &[allocation_entity::Model],
    ) -> Self {
        let mut totals = Self::default();
        for entry in entries {
            match entry.transaction_type {
                TransactionType::TopUp | TransactionType::Adjustment => {
                    totals.total_funded += entry.amount;
                }
                TransactionType::Refund => totals.total_refunded += entry.amount,
            }
        }
        totals.total_allocated = allocations.iter().map(|a| a.amount).sum();
        totals
    }

    /// Balance the ledger implies: funded - outstanding allocations.
    ///
    /// Refunds are not added on top: every refunded amount already shows up as a
    /// lower (or deleted) outstanding allocation.
    #[must_use]
    pub fn expected_balance(&self) -> Decimal {
        self.total_funded - self.total_allocated
    }
}

/// Everything the sponsor portal shows on its dashboard
#[derive(Debug, Clone)]
pub struct SponsorStatement {
    /// The sponsor being reported on
    pub sponsor: sponsor::Model,
    /// Funding the account was opened with
    pub initial_amount: Decimal,
    /// Spendable balance
    pub current_amount: Decimal,
    /// Ledger-derived totals
    pub totals: LedgerTotals,
    /// Outstanding allocations, newest first
    pub allocations: Vec<allocation_entity::Model>,
    /// Most recent ledger entries, newest first
    pub recent_transactions: Vec<sponsor_transaction::Model>,
}

/// Result of comparing the stored balance with the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Balance implied by ledger entries and outstanding allocations
    pub expected: Decimal,
    /// Balance stored on the sponsor row
    pub actual: Decimal,
    /// `actual - expected`
    pub difference: Decimal,
}

impl Reconciliation {
    /// Whether stored and implied balances agree to the cent
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference.is_zero()
    }
}

/// Generates the portal statement for one sponsor.
///
/// # Arguments
/// * `db` - Database connection
/// * `sponsor_id` - Sponsor to report on
/// * `transaction_limit` - Maximum number of recent entries to include (default 10)
pub async fn generate_sponsor_statement(
    db: &DatabaseConnection,
    sponsor_id: i64,
    transaction_limit: Option<u64>,
) -> Result<SponsorStatement> {
    let sponsor = require_active_sponsor(db, sponsor_id).await?;
    let entries = transaction::get_transactions_for_sponsor(db, sponsor_id).await?;
    let allocations = allocation::get_allocations_for_sponsor(db, sponsor_id).await?;

    let totals = LedgerTotals::from_rows(&entries, &allocations);
    let limit = usize::try_from(transaction_limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT))
        .unwrap_or(usize::MAX);
    let recent_transactions = entries.into_iter().take(limit).collect();

    Ok(SponsorStatement {
        initial_amount: sponsor.initial_amount,
        current_amount: sponsor.current_amount,
        sponsor,
        totals,
        allocations,
        recent_transactions,
    })
}

/// Compares a sponsor's stored balance with the balance its ledger implies.
///
/// For a sponsor opened with `current_amount == initial_amount`, a non-zero
/// difference means some balance change bypassed the ledger.
pub async fn reconcile_sponsor(
    db: &DatabaseConnection,
    sponsor_id: i64,
) -> Result<Reconciliation> {
    let statement = generate_sponsor_statement(db, sponsor_id, Some(0)).await?;
    let expected = statement.totals.expected_balance();
    let actual = statement.current_amount;

    Ok(Reconciliation {
        expected,
        actual,
        difference: actual - expected,
    })
}
