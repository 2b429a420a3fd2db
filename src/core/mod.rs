//! Core business logic - framework-agnostic sponsor ledger operations.
//!
//! Every operation here takes a `SeaORM` connection and returns [`crate::errors::Result`].
//! Nothing in this layer knows about HTTP, sessions or page rendering.

/// Allocation lifecycle: create, correct, reverse
pub mod allocation;
/// Minimal course catalog referenced by allocations
pub mod course;
/// Password hashing and sponsor portal credentials
pub mod credentials;
/// Fixed-precision amount validation
pub mod money;
/// Sponsor statements and balance reconciliation
pub mod report;
/// Sponsor accounts and the balance mutation primitive
pub mod sponsor;
/// Funding and the append-only ledger
pub mod transaction;
/// Per-locale field overrides
pub mod translation;

/// Trims optional free text; blank input becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
