//! Unified error type for the sponsor ledger.
//!
//! Every public operation returns [`Result`]. Variants carry enough context for a
//! caller (the admin dashboard or the sponsor portal) to map them onto a
//! field-level validation error, a 404, or a 422 response.

use rust_decimal::Decimal;
use thiserror::Error;

/// All failures the ledger can report
#[derive(Debug, Error)]
pub enum Error {
    /// Amount failed numeric, range, precision or positivity validation
    #[error("Invalid amount {value}: {reason}")]
    InvalidAmount {
        /// The rejected input, as received
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Requested allocation or increase exceeds the sponsor's current balance
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Balance at the time of the check
        available: Decimal,
        /// Amount the operation tried to take
        requested: Decimal,
    },

    /// Sponsor does not exist or has been soft-deleted
    #[error("Sponsor not found: {id}")]
    SponsorNotFound {
        /// Sponsor id that was looked up
        id: i64,
    },

    /// Allocation does not exist, or does not belong to the stated sponsor
    #[error("Allocation not found: {id}")]
    AllocationNotFound {
        /// Allocation id that was looked up
        id: i64,
    },

    /// Referenced course does not exist
    #[error("Course not found: {id}")]
    CourseNotFound {
        /// Course id that was looked up
        id: i64,
    },

    /// Ledger entry does not exist
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Transaction id that was looked up
        id: i64,
    },

    /// Another sponsor already uses this email address
    #[error("A sponsor with email {email} already exists")]
    DuplicateEmail {
        /// The conflicting email
        email: String,
    },

    /// A non-monetary input field is invalid
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// Human-readable reason
        message: String,
    },

    /// Email/password pair did not match
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The balance row changed between the locked read and the write
    #[error("Balance of sponsor {sponsor_id} was modified concurrently")]
    BalanceConflict {
        /// Sponsor whose balance raced
        sponsor_id: i64,
    },

    /// Password hashing backend failure
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Backend message
        message: String,
    },

    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Any database driver or ORM failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for [`Error::Validation`]
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
