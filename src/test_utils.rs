//! Shared test utilities for the sponsor ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        allocation::{self, AllocationInput},
        course,
        sponsor::{self, NewSponsor},
    },
    entities,
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Password given to every sponsor created by these helpers
pub const TEST_PASSWORD: &str = "test-password-123";

/// Installs a tracing subscriber that writes through the test harness.
/// Safe to call from every test; only the first call takes effect.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Parses a decimal literal such as `"300.00"`.
pub fn money(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a sponsor payload whose initial and current amounts are both `amount`.
///
/// # Defaults
/// * `full_name`: "Test Sponsor"
/// * `phone`: None
/// * `password`: [`TEST_PASSWORD`]
pub fn new_sponsor_input(email: &str, amount: &str) -> NewSponsor {
    NewSponsor {
        full_name: "Test Sponsor".to_string(),
        email: email.to_string(),
        phone: None,
        initial_amount: money(amount),
        current_amount: money(amount),
        password: TEST_PASSWORD.to_string(),
    }
}

/// Creates a sponsor funded with `amount` (logged as its initial `top_up`).
pub async fn create_test_sponsor(
    db: &DatabaseConnection,
    email: &str,
    amount: &str,
) -> Result<entities::sponsor::Model> {
    sponsor::create_sponsor(db, new_sponsor_input(email, amount)).await
}

/// Sets up a complete test environment with one funded sponsor.
/// Returns (db, sponsor) for common test scenarios.
pub async fn setup_with_sponsor(
    amount: &str,
) -> Result<(DatabaseConnection, entities::sponsor::Model)> {
    let db = setup_test_db().await?;
    let sponsor = create_test_sponsor(&db, "sponsor@example.com", amount).await?;
    Ok((db, sponsor))
}

/// Builds an allocation payload with no course, URL or note.
pub fn allocation_input(recipient: &str, amount: &str) -> AllocationInput {
    AllocationInput {
        recipient_full_name: recipient.to_string(),
        course_id: None,
        course_external_url: None,
        amount: money(amount),
        admin_note: None,
    }
}

/// Allocates `amount` from `sponsor_id` to `recipient`.
pub async fn create_test_allocation(
    db: &DatabaseConnection,
    sponsor_id: i64,
    recipient: &str,
    amount: &str,
) -> Result<entities::allocation::Model> {
    allocation::create_allocation(db, sponsor_id, allocation_input(recipient, amount)).await
}

/// Creates a catalog course with only a title.
pub async fn create_test_course(
    db: &DatabaseConnection,
    title: &str,
) -> Result<entities::course::Model> {
    course::create_course(db, title.to_string(), None, None).await
}
