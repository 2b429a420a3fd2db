//! Database configuration module for the sponsor ledger.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written DDL.

use crate::entities::{Allocation, Course, Sponsor, SponsorTransaction, Translation};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/sponsor_ledger.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all ledger tables if they do not exist yet.
///
/// Referenced tables are created before the tables holding foreign keys to them.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Sponsor),
        schema.create_table_from_entity(Course),
        schema.create_table_from_entity(Allocation),
        schema.create_table_from_entity(SponsorTransaction),
        schema.create_table_from_entity(Translation),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AllocationModel, CourseModel, SponsorModel, SponsorTransactionModel, TranslationModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<SponsorModel> = Sponsor::find().limit(1).all(&db).await?;
        let _: Vec<CourseModel> = Course::find().limit(1).all(&db).await?;
        let _: Vec<AllocationModel> = Allocation::find().limit(1).all(&db).await?;
        let _: Vec<SponsorTransactionModel> = SponsorTransaction::find().limit(1).all(&db).await?;
        let _: Vec<TranslationModel> = Translation::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<SponsorModel> = Sponsor::find().limit(1).all(&db).await?;
        Ok(())
    }
}
