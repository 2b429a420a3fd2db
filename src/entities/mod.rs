//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod allocation;
pub mod course;
pub mod sponsor;
pub mod sponsor_transaction;
pub mod translation;

// Re-export specific types to avoid conflicts
pub use allocation::{Column as AllocationColumn, Entity as Allocation, Model as AllocationModel};
pub use course::{Column as CourseColumn, Entity as Course, Model as CourseModel};
pub use sponsor::{Column as SponsorColumn, Entity as Sponsor, Model as SponsorModel};
pub use sponsor_transaction::{
    Column as SponsorTransactionColumn, Entity as SponsorTransaction,
    Model as SponsorTransactionModel, TransactionType,
};
pub use translation::{
    Column as TranslationColumn, Entity as Translation, Model as TranslationModel,
};
