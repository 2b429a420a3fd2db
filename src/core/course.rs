//! Course business logic - The catalog rows allocations may point at.
//!
//! Only what the ledger needs lives here: creating a course, looking it up, and
//! deleting it without touching the allocations that referenced it.

use crate::{
    core::{allocation::validate_external_url, normalize_optional_text},
    entities::{Allocation, Course, allocation, course},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument};

/// Creates a catalog course.
pub async fn create_course(
    db: &DatabaseConnection,
    title: String,
    description: Option<String>,
    external_url: Option<String>,
) -> Result<course::Model> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(Error::validation("title", "course title cannot be empty"));
    }
    let external_url = validate_external_url(normalize_optional_text(external_url))?;

    let now = Utc::now();
    let course = course::ActiveModel {
        title: Set(title),
        description: Set(normalize_optional_text(description)),
        external_url: Set(external_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    course.insert(db).await.map_err(Into::into)
}

/// Finds a course by its unique ID.
pub async fn get_course_by_id(
    db: &DatabaseConnection,
    course_id: i64,
) -> Result<Option<course::Model>> {
    Course::find_by_id(course_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes a course. Allocations that referenced it keep their amounts and
/// recipients; only their `course_id` is cleared.
///
/// # Returns
/// The number of allocations that were detached
#[instrument(skip(db))]
pub async fn delete_course(db: &DatabaseConnection, course_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    let course = Course::find_by_id(course_id)
        .one(&txn)
        .await?
        .ok_or(Error::CourseNotFound { id: course_id })?;

    let detached = Allocation::update_many()
        .col_expr(allocation::Column::CourseId, Expr::value(Option::<i64>::None))
        .filter(allocation::Column::CourseId.eq(course_id))
        .exec(&txn)
        .await?
        .rows_affected;

    course.delete(&txn).await?;
    txn.commit().await?;

    info!(course_id, detached, "Course deleted");
    Ok(detached)
}
