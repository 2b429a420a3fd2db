//! Sponsor portal credentials.
//!
//! Passwords are stored as Argon2id PHC strings. New and admin-reset accounts
//! carry `must_change_password` until the sponsor picks their own password.

use crate::{
    core::sponsor::{require_active_sponsor, validate_password},
    entities::sponsor,
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{info, instrument, warn};

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a password against a stored PHC hash.
///
/// A malformed stored hash is an error; a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Looks up an active sponsor by email and checks the password.
///
/// Returns `None` for an unknown email, a deleted sponsor, or a wrong password,
/// without telling the caller which one it was.
#[instrument(skip(db, password))]
pub async fn authenticate_sponsor(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Option<sponsor::Model>> {
    let Some(sponsor) = crate::core::sponsor::get_sponsor_by_email(db, email).await? else {
        return Ok(None);
    };
    if verify_password(password, &sponsor.password_hash)? {
        Ok(Some(sponsor))
    } else {
        warn!(sponsor_id = sponsor.id, "Failed sponsor login");
        Ok(None)
    }
}

/// Lets a sponsor replace their password after proving the current one.
#[instrument(skip(db, current_password, new_password))]
pub async fn change_sponsor_password(
    db: &DatabaseConnection,
    sponsor_id: i64,
    current_password: &str,
    new_password: &str,
) -> Result<sponsor::Model> {
    validate_password(new_password)?;
    let sponsor = require_active_sponsor(db, sponsor_id).await?;
    if !verify_password(current_password, &sponsor.password_hash)? {
        return Err(Error::InvalidCredentials);
    }
    if current_password == new_password {
        return Err(Error::validation(
            "password",
            "new password must differ from the current one",
        ));
    }

    let now = Utc::now();
    let mut active_model: sponsor::ActiveModel = sponsor.into();
    active_model.password_hash = Set(hash_password(new_password)?);
    active_model.must_change_password = Set(false);
    active_model.password_changed_at = Set(Some(now));
    active_model.updated_at = Set(now);
    let updated = active_model.update(db).await?;

    info!(sponsor_id, "Sponsor changed password");
    Ok(updated)
}

/// Admin reset: sets a temporary password the sponsor must change on next login.
#[instrument(skip(db, new_password))]
pub async fn reset_sponsor_password(
    db: &DatabaseConnection,
    sponsor_id: i64,
    new_password: &str,
) -> Result<sponsor::Model> {
    validate_password(new_password)?;
    let sponsor = require_active_sponsor(db, sponsor_id).await?;

    let mut active_model: sponsor::ActiveModel = sponsor.into();
    active_model.password_hash = Set(hash_password(new_password)?);
    active_model.must_change_password = Set(true);
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(db).await?;

    info!(sponsor_id, "Sponsor password reset by admin");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_hash_and_verify() -> Result<()> {
        let hash = hash_password("correct horse")?;
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash)?);
        assert!(!verify_password("wrong horse", &hash)?);

        // Same password, different salt
        assert_ne!(hash, hash_password("correct horse")?);
        Ok(())
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(Error::PasswordHash { .. })
        ));
    }

    #[tokio::test]
    async fn test_authenticate_sponsor() -> Result<()> {
        let (db, sponsor) = setup_with_sponsor("10.00").await?;

        let found = authenticate_sponsor(&db, &sponsor.email, TEST_PASSWORD).await?;
        assert_eq!(found.map(|s| s.id), Some(sponsor.id));

        assert!(authenticate_sponsor(&db, &sponsor.email, "wrong-password").await?.is_none());
        assert!(authenticate_sponsor(&db, "nobody@example.com", TEST_PASSWORD).await?.is_none());

        crate::core::sponsor::soft_delete_sponsor(&db, sponsor.id).await?;
        assert!(authenticate_sponsor(&db, &sponsor.email, TEST_PASSWORD).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_change_sponsor_password() -> Result<()> {
        let (db, sponsor) = setup_with_sponsor("10.00").await?;

        let wrong =
            change_sponsor_password(&db, sponsor.id, "not-the-password", "brand-new-pass").await;
        assert!(matches!(wrong, Err(Error::InvalidCredentials)));

        let same = change_sponsor_password(&db, sponsor.id, TEST_PASSWORD, TEST_PASSWORD).await;
        assert!(matches!(same, Err(Error::Validation { .. })));

        let updated =
            change_sponsor_password(&db, sponsor.id, TEST_PASSWORD, "brand-new-pass").await?;
        assert!(!updated.must_change_password);
        assert!(updated.password_changed_at.is_some());
        assert_eq!(updated.current_amount, sponsor.current_amount);

        assert!(authenticate_sponsor(&db, &sponsor.email, "brand-new-pass").await?.is_some());
        assert!(authenticate_sponsor(&db, &sponsor.email, TEST_PASSWORD).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_reset_sponsor_password() -> Result<()> {
        let (db, sponsor) = setup_with_sponsor("10.00").await?;
        change_sponsor_password(&db, sponsor.id, TEST_PASSWORD, "chosen-by-me").await?;

        let reset = reset_sponsor_password(&db, sponsor.id, "temporary-123").await?;
        assert!(reset.must_change_password);
        assert!(authenticate_sponsor(&db, &sponsor.email, "temporary-123").await?.is_some());

        assert!(matches!(
            reset_sponsor_password(&db, sponsor.id, "short").await,
            Err(Error::Validation { .. })
        ));

        Ok(())
    }
}
