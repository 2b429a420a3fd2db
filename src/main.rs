use dotenvy::dotenv;
use sponsor_ledger::{
    config::{database, sponsors},
    core::sponsor::{NewSponsor, create_sponsor, get_all_active_sponsors},
    errors::{Error, Result},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed sponsors from config.toml through the ledger, so each gets its
    //    initial funding entry
    let config = sponsors::load_default_config()?;
    for seed in config.sponsors {
        let email = seed.email.clone();
        let new_sponsor = NewSponsor {
            full_name: seed.full_name,
            email: seed.email,
            phone: seed.phone,
            initial_amount: seed.initial_amount,
            current_amount: seed.current_amount.unwrap_or(seed.initial_amount),
            password: seed.password,
        };
        match create_sponsor(&db, new_sponsor).await {
            Ok(created) => info!("Seeded sponsor {} (id {})", created.email, created.id),
            // Soft-deleted sponsors still own their email
            Err(Error::DuplicateEmail { .. }) => {
                info!("Sponsor {} already present, skipping", email);
            }
            Err(e) => warn!("Could not seed sponsor {}: {}", email, e),
        }
    }

    let active = get_all_active_sponsors(&db).await?;
    info!("Ledger ready with {} active sponsor(s)", active.len());

    Ok(())
}
