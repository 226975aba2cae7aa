//! Applies (or with `down`, rolls back) the schema migrations against the
//! configured database.

use k9ops_api::{config, db, migrator::Migrator};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let direction = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let pool = db::establish_connection_from_app_config(&cfg).await?;

    match direction.as_str() {
        "up" => {
            info!("Starting database migration");
            db::run_migrations(&pool).await?;
        }
        "down" => {
            info!("Rolling back all migrations");
            Migrator::down(&pool, None).await?;
        }
        "status" => {
            Migrator::status(&pool).await?;
        }
        other => {
            error!("Unknown migration command '{}'; expected up, down or status", other);
            anyhow::bail!("unknown migration command: {}", other);
        }
    }

    info!("Migration command '{}' completed", direction);
    Ok(())
}
