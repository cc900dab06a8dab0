use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

pub struct MigrationOpts {
    pub database_url: String,
}

pub async fn run_migrations(opts: MigrationOpts) -> anyhow::Result<()> {
    let connect_options =
        SqliteConnectOptions::from_str(&opts.database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("Applied database migrations.");

    Ok(())
}
