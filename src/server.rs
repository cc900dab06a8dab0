use std::{net::SocketAddr, str::FromStr, time::Duration};

use axum::{extract::FromRef, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{database, database::SqliteConnection, ledger::services::LedgerService};

pub struct Options {
    pub database_pool_size: u32,
    pub database_timeout_seconds: u8,
    pub database_url: String,

    pub port: u16,
}

#[derive(Clone)]
pub struct AppState {
    db: SqliteConnection,
    ledger_service: LedgerService,
}

impl AppState {
    pub fn new(db: SqliteConnection) -> Self {
        let ledger_service = LedgerService::new(db.clone());

        Self { db, ledger_service }
    }
}

/// Build the application router for the given state. Pulled out of [`serve`]
/// so tests can drive the full HTTP surface without binding a socket.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", crate::ledger::http::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(opts: Options) -> anyhow::Result<()> {
    let connect_options =
        SqliteConnectOptions::from_str(&opts.database_url)?.create_if_missing(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(opts.database_pool_size)
        .acquire_timeout(Duration::from_secs(opts.database_timeout_seconds.into()))
        .connect_with(connect_options)
        .await?;

    database::seed_defaults(&db_pool).await?;

    let state = AppState::new(SqliteConnection::new(db_pool));

    let address = SocketAddr::from(([0, 0, 0, 0], opts.port));

    info!(%address, "Starting server.");

    axum::Server::bind(&address)
        .serve(app(state).into_make_service())
        .await?;

    Ok(())
}

impl FromRef<AppState> for SqliteConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for LedgerService {
    fn from_ref(state: &AppState) -> Self {
        state.ledger_service.clone()
    }
}
