use std::sync::Arc;

use anyhow::Result;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::Config;
use crate::error::LeaveError;

pub mod models;
pub mod repositories;
pub mod retry;
pub mod utils;

use repositories::{
    BalanceRepository, BalanceStore, InMemoryBalanceStore, InMemoryLeaveRequestStore,
    LeaveRequestRepository, LeaveRequestStore,
};
use retry::{RetryPolicy, retry_with_backoff};

pub const IN_MEMORY_URL: &str = "memory://";

/// Store handles shared by every request handler and the scheduler.
#[derive(Clone)]
pub struct Stores {
    pub requests: Arc<dyn LeaveRequestStore>,
    pub balances: Arc<dyn BalanceStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            requests: Arc::new(InMemoryLeaveRequestStore::new()),
            balances: Arc::new(InMemoryBalanceStore::new()),
        }
    }

    pub fn postgres(pool: PgPool, retry: RetryPolicy) -> Self {
        Self {
            requests: Arc::new(LeaveRequestRepository::new(pool.clone(), retry)),
            balances: Arc::new(BalanceRepository::new(pool, retry)),
        }
    }
}

pub async fn init_database(database_url: &str, retry: &RetryPolicy) -> Result<PgPool> {
    let pool = retry_with_backoff(retry, "connect to database", || async {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok::<_, LeaveError>(pool)
    })
    .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(pool)
}

/// Picks the backing store from the configured URL.
pub async fn connect_stores(config: &Config) -> Result<Stores> {
    let retry = config.retry_policy();

    if config.database_url == IN_MEMORY_URL {
        log::warn!("DATABASE_URL not set to Postgres; leave data is kept in memory only");
        return Ok(Stores::in_memory());
    }

    let pool = init_database(&config.database_url, &retry).await?;
    log::info!("Database connection successful");
    Ok(Stores::postgres(pool, retry))
}
