//! Shared application state handed to every handler

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};

use crate::{
    auth::AuthManager,
    config::{Config, StorageBackend},
    db::{self, MemoryStore, Repositories},
    integrations::{build_gateway, build_provider, OtpProvider, PaymentGateway},
    services::{AuthService, DressmakerService, OtpService, SubscriptionService, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthManager,
    pub repos: Repositories,
    /// Present only for the postgres backend.
    pub db_pool: Option<PgPool>,
    pub dressmakers: Arc<DressmakerService>,
    pub users: Arc<UserService>,
    pub sessions: Arc<AuthService>,
    pub otp: Arc<OtpService>,
    pub subscriptions: Arc<SubscriptionService>,
}

impl AppState {
    /// Connect storage and outbound providers as configured.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (repos, db_pool) = match config.database.backend {
            StorageBackend::Postgres => {
                let pool = connect(&config).await?;
                (Repositories::postgres(pool.clone()), Some(pool))
            }
            StorageBackend::Firestore => {
                let client = db::firestore::connect(&config.database).await?;
                (Repositories::firestore(client), None)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using the in-process memory store; data is not persisted");
                (Repositories::memory(MemoryStore::new()), None)
            }
        };

        let otp = build_provider(&config.sms).context("Failed to build SMS provider")?;
        let payments = build_gateway(&config.payment).context("Failed to build payment gateway")?;

        let mut state = Self::with_components(config, repos, otp, payments)?;
        state.db_pool = db_pool;
        Ok(state)
    }

    /// Assemble state from already-built parts.
    pub fn with_components(
        config: Config,
        repos: Repositories,
        otp: Arc<dyn OtpProvider>,
        payments: Arc<dyn PaymentGateway>,
    ) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let auth = AuthManager::new(config.clone()).context("Failed to initialize auth")?;

        Ok(Self {
            dressmakers: Arc::new(DressmakerService::new(config.clone(), repos.clone())),
            users: Arc::new(UserService::new(config.clone(), repos.clone())),
            sessions: Arc::new(AuthService::new(auth.clone(), repos.clone())),
            otp: Arc::new(OtpService::new(otp, repos.clone())),
            subscriptions: Arc::new(SubscriptionService::new(
                config.clone(),
                repos.clone(),
                payments,
            )),
            config,
            auth,
            repos,
            db_pool: None,
        })
    }
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let url = config
        .database
        .url
        .as_deref()
        .context("database.url is required for the postgres backend")?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.database.pool_timeout_seconds))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
