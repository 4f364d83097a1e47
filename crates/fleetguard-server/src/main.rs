//! FleetGuard server entry point.

mod config;

use std::sync::Arc;

use anyhow::Context;
use fleetguard_auth::{Argon2Verifier, AuthService, PasswordVerifier, PlaintextVerifier};
use fleetguard_core::repository::{AccountRepository, LoginHistoryRepository};
use fleetguard_db::{
    DbManager, InMemoryAccountRepository, InMemoryLoginHistoryRepository,
    SurrealAccountRepository, SurrealLoginHistoryRepository, seed_default_accounts,
    seed_demo_account,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, StoreMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fleetguard=info".parse()?),
        )
        .json()
        .init();

    info!("Starting FleetGuard server...");

    let config = AppConfig::load().context("loading configuration")?;

    match config.store {
        StoreMode::Memory => {
            warn!("In-memory store selected: demo account only, passwords unhashed");
            let accounts = InMemoryAccountRepository::new();
            seed_demo_account(&accounts).await;

            let service = AuthService::new(
                accounts,
                InMemoryLoginHistoryRepository::new(),
                Arc::new(PlaintextVerifier),
                &config.auth,
            );
            run(service).await?;
        }
        StoreMode::Surreal => {
            let manager = DbManager::connect(&config.db)
                .await
                .context("connecting to SurrealDB")?;
            let db = manager.client().clone();
            let accounts = match config.auth.pepper.clone() {
                Some(pepper) => SurrealAccountRepository::with_pepper(db.clone(), pepper),
                None => SurrealAccountRepository::new(db.clone()),
            };

            if config.seed_accounts {
                let created = seed_default_accounts(&accounts).await;
                info!(created, "Default accounts checked");
            }

            let verifier: Arc<dyn PasswordVerifier> =
                Arc::new(Argon2Verifier::new(config.auth.pepper.clone()));
            let service = AuthService::new(
                accounts,
                SurrealLoginHistoryRepository::new(db),
                verifier,
                &config.auth,
            );
            run(service).await?;
        }
    }

    info!("FleetGuard server stopped.");
    Ok(())
}

/// Hold the service until shutdown is requested.
async fn run<A, H>(service: AuthService<A, H>) -> anyhow::Result<()>
where
    A: AccountRepository,
    H: LoginHistoryRepository,
{
    let policy = service.policy();
    info!(
        max_failed_attempts = policy.max_failed_attempts(),
        lock_duration_secs = policy.lock_duration().num_seconds(),
        "Authentication service ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutdown signal received");
    Ok(())
}
