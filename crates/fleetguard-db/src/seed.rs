//! Startup provisioning of the well-known accounts.

use fleetguard_core::models::account::{Account, NewAccount};
use fleetguard_core::repository::AccountRepository;
use tracing::{error, info};

/// Accounts created on first start: `(username, password, role)`.
pub const DEFAULT_ACCOUNTS: &[(&str, &str, &str)] =
    &[("admin", "admin123", "ADMIN"), ("operador", "op123", "USER")];

/// Credentials of the demo profile's single account.
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo";

/// Create each of [`DEFAULT_ACCOUNTS`] that does not exist yet.
///
/// Failures are logged and skipped so a store hiccup never blocks
/// startup. Returns how many accounts were created.
pub async fn seed_default_accounts<A: AccountRepository>(accounts: &A) -> usize {
    let mut created = 0;
    for &(username, password, role) in DEFAULT_ACCOUNTS {
        match accounts.find_by_username(username).await {
            Ok(Some(_)) => continue,
            Ok(None) => {}
            Err(e) => {
                error!(username, error = %e, "Failed to check seed account");
                continue;
            }
        }

        match accounts
            .create(NewAccount::new(username, password, [role]))
            .await
        {
            Ok(_) => {
                info!(username, role, "Seed account created");
                created += 1;
            }
            Err(e) => error!(username, error = %e, "Failed to create seed account"),
        }
    }
    created
}

/// Provision the demo account with its password stored verbatim. Only
/// meaningful behind a plaintext password verifier.
pub async fn seed_demo_account<A: AccountRepository>(accounts: &A) -> bool {
    match accounts.find_by_username(DEMO_USERNAME).await {
        Ok(Some(_)) => return false,
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to check demo account");
            return false;
        }
    }

    let account = Account::new(DEMO_USERNAME, DEMO_PASSWORD, ["USER"]);
    match accounts.save(account).await {
        Ok(_) => {
            info!(username = DEMO_USERNAME, "Demo account created");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to create demo account");
            false
        }
    }
}
