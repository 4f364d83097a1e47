//! Authorization view of an account.
//!
//! Request handlers receive an [`AuthenticatedPrincipal`] from the login
//! flow and pass it explicitly to whatever needs the caller's identity.

use std::collections::BTreeSet;
use std::sync::Arc;

use fleetguard_core::Clock;
use fleetguard_core::models::account::Account;
use fleetguard_core::repository::AccountRepository;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AuthError, AuthResult};
use crate::lockout::LockoutPolicy;

/// Prefix turning a role name into an authority string.
pub const ROLE_PREFIX: &str = "ROLE_";

/// What the authentication layer needs to verify a login and authorize
/// the resulting session.
#[derive(Debug, Clone)]
pub struct AuthView {
    pub username: String,
    /// Stored hash, handed to the password verifier.
    pub password_hash: String,
    pub enabled: bool,
    /// Always `true`: locked accounts never produce a view.
    pub account_non_locked: bool,
    pub roles: BTreeSet<String>,
    /// `ROLE_<name>` for every role.
    pub authorities: BTreeSet<String>,
}

impl AuthView {
    pub fn from_account(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            password_hash: account.password_hash.clone(),
            enabled: account.enabled,
            account_non_locked: true,
            roles: account.roles.clone(),
            authorities: authorities(&account.roles),
        }
    }

    /// Drop the credential material, keeping what a request needs.
    pub fn into_principal(self) -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            username: self.username,
            roles: self.roles,
            authorities: self.authorities,
        }
    }
}

/// The authenticated caller, threaded through request handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
    pub username: String,
    pub roles: BTreeSet<String>,
    pub authorities: BTreeSet<String>,
}

impl AuthenticatedPrincipal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// Role label shown by the dashboard: administrators vs. operators.
    pub fn display_role(&self) -> &'static str {
        let is_admin = self.roles.iter().any(|r| {
            r.eq_ignore_ascii_case("ADMIN") || r.eq_ignore_ascii_case("ADMINISTRADOR")
        });
        if is_admin { "administrador" } else { "operador" }
    }
}

pub fn authorities(roles: &BTreeSet<String>) -> BTreeSet<String> {
    roles.iter().map(|r| format!("{ROLE_PREFIX}{r}")).collect()
}

/// Loads accounts for authentication, refusing locked ones.
#[derive(Clone)]
pub struct UserDetailsLoader<A: AccountRepository> {
    accounts: A,
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl<A: AccountRepository> UserDetailsLoader<A> {
    pub fn new(accounts: A, policy: LockoutPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            policy,
            clock,
        }
    }

    /// Resolve `username` into an [`AuthView`].
    ///
    /// Fails with [`AuthError::UnknownAccount`] both when the name does
    /// not resolve and when the account is inside its lock window. An
    /// expired lock is released and saved before the view is built;
    /// store errors on that write propagate.
    pub async fn load_authorization_view(&self, username: &str) -> AuthResult<AuthView> {
        let Some(mut account) = self.accounts.find_by_username(username).await? else {
            return Err(AuthError::UnknownAccount);
        };

        let now = self.clock.now();
        if self.policy.release_if_expired(&mut account, now) {
            account = self.accounts.save(account).await?;
            info!(username = %account.username, "Lock expired, account unlocked");
        }

        if self.policy.is_locked(&account, now) {
            warn!(username = %account.username, "Refusing locked account");
            return Err(AuthError::UnknownAccount);
        }

        Ok(AuthView::from_account(&account))
    }
}
