//! Authentication service: login orchestration, lockout bookkeeping and
//! login history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fleetguard_core::models::login_attempt::{LoginAttempt, NewLoginAttempt};
use fleetguard_core::repository::{
    AccountRepository, LoginHistoryRepository, PaginatedResult, Pagination,
};
use fleetguard_core::{Clock, SystemClock};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::lockout::{self, LockoutPolicy};
use crate::password::PasswordVerifier;
use crate::sanitize;
use crate::user_details::{AuthenticatedPrincipal, UserDetailsLoader};

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
    /// Client address as resolved by the HTTP layer.
    pub ip_address: Option<String>,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Identity to attach to the new session.
    pub principal: AuthenticatedPrincipal,
    pub login_time: DateTime<Utc>,
    pub ip_address: String,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<A: AccountRepository, H: LoginHistoryRepository> {
    accounts: A,
    history: H,
    details: UserDetailsLoader<A>,
    verifier: Arc<dyn PasswordVerifier>,
    policy: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl<A: AccountRepository + Clone, H: LoginHistoryRepository> AuthService<A, H> {
    pub fn new(
        accounts: A,
        history: H,
        verifier: Arc<dyn PasswordVerifier>,
        config: &AuthConfig,
    ) -> Self {
        let policy = LockoutPolicy::from_config(config);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            details: UserDetailsLoader::new(accounts.clone(), policy, clock.clone()),
            accounts,
            history,
            verifier,
            policy,
            clock,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.details = UserDetailsLoader::new(self.accounts.clone(), self.policy, clock.clone());
        self.clock = clock;
        self
    }
}

impl<A: AccountRepository, H: LoginHistoryRepository> AuthService<A, H> {
    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    pub fn user_details(&self) -> &UserDetailsLoader<A> {
        &self.details
    }

    /// See [`sanitize::sanitize_identifier`].
    pub fn sanitize_identifier(&self, raw: Option<&str>, context: &str) -> String {
        sanitize::sanitize_identifier(raw, context)
    }

    /// Authenticate `username`/`password`.
    ///
    /// The lock check runs before the password is looked at, every
    /// credential failure is counted before the error is returned, and
    /// the counter reset is committed before the principal is handed
    /// out.
    pub async fn login(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        // Lookups use the name as typed; the cleaned copy is for logs only.
        let raw = input.username.as_str();
        let username = sanitize::sanitize_identifier(Some(raw), "login");
        let ip = sanitize::clean(input.ip_address.as_deref());

        if input.username.is_empty() {
            return Err(AuthError::MissingCredential("username"));
        }
        if input.password.is_empty() {
            return Err(AuthError::MissingCredential("password"));
        }

        // 1. Lock status (auto-unlocks an expired lock).
        if self.is_account_locked(raw).await? {
            warn!(username = %username, ip = %ip, "Login attempt on locked account");
            return Err(AuthError::AccountLocked);
        }

        // 2. Load the account's authorization view.
        let view = match self.details.load_authorization_view(raw).await {
            Ok(view) => view,
            Err(AuthError::UnknownAccount) => {
                warn!(username = %username, ip = %ip, "Invalid credentials");
                self.record_failed_attempt(raw, &ip).await;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        // 3. Pre-authentication checks.
        if !view.enabled {
            warn!(username = %username, ip = %ip, "Login attempt on disabled account");
            return Err(AuthError::AccountDisabled);
        }

        // 4. Verify password.
        if !self.verifier.matches(&input.password, &view.password_hash)? {
            warn!(username = %username, ip = %ip, "Invalid credentials");
            self.record_failed_attempt(raw, &ip).await;
            return Err(AuthError::InvalidCredentials);
        }

        // 5. Commit the reset and history row.
        self.record_successful_login(raw, &ip).await?;

        Ok(LoginOutput {
            principal: view.into_principal(),
            login_time: self.clock.now(),
            ip_address: ip,
        })
    }

    /// Whether `username` is inside its lock window.
    ///
    /// Unknown usernames report `false` so lock status cannot be used to
    /// probe for accounts. An expired lock is reset and saved before
    /// returning `false`.
    pub async fn is_account_locked(&self, username: &str) -> AuthResult<bool> {
        let Some(mut account) = self.accounts.find_by_username(username).await? else {
            return Ok(false);
        };

        let now = self.clock.now();
        if self.policy.release_if_expired(&mut account, now) {
            account = self.accounts.save(account).await?;
            info!(username = %account.username, "Lock expired, account unlocked");
        }

        Ok(self.policy.is_locked(&account, now))
    }

    /// Count a failed attempt and append it to the history.
    ///
    /// Best effort: lookup and store errors are logged, never returned.
    /// Attempts against unknown usernames are still written to the
    /// history with no account reference. The account is looked up by
    /// `raw_username` exactly; logs and history get the cleaned form.
    pub async fn record_failed_attempt(&self, raw_username: &str, ip_address: &str) {
        let (cleaned, ip_address) = (
            sanitize::clean(Some(raw_username)),
            sanitize::clean(Some(ip_address)),
        );
        let (username, ip_address) = (cleaned.as_str(), ip_address.as_str());
        let now = self.clock.now();

        let account = match self.accounts.find_by_username(raw_username).await {
            Ok(account) => account,
            Err(e) => {
                error!(username = %username, error = %e, "Failed to load account for failed attempt");
                None
            }
        };

        let account_id = match account {
            Some(mut account) => {
                let id = account.id;
                self.policy.release_if_expired(&mut account, now);
                self.policy.record_failure(&mut account, now);
                let attempts = account.failed_attempts;
                let locked = account.locked_at.is_some();

                match self.accounts.save(account).await {
                    Ok(_) if locked => error!(
                        username = %username,
                        ip = %ip_address,
                        attempts,
                        "Account LOCKED after repeated failed attempts"
                    ),
                    Ok(_) => warn!(
                        username = %username,
                        ip = %ip_address,
                        attempts,
                        "Failed login attempt"
                    ),
                    Err(e) => error!(
                        username = %username,
                        error = %e,
                        "Failed to persist failed attempt"
                    ),
                }
                Some(id)
            }
            None => None,
        };

        self.append_history(account_id, username, ip_address, false, now)
            .await;
    }

    /// Clear the failure counter and append a successful history row.
    ///
    /// The account must exist: a successful authentication for an
    /// unresolvable username is an inconsistency and fails with
    /// [`AuthError::AccountNotFound`]. Store errors on the counter reset
    /// propagate; history errors are only logged.
    pub async fn record_successful_login(
        &self,
        raw_username: &str,
        ip_address: &str,
    ) -> AuthResult<()> {
        let (cleaned, ip_address) = (
            sanitize::clean(Some(raw_username)),
            sanitize::clean(Some(ip_address)),
        );
        let (username, ip_address) = (cleaned.as_str(), ip_address.as_str());
        let mut account = self
            .accounts
            .find_by_username(raw_username)
            .await?
            .ok_or_else(|| AuthError::AccountNotFound(username.to_string()))?;

        let now = self.clock.now();
        if self.policy.record_success(&mut account, now) {
            account = self.accounts.save(account).await?;
        }

        info!(username = %username, ip = %ip_address, "Successful login");
        self.append_history(Some(account.id), username, ip_address, true, now)
            .await;
        Ok(())
    }

    /// Force the account back to OPEN (administrative unlock). Unknown
    /// usernames are a no-op.
    pub async fn reset_failed_attempts(&self, username: &str) -> AuthResult<()> {
        let Some(mut account) = self.accounts.find_by_username(username).await? else {
            return Ok(());
        };

        lockout::reset(&mut account, self.clock.now());
        self.accounts.save(account).await?;
        info!(username = %sanitize::clean(Some(username)), "Failed attempts reset");
        Ok(())
    }

    /// Login history for `username`, newest first.
    pub async fn login_history(
        &self,
        username: &str,
        pagination: Pagination,
    ) -> AuthResult<PaginatedResult<LoginAttempt>> {
        Ok(self.history.list_for_username(username, pagination).await?)
    }

    async fn append_history(
        &self,
        account_id: Option<Uuid>,
        username: &str,
        ip_address: &str,
        success: bool,
        timestamp: DateTime<Utc>,
    ) {
        let entry = NewLoginAttempt {
            account_id,
            username: username.to_string(),
            ip_address: ip_address.to_string(),
            success,
            timestamp,
        };
        if let Err(e) = self.history.append(entry).await {
            error!(username = %username, error = %e, "Failed to save login history");
        }
    }
}
