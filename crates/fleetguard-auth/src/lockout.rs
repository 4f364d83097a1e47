//! Account lockout policy.
//!
//! Pure decisions over an [`Account`]'s `failed_attempts` / `locked_at`
//! pair and the current time. Nothing here touches a store: callers
//! persist whatever a mutating method changed.
//!
//! ```text
//!   OPEN --failure (n+1 < max)--> OPEN
//!   OPEN --failure (n+1 >= max)--> LOCKED
//!   LOCKED --observed after lock window--> OPEN (counter reset)
//!   OPEN --success--> OPEN (counter reset)
//! ```

use chrono::{DateTime, Duration, Utc};
use fleetguard_core::models::account::Account;

use crate::config::AuthConfig;

/// Lock status derived from account fields and "now". Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Open,
    Locked { until: DateTime<Utc> },
    /// Lock window elapsed but the reset has not been written yet.
    Expired,
}

#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    max_failed_attempts: u32,
    lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}

impl LockoutPolicy {
    pub fn new(max_failed_attempts: u32, lock_duration: Duration) -> Self {
        Self {
            max_failed_attempts: max_failed_attempts.max(1),
            lock_duration,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.max_failed_attempts, config.lock_duration())
    }

    pub fn max_failed_attempts(&self) -> u32 {
        self.max_failed_attempts
    }

    pub fn lock_duration(&self) -> Duration {
        self.lock_duration
    }

    pub fn lock_state(&self, account: &Account, now: DateTime<Utc>) -> LockState {
        let Some(locked_at) = account.locked_at else {
            return LockState::Open;
        };
        // An unrepresentable expiry means the lock never ends.
        match locked_at.checked_add_signed(self.lock_duration) {
            Some(until) if now >= until => LockState::Expired,
            Some(until) => LockState::Locked { until },
            None => LockState::Locked {
                until: DateTime::<Utc>::MAX_UTC,
            },
        }
    }

    /// `true` iff a lock is set and `now < locked_at + lock_duration`.
    ///
    /// An expired lock reads as unlocked, but the account still carries
    /// the stale fields: follow up with [`Self::release_if_expired`] and
    /// persist so the auto-unlock is committed.
    pub fn is_locked(&self, account: &Account, now: DateTime<Utc>) -> bool {
        matches!(self.lock_state(account, now), LockState::Locked { .. })
    }

    /// Time left on an active lock.
    pub fn remaining_lock(&self, account: &Account, now: DateTime<Utc>) -> Option<Duration> {
        match self.lock_state(account, now) {
            LockState::Locked { until } => Some(until - now),
            LockState::Open | LockState::Expired => None,
        }
    }

    /// Collapse an expired lock back to OPEN. Returns `true` when the
    /// account changed and must be saved.
    pub fn release_if_expired(&self, account: &mut Account, now: DateTime<Utc>) -> bool {
        if self.lock_state(account, now) != LockState::Expired {
            return false;
        }
        account.failed_attempts = 0;
        account.locked_at = None;
        account.updated_at = now;
        true
    }

    /// Count one failure, locking at the threshold.
    pub fn record_failure(&self, account: &mut Account, now: DateTime<Utc>) {
        account.failed_attempts = account.failed_attempts.saturating_add(1);
        if account.failed_attempts >= self.max_failed_attempts {
            account.locked_at = Some(now);
        }
        account.updated_at = now;
    }

    /// Clear the counter after a successful login. Returns `true` when
    /// there was anything to clear.
    pub fn record_success(&self, account: &mut Account, now: DateTime<Utc>) -> bool {
        if account.failed_attempts == 0 && account.locked_at.is_none() {
            return false;
        }
        reset(account, now);
        true
    }
}

/// Unconditional reset, used for administrative unlock.
pub fn reset(account: &mut Account, now: DateTime<Utc>) {
    account.failed_attempts = 0;
    account.locked_at = None;
    account.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new("admin", "hash", ["ADMIN"])
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn fresh_account_is_open() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.lock_state(&account(), t0()), LockState::Open);
        assert!(!policy.is_locked(&account(), t0()));
    }

    #[test]
    fn failures_below_threshold_do_not_lock() {
        let policy = LockoutPolicy::default();
        for start in 0..2 {
            let mut acc = account();
            acc.failed_attempts = start;
            policy.record_failure(&mut acc, t0());
            assert_eq!(acc.failed_attempts, start + 1);
            assert!(acc.locked_at.is_none());
            assert!(!policy.is_locked(&acc, t0()));
        }
    }

    #[test]
    fn third_failure_locks_at_failure_time() {
        let policy = LockoutPolicy::default();
        let mut acc = account();
        for _ in 0..3 {
            policy.record_failure(&mut acc, t0());
        }
        assert_eq!(acc.failed_attempts, 3);
        assert_eq!(acc.locked_at, Some(t0()));
        assert!(policy.is_locked(&acc, t0()));
    }

    #[test]
    fn lock_window_is_half_open() {
        let policy = LockoutPolicy::default();
        let mut acc = account();
        acc.failed_attempts = 3;
        acc.locked_at = Some(t0());

        assert!(policy.is_locked(&acc, t0()));
        assert!(policy.is_locked(&acc, t0() + Duration::minutes(15) - Duration::seconds(1)));
        assert!(!policy.is_locked(&acc, t0() + Duration::minutes(15)));
        assert_eq!(
            policy.lock_state(&acc, t0() + Duration::minutes(16)),
            LockState::Expired
        );
    }

    #[test]
    fn release_resets_only_after_expiry() {
        let policy = LockoutPolicy::default();
        let mut acc = account();
        acc.failed_attempts = 3;
        acc.locked_at = Some(t0());

        assert!(!policy.release_if_expired(&mut acc, t0() + Duration::minutes(5)));
        assert_eq!(acc.failed_attempts, 3);

        assert!(policy.release_if_expired(&mut acc, t0() + Duration::minutes(16)));
        assert_eq!(acc.failed_attempts, 0);
        assert!(acc.locked_at.is_none());

        // Already open: nothing to write.
        assert!(!policy.release_if_expired(&mut acc, t0() + Duration::minutes(17)));
    }

    #[test]
    fn remaining_lock_counts_down() {
        let policy = LockoutPolicy::default();
        let mut acc = account();
        acc.failed_attempts = 3;
        acc.locked_at = Some(t0());

        assert_eq!(
            policy.remaining_lock(&acc, t0() + Duration::minutes(10)),
            Some(Duration::minutes(5))
        );
        assert_eq!(policy.remaining_lock(&acc, t0() + Duration::minutes(20)), None);
    }

    #[test]
    fn success_resets_and_reports_change() {
        let policy = LockoutPolicy::default();
        let mut acc = account();
        acc.failed_attempts = 2;

        assert!(policy.record_success(&mut acc, t0()));
        assert_eq!(acc.failed_attempts, 0);
        assert!(acc.locked_at.is_none());

        assert!(!policy.record_success(&mut acc, t0()));
    }

    #[test]
    fn custom_threshold_and_duration() {
        let policy = LockoutPolicy::new(5, Duration::minutes(1));
        let mut acc = account();
        for _ in 0..4 {
            policy.record_failure(&mut acc, t0());
        }
        assert!(!policy.is_locked(&acc, t0()));
        policy.record_failure(&mut acc, t0());
        assert!(policy.is_locked(&acc, t0()));
        assert!(!policy.is_locked(&acc, t0() + Duration::minutes(1)));
    }

    #[test]
    fn huge_duration_never_expires() {
        let policy = LockoutPolicy::new(3, Duration::MAX);
        let mut acc = account();
        acc.failed_attempts = 3;
        acc.locked_at = Some(t0());
        assert!(policy.is_locked(&acc, t0() + Duration::days(3650)));
    }
}
