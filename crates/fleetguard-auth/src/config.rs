//! Authentication configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Failed attempts that lock an account.
pub const MAX_FAILED_ATTEMPTS: u32 = 3;
/// How long a lock lasts before it auto-expires.
pub const LOCK_DURATION_MINUTES: i64 = 15;

/// Configuration for the authentication service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Max consecutive failed login attempts before lockout (default: 3).
    pub max_failed_attempts: u32,
    /// Lockout duration in seconds (default: 900 = 15 min).
    pub lock_duration_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
}

impl AuthConfig {
    pub fn lock_duration(&self) -> Duration {
        i64::try_from(self.lock_duration_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: MAX_FAILED_ATTEMPTS,
            lock_duration_secs: (LOCK_DURATION_MINUTES * 60) as u64,
            pepper: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_lockout_constants() {
        let config = AuthConfig::default();
        assert_eq!(config.max_failed_attempts, 3);
        assert_eq!(config.lock_duration(), Duration::minutes(15));
        assert!(config.pepper.is_none());
    }
}
