//! Authentication error types.

use fleetguard_core::error::FleetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is locked")]
    AccountLocked,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("missing {0}")]
    MissingCredential(&'static str),

    /// A flow that already asserted the account exists could not find it.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Username unresolvable or account locked while loading the
    /// authorization view. The two are deliberately indistinguishable.
    #[error("unknown account")]
    UnknownAccount,

    #[error("store error: {0}")]
    Store(#[from] FleetError),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Status code the HTTP layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::AccountLocked => 423,
            AuthError::AccountDisabled => 403,
            AuthError::MissingCredential(_) => 400,
            AuthError::InvalidCredentials
            | AuthError::AccountNotFound(_)
            | AuthError::UnknownAccount => 401,
            AuthError::Store(_) | AuthError::Crypto(_) => 500,
        }
    }

    /// Client-facing message. Never reveals whether a username exists.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::AccountLocked => {
                "Account locked after repeated failed attempts. Try again later."
            }
            AuthError::AccountDisabled => "Account disabled",
            AuthError::MissingCredential(_) => "Username and password are required",
            AuthError::InvalidCredentials
            | AuthError::AccountNotFound(_)
            | AuthError::UnknownAccount => "Incorrect username or password",
            AuthError::Store(_) | AuthError::Crypto(_) => "Authentication error",
        }
    }
}

impl From<AuthError> for FleetError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountLocked
            | AuthError::AccountDisabled
            | AuthError::AccountNotFound(_)
            | AuthError::UnknownAccount => FleetError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::MissingCredential(field) => FleetError::Validation {
                message: format!("{field} is required"),
            },
            AuthError::Store(inner) => inner,
            AuthError::Crypto(msg) => FleetError::Crypto(msg),
        }
    }
}
