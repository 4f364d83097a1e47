//! FleetGuard Auth: account lockout, login orchestration and the
//! authorization view handed to request handlers.

pub mod config;
pub mod error;
pub mod lockout;
pub mod password;
pub mod sanitize;
pub mod service;
pub mod user_details;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use lockout::{LockState, LockoutPolicy};
pub use password::{Argon2Verifier, PasswordVerifier, PlaintextVerifier};
pub use sanitize::{client_ip, sanitize_identifier};
pub use service::{AuthService, LoginInput, LoginOutput};
pub use user_details::{AuthView, AuthenticatedPrincipal, UserDetailsLoader};
