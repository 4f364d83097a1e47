//! Credential and login-history store implementations.

mod account;
mod login_history;
mod memory;

pub use account::SurrealAccountRepository;
pub use login_history::SurrealLoginHistoryRepository;
pub use memory::{InMemoryAccountRepository, InMemoryLoginHistoryRepository};
