//! Repository interfaces for the credential store, plus an in-memory implementation.

pub mod memory;
pub mod token;
pub mod user;

pub use memory::InMemoryCredentialStore;
pub use token::{RotationCommit, TokenRepository};
pub use user::UserRepository;
