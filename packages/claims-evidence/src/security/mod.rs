//! Credential handling.

pub mod credentials;

pub use credentials::{ModelCredentials, SecretString};
pub use secrecy::ExposeSecret;
