//! Configuration management for the Sumo Logic search client.
//!
//! This crate provides the default values and the loader that assembles a
//! validated [`Config`] from `.env` files, environment variables and explicit
//! overrides.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use types::{Config, ConnectionConfig, CredentialsConfig, SearchConfig};
