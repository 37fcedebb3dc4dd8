//! Florence core library
//!
//! This module exports the core functionality of the Florence hospital
//! administration platform: the resource schema, the storage-backed access
//! layer, the REST surface, and the typed client with its per-entity
//! collection stores.

pub mod api;
pub mod auth;
pub mod client;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub database: DatabaseConfig,
        pub auth: AuthConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DatabaseConfig {
        pub url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct AuthConfig {
        pub jwt_secret: String,
        pub token_ttl_minutes: i64,
    }

    /// Load configuration: defaults file, then the environment-specific
    /// file named by FLORENCE_ENV, then FLORENCE_* environment variables.
    pub fn load_config() -> Result<Config, ::config::ConfigError> {
        let env = std::env::var("FLORENCE_ENV").unwrap_or_else(|_| "development".into());

        ::config::Config::builder()
            .add_source(::config::File::with_name("config/default"))
            .add_source(::config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(::config::Environment::with_prefix("FLORENCE").separator("__"))
            .build()?
            .try_deserialize()
    }
}
