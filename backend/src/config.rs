//! Configuration management for the Rider Distribution Management backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RDM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::AllocationPolicy;
use std::collections::HashMap;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Allocation policy for bundle distribution and production planning
    #[serde(default)]
    pub allocation: AllocationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

/// Allocation policy configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AllocationConfig {
    /// Product name -> units per rider; unset products use the policy fallbacks
    #[serde(default = "default_per_rider")]
    pub per_rider: HashMap<String, i32>,

    /// Fallback allocation for add-ons not listed per product
    #[serde(default = "default_addon_default")]
    pub addon_default: i32,

    /// Minimum warehouse buffer after distribution
    #[serde(default = "default_buffer_min")]
    pub buffer_min: i32,

    /// Buffer as a share of total allocation
    #[serde(default = "default_buffer_percent")]
    pub buffer_percent: f64,
}

fn default_per_rider() -> HashMap<String, i32> {
    AllocationPolicy::default().per_rider
}

fn default_addon_default() -> i32 {
    AllocationPolicy::default().addon_default
}

fn default_buffer_min() -> i32 {
    AllocationPolicy::default().buffer_min
}

fn default_buffer_percent() -> f64 {
    AllocationPolicy::default().buffer_percent
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            per_rider: default_per_rider(),
            addon_default: default_addon_default(),
            buffer_min: default_buffer_min(),
            buffer_percent: default_buffer_percent(),
        }
    }
}

impl AllocationConfig {
    /// Build the domain allocation policy from configuration
    pub fn policy(&self) -> AllocationPolicy {
        AllocationPolicy {
            per_rider: self.per_rider.clone(),
            addon_default: self.addon_default,
            buffer_min: self.buffer_min,
            buffer_percent: self.buffer_percent,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("RDM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RDM_ prefix)
            .add_source(
                Environment::with_prefix("RDM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
