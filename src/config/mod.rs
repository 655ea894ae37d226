//! Configuration loading and validation
//!
//! TOML configuration with kebab-case keys, validated at load, hashed for
//! the startup log line so operators can tell config revisions apart.

mod parser;
mod types;
mod validation;

pub use parser::{load_config, load_config_with_hash};
pub use types::{
    Config, CrawlConfig, CredentialsConfig, IdentityConfig, OutputConfig, RemoteConfig,
    RetryConfig,
};
pub use validation::validate_config;
