/// Database configuration and connection management
pub mod database;

/// Application settings loading from config.toml
pub mod settings;

/// Staff account bootstrap from environment variables
pub mod admin;

pub use settings::AppConfig;
