//! Runtime configuration.
//!
//! [`ConfigLoader`] merges `config/default.toml`, the `{environment}.toml`
//! selected by `PVZ_APP_ENV`, an untracked `local.toml` and `PVZ_*`
//! environment variables into [`Settings`].

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, DatabaseConfig, JwtConfig, ServerConfig, Settings,
};
