//! Range and consistency checks run after deserialization.

use crate::config::error::ConfigError;
use crate::config::settings::{DatabaseConfig, JwtConfig, ServerConfig, Settings};
use crate::logger::LoggerError;

const POSTGRES_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

const MIN_SECRET_LEN: usize = 32;

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535",
            ));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be at least one second",
            ));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required (set PVZ_DATABASE__URL)",
            ));
        }
        if !POSTGRES_SCHEMES.iter().any(|s| self.url.starts_with(s)) {
            return Err(ConfigError::validation(
                "database.url",
                "Expected postgres://[user:password@]host[:port]/database",
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Pool needs at least one connection",
            ));
        }
        if self.min_connections == 0 || self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Must be between 1 and max_connections ({}), got {}",
                    self.max_connections, self.min_connections
                ),
            ));
        }
        Ok(())
    }
}

impl JwtConfig {
    /// Only `serve` needs a signing key, so this is not part of
    /// [`Settings::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty (set PVZ_JWT__SECRET)",
            ));
        }
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::validation(
                "jwt.secret",
                format!("JWT secret must be at least {MIN_SECRET_LEN} characters"),
            ));
        }
        if self.token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.token_expiration",
                "Token expiration must be a positive number of hours",
            ));
        }
        Ok(())
    }
}

impl From<LoggerError> for ConfigError {
    fn from(error: LoggerError) -> Self {
        match error {
            LoggerError::InvalidSetting { key, message } => {
                ConfigError::validation(format!("logger.{key}"), message)
            }
            other => ConfigError::validation("logger", other.to_string()),
        }
    }
}

impl Settings {
    /// Returns the first failing section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> DatabaseConfig {
        DatabaseConfig {
            url: "postgres://localhost/pvz".to_string(),
            ..Default::default()
        }
    }

    fn jwt(secret: &str, hours: i64) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            token_expiration: hours,
        }
    }

    fn field_of(result: Result<(), ConfigError>) -> String {
        match result {
            Err(error) => error.field().unwrap_or_default().to_string(),
            Ok(()) => panic!("Expected a validation error"),
        }
    }

    #[test]
    fn test_server_bounds() {
        assert!(ServerConfig::default().validate().is_ok());

        let zero_port = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(field_of(zero_port.validate()), "server.port");

        let zero_timeout = ServerConfig {
            request_timeout: 0,
            ..Default::default()
        };
        assert_eq!(field_of(zero_timeout.validate()), "server.request_timeout");
    }

    #[test]
    fn test_database_url() {
        assert!(database().validate().is_ok());
        assert_eq!(field_of(DatabaseConfig::default().validate()), "database.url");

        for url in ["mysql://localhost/pvz", "sqlite://pvz.db", "localhost:5432"] {
            let config = DatabaseConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert_eq!(field_of(config.validate()), "database.url", "{url}");
        }

        let config = DatabaseConfig {
            url: "postgresql://u:p@db:5432/pvz".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_pool_sizes() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..database()
        };
        assert_eq!(field_of(config.validate()), "database.max_connections");

        for min in [0, 11] {
            let config = DatabaseConfig {
                min_connections: min,
                ..database()
            };
            assert_eq!(field_of(config.validate()), "database.min_connections");
        }
    }

    #[test]
    fn test_jwt_rules() {
        assert_eq!(field_of(JwtConfig::default().validate()), "jwt.secret");
        assert_eq!(field_of(jwt("short", 12).validate()), "jwt.secret");
        assert_eq!(
            field_of(jwt(&"a".repeat(32), 0).validate()),
            "jwt.token_expiration"
        );
        assert!(jwt(&"a".repeat(32), 12).validate().is_ok());
    }

    #[test]
    fn test_logger_errors_are_prefixed() {
        let mut settings = Settings {
            database: database(),
            ..Default::default()
        };
        settings.logger.console.enabled = false;
        assert_eq!(field_of(settings.validate()), "logger.console.enabled");
    }

    #[test]
    fn test_settings_do_not_require_jwt_secret() {
        let settings = Settings {
            database: database(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_report_first_failure() {
        let settings = Settings {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate()), "server.port");
        assert_eq!(field_of(Settings::default().validate()), "database.url");
    }
}
