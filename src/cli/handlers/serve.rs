//! Serve command handler

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Start the server, or only validate the configuration when `dry_run` is set.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()?;
            return Ok(());
        }
        Server::new(self.config).run().await
    }

    /// Everything `serve` checks before touching the network.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        self.config.jwt.validate()?;

        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Tokens expire after {} hour(s)",
            self.config.jwt.token_expiration
        );
        if self.config.database.auto_migrate {
            println!("✓ Pending migrations will be applied on startup");
        }
        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn create_valid_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/pvz".to_string();
        config.jwt.secret = "0123456789abcdef0123456789abcdef".to_string();
        config
    }

    #[tokio::test]
    async fn test_serve_dry_run() {
        let handler = ServeCommandHandler::new(create_valid_config());
        assert!(handler.execute(true).await.is_ok());
    }

    #[test]
    fn test_dry_run_rejects_invalid_port() {
        let mut config = create_valid_config();
        config.server.port = 0;
        let handler = ServeCommandHandler::new(config);
        assert!(handler.validate_only().is_err());
    }

    #[test]
    fn test_dry_run_requires_jwt_secret() {
        let mut config = create_valid_config();
        config.jwt.secret = String::new();
        let handler = ServeCommandHandler::new(config);

        match handler.validate_only() {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "jwt.secret"),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_accessor() {
        let config = create_valid_config();
        let handler = ServeCommandHandler::new(config.clone());
        assert_eq!(handler.config(), &config);
    }
}
