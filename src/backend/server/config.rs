//! Environment-driven configuration.

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub port: u16,
}

impl ServerConfig {
    /// Read configuration from the environment. `DATABASE_URL` is required;
    /// `SERVER_PORT` defaults to 5000.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;
        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("SERVER_PORT is not a valid port: {raw}"))?,
            Err(_) => 5000,
        };
        Ok(Self { database_url, port })
    }
}
