//! Server wiring: shared state, configuration, and startup.

pub mod config;
pub mod init;
pub mod state;

pub use config::ServerConfig;
pub use init::connect_database;
pub use state::AppState;
