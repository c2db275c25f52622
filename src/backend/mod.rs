//! TaskFlow backend server.
//!
//! Axum HTTP API plus a WebSocket realtime endpoint, backed by Postgres via
//! sqlx. Only compiled with the `server` feature.

pub mod auth;
pub mod board;
pub mod error;
pub mod middleware;
pub mod realtime;
pub mod routes;
pub mod server;
pub mod store;
