//! TaskFlow - Main Library
//!
//! TaskFlow is a multi-user task/project tracker with a real-time
//! collaborative Kanban board. Users register, create projects, invite
//! members with roles, and manage tasks across status columns; every
//! connected collaborator sees board changes as they happen.
//!
//! # Module Structure
//!
//! The library is organized into three main modules:
//!
//! - **`shared`** - Types shared between client and server
//!   - Task and project data model
//!   - Realtime wire events
//!   - Error taxonomy
//!
//! - **`backend`** - Server-side code (only compiled with the `server` feature)
//!   - Axum HTTP server with a WebSocket realtime endpoint
//!   - Postgres persistence via sqlx
//!   - JWT authentication, room-based broadcast fan-out
//!   - Authoritative position/status reconciliation for board moves
//!
//! - **`client`** - Headless board synchronization engine
//!   - Optimistic per-column board state with rollback
//!   - Session-scoped realtime transport handle
//!   - HTTP gateway to the task/project API
//!   - Dashboard statistics aggregator
//!
//! # Feature Flags
//!
//! - **`server`** (default) - Enables the backend modules and the
//!   `taskflow-server` binary. The `shared` and `client` modules compile
//!   without it, so frontends can depend on the sync engine alone.

pub mod shared;

pub mod client;

#[cfg(feature = "server")]
pub mod backend;
