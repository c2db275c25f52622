//! Headless board synchronization engine.
//!
//! This is the client half of the realtime Kanban board, independent of any
//! UI toolkit. A frontend drives [`sync::BoardSyncClient`] from its
//! single-threaded event loop and renders [`board::BoardState`] after each
//! call; the engine takes care of optimistic application, rollback, and
//! reconciliation with the server.

pub mod board;
pub mod dashboard;
pub mod gateway;
pub mod http;
pub mod session;
pub mod sync;

pub use board::BoardState;
pub use dashboard::{Dashboard, DashboardStats};
pub use gateway::TaskGateway;
pub use http::HttpTaskGateway;
pub use session::{RealtimeSession, SubscriptionId};
pub use sync::{BoardSyncClient, MoveOutcome};
