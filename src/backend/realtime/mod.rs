//! Realtime layer: room membership routing and the WebSocket endpoint.

pub mod rooms;
pub mod socket;

pub use rooms::{ConnectionId, RoomRouter};
pub use socket::ws_handler;
