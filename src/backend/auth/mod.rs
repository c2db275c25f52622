//! Authentication: user records, JWT sessions, and the auth handlers.

pub mod handlers;
pub mod sessions;
pub mod users;

pub use handlers::{login, me, register};
