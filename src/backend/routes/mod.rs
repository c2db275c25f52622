//! HTTP route handlers and router assembly.

pub mod projects;
pub mod router;
pub mod tasks;

pub use router::create_app;
