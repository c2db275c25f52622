//! Postgres persistence for tasks and projects.
//!
//! Queries are runtime-checked `query_as` calls against the schema in
//! `migrations/`. Enum columns are stored as text and parsed back through
//! the shared `FromStr` impls; an unrecognized value falls back to the
//! enum default instead of failing the whole read.

pub mod projects;
pub mod tasks;
