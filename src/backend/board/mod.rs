//! Server-side board logic: patch and move application, and the
//! completed-at transition every status change runs through.

pub mod reconciler;

pub use reconciler::{apply_move, apply_patch, completed_at_transition, toggle_archived};
