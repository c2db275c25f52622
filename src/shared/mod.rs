//! Types shared between the client sync engine and the backend server.
//!
//! Everything in here is plain data: the task/project model, the realtime
//! wire events, and the error taxonomy. Both sides serialize these with
//! camelCase field names so the JSON matches on the wire.

pub mod error;
pub mod event;
pub mod project;
pub mod task;
pub mod user;

pub use error::SyncError;
pub use event::{BoardEvent, ClientMessage, EventKind};
pub use project::{Project, ProjectMember, ProjectRole, ProjectStatistics};
pub use task::{Comment, NewTask, Task, TaskMove, TaskPatch, TaskPriority, TaskStatus};
pub use user::UserProfile;
