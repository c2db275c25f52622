//! Realtime wire events.
//!
//! The realtime transport carries two message families:
//!
//! - [`ClientMessage`] - client to server: room joins/leaves and task
//!   lifecycle notifications emitted after a persistence call succeeded.
//! - [`BoardEvent`] - server to room: the same task lifecycle payloads
//!   rebroadcast verbatim to every connection in the project room,
//!   including the sender. Clients must tolerate their own echoes
//!   idempotently.
//!
//! Events are fire-and-forget notifications, not the system of record: a
//! connection that is offline at broadcast time never receives the event and
//! resyncs on its next full fetch.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::task::{Task, TaskStatus};

/// Client-to-server realtime message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinProject {
        project_id: Uuid,
    },
    LeaveProject {
        project_id: Uuid,
    },
    TaskCreate {
        project_id: Uuid,
        task: Box<Task>,
    },
    TaskUpdate {
        project_id: Uuid,
        task_id: Uuid,
        #[serde(default)]
        status: Option<TaskStatus>,
        #[serde(default)]
        position: Option<i32>,
    },
    TaskDelete {
        project_id: Uuid,
        task_id: Uuid,
    },
}

/// Server-to-room broadcast event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
pub enum BoardEvent {
    TaskCreated {
        project_id: Uuid,
        task: Box<Task>,
    },
    TaskUpdated {
        project_id: Uuid,
        task_id: Uuid,
        #[serde(default)]
        status: Option<TaskStatus>,
        #[serde(default)]
        position: Option<i32>,
    },
    TaskDeleted {
        project_id: Uuid,
        task_id: Uuid,
    },
}

/// Kind of a [`BoardEvent`], used for listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
}

impl BoardEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BoardEvent::TaskCreated { .. } => EventKind::TaskCreated,
            BoardEvent::TaskUpdated { .. } => EventKind::TaskUpdated,
            BoardEvent::TaskDeleted { .. } => EventKind::TaskDeleted,
        }
    }

    /// Project room this event is addressed to.
    pub fn project_id(&self) -> Uuid {
        match self {
            BoardEvent::TaskCreated { project_id, .. }
            | BoardEvent::TaskUpdated { project_id, .. }
            | BoardEvent::TaskDeleted { project_id, .. } => *project_id,
        }
    }
}

impl ClientMessage {
    /// Rebroadcast form of a task notification, verbatim payload. Join and
    /// leave messages have no broadcast counterpart.
    pub fn into_board_event(self) -> Option<BoardEvent> {
        match self {
            ClientMessage::TaskCreate { project_id, task } => {
                Some(BoardEvent::TaskCreated { project_id, task })
            }
            ClientMessage::TaskUpdate {
                project_id,
                task_id,
                status,
                position,
            } => Some(BoardEvent::TaskUpdated {
                project_id,
                task_id,
                status,
                position,
            }),
            ClientMessage::TaskDelete {
                project_id,
                task_id,
            } => Some(BoardEvent::TaskDeleted {
                project_id,
                task_id,
            }),
            ClientMessage::JoinProject { .. } | ClientMessage::LeaveProject { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_message_uses_kebab_case_event_name() {
        let msg = ClientMessage::JoinProject {
            project_id: Uuid::new_v4(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "join-project");
        assert!(json["data"].get("projectId").is_some());
    }

    #[test]
    fn task_update_round_trips() {
        let msg = ClientMessage::TaskUpdate {
            project_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            status: Some(TaskStatus::Review),
            position: Some(3),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn update_message_rebroadcasts_verbatim() {
        let project_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let msg = ClientMessage::TaskUpdate {
            project_id,
            task_id,
            status: Some(TaskStatus::Done),
            position: Some(0),
        };
        let event = msg.into_board_event().unwrap();
        assert_eq!(event.kind(), EventKind::TaskUpdated);
        assert_eq!(event.project_id(), project_id);
        match event {
            BoardEvent::TaskUpdated {
                task_id: t,
                status,
                position,
                ..
            } => {
                assert_eq!(t, task_id);
                assert_eq!(status, Some(TaskStatus::Done));
                assert_eq!(position, Some(0));
            }
            other => panic!("expected TaskUpdated, got {other:?}"),
        }
    }

    #[test]
    fn join_has_no_broadcast_form() {
        let msg = ClientMessage::LeaveProject {
            project_id: Uuid::new_v4(),
        };
        assert!(msg.into_board_event().is_none());
    }
}
