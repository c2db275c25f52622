//! Reconciles task mutations against the board ordering model.
//!
//! Positions are advisory hints, not dense ranks. A move to index `i` in a
//! column writes `position = i` on the moved task and touches nothing else;
//! readers re-sort by `(position, created_at)` and creation time breaks the
//! ties that produces. Nothing here renumbers neighbours.

use chrono::Utc;

use crate::shared::task::{Task, TaskPatch, TaskStatus};

/// Apply a board move: destination column plus the 0-based destination
/// index, which becomes the task's position hint verbatim.
pub fn apply_move(task: &mut Task, status: TaskStatus, index: usize) {
    completed_at_transition(task, status);
    task.position = index as i32;
}

/// Maintain the `completed_at` invariant across a status change.
///
/// Entering `done` stamps the completion time once; leaving it clears the
/// stamp. A write that stays inside or outside `done` leaves it alone.
pub fn completed_at_transition(task: &mut Task, new_status: TaskStatus) {
    match (task.status, new_status) {
        (TaskStatus::Done, TaskStatus::Done) => {}
        (_, TaskStatus::Done) => task.completed_at = Some(Utc::now()),
        (TaskStatus::Done, _) => task.completed_at = None,
        _ => {}
    }
    task.status = new_status;
}

/// Flip the archived flag. Archiving hides a task from boards and counts;
/// unarchiving brings it back.
pub fn toggle_archived(task: &mut Task) {
    task.is_archived = !task.is_archived;
}

/// Apply a whitelisted patch to a task in memory.
///
/// Only the fields `TaskPatch` carries can change; a status change goes
/// through `completed_at_transition` so the invariant holds on every path.
pub fn apply_patch(task: &mut Task, patch: &TaskPatch) {
    if let Some(title) = &patch.title {
        task.title = title.clone();
    }
    if let Some(description) = &patch.description {
        task.description = description.clone();
    }
    if let Some(status) = patch.status {
        completed_at_transition(task, status);
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(assignee) = patch.assignee {
        task.assignee = Some(assignee);
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(start_date) = patch.start_date {
        task.start_date = Some(start_date);
    }
    if let Some(tags) = &patch.tags {
        task.tags = tags.clone();
    }
    if let Some(estimated) = patch.estimated_hours {
        task.estimated_hours = Some(estimated);
    }
    if let Some(actual) = patch.actual_hours {
        task.actual_hours = Some(actual);
    }
    if let Some(position) = patch.position {
        task.position = position;
    }
}
