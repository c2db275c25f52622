//! In-memory board view: one ordered task sequence per status column.
//!
//! The board is a read-through cache of the store, authoritative only until
//! the next reconciling fetch. Columns are always kept in the order implied
//! by `(position ascending, created_at ascending)` when built from a fetch;
//! local mutations splice tasks in and out without re-sorting so the view
//! matches what the user just did.

use uuid::Uuid;

use crate::shared::task::{Task, TaskStatus};

/// Per-status ordered sequences representing the visible board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    columns: [Vec<Task>; 4],
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket fetched tasks into columns and sort each by
    /// `(position, created_at)`. Archived tasks are dropped.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut board = Self::new();
        for task in tasks {
            if !task.is_archived {
                board.columns[task.status.index()].push(task);
            }
        }
        for column in &mut board.columns {
            column.sort_by(|a, b| {
                a.position
                    .cmp(&b.position)
                    .then(a.created_at.cmp(&b.created_at))
            });
        }
        board
    }

    /// Tasks in one column, in display order.
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[status.index()]
    }

    pub fn contains(&self, task_id: Uuid) -> bool {
        self.find(task_id).is_some()
    }

    /// Locate a task: which column it is in and at what index.
    pub fn find(&self, task_id: Uuid) -> Option<(TaskStatus, usize)> {
        for status in TaskStatus::ALL {
            if let Some(idx) = self.columns[status.index()]
                .iter()
                .position(|t| t.id == task_id)
            {
                return Some((status, idx));
            }
        }
        None
    }

    pub fn get(&self, task_id: Uuid) -> Option<&Task> {
        let (status, idx) = self.find(task_id)?;
        Some(&self.columns[status.index()][idx])
    }

    /// Remove a task from whichever column holds it.
    pub fn remove(&mut self, task_id: Uuid) -> Option<Task> {
        let (status, idx) = self.find(task_id)?;
        Some(self.columns[status.index()].remove(idx))
    }

    /// Insert a task into a column at the given index, clamped to the
    /// column length.
    pub fn insert_at(&mut self, status: TaskStatus, index: usize, task: Task) {
        let column = &mut self.columns[status.index()];
        let index = index.min(column.len());
        column.insert(index, task);
    }

    /// Append a task to its status column unless it is already on the board
    /// (duplicate suppression by id). Returns whether it was added.
    pub fn append(&mut self, task: Task) -> bool {
        if task.is_archived || self.contains(task.id) {
            return false;
        }
        self.columns[task.status.index()].push(task);
        true
    }

    /// Replace a task in place with a fresher copy, keeping its current slot.
    /// Returns false if the task is not on the board.
    pub fn replace(&mut self, task: Task) -> bool {
        match self.find(task.id) {
            Some((status, idx)) => {
                self.columns[status.index()][idx] = task;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All tasks on the board, column by column.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flatten()
    }

    /// Ids per column, handy for asserting order in tests.
    pub fn column_ids(&self, status: TaskStatus) -> Vec<Uuid> {
        self.column(status).iter().map(|t| t.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::task::TaskPriority;
    use chrono::{Duration, Utc};

    fn task(status: TaskStatus, position: i32, created_offset_secs: i64) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: format!("task-{position}"),
            description: String::new(),
            status,
            priority: TaskPriority::Medium,
            project: Uuid::new_v4(),
            assignee: None,
            creator: Uuid::new_v4(),
            tags: vec![],
            due_date: None,
            start_date: None,
            completed_at: None,
            estimated_hours: None,
            actual_hours: None,
            comments: vec![],
            position,
            is_archived: false,
            created_at: now + Duration::seconds(created_offset_secs),
            updated_at: now,
        }
    }

    #[test]
    fn buckets_and_sorts_by_position_then_created_at() {
        let a = task(TaskStatus::Todo, 2, 0);
        let b = task(TaskStatus::Todo, 0, 0);
        // Same position as `b`: creation time breaks the tie.
        let c = {
            let mut t = task(TaskStatus::Todo, 0, 10);
            t.title = "tie".into();
            t
        };
        let d = task(TaskStatus::Done, 0, 0);

        let board = BoardState::from_tasks(vec![a.clone(), c.clone(), b.clone(), d.clone()]);
        assert_eq!(
            board.column_ids(TaskStatus::Todo),
            vec![b.id, c.id, a.id]
        );
        assert_eq!(board.column_ids(TaskStatus::Done), vec![d.id]);
    }

    #[test]
    fn archived_tasks_never_enter_the_board() {
        let mut archived = task(TaskStatus::Todo, 0, 0);
        archived.is_archived = true;
        let board = BoardState::from_tasks(vec![archived.clone()]);
        assert!(board.is_empty());

        let mut board = BoardState::new();
        assert!(!board.append(archived));
    }

    #[test]
    fn append_suppresses_duplicates_by_id() {
        let t = task(TaskStatus::Review, 0, 0);
        let mut board = BoardState::new();
        assert!(board.append(t.clone()));
        assert!(!board.append(t.clone()));
        assert_eq!(board.column(TaskStatus::Review).len(), 1);
    }

    #[test]
    fn remove_and_insert_move_a_task_between_columns() {
        let t = task(TaskStatus::Todo, 0, 0);
        let other = task(TaskStatus::InProgress, 0, 0);
        let mut board = BoardState::from_tasks(vec![t.clone(), other.clone()]);

        let mut moved = board.remove(t.id).unwrap();
        moved.status = TaskStatus::InProgress;
        board.insert_at(TaskStatus::InProgress, 0, moved);

        assert!(board.column(TaskStatus::Todo).is_empty());
        assert_eq!(
            board.column_ids(TaskStatus::InProgress),
            vec![t.id, other.id]
        );
    }

    #[test]
    fn insert_index_is_clamped() {
        let t = task(TaskStatus::Todo, 0, 0);
        let mut board = BoardState::new();
        board.insert_at(TaskStatus::Todo, 99, t.clone());
        assert_eq!(board.find(t.id), Some((TaskStatus::Todo, 0)));
    }

    #[test]
    fn replace_keeps_slot() {
        let t = task(TaskStatus::Todo, 0, 0);
        let u = task(TaskStatus::Todo, 1, 0);
        let mut board = BoardState::from_tasks(vec![t.clone(), u.clone()]);

        let mut fresher = t.clone();
        fresher.title = "renamed".into();
        assert!(board.replace(fresher));
        assert_eq!(board.column(TaskStatus::Todo)[0].title, "renamed");
        assert_eq!(board.column_ids(TaskStatus::Todo), vec![t.id, u.id]);
    }
}
