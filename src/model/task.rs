//! Task inputs and the optimistic mutation overlay.
//!
//! Tasks are owned by the host's data layer; the engine only reads them.
//! `TaskOverlay` lets the host show create/toggle/edit/delete results
//! immediately while the authoritative backend is still confirming, with an
//! explicit pending list instead of mutating the confirmed baseline.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self { Self(id.to_string()) }
}

/// One todo entry as reported by the host. Timestamps are epoch milliseconds
/// assigned by the host; the engine never consults a clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub done: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn is_active(&self) -> bool { !self.done }
}

/// Returns whether `selected` still refers to an active (not done) task.
pub fn selection_valid(tasks: &[Task], selected: &TaskId) -> bool {
    tasks.iter().any(|task| task.id == *selected && task.is_active())
}

/// Ticket handed out for a pending edit, used to confirm or roll it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum PendingEdit {
    Create(Task),
    Toggle { id: TaskId, done: bool },
    Edit { id: TaskId, text: String },
    Delete(TaskId),
}

/// Pending local edits layered over the last confirmed task list.
#[derive(Debug, Clone, Default)]
pub struct TaskOverlay {
    confirmed: Vec<Task>,
    pending: Vec<(EditId, PendingEdit)>,
    next_edit: u64,
}

impl TaskOverlay {
    pub fn new(confirmed: Vec<Task>) -> Self {
        Self {
            confirmed,
            pending: Vec::new(),
            next_edit: 1,
        }
    }

    pub fn confirmed(&self) -> &[Task] { &self.confirmed }

    pub fn has_pending(&self) -> bool { !self.pending.is_empty() }

    /// The task list as the user should see it right now: the confirmed
    /// baseline with every pending edit applied in submission order.
    pub fn tasks(&self) -> Vec<Task> {
        let mut tasks = self.confirmed.clone();
        for (_, edit) in &self.pending {
            match edit {
                PendingEdit::Create(task) => tasks.push(task.clone()),
                PendingEdit::Toggle { id, done } => {
                    if let Some(task) = tasks.iter_mut().find(|t| t.id == *id) {
                        task.done = *done;
                    }
                }
                PendingEdit::Edit { id, text } => {
                    if let Some(task) = tasks.iter_mut().find(|t| t.id == *id) {
                        task.text = text.clone();
                    }
                }
                PendingEdit::Delete(id) => tasks.retain(|t| t.id != *id),
            }
        }
        tasks
    }

    pub fn push(&mut self, edit: PendingEdit) -> EditId {
        let id = EditId(self.next_edit);
        self.next_edit += 1;
        self.pending.push((id, edit));
        id
    }

    /// The backend confirmed `edit`; its effect is now part of `confirmed`.
    pub fn confirm(&mut self, edit: EditId, confirmed: Vec<Task>) {
        if !self.remove_pending(edit) {
            warn!("confirmed unknown edit {edit:?}");
        }
        self.confirmed = confirmed;
    }

    /// The backend rejected `edit`; drop it so the view snaps back.
    pub fn rollback(&mut self, edit: EditId) {
        if !self.remove_pending(edit) {
            warn!("rolled back unknown edit {edit:?}");
        }
    }

    fn remove_pending(&mut self, edit: EditId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(id, _)| *id != edit);
        self.pending.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, text: &str, done: bool) -> Task {
        Task {
            id: TaskId::from(id),
            text: text.to_string(),
            done,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_selection_valid() {
        let tasks = vec![task("a", "one", false), task("b", "two", true)];
        assert!(selection_valid(&tasks, &TaskId::from("a")));
        assert!(!selection_valid(&tasks, &TaskId::from("b")));
        assert!(!selection_valid(&tasks, &TaskId::from("missing")));
    }

    #[test]
    fn test_overlay_create_shows_immediately() {
        let mut overlay = TaskOverlay::new(vec![task("a", "one", false)]);
        overlay.push(PendingEdit::Create(task("b", "two", false)));

        let visible = overlay.tasks();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[1].id, TaskId::from("b"));
        assert_eq!(overlay.confirmed().len(), 1);
    }

    #[test]
    fn test_overlay_toggle_and_edit() {
        let mut overlay = TaskOverlay::new(vec![task("a", "one", false)]);
        overlay.push(PendingEdit::Toggle {
            id: TaskId::from("a"),
            done: true,
        });
        overlay.push(PendingEdit::Edit {
            id: TaskId::from("a"),
            text: "one!".to_string(),
        });

        let visible = overlay.tasks();
        assert!(visible[0].done);
        assert_eq!(visible[0].text, "one!");
    }

    #[test]
    fn test_overlay_delete() {
        let mut overlay = TaskOverlay::new(vec![task("a", "one", false), task("b", "two", false)]);
        overlay.push(PendingEdit::Delete(TaskId::from("a")));

        let visible = overlay.tasks();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, TaskId::from("b"));
    }

    #[test]
    fn test_confirm_replaces_baseline_and_drops_edit() {
        let mut overlay = TaskOverlay::new(vec![task("a", "one", false)]);
        let edit = overlay.push(PendingEdit::Create(task("b", "two", false)));

        let server = vec![task("a", "one", false), task("b", "two", false)];
        overlay.confirm(edit, server.clone());

        assert!(!overlay.has_pending());
        assert_eq!(overlay.tasks(), server);
    }

    #[test]
    fn test_rollback_restores_confirmed_view() {
        let mut overlay = TaskOverlay::new(vec![task("a", "one", false)]);
        let edit = overlay.push(PendingEdit::Delete(TaskId::from("a")));
        assert!(overlay.tasks().is_empty());

        overlay.rollback(edit);
        assert_eq!(overlay.tasks().len(), 1);
    }

    #[test]
    fn test_rollback_unknown_edit_is_noop() {
        let mut overlay = TaskOverlay::new(vec![task("a", "one", false)]);
        let edit = overlay.push(PendingEdit::Delete(TaskId::from("a")));
        overlay.rollback(edit);
        overlay.rollback(edit); // second time has nothing to remove
        assert_eq!(overlay.tasks().len(), 1);
    }
}
