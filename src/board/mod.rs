//! Client-side task board.
//!
//! Keeps a reconciled view of the user's tasks and runs delete and clone
//! optimistically, with a time-limited undo for each.

pub mod api;
pub mod controller;
pub mod notify;
pub mod state;
pub mod undo;

pub use api::{LocalTaskApi, TaskApi};
pub use controller::{BoardController, BoardError, PendingClone, PendingDelete, UndoOutcome};
pub use notify::{
    NotificationAction, NotificationId, NotificationLog, NotificationRequest, Notifier, Severity,
};
pub use state::{TaskListState, is_temporary_id, temporary_id};
pub use undo::{UndoAction, UndoCoordinator, UndoKey};
