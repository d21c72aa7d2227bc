//! Shared task model and wire definitions for Taskboard.

pub mod api;
pub mod task;
pub mod transition;

pub use api::{ErrorBody, FieldError, SessionInfo};
pub use task::{
    Category, Description, DescriptionPatch, NewTask, Priority, Status, Task, TaskId, TaskPatch,
    ValidationError,
};
pub use transition::{
    TRANSITIONS, TransitionError, allowed_targets, can_transition, check_transition,
};
