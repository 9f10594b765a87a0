//! Core domain types for console sessions

mod output;
mod scroll;
mod task_state;

pub use output::{OutputRecord, Tag};
pub use scroll::{ScrollAnchor, ScrollRequest};
pub use task_state::TaskState;
