//! Shared data model definitions for `Taskboard` tasks.

pub mod codec;
pub mod filter;
pub mod task;
