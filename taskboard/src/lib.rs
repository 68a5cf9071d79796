//! `Taskboard` — in-memory task tracker library.

pub mod clock;
pub mod config;
pub mod script;
pub mod tasks;
