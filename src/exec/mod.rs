// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the simulation commands,
//! using `tokio::process::Command`, and reporting their output back to the
//! supervisor runtime.
//!
//! - [`line_buffer`] splits raw output chunks into lines, carrying partial
//!   lines over to the next chunk.
//! - [`process_runner`] spawns one shell command and emits [`ProcessEvent`]s.
//! - [`backend`] provides the `ProcessBackend` trait and the
//!   `RealProcessBackend` the runtime uses in production; tests replace it
//!   with a scripted fake.

pub mod backend;
pub mod line_buffer;
pub mod process_runner;

pub use backend::{ProcessBackend, RealProcessBackend};
pub use line_buffer::LineBuffer;
pub use process_runner::{ProcessEvent, ShellCommand, run_process, shell_command};
