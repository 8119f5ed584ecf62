//! Command-line interface components
//!
//! This module contains CLI-specific code for the Reactor uploader,
//! including argument parsing, prompts, zip discovery and progress display.

pub mod args;
pub mod commands;
pub mod progress;
pub mod prompts;
pub mod zip_path;

pub use args::Cli;
pub use commands::{handle_upload, run_upload, UploadContext};
pub use progress::ProcessingSpinner;
pub use prompts::{Prompter, TerminalPrompter};
pub use zip_path::resolve_zip_path;
