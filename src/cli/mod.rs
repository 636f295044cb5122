//! Command Line Interface (CLI) layer for POLARPRO.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for inspection, single-file and
//! batch rendering. It wires user-provided options to the library
//! functionality exposed via `polarpro::api`.
//!
//! If you are embedding POLARPRO into another application, prefer using
//! the high-level `polarpro::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
