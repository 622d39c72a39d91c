// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface.
//!
//! Argument parsing lives in [`args`]; the `analyze` and `lines` commands in
//! [`analyze`].

/// CLI arguments.
pub mod args;

/// Analysis command.
pub mod analyze;
