// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Console logging shared by the library and the CLI.
//!
//! Warnings and errors always go to stderr. Per-frame results and analysis
//! phase messages are gated by a process-wide [`Verbosity`].

use std::sync::atomic::{AtomicU8, Ordering};

/// How much the library and CLI print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    /// Only warnings and errors.
    Quiet = 0,
    /// Per-frame summaries.
    Normal = 1,
    /// Per-frame summaries plus analysis phase tracing.
    Debug = 2,
}

impl Verbosity {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Quiet,
            1 => Self::Normal,
            _ => Self::Debug,
        }
    }
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Set the global verbosity level.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Current global verbosity level.
pub fn verbosity() -> Verbosity {
    Verbosity::from_u8(VERBOSITY.load(Ordering::Relaxed))
}

/// Toggle between [`Verbosity::Normal`] and [`Verbosity::Quiet`].
pub fn set_verbose(verbose: bool) {
    set_verbosity(if verbose {
        Verbosity::Normal
    } else {
        Verbosity::Quiet
    });
}

/// Check if per-frame output is enabled.
pub fn is_verbose() -> bool {
    verbosity() >= Verbosity::Normal
}

/// Check if phase tracing is enabled.
pub fn is_debug() -> bool {
    verbosity() >= Verbosity::Debug
}

/// Macro for standard info messages.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("{}", format!($($arg)*));
    }
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }}
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }}
}

/// Macro for success messages.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        println!("{} {}", "✅".green(), format!($($arg)*));
    }}
}

/// Macro for verbose messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Macro for analysis phase tracing.
#[macro_export]
macro_rules! trace_phase {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::logging::is_debug() {
            println!("{} {}", "›".dimmed(), format!($($arg)*).dimmed());
        }
    }}
}

/// Macro for section headers.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::logging::is_verbose() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }}
}
