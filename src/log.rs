//! Terminal logging with colored module prefixes.
//!
//! ```ignore
//! log!("build"; "rendered {} posts", posts.len());
//! ```
//!
//! prints `[build] rendered 3 posts` with the prefix colored by module.

use colored::{ColoredString, Colorize};
use std::io::{stdout, Write};

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::log::log($module, &format!($($arg)*))
    }};
}

/// Writes a single `[module] message` line to stdout. Prefer the [`log!`]
/// macro.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold(),
        "github" => prefix.bright_magenta().bold(),
        "blog" | "books" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}
