//! Source code parsers using tree-sitter
//!
//! Only Python is analyzed; files with any other extension never reach the
//! pipeline (see [`crate::files::IgnorePolicy`]).

pub mod python;

/// Get the language name for a file extension
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "py" => Some("Python"),
        _ => None,
    }
}
