//! Error types for the packing pipeline
//!
//! Only failures on the repository root are fatal. Everything that goes
//! wrong with a single file is logged and downgraded by the caller.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("Repository not found: {}", .0.display())]
    RepoNotFound(PathBuf),

    #[error("Repository path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Syntax error in {}", path.display())]
    Syntax { path: PathBuf },

    #[error("Failed to load Python grammar: {0}")]
    Language(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type PackResult<T> = Result<T, PackError>;
