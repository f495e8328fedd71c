//! Per-file extraction errors.
//!
//! Every variant is fatal for a single file only. The generator logs it and
//! moves on to the next file.

use std::path::PathBuf;

/// Errors raised while turning one source file into facts.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type {extension:?}: {}", path.display())]
    UnsupportedExtension { path: PathBuf, extension: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl ExtractError {
    /// Path of the file that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::UnsupportedExtension { path, .. } => path,
            Self::Read { path, .. } => path,
            Self::Parse { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
