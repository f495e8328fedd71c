//! Core traits for language analysis.

use std::path::Path;

use super::{FileFacts, Language};
use crate::error::Result;

/// Holds a parsed tree-sitter tree and the text it was built from.
///
/// Only the statically parsed branch produces one of these; the heuristic
/// branch works on lines directly.
pub struct ParsedFile<'s> {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source text (kept for node text extraction).
    pub source: &'s str,
}

impl<'s> ParsedFile<'s> {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or("")
    }
}

/// Language-specific extractor trait.
///
/// Implementations turn the full text of one file into [`FileFacts`]. They
/// never read from disk and carry no state between calls, so running the
/// same text twice yields identical facts.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language tag this analyzer produces.
    fn language(&self) -> Language;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Extract declarations and imports from `source`.
    ///
    /// `path` is only used for the returned facts and for error messages.
    /// Malformed input degrades to fewer records; only a failure to build a
    /// tree at all is an error.
    fn extract(&self, path: &Path, source: &str) -> Result<FileFacts>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
