//! Declaration extraction.
//!
//! Turns the text of one source file into [`FileFacts`]: functions, classes,
//! interfaces, imports.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌────────────────────┐     ┌───────────────┐
//! │ Source text     │────▶│ Analyzers          │────▶│ FileFacts     │
//! └─────────────────┘     │ .ts/.js tree-sitter│     │ (functions,   │
//!                         │ .py line scanner   │     │  classes, ...)│
//!                         └────────────────────┘     └───────────────┘
//!                                                            │
//!                                                            ▼
//!                                                    ┌───────────────┐
//!                                                    │ detect        │
//!                                                    └───────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement the `LanguageAnalyzer` trait
//! 3. Add a variant to [`Language`]
//! 4. Register the analyzer in `languages/mod.rs`

pub mod doc_comment;
mod facts;
mod languages;
pub mod scan;
mod traits;

use std::path::Path;

pub use facts::{
    ClassInfo, FileFacts, FunctionInfo, ImportInfo, InterfaceInfo, Language, Property,
    PropertyOrigin,
};
pub use languages::{
    get_analyzer, register_analyzers, registered_extensions, PythonAnalyzer, TypeScriptAnalyzer,
};
pub use traits::{LanguageAnalyzer, ParsedFile};

use crate::error::{ExtractError, Result};

/// Pick the analyzer for `path` by its extension.
pub fn analyzer_for(path: &Path) -> Result<&'static dyn LanguageAnalyzer> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    get_analyzer(extension).ok_or_else(|| ExtractError::UnsupportedExtension {
        path: path.to_path_buf(),
        extension: extension.to_string(),
    })
}

/// Extract facts from already-read text, dispatching on the extension.
pub fn extract_source(path: &Path, source: &str) -> Result<FileFacts> {
    analyzer_for(path)?.extract(path, source)
}

/// Read `path` and extract facts from it.
///
/// Returns the text as well so detectors can scan it without a second read.
pub fn extract_file(path: &Path) -> Result<(FileFacts, String)> {
    let analyzer = analyzer_for(path)?;
    let source = std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let facts = analyzer.extract(path, &source)?;
    Ok((facts, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension() {
        let err = extract_source(Path::new("notes/readme.md"), "# hi").unwrap_err();
        match err {
            ExtractError::UnsupportedExtension { extension, .. } => assert_eq!(extension, "md"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(extract_source(Path::new("Makefile"), "all:").is_err());
    }

    #[test]
    fn test_read_failure() {
        let err = extract_file(Path::new("/definitely/not/here.py")).unwrap_err();
        assert!(matches!(err, ExtractError::Read { .. }));
        assert_eq!(err.path(), Path::new("/definitely/not/here.py"));
    }
}
