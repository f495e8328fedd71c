//! Language-specific analyzer implementations.

mod python;
mod typescript;

pub use python::PythonAnalyzer;
pub use typescript::TypeScriptAnalyzer;

use super::LanguageAnalyzer;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};

/// Static storage for the `.ts` analyzer.
static TYPESCRIPT_ANALYZER: OnceCell<TypeScriptAnalyzer> = OnceCell::new();

/// Static storage for the `.js` analyzer.
static JAVASCRIPT_ANALYZER: OnceCell<TypeScriptAnalyzer> = OnceCell::new();

/// Static storage for the Python analyzer.
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Whether analyzers have been registered.
static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Register all available language analyzers.
///
/// Idempotent; [`get_analyzer`] calls it on demand.
pub fn register_analyzers() {
    if REGISTERED.swap(true, Ordering::SeqCst) {
        return;
    }

    TYPESCRIPT_ANALYZER.get_or_init(TypeScriptAnalyzer::typescript);
    JAVASCRIPT_ANALYZER.get_or_init(TypeScriptAnalyzer::javascript);
    PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new);
}

/// Get an analyzer for the given file extension (without dot).
///
/// Returns None if no analyzer is registered for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    register_analyzers();

    match ext {
        "ts" => TYPESCRIPT_ANALYZER
            .get()
            .map(|a| a as &'static dyn LanguageAnalyzer),
        "js" => JAVASCRIPT_ANALYZER
            .get()
            .map(|a| a as &'static dyn LanguageAnalyzer),
        "py" => PYTHON_ANALYZER.get().map(|a| a as &'static dyn LanguageAnalyzer),
        _ => None,
    }
}

/// Get all registered file extensions.
pub fn registered_extensions() -> &'static [&'static str] {
    &["ts", "js", "py"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Language;

    #[test]
    fn test_dispatch_by_extension() {
        assert_eq!(get_analyzer("ts").unwrap().language(), Language::TypeScript);
        assert_eq!(get_analyzer("js").unwrap().language(), Language::JavaScript);
        assert_eq!(get_analyzer("py").unwrap().language(), Language::Python);
        assert!(get_analyzer("rb").is_none());
        assert!(get_analyzer("tsx").is_none());
    }

    #[test]
    fn test_registered_extensions_resolve() {
        for ext in registered_extensions() {
            let analyzer = get_analyzer(ext).unwrap();
            assert!(analyzer.handles_extension(ext));
        }
    }
}
