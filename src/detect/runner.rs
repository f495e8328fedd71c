//! Runs every detector over one file.

use crate::analysis::FileFacts;

use super::routes::detect_routes;
use super::schema::detect_tables;
use super::tech::detect_technologies;
use super::FileSignals;

/// Detect technologies, routes and tables in one file.
///
/// Pure over its inputs: the result depends only on `facts` and `text`, and
/// the caller decides how to merge it.
pub fn detect_file(facts: &FileFacts, text: &str) -> FileSignals {
    let signals = FileSignals {
        technologies: detect_technologies(&facts.imports),
        endpoints: detect_routes(facts, text),
        tables: detect_tables(facts, text),
    };

    tracing::debug!(
        file = %facts.relative_path,
        technologies = signals.technologies.len(),
        endpoints = signals.endpoints.len(),
        tables = signals.tables.len(),
        "detected signals"
    );
    signals
}
