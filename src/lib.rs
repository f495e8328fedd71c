//! codecontext - project context generator for AI coding assistants.
//!
//! Scans a source tree, extracts lightweight structural facts (functions,
//! classes, interfaces, imports), infers HTTP routes and database tables
//! from framework conventions, and renders everything into one document.
//!
//! # Architecture
//!
//! - `analysis`: per-file declaration extraction (tree-sitter for
//!   TypeScript/JavaScript, a line scanner for Python)
//! - `detect`: technology, route and schema rules over one file's facts
//! - `project`: the per-file loop and the aggregated model
//! - `files`: source enumeration and project naming
//! - `config`: YAML configuration
//! - `report`: Markdown, JSON and terminal output
//!
//! # Adding a New Language
//!
//! See `src/analysis/languages/` for examples. Implement the
//! `LanguageAnalyzer` trait and register it in `languages/mod.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod files;
pub mod project;
pub mod report;

pub use analysis::{
    extract_file, extract_source, register_analyzers, FileFacts, Language, LanguageAnalyzer,
};
pub use config::{Config, OutputFormat};
pub use detect::{detect_file, ApiEndpoint, DatabaseTable, FileSignals, HttpMethod};
pub use error::ExtractError;
pub use project::{ExtractOptions, Generation, Generator, ProjectBuilder, ProjectModel};
