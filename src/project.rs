//! Project-level aggregation.
//!
//! [`Generator`] drives the per-file loop: read, extract, detect, fold. Each
//! file contributes independently to a [`ProjectBuilder`]; a file that fails
//! is logged and left out.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{extract_file, FileFacts};
use crate::detect::{detect_file, ApiEndpoint, DatabaseTable, FileSignals};
use crate::error::Result;

/// Which optional records end up in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub include_types: bool,
    pub include_imports: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_types: true,
            include_imports: true,
        }
    }
}

/// Everything one generation pass learned about a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    pub name: String,
    pub generated_at: DateTime<Utc>,
    pub total_files: usize,
    /// Top-level functions plus class methods.
    pub total_functions: usize,
    pub total_classes: usize,
    pub files: Vec<FileFacts>,
    /// Sorted, deduplicated technology labels.
    pub technologies: Vec<String>,
    pub endpoints: Vec<ApiEndpoint>,
    pub tables: Vec<DatabaseTable>,
}

/// Accumulates per-file results.
#[derive(Debug)]
pub struct ProjectBuilder {
    name: String,
    options: ExtractOptions,
    files: Vec<FileFacts>,
    technologies: BTreeSet<&'static str>,
    endpoints: Vec<ApiEndpoint>,
    tables: Vec<DatabaseTable>,
    total_functions: usize,
    total_classes: usize,
}

impl ProjectBuilder {
    pub fn new(name: impl Into<String>, options: ExtractOptions) -> Self {
        Self {
            name: name.into(),
            options,
            files: Vec::new(),
            technologies: BTreeSet::new(),
            endpoints: Vec::new(),
            tables: Vec::new(),
            total_functions: 0,
            total_classes: 0,
        }
    }

    /// Add one file's facts and signals.
    ///
    /// Detection has already seen interfaces and imports, so dropping them
    /// here only affects what is stored.
    pub fn fold(&mut self, mut facts: FileFacts, signals: FileSignals) {
        if !self.options.include_types {
            facts.interfaces.clear();
        }
        if !self.options.include_imports {
            facts.imports.clear();
        }

        self.total_functions += facts.callable_count();
        self.total_classes += facts.classes.len();
        self.technologies.extend(signals.technologies);
        self.endpoints.extend(signals.endpoints);
        self.tables.extend(signals.tables);
        self.files.push(facts);
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Finish with the current time as the generation timestamp.
    pub fn finish(self) -> ProjectModel {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(self, generated_at: DateTime<Utc>) -> ProjectModel {
        ProjectModel {
            name: self.name,
            generated_at,
            total_files: self.files.len(),
            total_functions: self.total_functions,
            total_classes: self.total_classes,
            files: self.files,
            technologies: self.technologies.into_iter().map(String::from).collect(),
            endpoints: self.endpoints,
            tables: self.tables,
        }
    }
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub model: ProjectModel,
    /// Files that could not be read, parsed or dispatched.
    pub failed: Vec<PathBuf>,
}

/// Runs extraction and detection over a list of files.
pub struct Generator {
    root: PathBuf,
    options: ExtractOptions,
}

impl Generator {
    /// Create a generator; relative paths are computed against `root`.
    pub fn new<P: AsRef<Path>>(root: P, options: ExtractOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extract and detect one file.
    pub fn process_file(&self, path: &Path) -> Result<(FileFacts, FileSignals)> {
        let (mut facts, text) = extract_file(path)?;
        facts.relative_path = self.relative_path(path);
        let signals = detect_file(&facts, &text);
        Ok((facts, signals))
    }

    /// Process files in order. Failures are logged and skipped.
    pub fn run(&self, name: &str, files: &[PathBuf]) -> Generation {
        self.run_with(name, files, |_| {})
    }

    /// Like [`Generator::run`], calling `on_file` after each file.
    pub fn run_with<F>(&self, name: &str, files: &[PathBuf], mut on_file: F) -> Generation
    where
        F: FnMut(&Path),
    {
        let mut builder = ProjectBuilder::new(name, self.options);
        let mut failed = Vec::new();

        for path in files {
            match self.process_file(path) {
                Ok((facts, signals)) => {
                    tracing::debug!(
                        file = %facts.relative_path,
                        functions = facts.functions.len(),
                        classes = facts.classes.len(),
                        "extracted"
                    );
                    builder.fold(facts, signals);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping file");
                    failed.push(path.clone());
                }
            }
            on_file(path);
        }

        let model = builder.finish();
        tracing::info!(
            files = model.total_files,
            failed = failed.len(),
            endpoints = model.endpoints.len(),
            tables = model.tables.len(),
            "generation finished"
        );
        Generation { model, failed }
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ClassInfo, FunctionInfo, ImportInfo, InterfaceInfo, Language};
    use tempfile::TempDir;

    fn sample_facts() -> FileFacts {
        let mut facts = FileFacts::empty("src/a.ts", Language::TypeScript);
        facts.functions.push(FunctionInfo::new("main", 1));
        let mut class = ClassInfo::new("Store", 3);
        class.methods.push(FunctionInfo::new("get", 4));
        facts.classes.push(class);
        facts.interfaces.push(InterfaceInfo {
            name: "Item".to_string(),
            line: 9,
            properties: Vec::new(),
            is_exported: true,
            description: None,
        });
        facts.imports.push(ImportInfo {
            source: "express".to_string(),
            symbols: vec!["express".to_string()],
            line: 1,
        });
        facts
    }

    #[test]
    fn test_fold_counts_and_sorts_technologies() {
        let mut builder = ProjectBuilder::new("demo", ExtractOptions::default());
        let mut signals = FileSignals::new();
        signals.technologies.insert("React");
        signals.technologies.insert("Express");
        builder.fold(sample_facts(), signals);
        builder.fold(sample_facts(), FileSignals::new());

        let model = builder.finish();
        assert_eq!(model.name, "demo");
        assert_eq!(model.total_files, 2);
        assert_eq!(model.total_functions, 4);
        assert_eq!(model.total_classes, 2);
        assert_eq!(model.technologies, vec!["Express", "React"]);
    }

    #[test]
    fn test_options_applied_at_fold() {
        let options = ExtractOptions {
            include_types: false,
            include_imports: false,
        };
        let mut builder = ProjectBuilder::new("demo", options);
        let mut signals = FileSignals::new();
        signals.technologies.insert("Express");
        builder.fold(sample_facts(), signals);

        let model = builder.finish();
        assert!(model.files[0].interfaces.is_empty());
        assert!(model.files[0].imports.is_empty());
        assert_eq!(model.technologies, vec!["Express"]);
    }

    #[test]
    fn test_generator_isolates_failures() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("app.py");
        std::fs::write(&good, "def main():\n    pass\n").unwrap();
        let unsupported = temp.path().join("notes.txt");
        std::fs::write(&unsupported, "def nope(): pass\n").unwrap();
        let missing = temp.path().join("gone.ts");

        let files = vec![unsupported.clone(), good, missing.clone()];
        let mut seen = 0;
        let generation =
            Generator::new(temp.path(), ExtractOptions::default()).run_with("demo", &files, |_| {
                seen += 1
            });

        assert_eq!(seen, 3);
        assert_eq!(generation.failed, vec![unsupported, missing]);
        assert_eq!(generation.model.total_files, 1);
        assert_eq!(generation.model.total_functions, 1);
        assert_eq!(generation.model.files[0].relative_path, "app.py");
    }
}
