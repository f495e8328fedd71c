//! Core types for detection results.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// HTTP verbs recognized by route rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            _ => Err(format!("unknown HTTP method: {}", s)),
        }
    }
}

/// An inferred HTTP route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub method: HttpMethod,
    /// Route path in the framework's own syntax (`:id`, `{id}`, ...).
    pub path: String,
    /// Handler name, `Class.method`, or a placeholder when unresolved.
    pub handler: String,
    /// Relative path of the declaring file.
    pub file: String,
    pub line: usize,
    /// Heuristic: an auth marker appears somewhere in the file.
    pub requires_auth: bool,
}

/// A column of an inferred table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Framework-native type text, not normalized.
    pub type_name: String,
    pub nullable: bool,
    pub primary: bool,
    pub foreign_key: Option<String>,
}

/// A table or model inferred from ORM declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseTable {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub columns: Vec<Column>,
}

impl DatabaseTable {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Everything the detector found in one file.
///
/// The caller merges these into the project; nothing here is shared between
/// files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSignals {
    pub technologies: BTreeSet<&'static str>,
    pub endpoints: Vec<ApiEndpoint>,
    pub tables: Vec<DatabaseTable>,
}

impl FileSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty() && self.endpoints.is_empty() && self.tables.is_empty()
    }

    /// Merge another set of signals into this one.
    pub fn merge(&mut self, other: FileSignals) {
        self.technologies.extend(other.technologies);
        self.endpoints.extend(other.endpoints);
        self.tables.extend(other.tables);
    }
}
