//! Fact structures extracted from a single source file.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Language tag for a supported source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
}

impl Language {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
        }
    }

    /// Languages handled by the tree-sitter branch.
    pub fn is_script_family(&self) -> bool {
        matches!(self, Language::TypeScript | Language::JavaScript)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// Parameter signatures as written (e.g. `id: string`, `limit=10`).
    pub params: Vec<String>,
    pub return_type: Option<String>,
    /// Line of the declaration keyword (1-indexed).
    pub line: usize,
    pub is_async: bool,
    pub is_exported: bool,
    pub description: Option<String>,
}

impl FunctionInfo {
    /// Create a bare declaration with no parameters or metadata.
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            line,
            is_async: false,
            is_exported: false,
            description: None,
        }
    }

    /// Render as a one-line signature, e.g. `async fetch(id: string): Promise<User>`.
    pub fn signature(&self) -> String {
        let mut sig = String::new();
        if self.is_async {
            sig.push_str("async ");
        }
        sig.push_str(&self.name);
        sig.push('(');
        sig.push_str(&self.params.join(", "));
        sig.push(')');
        if let Some(ret) = &self.return_type {
            sig.push_str(": ");
            sig.push_str(ret);
        }
        sig
    }
}

/// Which producer filled in a [`Property`].
///
/// The same container carries TypeScript fields, interface members, Python
/// class attributes and ORM column declarations; the origin keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOrigin {
    /// TypeScript class data member.
    Field,
    /// TypeScript interface or object type-literal member.
    Member,
    /// Python `name = Column(...)` style ORM column.
    Column,
    /// Python `name: Type` class attribute.
    Attribute,
}

/// A class or interface property, rendered as `name: type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub type_name: String,
    pub origin: PropertyOrigin,
}

impl Property {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, origin: PropertyOrigin) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            origin,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_name)
    }
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub line: usize,
    pub methods: Vec<FunctionInfo>,
    pub properties: Vec<Property>,
    pub is_exported: bool,
    pub description: Option<String>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            methods: Vec::new(),
            properties: Vec::new(),
            is_exported: false,
            description: None,
        }
    }

    /// Properties produced by a given extractor rule.
    pub fn properties_of(&self, origin: PropertyOrigin) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(move |p| p.origin == origin)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }
}

/// An interface or object-shaped type alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub line: usize,
    pub properties: Vec<Property>,
    pub is_exported: bool,
    pub description: Option<String>,
}

/// An import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// Module specifier as written, not resolved.
    pub source: String,
    /// Imported symbol names (may be empty for side-effect imports).
    pub symbols: Vec<String>,
    pub line: usize,
}

/// All facts extracted from a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFacts {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the scan root, always with `/` separators.
    pub relative_path: String,
    pub language: Language,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub imports: Vec<ImportInfo>,
}

impl FileFacts {
    /// Create empty facts for a file.
    pub fn empty(path: impl Into<PathBuf>, language: Language) -> Self {
        let path = path.into();
        let relative_path = path.to_string_lossy().replace('\\', "/");
        Self {
            path,
            relative_path,
            language,
            functions: Vec::new(),
            classes: Vec::new(),
            interfaces: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Find a top-level function by name.
    pub fn find_function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Find a class by name.
    pub fn find_class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Top-level functions plus class methods.
    pub fn callable_count(&self) -> usize {
        self.functions.len() + self.classes.iter().map(|c| c.methods.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature() {
        let mut func = FunctionInfo::new("fetchUser", 3);
        func.params = vec!["id: string".to_string(), "opts?: Options".to_string()];
        func.return_type = Some("Promise<User>".to_string());
        func.is_async = true;
        assert_eq!(func.signature(), "async fetchUser(id: string, opts?: Options): Promise<User>");

        let bare = FunctionInfo::new("main", 1);
        assert_eq!(bare.signature(), "main()");
    }

    #[test]
    fn test_property_display() {
        let prop = Property::new("email", "String(120)", PropertyOrigin::Column);
        assert_eq!(prop.to_string(), "email: String(120)");
    }

    #[test]
    fn test_callable_count() {
        let mut facts = FileFacts::empty("a.py", Language::Python);
        facts.functions.push(FunctionInfo::new("helper", 1));
        let mut class = ClassInfo::new("Service", 3);
        class.methods.push(FunctionInfo::new("run", 4));
        class.methods.push(FunctionInfo::new("stop", 6));
        facts.classes.push(class);
        assert_eq!(facts.callable_count(), 3);
    }

    #[test]
    fn test_language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::TypeScript).unwrap();
        assert_eq!(json, "\"typescript\"");
    }
}
