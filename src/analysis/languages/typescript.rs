//! TypeScript/JavaScript declaration extractor using tree-sitter.
//!
//! One recursive walk over the tree collects functions (declarations and
//! function-valued variables), classes with their fields and methods,
//! interfaces, object-shaped type aliases and imports. Declarations nested
//! inside function or class bodies are not reported as file-level records.

use std::path::Path;

use tree_sitter::{Language as TsLanguage, Node, Parser};

use crate::analysis::doc_comment::nearest_doc_block;
use crate::analysis::{
    ClassInfo, FileFacts, FunctionInfo, ImportInfo, InterfaceInfo, Language, LanguageAnalyzer,
    ParsedFile, Property, PropertyOrigin,
};
use crate::error::{ExtractError, Result};

/// Placeholder type for untyped fields and members.
const UNTYPED: &str = "any";

pub struct TypeScriptAnalyzer {
    language: TsLanguage,
    tag: Language,
}

impl TypeScriptAnalyzer {
    /// Analyzer for `.ts` files.
    pub fn typescript() -> Self {
        Self {
            language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            tag: Language::TypeScript,
        }
    }

    /// Analyzer for `.js` files. Uses the TSX grammar so JSX in plain
    /// JavaScript files still parses.
    pub fn javascript() -> Self {
        Self {
            language: tree_sitter_typescript::LANGUAGE_TSX.into(),
            tag: Language::JavaScript,
        }
    }

    fn create_parser(&self, path: &Path) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ExtractError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(parser)
    }

    fn parse<'s>(&self, path: &Path, source: &'s str) -> Result<ParsedFile<'s>> {
        let mut parser = self.create_parser(path)?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::Parse {
                path: path.to_path_buf(),
                message: format!("failed to build {} syntax tree", self.tag),
            })?;
        Ok(ParsedFile { tree, source })
    }
}

impl Default for TypeScriptAnalyzer {
    fn default() -> Self {
        Self::typescript()
    }
}

impl LanguageAnalyzer for TypeScriptAnalyzer {
    fn language(&self) -> Language {
        self.tag
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        match self.tag {
            Language::JavaScript => &["js"],
            _ => &["ts"],
        }
    }

    fn extract(&self, path: &Path, source: &str) -> Result<FileFacts> {
        let parsed = self.parse(path, source)?;
        let mut walker = Walker {
            parsed: &parsed,
            facts: FileFacts::empty(path, self.tag),
        };
        walker.visit(parsed.tree.root_node(), false);
        Ok(walker.facts)
    }
}

/// Traversal state for one file.
struct Walker<'p, 's> {
    parsed: &'p ParsedFile<'s>,
    facts: FileFacts,
}

impl<'p, 's> Walker<'p, 's> {
    fn text(&self, node: Node) -> &'s str {
        self.parsed.node_text(node)
    }

    /// Visit `node` and all of its descendants. `nested` is true below a
    /// function or class body.
    fn visit(&mut self, node: Node, nested: bool) {
        let mut nested_children = nested;

        if !nested {
            match node.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    self.function_declaration(node);
                    nested_children = true;
                }
                "variable_declarator" => {
                    self.variable_function(node);
                }
                "export_statement" => {
                    self.default_export_function(node);
                }
                "class_declaration" | "abstract_class_declaration" => {
                    self.class_declaration(node);
                    nested_children = true;
                }
                "interface_declaration" => self.interface_declaration(node),
                "type_alias_declaration" => self.type_alias_declaration(node),
                "import_statement" => self.import_statement(node),
                _ => {}
            }
        }

        if is_function_like(node.kind()) {
            nested_children = true;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, nested_children);
        }
    }

    fn function_declaration(&mut self, node: Node) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let statement = export_wrapper(node).unwrap_or(node);

        let mut func = FunctionInfo::new(self.text(name), line_of(node));
        func.params = self.params(node);
        func.return_type = self.return_type(node);
        func.is_async = has_token(node, "async");
        func.is_exported = export_wrapper(node).is_some();
        func.description = self.description(statement);
        self.facts.functions.push(func);
    }

    /// `const name = (..) => ..` and `const name = function (..) {..}`.
    fn variable_function(&mut self, declarator: Node) {
        let (Some(name), Some(value)) = (
            declarator.child_by_field_name("name"),
            declarator.child_by_field_name("value"),
        ) else {
            return;
        };
        if !matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
            return;
        }
        if name.kind() != "identifier" {
            return;
        }

        // Leading trivia and export modifiers live on the enclosing statement.
        let declaration = declarator
            .parent()
            .filter(|p| matches!(p.kind(), "lexical_declaration" | "variable_declaration"))
            .unwrap_or(declarator);
        let exported = export_wrapper(declaration);
        let statement = exported.unwrap_or(declaration);

        let mut func = FunctionInfo::new(self.text(name), line_of(declaration));
        func.params = self.params(value);
        func.return_type = self.return_type(value);
        func.is_async = has_token(value, "async");
        func.is_exported = exported.is_some();
        func.description = self.description(statement);
        self.facts.functions.push(func);
    }

    /// `export default function name() {}` when the grammar reads it as an
    /// expression rather than a declaration.
    fn default_export_function(&mut self, statement: Node) {
        let Some(value) = statement.child_by_field_name("value") else {
            return;
        };
        if !matches!(value.kind(), "function_expression" | "function") {
            return;
        }
        let Some(name) = value.child_by_field_name("name") else {
            return;
        };

        let mut func = FunctionInfo::new(self.text(name), line_of(statement));
        func.params = self.params(value);
        func.return_type = self.return_type(value);
        func.is_async = has_token(value, "async");
        func.is_exported = true;
        func.description = self.description(statement);
        self.facts.functions.push(func);
    }

    fn class_declaration(&mut self, node: Node) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let statement = export_wrapper(node).unwrap_or(node);

        let mut class = ClassInfo::new(self.text(name), line_of(name));
        class.is_exported = export_wrapper(node).is_some();
        class.description = self.description(statement);

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                match member.kind() {
                    "public_field_definition" | "field_definition" => {
                        if let Some(prop) = self.field(member) {
                            class.properties.push(prop);
                        }
                    }
                    "method_definition" => {
                        if let Some(method) = self.method(member) {
                            class.methods.push(method);
                        }
                    }
                    _ => {}
                }
            }
        }

        self.facts.classes.push(class);
    }

    fn field(&self, member: Node) -> Option<Property> {
        let name = member
            .child_by_field_name("name")
            .or_else(|| member.child_by_field_name("property"))?;
        let type_name = member
            .child_by_field_name("type")
            .map(|t| strip_annotation(self.text(t)))
            .unwrap_or_else(|| UNTYPED.to_string());
        Some(Property::new(self.text(name), type_name, PropertyOrigin::Field))
    }

    fn method(&self, member: Node) -> Option<FunctionInfo> {
        let name_node = member.child_by_field_name("name")?;
        let name = self.text(name_node);
        if name == "constructor" || has_token(member, "get") || has_token(member, "set") {
            return None;
        }

        // Member decorators belong to the node, so its start may be a decorator line.
        let mut method = FunctionInfo::new(name, line_of(name_node));
        method.params = self.params(member);
        method.return_type = self.return_type(member);
        method.is_async = has_token(member, "async");
        method.description = self.description(member);
        Some(method)
    }

    fn interface_declaration(&mut self, node: Node) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let properties = node
            .child_by_field_name("body")
            .map(|body| self.members(body))
            .unwrap_or_default();
        self.push_interface(node, name, properties);
    }

    /// Only aliases of object-literal types are recorded.
    fn type_alias_declaration(&mut self, node: Node) {
        let (Some(name), Some(value)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("value"),
        ) else {
            return;
        };
        if value.kind() != "object_type" {
            return;
        }
        let properties = self.members(value);
        self.push_interface(node, name, properties);
    }

    fn push_interface(&mut self, node: Node, name: Node, properties: Vec<Property>) {
        let statement = export_wrapper(node).unwrap_or(node);
        self.facts.interfaces.push(InterfaceInfo {
            name: self.text(name).to_string(),
            line: line_of(name),
            properties,
            is_exported: export_wrapper(node).is_some(),
            description: self.description(statement),
        });
    }

    fn members(&self, body: Node) -> Vec<Property> {
        let mut cursor = body.walk();
        body.named_children(&mut cursor)
            .filter(|m| m.kind() == "property_signature")
            .filter_map(|m| {
                let name = m.child_by_field_name("name")?;
                let type_name = m
                    .child_by_field_name("type")
                    .map(|t| strip_annotation(self.text(t)))
                    .unwrap_or_else(|| UNTYPED.to_string());
                Some(Property::new(self.text(name), type_name, PropertyOrigin::Member))
            })
            .collect()
    }

    fn import_statement(&mut self, node: Node) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        if source.kind() != "string" {
            return;
        }
        let module = self
            .text(source)
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .to_string();

        let mut symbols = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "import_clause" {
                self.import_clause(child, &mut symbols);
            }
        }

        self.facts.imports.push(ImportInfo {
            source: module,
            symbols,
            line: line_of(node),
        });
    }

    fn import_clause(&self, clause: Node, symbols: &mut Vec<String>) {
        let mut cursor = clause.walk();
        for binding in clause.named_children(&mut cursor) {
            match binding.kind() {
                // import Default from '..'
                "identifier" => symbols.push(self.text(binding).to_string()),
                // import * as ns from '..'
                "namespace_import" => {
                    let mut inner = binding.walk();
                    let ident = binding
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "identifier");
                    if let Some(ident) = ident {
                        symbols.push(self.text(ident).to_string());
                    }
                }
                // import { a, b as c } from '..'
                "named_imports" => {
                    let mut inner = binding.walk();
                    for spec in binding.named_children(&mut inner) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        if let Some(name) = spec.child_by_field_name("name") {
                            symbols.push(self.text(name).to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn params(&self, func: Node) -> Vec<String> {
        if let Some(single) = func.child_by_field_name("parameter") {
            return vec![self.text(single).to_string()];
        }
        let Some(list) = func.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|p| p.kind() != "comment")
            .map(|p| collapse_whitespace(self.text(p)))
            .collect()
    }

    fn return_type(&self, func: Node) -> Option<String> {
        func.child_by_field_name("return_type")
            .map(|t| strip_annotation(self.text(t)))
            .filter(|t| !t.is_empty())
    }

    /// Doc block in the trivia between the previous sibling and `node`.
    fn description(&self, node: Node) -> Option<String> {
        let mut prev = node.prev_sibling();
        while let Some(p) = prev {
            if matches!(p.kind(), "comment" | "decorator") {
                prev = p.prev_sibling();
            } else {
                break;
            }
        }
        let start = prev
            .map(|p| p.end_byte())
            .or_else(|| node.parent().map(|p| p.start_byte()))
            .unwrap_or(0);
        let leading = self.parsed.source.get(start..node.start_byte())?;
        nearest_doc_block(leading)
    }
}

/// The `export_statement` directly wrapping `node`, if any.
fn export_wrapper(node: Node) -> Option<Node> {
    node.parent().filter(|p| p.kind() == "export_statement")
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}

fn is_function_like(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "arrow_function"
            | "method_definition"
            | "class_body"
    )
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// `: Promise<User>` -> `Promise<User>`.
fn strip_annotation(text: &str) -> String {
    collapse_whitespace(text.trim().trim_start_matches(':').trim())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
