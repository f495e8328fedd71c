//! Python declaration extractor.
//!
//! Python files are not parsed. A single forward pass over the lines carries
//! a little state (open class, open method body, pending docstring, triple
//! quote state) and matches line-anchored patterns for classes, ORM columns,
//! typed attributes, methods, top-level functions and imports.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::scan::{
    collect_call, find_closing, indentation, split_top_level, QuoteEvent, TripleQuote,
};
use crate::analysis::{
    ClassInfo, FileFacts, FunctionInfo, ImportInfo, Language, LanguageAnalyzer, Property,
    PropertyOrigin,
};
use crate::error::Result;

lazy_static! {
    static ref CLASS_RE: Regex =
        Regex::new(r"^(\s*)class\s+(\w+)\s*(?:\(.*\))?\s*:").unwrap();
    static ref DEF_RE: Regex = Regex::new(r"^\s*(async\s+)?def\s+(\w+)\s*\(").unwrap();
    static ref COLUMN_RE: Regex = Regex::new(
        r"^\s+(\w+)\s*(?::\s*([^=]+?))?\s*=\s*(?:[\w.]+\.)?(?:Column|mapped_column)\s*\("
    )
    .unwrap();
    static ref ATTR_RE: Regex = Regex::new(r"^\s+(\w+)\s*:\s*([^=]+?)\s*(?:=.*)?$").unwrap();
    static ref IMPORT_RE: Regex = Regex::new(r"^import\s+(.+)$").unwrap();
    static ref FROM_IMPORT_RE: Regex = Regex::new(r"^from\s+(\S+)\s+import\s+(.+)$").unwrap();
}

/// Placeholder type for columns whose type cannot be read off the call.
const UNTYPED: &str = "Any";

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "case", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "match", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
    "yield",
];

#[derive(Default)]
pub struct PythonAnalyzer;

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn extract(&self, path: &Path, source: &str) -> Result<FileFacts> {
        let lines: Vec<&str> = source.lines().collect();
        let mut scanner = Scanner {
            lines: &lines,
            facts: FileFacts::empty(path, Language::Python),
            class: None,
            method_indent: None,
            pending: None,
            last_header: None,
        };
        scanner.run();
        Ok(scanner.facts)
    }
}

/// The declaration whose header was the last code line seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    Class,
    Method,
    Function,
}

struct OpenClass {
    info: ClassInfo,
    indent: usize,
}

struct Scanner<'a> {
    lines: &'a [&'a str],
    facts: FileFacts,
    class: Option<OpenClass>,
    /// Indentation of the method whose body we are in, if any.
    method_indent: Option<usize>,
    pending: Option<String>,
    last_header: Option<Header>,
}

impl Scanner<'_> {
    fn run(&mut self) {
        let mut quote = TripleQuote::new();
        let mut i = 0;

        while i < self.lines.len() {
            let line = self.lines[i];
            match quote.feed(line) {
                QuoteEvent::Inside => {
                    i += 1;
                    continue;
                }
                QuoteEvent::Docstring(text) => {
                    self.attach_docstring(text);
                    i += 1;
                    continue;
                }
                QuoteEvent::Code => {}
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                i += 1;
                continue;
            }
            i = self.code_line(i, indentation(line)) + 1;
        }

        self.close_class();
    }

    /// Handle one code line; returns the index of the last line consumed.
    fn code_line(&mut self, i: usize, indent: usize) -> usize {
        let line = self.lines[i];

        if let Some(caps) = CLASS_RE.captures(line) {
            let nested = self.class.as_ref().is_some_and(|c| indent > c.indent);
            if !nested {
                self.open_class(&caps[2], indent, i + 1);
                return i;
            }
        }

        if self.method_indent.is_some_and(|m| indent <= m) {
            self.method_indent = None;
        }

        if let Some(class_indent) = self.class.as_ref().map(|c| c.indent) {
            if indent > class_indent {
                return self.class_body_line(i, indent);
            }
        }

        if indent == 0 && DEF_RE.is_match(line) {
            self.close_class();
            return self.function(i);
        }

        if self.class.as_ref().is_some_and(|c| indent <= c.indent) {
            self.close_class();
        }

        self.last_header = None;
        let trimmed = line.trim();
        if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
            return self.import(i);
        }
        i
    }

    fn class_body_line(&mut self, i: usize, indent: usize) -> usize {
        let line = self.lines[i];
        self.last_header = None;

        if self.method_indent.is_none() {
            if COLUMN_RE.is_match(line) {
                return self.column(i);
            }
            if let Some(property) = typed_attribute(line) {
                if let Some(class) = self.class.as_mut() {
                    class.info.properties.push(property);
                }
                return i;
            }
        }

        if self.method_indent.is_none() && DEF_RE.is_match(line) {
            return self.method(i, indent);
        }
        i
    }

    fn open_class(&mut self, name: &str, indent: usize, line: usize) {
        self.close_class();
        let mut info = ClassInfo::new(name, line);
        info.is_exported = true;
        info.description = self.pending.take();
        self.class = Some(OpenClass { info, indent });
        self.method_indent = None;
        self.last_header = Some(Header::Class);
    }

    fn close_class(&mut self) {
        if let Some(open) = self.class.take() {
            self.facts.classes.push(open.info);
        }
        self.method_indent = None;
    }

    fn column(&mut self, i: usize) -> usize {
        let (text, last) = collect_call(self.lines, i);
        if let Some(property) = column_property(&text) {
            if let Some(class) = self.class.as_mut() {
                class.info.properties.push(property);
            }
        }
        last
    }

    fn method(&mut self, i: usize, indent: usize) -> usize {
        let (text, last) = collect_call(self.lines, i);
        if let Some(mut func) = parse_def(&text, i + 1) {
            func.description = self.pending.take();
            if let Some(class) = self.class.as_mut() {
                class.info.methods.push(func);
                self.method_indent = Some(indent);
                self.last_header = Some(Header::Method);
            }
        }
        last
    }

    fn function(&mut self, i: usize) -> usize {
        let (text, last) = collect_call(self.lines, i);
        if let Some(mut func) = parse_def(&text, i + 1) {
            func.is_exported = true;
            func.description = self.pending.take();
            self.facts.functions.push(func);
            self.last_header = Some(Header::Function);
        }
        last
    }

    fn import(&mut self, i: usize) -> usize {
        // Comments inside a parenthesized import would swallow the names
        // joined after them.
        let stripped: Vec<&str> = self.lines[i..].iter().map(|l| strip_comment(l)).collect();
        let (text, consumed) = collect_call(&stripped, 0);
        let text = text.trim();

        if let Some(caps) = FROM_IMPORT_RE.captures(text) {
            let names = caps[2].trim().trim_start_matches('(').trim_end_matches(')');
            self.facts.imports.push(ImportInfo {
                source: caps[1].to_string(),
                symbols: import_symbols(names),
                line: i + 1,
            });
        } else if let Some(caps) = IMPORT_RE.captures(text) {
            let symbols = import_symbols(&caps[1]);
            if let Some(first) = symbols.first() {
                self.facts.imports.push(ImportInfo {
                    source: first.clone(),
                    symbols: symbols.clone(),
                    line: i + 1,
                });
            }
        }
        i + consumed
    }

    /// A docstring right after a header describes that declaration and
    /// replaces any pending text it took; anything else waits for the next
    /// declaration.
    fn attach_docstring(&mut self, text: String) {
        let slot = match self.last_header.take() {
            Some(Header::Class) => self.class.as_mut().map(|c| &mut c.info.description),
            Some(Header::Method) => self
                .class
                .as_mut()
                .and_then(|c| c.info.methods.last_mut())
                .map(|m| &mut m.description),
            Some(Header::Function) => self.facts.functions.last_mut().map(|f| &mut f.description),
            None => None,
        };

        match slot {
            Some(description) => *description = Some(text),
            None => self.pending = Some(text),
        }
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Parse a (possibly joined multi-line) `def` header.
fn parse_def(text: &str, line: usize) -> Option<FunctionInfo> {
    let caps = DEF_RE.captures(text)?;
    let open = caps.get(0)?.end() - 1;
    let close = find_closing(text, open, '(', ')');
    let params_text = match close {
        Some(close) => &text[open + 1..close],
        None => &text[open + 1..],
    };

    let mut func = FunctionInfo::new(&caps[2], line);
    func.is_async = caps.get(1).is_some();
    func.params = split_top_level(params_text)
        .into_iter()
        .filter(|p| {
            let name = p.split([':', '=']).next().unwrap_or("").trim();
            !name.is_empty() && name != "self" && name != "cls"
        })
        .collect();
    func.return_type = close.and_then(|close| {
        let ret = strip_comment(&text[close + 1..]).trim().strip_prefix("->")?;
        let ret = ret.trim().trim_end_matches(':').trim();
        (!ret.is_empty()).then(|| ret.to_string())
    });
    Some(func)
}

/// `name = Column(Type, ...)` → `name: Type`.
fn column_property(text: &str) -> Option<Property> {
    let caps = COLUMN_RE.captures(text)?;
    let open = caps.get(0)?.end() - 1;
    let args = match find_closing(text, open, '(', ')') {
        Some(close) => &text[open + 1..close],
        None => &text[open + 1..],
    };

    let token = args
        .split([',', '('])
        .next()
        .unwrap_or("")
        .trim();
    let type_name = if token.is_empty() || token.contains('=') {
        caps.get(2).map_or(UNTYPED, |m| m.as_str().trim())
    } else {
        token
    };
    Some(Property::new(&caps[1], type_name, PropertyOrigin::Column))
}

/// `name: Type [= default]` inside a class body.
fn typed_attribute(line: &str) -> Option<Property> {
    let caps = ATTR_RE.captures(strip_comment(line))?;
    let name = &caps[1];
    if KEYWORDS.contains(&name) {
        return None;
    }
    Some(Property::new(name, caps[2].trim(), PropertyOrigin::Attribute))
}

/// `a, b as c` → `["a", "b"]`.
fn import_symbols(list: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|part| part.split_whitespace().next())
        .map(|name| name.trim_matches(|c| c == '(' || c == ')').to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
