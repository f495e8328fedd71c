//! SQLAlchemy declarative models.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::scan::find_closing;
use crate::analysis::{FileFacts, PropertyOrigin};
use crate::detect::text::{contains_any, line_offset};
use crate::detect::{Column, DatabaseTable};

const GATE_MARKERS: &[&str] = &["declarative_base", "DeclarativeBase", "db.Model", "sqlalchemy"];

lazy_static! {
    static ref NOT_NULL_RE: Regex = Regex::new(r"nullable\s*=\s*False").unwrap();
    static ref PRIMARY_RE: Regex = Regex::new(r"primary_key\s*=\s*True").unwrap();
    static ref FOREIGN_KEY_RE: Regex =
        Regex::new(r#"ForeignKey\(\s*['"]([^'"]+)['"]"#).unwrap();
    static ref COLUMN_CALL_RE: Regex = Regex::new(
        r"(?m)^[ \t]+(\w+)\s*(?::[^=\n]*)?=\s*(?:[\w.]+\.)?(?:Column|mapped_column)\s*\("
    )
    .unwrap();
}

/// One table per class that declared `Column`/`mapped_column` attributes.
pub fn sqlalchemy_tables(facts: &FileFacts, text: &str) -> Vec<DatabaseTable> {
    if !contains_any(text, GATE_MARKERS) {
        return Vec::new();
    }

    let mut tables = Vec::new();
    for class in &facts.classes {
        let after_header = &text[line_offset(text, class.line)..];
        let columns: Vec<Column> = class
            .properties_of(PropertyOrigin::Column)
            .map(|prop| {
                let call = column_call(after_header, &prop.name).unwrap_or_default();
                Column {
                    name: prop.name.clone(),
                    type_name: prop.type_name.clone(),
                    nullable: !NOT_NULL_RE.is_match(call),
                    primary: PRIMARY_RE.is_match(call),
                    foreign_key: FOREIGN_KEY_RE
                        .captures(call)
                        .map(|caps| caps[1].to_string()),
                }
            })
            .collect();

        if columns.is_empty() {
            continue;
        }
        tracing::debug!(table = %class.name, columns = columns.len(), "sqlalchemy model");
        tables.push(DatabaseTable {
            name: class.name.clone(),
            file: facts.relative_path.clone(),
            line: class.line,
            columns,
        });
    }
    tables
}

/// Argument text of the first `name = [ns.]Column(...)` call in `text`.
fn column_call<'t>(text: &'t str, name: &str) -> Option<&'t str> {
    let open = COLUMN_CALL_RE
        .captures_iter(text)
        .find(|caps| &caps[1] == name)?
        .get(0)?
        .end()
        - 1;
    let close = find_closing(text, open, '(', ')').unwrap_or(text.len());
    text.get(open + 1..close)
}
