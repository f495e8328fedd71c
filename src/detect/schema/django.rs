//! Django `models.Model` classes.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::scan::{find_closing, split_top_level};
use crate::analysis::FileFacts;
use crate::detect::text::{line_offset, unquote};
use crate::detect::{Column, DatabaseTable};

const GATE_MARKER: &str = "models.Model";

/// Field types whose first argument names the related model.
const RELATION_FIELDS: &[&str] = &["ForeignKey", "OneToOneField", "ManyToManyField"];

lazy_static! {
    static ref FIELD_RE: Regex =
        Regex::new(r"(?m)^[ \t]+(\w+)\s*=\s*models\.(\w+)\s*\(").unwrap();
    static ref TOP_LEVEL_CLASS_RE: Regex = Regex::new(r"(?m)^class\s").unwrap();
    static ref NULL_RE: Regex = Regex::new(r"\bnull\s*=\s*True").unwrap();
    static ref PRIMARY_RE: Regex = Regex::new(r"primary_key\s*=\s*True").unwrap();
}

/// One table per class with at least one `models.*` field.
pub fn django_tables(facts: &FileFacts, text: &str) -> Vec<DatabaseTable> {
    if !text.contains(GATE_MARKER) {
        return Vec::new();
    }

    let mut tables = Vec::new();
    for class in &facts.classes {
        let start = line_offset(text, class.line);
        let body_start = text[start..]
            .find('\n')
            .map_or(text.len(), |idx| start + idx + 1);
        let end = TOP_LEVEL_CLASS_RE
            .find(&text[body_start..])
            .map_or(text.len(), |m| body_start + m.start());
        let slice = &text[start..end];

        let columns: Vec<Column> = FIELD_RE
            .captures_iter(slice)
            .filter_map(|caps| {
                let open = caps.get(0)?.end() - 1;
                let close = find_closing(slice, open, '(', ')').unwrap_or(slice.len());
                let args = slice.get(open + 1..close).unwrap_or_default();
                Some(field_column(&caps[1], &caps[2], args))
            })
            .collect();

        if columns.is_empty() {
            continue;
        }
        tracing::debug!(table = %class.name, columns = columns.len(), "django model");
        tables.push(DatabaseTable {
            name: class.name.clone(),
            file: facts.relative_path.clone(),
            line: class.line,
            columns,
        });
    }
    tables
}

fn field_column(name: &str, field_type: &str, args: &str) -> Column {
    let foreign_key = if RELATION_FIELDS.contains(&field_type) {
        split_top_level(args)
            .into_iter()
            .next()
            .filter(|first| !first.contains('='))
            .map(|first| unquote(&first).to_string())
    } else {
        None
    };

    Column {
        name: name.to_string(),
        type_name: field_type.to_string(),
        nullable: NULL_RE.is_match(args),
        primary: PRIMARY_RE.is_match(args),
        foreign_key,
    }
}
