//! TypeORM `@Entity` classes.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::scan::find_closing;
use crate::analysis::{FileFacts, PropertyOrigin};
use crate::detect::text::line_offset;
use crate::detect::{Column, DatabaseTable};

const GATE_MARKER: &str = "@Entity";

lazy_static! {
    static ref DECORATOR_HEAD_RE: Regex = Regex::new(r"^@[\w.]+").unwrap();
    static ref PROPERTY_LINE_RE: Regex = Regex::new(
        r"^(?:(?:public|private|protected|readonly|declare)\s+)*(\w+)[?!]?\s*:"
    )
    .unwrap();
    static ref COLUMN_DECORATOR_RE: Regex =
        Regex::new(r"@(?:\w*Column|ManyToOne|OneToOne)\b").unwrap();
    static ref PRIMARY_RE: Regex = Regex::new(r"@Primary\w*").unwrap();
    static ref NULLABLE_RE: Regex = Regex::new(r"nullable\s*:\s*true").unwrap();
    static ref RELATION_TARGET_RE: Regex =
        Regex::new(r"@(?:ManyToOne|OneToOne)\(\s*\(\s*\)\s*=>\s*(\w+)").unwrap();
}

/// One table per class whose properties carry column decorators.
pub fn typeorm_tables(facts: &FileFacts, text: &str) -> Vec<DatabaseTable> {
    if !text.contains(GATE_MARKER) {
        return Vec::new();
    }

    let mut tables = Vec::new();
    for class in &facts.classes {
        if class.properties_of(PropertyOrigin::Field).next().is_none() {
            continue;
        }
        let start = line_offset(text, class.line);
        let Some(open) = text[start..].find('{').map(|idx| start + idx) else {
            continue;
        };
        let close = find_closing(text, open, '{', '}').unwrap_or(text.len());
        let decorated = decorated_properties(&text[open + 1..close]);

        let columns: Vec<Column> = class
            .properties_of(PropertyOrigin::Field)
            .filter_map(|prop| {
                let (_, decorators) = decorated.iter().find(|(name, _)| *name == prop.name)?;
                if !COLUMN_DECORATOR_RE.is_match(decorators) {
                    return None;
                }
                Some(Column {
                    name: prop.name.clone(),
                    type_name: prop.type_name.clone(),
                    nullable: NULLABLE_RE.is_match(decorators),
                    primary: PRIMARY_RE.is_match(decorators),
                    foreign_key: RELATION_TARGET_RE
                        .captures(decorators)
                        .map(|caps| caps[1].to_string()),
                })
            })
            .collect();

        if columns.is_empty() {
            continue;
        }
        tracing::debug!(table = %class.name, columns = columns.len(), "typeorm entity");
        tables.push(DatabaseTable {
            name: class.name.clone(),
            file: facts.relative_path.clone(),
            line: class.line,
            columns,
        });
    }
    tables
}

/// Walk a class body and pair each property line with the decorators
/// written directly above it (or in front of it on the same line).
fn decorated_properties(body: &str) -> Vec<(String, String)> {
    let mut found = Vec::new();
    let mut decorators = String::new();
    let mut pos = 0;

    while pos < body.len() {
        let rest = &body[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }

        if let Some(head) = DECORATOR_HEAD_RE.find(trimmed) {
            let mut end = pos + head.end();
            if body[end..].starts_with('(') {
                end = find_closing(body, end, '(', ')').map_or(body.len(), |close| close + 1);
            }
            decorators.push_str(&body[pos..end]);
            decorators.push('\n');
            pos = end;
            continue;
        }

        let eol = trimmed.find('\n').map_or(body.len(), |idx| pos + idx);
        match PROPERTY_LINE_RE.captures(&body[pos..eol]) {
            Some(caps) => found.push((caps[1].to_string(), std::mem::take(&mut decorators))),
            None => decorators.clear(),
        }
        pos = eol;
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extract_source;
    use std::path::Path;

    const ENTITY: &str = r#"import { Entity, Column, PrimaryGeneratedColumn, ManyToOne, OneToMany } from "typeorm";

@Entity()
export class Photo {
  @PrimaryGeneratedColumn()
  id: number;

  @Column({
    length: 100,
    nullable: true,
  })
  caption: string;

  @ManyToOne(() => User, (user) => user.photos)
  @JoinColumn({ name: "owner_id" })
  owner: User;

  @OneToMany(() => Tag, (tag) => tag.photo)
  tags: Tag[];

  cached: boolean;

  @Column() views: number;

  describe(): string {
    const label: string = `${this.caption} {}`;
    return label;
  }
}
"#;

    #[test]
    fn test_entity_columns() {
        let facts = extract_source(Path::new("src/photo.entity.ts"), ENTITY).unwrap();
        let tables = typeorm_tables(&facts, ENTITY);
        assert_eq!(tables.len(), 1);

        let photo = &tables[0];
        assert_eq!(photo.name, "Photo");
        assert_eq!(photo.line, 4);
        let names: Vec<_> = photo.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "caption", "owner", "views"]);

        let id = photo.column("id").unwrap();
        assert!(id.primary);
        assert!(!id.nullable);
        assert_eq!(id.type_name, "number");

        assert!(photo.column("caption").unwrap().nullable);

        let owner = photo.column("owner").unwrap();
        assert_eq!(owner.foreign_key.as_deref(), Some("User"));
        assert!(!owner.primary);
    }

    #[test]
    fn test_gate() {
        let text = "export class Photo {\n  @Column()\n  id: number;\n}\n";
        let facts = extract_source(Path::new("photo.ts"), text).unwrap();
        assert!(typeorm_tables(&facts, text).is_empty());
    }

    #[test]
    fn test_decorated_properties_pairs_lines() {
        let body = "\n  @Index()\n  @Column()\n  name: string;\n  plain: number;\n";
        let pairs = decorated_properties(body);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "name");
        assert!(pairs[0].1.contains("@Index()"));
        assert!(pairs[0].1.contains("@Column()"));
        assert_eq!(pairs[1], ("plain".to_string(), String::new()));
    }
}
