//! Output formatting for a generated project model.
//!
//! Supports three outputs:
//! - Markdown: the context document handed to AI assistants
//! - JSON: the full model, for programmatic consumption
//! - Pretty: colored terminal summary of a run

use std::fmt::Write as _;
use std::path::PathBuf;

use colored::*;

use crate::analysis::{ClassInfo, FileFacts, FunctionInfo};
use crate::detect::DatabaseTable;
use crate::project::ProjectModel;

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize the whole model.
pub fn render_json(model: &ProjectModel) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

// =============================================================================
// Markdown Format
// =============================================================================

/// Render the model as a Markdown context document.
pub fn render_markdown(model: &ProjectModel) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_markdown(&mut out, model);
    out
}

fn write_markdown(out: &mut String, model: &ProjectModel) -> std::fmt::Result {
    writeln!(out, "# {} - AI Context", model.name)?;
    writeln!(out)?;
    writeln!(
        out,
        "_Generated {}_",
        model.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out)?;

    writeln!(out, "## Overview")?;
    writeln!(out)?;
    writeln!(out, "- Files: {}", model.total_files)?;
    writeln!(out, "- Functions: {}", model.total_functions)?;
    writeln!(out, "- Classes: {}", model.total_classes)?;
    writeln!(out, "- API endpoints: {}", model.endpoints.len())?;
    writeln!(out, "- Database tables: {}", model.tables.len())?;
    writeln!(out)?;

    if !model.technologies.is_empty() {
        writeln!(out, "## Technologies")?;
        writeln!(out)?;
        for tech in &model.technologies {
            writeln!(out, "- {}", tech)?;
        }
        writeln!(out)?;
    }

    if !model.endpoints.is_empty() {
        writeln!(out, "## API Endpoints")?;
        writeln!(out)?;
        writeln!(out, "| Method | Path | Handler | Location | Auth |")?;
        writeln!(out, "|--------|------|---------|----------|------|")?;
        for e in &model.endpoints {
            writeln!(
                out,
                "| {} | `{}` | {} | {}:{} | {} |",
                e.method,
                escape_cell(&e.path),
                escape_cell(&e.handler),
                escape_cell(&e.file),
                e.line,
                if e.requires_auth { "yes" } else { "no" }
            )?;
        }
        writeln!(out)?;
    }

    if !model.tables.is_empty() {
        writeln!(out, "## Database Schema")?;
        writeln!(out)?;
        for table in &model.tables {
            write_table(out, table)?;
        }
    }

    if !model.files.is_empty() {
        writeln!(out, "## Files")?;
        writeln!(out)?;
        for file in &model.files {
            write_file(out, file)?;
        }
    }

    Ok(())
}

fn write_table(out: &mut String, table: &DatabaseTable) -> std::fmt::Result {
    writeln!(out, "### {}", table.name)?;
    writeln!(out)?;
    writeln!(out, "_{}:{}_", table.file, table.line)?;
    writeln!(out)?;
    writeln!(out, "| Column | Type | Nullable | Primary | Foreign Key |")?;
    writeln!(out, "|--------|------|----------|---------|-------------|")?;
    for c in &table.columns {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            escape_cell(&c.name),
            escape_cell(&c.type_name),
            yes_no(c.nullable),
            yes_no(c.primary),
            c.foreign_key.as_deref().map(escape_cell).unwrap_or_default()
        )?;
    }
    writeln!(out)
}

fn write_file(out: &mut String, file: &FileFacts) -> std::fmt::Result {
    if file.functions.is_empty()
        && file.classes.is_empty()
        && file.interfaces.is_empty()
        && file.imports.is_empty()
    {
        return Ok(());
    }

    writeln!(out, "### `{}` ({})", file.relative_path, file.language)?;
    writeln!(out)?;

    for class in &file.classes {
        write_class(out, class)?;
    }

    for iface in &file.interfaces {
        writeln!(
            out,
            "**Interface `{}`**{} (line {})",
            iface.name,
            export_marker(iface.is_exported),
            iface.line
        )?;
        if let Some(desc) = &iface.description {
            writeln!(out, "> {}", desc)?;
        }
        for prop in &iface.properties {
            writeln!(out, "- `{}`", prop)?;
        }
        writeln!(out)?;
    }

    if !file.functions.is_empty() {
        writeln!(out, "**Functions**")?;
        writeln!(out)?;
        for func in &file.functions {
            write_function(out, func)?;
        }
        writeln!(out)?;
    }

    if !file.imports.is_empty() {
        writeln!(out, "**Imports**")?;
        writeln!(out)?;
        for import in &file.imports {
            if import.symbols.is_empty() {
                writeln!(out, "- `{}`", import.source)?;
            } else {
                writeln!(out, "- `{}`: {}", import.source, import.symbols.join(", "))?;
            }
        }
        writeln!(out)?;
    }

    Ok(())
}

fn write_class(out: &mut String, class: &ClassInfo) -> std::fmt::Result {
    writeln!(
        out,
        "**Class `{}`**{} (line {})",
        class.name,
        export_marker(class.is_exported),
        class.line
    )?;
    if let Some(desc) = &class.description {
        writeln!(out, "> {}", desc)?;
    }
    if !class.properties.is_empty() {
        writeln!(out)?;
        writeln!(out, "Properties:")?;
        for prop in &class.properties {
            writeln!(out, "- `{}`", prop)?;
        }
    }
    if !class.methods.is_empty() {
        writeln!(out)?;
        writeln!(out, "Methods:")?;
        for method in &class.methods {
            write_function(out, method)?;
        }
    }
    writeln!(out)
}

fn write_function(out: &mut String, func: &FunctionInfo) -> std::fmt::Result {
    write!(out, "- `{}`", func.signature())?;
    if func.is_exported {
        write!(out, " (exported)")?;
    }
    write!(out, " line {}", func.line)?;
    if let Some(desc) = &func.description {
        write!(out, ": {}", desc)?;
    }
    writeln!(out)
}

fn export_marker(exported: bool) -> &'static str {
    if exported {
        " (exported)"
    } else {
        ""
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Print a colored run summary to stdout.
pub fn write_pretty(model: &ProjectModel, failed: &[PathBuf], written: &[PathBuf]) {
    println!();
    print!("{}", "codecontext".cyan().bold());
    println!(" {}", model.name.bold());
    println!();

    println!(
        "  {} files, {} functions, {} classes",
        model.total_files.to_string().bold(),
        model.total_functions.to_string().bold(),
        model.total_classes.to_string().bold()
    );
    println!(
        "  {} endpoints, {} tables",
        model.endpoints.len().to_string().bold(),
        model.tables.len().to_string().bold()
    );
    if !model.technologies.is_empty() {
        println!("  {} {}", "Technologies:".bold(), model.technologies.join(", "));
    }

    if !failed.is_empty() {
        println!();
        println!("  {} ({}):", "Skipped".yellow().bold(), failed.len());
        for path in failed {
            println!("    {} {}", "!".yellow(), path.display());
        }
    }

    println!();
    for path in written {
        println!("  {} {}", "✓ wrote".green(), path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ImportInfo, Language, Property, PropertyOrigin};
    use crate::detect::{ApiEndpoint, Column, HttpMethod};
    use chrono::TimeZone;

    fn model() -> ProjectModel {
        let mut file = FileFacts::empty("app/models.py", Language::Python);
        let mut class = ClassInfo::new("User", 3);
        class.description = Some("A registered user.".to_string());
        class.properties.push(Property::new("id", "Integer", PropertyOrigin::Column));
        class.methods.push(FunctionInfo::new("save", 6));
        file.classes.push(class);
        let mut func = FunctionInfo::new("create_app", 10);
        func.is_exported = true;
        func.params = vec!["config".to_string()];
        file.functions.push(func);
        file.imports.push(ImportInfo {
            source: "flask".to_string(),
            symbols: vec!["Flask".to_string()],
            line: 1,
        });

        ProjectModel {
            name: "shop".to_string(),
            generated_at: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            total_files: 1,
            total_functions: 2,
            total_classes: 1,
            files: vec![file],
            technologies: vec!["Flask".to_string()],
            endpoints: vec![ApiEndpoint {
                method: HttpMethod::Get,
                path: "/users".to_string(),
                handler: "list_users".to_string(),
                file: "app/views.py".to_string(),
                line: 8,
                requires_auth: true,
            }],
            tables: vec![DatabaseTable {
                name: "User".to_string(),
                file: "app/models.py".to_string(),
                line: 3,
                columns: vec![Column {
                    name: "org_id".to_string(),
                    type_name: "Integer".to_string(),
                    nullable: true,
                    primary: false,
                    foreign_key: Some("orgs.id".to_string()),
                }],
            }],
        }
    }

    #[test]
    fn test_markdown_sections() {
        let md = render_markdown(&model());
        assert!(md.starts_with("# shop - AI Context\n"));
        assert!(md.contains("_Generated 2024-05-01 12:00:00 UTC_"));
        assert!(md.contains("- Functions: 2"));
        assert!(md.contains("## Technologies\n\n- Flask\n"));
        assert!(md.contains("| GET | `/users` | list_users | app/views.py:8 | yes |"));
        assert!(md.contains("| org_id | Integer | yes | no | orgs.id |"));
        assert!(md.contains("### `app/models.py` (python)"));
        assert!(md.contains("> A registered user."));
        assert!(md.contains("- `id: Integer`"));
        assert!(md.contains("- `create_app(config)` (exported) line 10"));
        assert!(md.contains("- `flask`: Flask"));
    }

    #[test]
    fn test_markdown_omits_empty_sections() {
        let mut m = model();
        m.endpoints.clear();
        m.tables.clear();
        m.technologies.clear();
        let md = render_markdown(&m);
        assert!(!md.contains("## API Endpoints"));
        assert!(!md.contains("## Database Schema"));
        assert!(!md.contains("## Technologies"));
    }

    #[test]
    fn test_json_round_trip() {
        let m = model();
        let json = render_json(&m).unwrap();
        assert!(json.contains("\"method\": \"GET\""));
        assert!(json.contains("\"language\": \"python\""));
        let back: ProjectModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
    }
}
