//! Source file enumeration and project naming.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::analysis::registered_extensions;
use crate::config::Config;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    "out",
    "coverage",
    "__pycache__",
    "venv",
    ".venv",
    "target",
];

/// Collect supported source files under `root`, sorted by path.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let excludes = config.exclude_set()?;
    let extensions = registered_extensions();
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !extensions.contains(&ext) {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.ends_with(".d.ts") {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if excludes.is_match(relative) {
            tracing::debug!(path = %relative.display(), "excluded by pattern");
            continue;
        }

        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!(path = %relative.display(), error = %e, "skipping file without metadata");
                continue;
            }
        };
        if size > config.max_file_size {
            tracing::debug!(path = %relative.display(), size, "skipping large file");
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Project name from the config, `package.json`, `pyproject.toml`, or the
/// directory name, in that order.
pub fn detect_project_name(root: &Path, config: &Config) -> String {
    if let Some(name) = config.project_name.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    if let Some(name) = package_json_name(root) {
        return name;
    }
    if let Some(name) = pyproject_name(root) {
        return name;
    }
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string())
}

fn package_json_name(root: &Path) -> Option<String> {
    let content = fs::read_to_string(root.join("package.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&content).ok()?;
    value
        .get("name")?
        .as_str()
        .filter(|n| !n.is_empty())
        .map(String::from)
}

fn pyproject_name(root: &Path) -> Option<String> {
    let content = fs::read_to_string(root.join("pyproject.toml")).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    let project = value.get("project").or_else(|| {
        value
            .get("tool")
            .and_then(|tool| tool.get("poetry"))
    })?;
    project.get("name")?.as_str().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collect_files_filters() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/b.ts", "");
        touch(root, "src/a.py", "");
        touch(root, "src/types.d.ts", "");
        touch(root, "src/readme.md", "");
        touch(root, "web/app.js", "");
        touch(root, "node_modules/lib/index.js", "");
        touch(root, ".git/hooks/x.py", "");
        touch(root, "venv/lib/site.py", "");
        touch(root, "src/generated/api.ts", "");
        touch(root, "big.py", &"x = 1\n".repeat(100));

        let config = Config {
            exclude: vec!["**/generated/**".to_string()],
            max_file_size: 100,
            ..Config::default()
        };
        let files = collect_files(root, &config).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["src/a.py", "src/b.ts", "web/app.js"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_broken_symlink_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "src/app.py", "");
        std::os::unix::fs::symlink(root.join("missing.py"), root.join("src/dangling.py")).unwrap();
        std::os::unix::fs::symlink(root.join("gone"), root.join("linked_dir")).unwrap();

        let files = collect_files(root, &Config::default()).unwrap();
        assert_eq!(files, vec![root.join("src/app.py")]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(collect_files(&temp.path().join("nope"), &Config::default()).is_err());
    }

    #[test]
    fn test_project_name_precedence() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "pyproject.toml", "[project]\nname = \"py-shop\"\n");
        assert_eq!(detect_project_name(root, &Config::default()), "py-shop");

        touch(root, "package.json", r#"{"name": "web-shop", "version": "1.0.0"}"#);
        assert_eq!(detect_project_name(root, &Config::default()), "web-shop");

        let config = Config {
            project_name: Some("configured".to_string()),
            ..Config::default()
        };
        assert_eq!(detect_project_name(root, &config), "configured");
    }

    #[test]
    fn test_project_name_falls_back_to_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("my-service");
        fs::create_dir(&dir).unwrap();
        assert_eq!(detect_project_name(&dir, &Config::default()), "my-service");
    }
}
