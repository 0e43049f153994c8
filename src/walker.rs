use std::path::{Path, PathBuf};

use crate::config::RefGraphConfig;
use crate::language::Dialect;

/// Source file extensions that ref-graph scans.
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "vue"];

/// Directory names excluded at any depth: dependency caches, version-control
/// metadata, and build output.
const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build"];

/// Walk a project directory and collect source files in scan order.
///
/// Respects `.gitignore` rules, always excludes the directories in
/// [`EXCLUDED_DIRS`], and applies any additional exclusions from
/// `config.exclude`. Recursion depth is unbounded; traversal order is
/// filesystem enumeration order.
///
/// When `verbose` is true, each discovered file path is printed to stderr.
pub fn walk_project(
    root: &Path,
    config: &RefGraphConfig,
    verbose: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git
        // repository, so exclusions work for standalone directories.
        .require_git(false)
        .build();

    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                eprintln!("warning: {err}");
                continue;
            }
        };

        let path = entry.path();

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        if path_in_excluded_dir(path) {
            continue;
        }

        if is_excluded_by_config(path, config) {
            continue;
        }

        // Only files with a recognised dialect extension are scanned.
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !SOURCE_EXTENSIONS.contains(&ext) {
            continue;
        }

        if verbose {
            let dialect = Dialect::from_path(path)
                .map(|d| d.display_name())
                .unwrap_or("unknown");
            eprintln!("{} [{dialect}]", path.display());
        }

        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Returns true if any component of `path` is one of the hard-excluded
/// directory names.
fn path_in_excluded_dir(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| EXCLUDED_DIRS.contains(&s))
            .unwrap_or(false)
    })
}

/// Returns true if `path` matches any exclusion pattern from config.
fn is_excluded_by_config(path: &Path, config: &RefGraphConfig) -> bool {
    let patterns = match &config.exclude {
        Some(p) => p,
        None => return false,
    };

    let path_str = path.to_string_lossy();

    for pattern in patterns {
        if let Ok(matched) = glob::Pattern::new(pattern)
            && matched.matches(&path_str)
        {
            return true;
        }
        // Also check if any component matches the pattern directly.
        for component in path.components() {
            if let Some(s) = component.as_os_str().to_str()
                && let Ok(matched) = glob::Pattern::new(pattern)
                && matched.matches(s)
            {
                return true;
            }
        }
    }

    false
}

/// The dialect hint for a discovered file. Discovered files always carry a
/// recognised extension, so this only returns `None` for paths that did not
/// come from [`walk_project`].
pub fn dialect_hint(path: &Path) -> Option<Dialect> {
    Dialect::from_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_walk_returns_only_source_extensions() {
        let dir = tmp();
        fs::write(dir.path().join("app.js"), "function a() {}").unwrap();
        fs::write(dir.path().join("Button.vue"), "<template/>").unwrap();
        fs::write(dir.path().join("service.ts"), "export {}").unwrap();
        fs::write(dir.path().join("README.md"), "# Hello").unwrap();
        fs::write(dir.path().join("data.json"), "{}").unwrap();

        let config = RefGraphConfig::default();
        let files = walk_project(dir.path(), &config, false).unwrap();
        let names = names(&files);

        assert!(names.contains(&"app.js".to_string()));
        assert!(names.contains(&"Button.vue".to_string()));
        assert!(names.contains(&"service.ts".to_string()));
        assert!(!names.contains(&"README.md".to_string()));
        assert!(!names.contains(&"data.json".to_string()));
    }

    #[test]
    fn test_walk_excludes_dependency_and_build_dirs() {
        let dir = tmp();
        for excluded in ["node_modules", "dist", "build"] {
            let sub = dir.path().join(excluded).join("pkg");
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join("index.js"), "function x() {}").unwrap();
        }
        fs::write(dir.path().join("main.js"), "function main() {}").unwrap();

        let config = RefGraphConfig::default();
        let files = walk_project(dir.path(), &config, false).unwrap();

        assert_eq!(files.len(), 1, "only main.js should survive: {files:?}");
        assert!(names(&files).contains(&"main.js".to_string()));
    }

    #[test]
    fn test_walk_recurses_nested_directories() {
        let dir = tmp();
        let deep = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("deep.js"), "function d() {}").unwrap();

        let config = RefGraphConfig::default();
        let files = walk_project(dir.path(), &config, false).unwrap();

        assert!(names(&files).contains(&"deep.js".to_string()));
    }

    #[test]
    fn test_walk_respects_config_exclusions() {
        let dir = tmp();
        fs::write(dir.path().join("keep.js"), "function k() {}").unwrap();
        fs::write(dir.path().join("skip.min.js"), "function s() {}").unwrap();
        let generated = dir.path().join("generated");
        fs::create_dir_all(&generated).unwrap();
        fs::write(generated.join("gen.js"), "function g() {}").unwrap();

        let config = RefGraphConfig {
            exclude: Some(vec!["*.min.js".to_string(), "generated".to_string()]),
        };
        let files = walk_project(dir.path(), &config, false).unwrap();
        let names = names(&files);

        assert!(names.contains(&"keep.js".to_string()));
        assert!(!names.contains(&"skip.min.js".to_string()));
        assert!(!names.contains(&"gen.js".to_string()));
    }

    #[test]
    fn test_dialect_hint_for_discovered_files() {
        assert_eq!(
            dialect_hint(&PathBuf::from("x/Button.vue")),
            Some(Dialect::Vue)
        );
        assert_eq!(
            dialect_hint(&PathBuf::from("x/app.jsx")),
            Some(Dialect::JavaScript)
        );
    }
}
