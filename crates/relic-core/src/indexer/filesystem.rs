//! Filesystem scanning helpers for extraction passes.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::ScanConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileCategory {
    SourceUnit,
    RoutingConfig,
    InterfaceDefinition,
}

/// Files found under a repository root, grouped by category, each in walk order.
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    pub source_units: Vec<PathBuf>,
    pub routing_configs: Vec<PathBuf>,
    pub interface_definitions: Vec<PathBuf>,
}

impl DiscoveredFiles {
    pub fn total(&self) -> usize {
        self.source_units.len() + self.routing_configs.len() + self.interface_definitions.len()
    }
}

/// Category of a file by name, or `None` if the scan does not read it.
pub fn detect_category(path: &Path, config: &ScanConfig) -> Option<FileCategory> {
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    if config.source_extensions.iter().any(|e| *e == ext) {
        return Some(FileCategory::SourceUnit);
    }
    if ext == config.interface_extension {
        return Some(FileCategory::InterfaceDefinition);
    }
    if ext == "xml" {
        let name = path.file_name()?.to_string_lossy();
        if name.starts_with(config.config_file_stem.as_str()) {
            return Some(FileCategory::RoutingConfig);
        }
    }
    None
}

/// Walk `repo_root` recursively, skipping ignored directories.
///
/// Symlinks are not followed but are still reported, so a dangling link
/// surfaces later as an unreadable file instead of vanishing silently.
pub fn discover_files(repo_root: &Path, config: &ScanConfig) -> DiscoveredFiles {
    let mut found = DiscoveredFiles::default();
    let walker = WalkDir::new(repo_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !config
                    .ignored_dirs
                    .iter()
                    .any(|d| entry.file_name().to_string_lossy() == d.as_str())
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        match detect_category(entry.path(), config) {
            Some(FileCategory::SourceUnit) => found.source_units.push(entry.into_path()),
            Some(FileCategory::RoutingConfig) => found.routing_configs.push(entry.into_path()),
            Some(FileCategory::InterfaceDefinition) => {
                found.interface_definitions.push(entry.into_path())
            }
            None => {}
        }
    }
    found
}

/// Path relative to the repository root with forward slashes.
pub fn relative_path(repo_root: &Path, path: &Path) -> String {
    path.strip_prefix(repo_root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_detect_category() {
        let config = ScanConfig::default();
        let cases = [
            ("src/com/acme/Login.java", Some(FileCategory::SourceUnit)),
            ("src/com/acme/Login.JAVA", Some(FileCategory::SourceUnit)),
            ("WEB-INF/struts-config.xml", Some(FileCategory::RoutingConfig)),
            ("WEB-INF/struts-config-admin.xml", Some(FileCategory::RoutingConfig)),
            ("WEB-INF/web.xml", None),
            ("idl/bank.idl", Some(FileCategory::InterfaceDefinition)),
            ("README", None),
        ];
        for (path, expected) in cases {
            assert_eq!(detect_category(Path::new(path), &config), expected, "{path}");
        }
    }

    #[test]
    fn test_discover_files_groups_and_skips_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/com/acme")).unwrap();
        fs::create_dir_all(root.join("WEB-INF")).unwrap();
        fs::create_dir_all(root.join("target/classes")).unwrap();
        fs::write(root.join("src/com/acme/B.java"), "class B {}").unwrap();
        fs::write(root.join("src/com/acme/A.java"), "class A {}").unwrap();
        fs::write(root.join("target/classes/Gen.java"), "class Gen {}").unwrap();
        fs::write(root.join("WEB-INF/struts-config.xml"), "<struts-config/>").unwrap();
        fs::write(root.join("bank.idl"), "module M {};").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let found = discover_files(root, &ScanConfig::default());
        let units: Vec<String> = found
            .source_units
            .iter()
            .map(|p| relative_path(root, p))
            .collect();
        assert_eq!(units, vec!["src/com/acme/A.java", "src/com/acme/B.java"]);
        assert_eq!(found.routing_configs.len(), 1);
        assert_eq!(found.interface_definitions.len(), 1);
        assert_eq!(found.total(), 4);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/repo"), Path::new("/repo/src/A.java")),
            "src/A.java"
        );
        assert_eq!(relative_path(Path::new("/other"), Path::new("/repo/A.java")), "/repo/A.java");
    }
}
