//! Scan configuration and its bounds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_MAX_CONCURRENT_PARSES: usize = 10;
pub const MAX_CONCURRENT_PARSES: usize = 256;

pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["java"];
pub const DEFAULT_CONFIG_FILE_STEM: &str = "struts-config";
pub const DEFAULT_INTERFACE_EXTENSION: &str = "idl";
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[".git", ".svn", "target", "node_modules"];

pub fn clamp_int(value: usize, minimum: usize, maximum: usize) -> usize {
    value.max(minimum).min(maximum)
}

/// Plain-value configuration for one repository scan.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Size of the parse worker pool; the only concurrency control.
    pub max_concurrent_parses: usize,
    /// Extensions (without the dot, lowercase) of Java source units.
    pub source_extensions: Vec<String>,
    /// Routing documents are `<stem>*.xml`.
    pub config_file_stem: String,
    pub interface_extension: String,
    /// Directory names never descended into.
    pub ignored_dirs: Vec<String>,
    /// When set, files not yet started are skipped as cancelled.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrent_parses: DEFAULT_MAX_CONCURRENT_PARSES,
            source_extensions: DEFAULT_SOURCE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            config_file_stem: DEFAULT_CONFIG_FILE_STEM.to_string(),
            interface_extension: DEFAULT_INTERFACE_EXTENSION.to_string(),
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            cancel: None,
        }
    }
}

impl ScanConfig {
    pub fn with_max_concurrent_parses(mut self, limit: usize) -> Self {
        self.max_concurrent_parses = limit;
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Pool size actually used: at least one worker, at most [`MAX_CONCURRENT_PARSES`].
    pub fn worker_count(&self) -> usize {
        clamp_int(self.max_concurrent_parses, 1, MAX_CONCURRENT_PARSES)
    }

    /// Whether the requested limit had to be clamped to fit the pool bounds.
    pub fn is_limit_clamped(&self) -> bool {
        self.worker_count() != self.max_concurrent_parses
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
