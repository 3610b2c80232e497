//! Repository scan orchestration with Rayon-based parallelism.
//!
//! Workers read and parse one file each and hand back an independent result;
//! only the coordinating thread touches the [`RepositoryModel`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{ScanConfig, MAX_CONCURRENT_PARSES};
use crate::errors::{ExtractError, ExtractResult};
use crate::indexer::filesystem::{discover_files, relative_path};
use crate::indexer::idl::try_parse_interface_definitions;
use crate::indexer::routing::{try_parse_routing_config, RoutingConfig};
use crate::indexer::unit::try_parse_unit;
use crate::models::{RemoteInterface, RepositoryModel, ScanFailure, TypeDeclaration};

/// Counts parses in flight and remembers the highest count observed.
#[derive(Debug, Default)]
pub struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

pub struct InFlightSlot<'a> {
    gauge: &'a InFlightGauge,
}

impl InFlightGauge {
    pub fn enter(&self) -> InFlightSlot<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightSlot { gauge: self }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

struct ScanContext<'a> {
    repo_root: &'a Path,
    config: &'a ScanConfig,
    gauge: InFlightGauge,
}

impl ScanContext<'_> {
    /// Read a file for parsing; invalid UTF-8 is replaced, not rejected.
    fn read(&self, path: &Path) -> ExtractResult<(String, String)> {
        let rel = relative_path(self.repo_root, path);
        if self.config.is_cancelled() {
            return Err(ExtractError::Cancelled { path: rel });
        }
        match std::fs::read(path) {
            Ok(bytes) => Ok((rel, String::from_utf8_lossy(&bytes).into_owned())),
            Err(source) => Err(ExtractError::UnreadableFile { path: rel, source }),
        }
    }

    fn parse_source_worker(&self, path: &Path) -> ExtractResult<TypeDeclaration> {
        let _slot = self.gauge.enter();
        let (rel, text) = self.read(path)?;
        try_parse_unit(&text, &rel)
    }

    fn parse_routing_worker(&self, path: &Path) -> ExtractResult<RoutingConfig> {
        let _slot = self.gauge.enter();
        let (rel, text) = self.read(path)?;
        try_parse_routing_config(&text, &rel)
    }

    fn parse_idl_worker(&self, path: &Path) -> ExtractResult<Vec<RemoteInterface>> {
        let _slot = self.gauge.enter();
        let (rel, text) = self.read(path)?;
        try_parse_interface_definitions(&text, &rel)
    }
}

/// Map `f` over `paths` on the pool, or sequentially when no pool could be built.
/// Output order matches input order.
fn parallel_map<R, F>(pool: Option<&rayon::ThreadPool>, paths: &[PathBuf], f: F) -> Vec<R>
where
    R: Send,
    F: Fn(&Path) -> R + Sync + Send,
{
    match pool {
        Some(pool) => pool.install(|| paths.par_iter().map(|p| f(p.as_path())).collect()),
        None => paths.iter().map(|p| f(p.as_path())).collect(),
    }
}

fn record_failure(model: &mut RepositoryModel, err: ExtractError) {
    match &err {
        ExtractError::UnparsableUnit { .. } | ExtractError::Cancelled { .. } => debug!("{err}"),
        _ => warn!("{err}"),
    }
    model.failures.push(ScanFailure {
        path: err.path().to_string(),
        kind: err.kind(),
        message: err.to_string(),
    });
}

/// Scan a repository and aggregate everything the parsers extract.
///
/// Never fails: unreadable or unparsable files are logged, listed in
/// [`RepositoryModel::failures`] and left out of the aggregate.
pub fn scan_repository(repo_root: &Path, config: &ScanConfig) -> RepositoryModel {
    let started = Instant::now();
    info!("Scanning repository: {}", repo_root.display());

    let files = discover_files(repo_root, config);
    let ctx = ScanContext {
        repo_root,
        config,
        gauge: InFlightGauge::default(),
    };

    if config.is_limit_clamped() {
        debug!(
            "Parse limit {} is outside 1..={MAX_CONCURRENT_PARSES}; using {} workers",
            config.max_concurrent_parses,
            config.worker_count()
        );
    }
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .build()
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!("Failed to build parse pool, parsing sequentially: {e}");
            None
        }
    };

    let unit_results = parallel_map(pool.as_ref(), &files.source_units, |p| {
        ctx.parse_source_worker(p)
    });
    let routing_results = parallel_map(pool.as_ref(), &files.routing_configs, |p| {
        ctx.parse_routing_worker(p)
    });
    let idl_results = parallel_map(pool.as_ref(), &files.interface_definitions, |p| {
        ctx.parse_idl_worker(p)
    });

    let mut model = RepositoryModel::default();

    for result in unit_results {
        match result {
            Ok(declaration) => {
                if let Some(previous) = model
                    .classes_by_qualified_name
                    .insert(declaration.qualified_name.clone(), declaration)
                {
                    debug!(
                        "Qualified name {} declared again; replacing {}",
                        previous.qualified_name, previous.source_path
                    );
                }
            }
            Err(e) => record_failure(&mut model, e),
        }
    }

    for result in routing_results {
        match result {
            Ok(routing) => {
                debug!(
                    "Merging {} route mappings and {} form beans",
                    routing.mappings.len(),
                    routing.form_beans.len()
                );
                for mapping in routing.mappings {
                    model.route_mappings_by_path.insert(mapping.path.clone(), mapping);
                }
                for bean in routing.form_beans {
                    model.form_beans_by_name.insert(bean.name.clone(), bean);
                }
                model.global_forwards.extend(routing.global_forwards);
            }
            Err(e) => record_failure(&mut model, e),
        }
    }

    for result in idl_results {
        match result {
            Ok(interfaces) => {
                for interface in interfaces {
                    model
                        .remote_interfaces_by_name
                        .insert(interface.name.clone(), interface);
                }
            }
            Err(e) => record_failure(&mut model, e),
        }
    }

    model.statistics.total_files_seen = files.total();
    model.statistics.source_units_seen = files.source_units.len();
    model.statistics.config_documents_seen = files.routing_configs.len();
    model.statistics.interface_documents_seen = files.interface_definitions.len();
    model.statistics.peak_concurrent_parses = ctx.gauge.peak();
    model.recompute_class_statistics();

    info!(
        "Parsed repository {}: {} source files, {} classes, {} action handlers, {} remote servants, {} skipped in {} ms",
        repo_root.display(),
        model.statistics.source_units_seen,
        model.classes_by_qualified_name.len(),
        model.statistics.action_handler_count,
        model.statistics.remote_servant_count,
        model.statistics.skipped_files,
        started.elapsed().as_millis()
    );

    model
}
