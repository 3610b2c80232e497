//! Relic core library: structural extraction for legacy Java web applications.
//!
//! This crate walks a repository and builds an in-memory model of its Java
//! source units, Struts-style routing documents and CORBA IDL interface
//! definitions.  Extraction is heuristic and pattern-based; no file is ever
//! compiled or type-checked.  Parsing fans out over a bounded rayon pool and
//! per-file failures are recorded on the model instead of aborting the scan.

pub mod config;
pub mod errors;
pub mod indexer;
pub mod models;
pub mod query;

pub use config::ScanConfig;
pub use errors::{ExtractError, ExtractResult, FailureKind};
pub use indexer::pipeline::scan_repository;
pub use models::RepositoryModel;
