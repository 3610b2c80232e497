//! Read-only views over a finished [`crate::models::RepositoryModel`].

pub mod relations;
pub mod signatures;
