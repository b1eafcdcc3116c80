//! `authmap-linkage` — name canonicalization and record linkage for local
//! authority datasets.
//!
//! Engine crate: receives delimited source text, returns authority clusters
//! and the inferred type alias table. Rendering helpers produce strings; the
//! CLI owns files and processes.

pub mod alias;
pub mod classify;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod load;
pub mod model;
pub mod normalize;
pub mod report;

pub use alias::resolve_types;
pub use cluster::build_clusters;
pub use config::LinkageConfig;
pub use engine::link;
pub use error::LinkageError;
pub use model::{AuthorityCluster, ClusterMap, Dataset, LinkageResult, Record, TypeAliasTable};
pub use normalize::normalize;
