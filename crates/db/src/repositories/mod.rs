//! Repository layer: stateless structs of queries over the pool.

pub mod annotation_repo;
pub mod stats_repo;

pub use annotation_repo::AnnotationRepo;
pub use stats_repo::StatsRepo;
