//! Question module: three-layer architecture (domain, repository, service).
//!
//! Every service operation runs in exactly one storage transaction which the
//! service commits on success and rolls back on failure.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::QuestionService;
