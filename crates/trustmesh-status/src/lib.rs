//! # TrustMesh Status
//!
//! Storage and allocation for Status List 2021 credentials. Builds on
//! [`trustmesh_credential::StatusList`], adding a persistence trait and a
//! [`StatusResolver`](trustmesh_credential::StatusResolver) implementation
//! that a verifier can plug in directly.

mod manager;
mod resolver;
mod storage;

pub use manager::StatusListManager;
pub use resolver::CachingStatusResolver;
pub use storage::{FilesystemStorage, InMemoryStorage, StatusListStorage};
