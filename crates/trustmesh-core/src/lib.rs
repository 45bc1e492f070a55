//! # TrustMesh Core
//!
//! Shared pieces used by every other `trustmesh-*` crate: the closed error
//! taxonomy all components report through, and the `Kind`/`OneMany` serde
//! helpers the W3C data model needs for its string-or-object and
//! one-or-many fields.
//!
//! Keeping these in one crate means the error taxonomy and JSON shapes
//! cannot fork between the issuer, the verifier, and the audit log - a
//! fork here would be a correctness hazard, not just an inconsistency.

mod error;
mod kind;
pub mod retry;
pub mod time;

pub use error::{internal, Error, ErrorKind};
pub use kind::{Kind, OneMany};

/// Result alias used throughout the trustmesh crates.
pub type Result<T> = std::result::Result<T, Error>;
