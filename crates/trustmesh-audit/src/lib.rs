//! # TrustMesh Audit
//!
//! An append-only log of security-relevant events (credential issuance,
//! revocation, trust score recomputation, KMS key rotation). Every entry
//! is hash-chained to the one before it and signed, so tampering with or
//! truncating the log after the fact is detectable.

mod entry;
mod log;
mod signer;
mod storage;

pub use entry::{AuditEntry, EventKind};
pub use log::AuditLog;
pub use signer::AuditSigner;
pub use storage::{AuditStorage, FileAuditStorage, InMemoryAuditStorage};
