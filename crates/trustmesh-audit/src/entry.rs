//! The shape of a single audit log entry and the events it can record.

use serde::{Deserialize, Serialize};

/// A security-relevant event worth recording permanently.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventKind {
    /// A credential was issued.
    CredentialIssued {
        /// The issued credential's id.
        credential_id: String,
        /// The issuing DID.
        issuer: String,
    },
    /// A credential's status bit was flagged as revoked.
    CredentialRevoked {
        /// The credential's status list entry id.
        status_entry_id: String,
        /// The status list credential the bit lives in.
        status_list_credential: String,
        /// The bit's index within the list.
        status_list_index: usize,
    },
    /// A credential's status bit was flagged as suspended, or a prior
    /// suspension was lifted.
    CredentialSuspended {
        /// The credential's status list entry id.
        status_entry_id: String,
        /// The status list credential the bit lives in.
        status_list_credential: String,
        /// The bit's index within the list.
        status_list_index: usize,
        /// `true` if this event suspended the credential, `false` if it
        /// lifted a prior suspension.
        suspended: bool,
    },
    /// A signing key was generated in a KMS backend.
    KeyGenerated {
        /// The key's id within its KMS backend.
        key_id: String,
    },
    /// A trust score was computed or recomputed for a subject.
    TrustScoreRecomputed {
        /// The DID the score describes.
        subject: String,
        /// The resulting composite score.
        score: f64,
    },
    /// A caller-supplied event that does not fit a built-in kind.
    Custom {
        /// A short, stable name for the event.
        name: String,
        /// Arbitrary event-specific detail.
        detail: serde_json::Value,
    },
    /// An operation failed. Recorded so that no error path mutates (or
    /// attempts to mutate) trust state without leaving a corresponding
    /// entry behind.
    OperationFailed {
        /// The operation that failed, e.g. `"issue_trust_declaration"`.
        operation: String,
        /// The error's display message.
        reason: String,
    },
}

/// A single entry in the hash-chained audit log.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Monotonically increasing position in the log, starting at 1.
    pub sequence: u64,
    /// When the event was recorded, RFC 3339.
    pub timestamp: String,
    /// The event itself.
    pub event: EventKind,
    /// Hex-encoded SHA-256 hash of the previous entry, or 32 zero bytes
    /// for the first entry in the log.
    pub prev_hash: String,
    /// Hex-encoded SHA-256 hash of this entry's signing payload.
    pub hash: String,
    /// The DID of the identity that signed this entry.
    pub signer: String,
    /// Base64url (unpadded) detached signature over `hash`.
    pub signature: String,
}

impl AuditEntry {
    /// The all-zero hash used as the previous-hash of the first entry.
    #[must_use]
    pub fn genesis_hash() -> String {
        "0".repeat(64)
    }
}
