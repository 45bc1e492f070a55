//! Closed error taxonomy shared by every trustmesh component.
//!
//! Every fallible operation in the crate returns this one `Error` type so
//! callers can match on `ErrorKind` regardless of which component raised
//! it - a DID resolution timeout and a KMS timeout are reported the same
//! way.

use thiserror::Error;

/// The error type returned by all trustmesh operations.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Input could not be parsed into the shape the operation expects.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A DID string is not well-formed per the `did:<method>:<msid>` grammar.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// The DID method is not one of the four supported methods.
    #[error("unsupported DID method: {0}")]
    MethodNotSupported(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A downstream network call failed.
    #[error("network error: {0}")]
    NetworkError(String),

    /// An operation exceeded its deadline.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// An operation was cancelled before completion.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// A cryptographic signature did not verify.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A verifiable credential is missing required fields or violates the data model.
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// A credential's `expirationDate` has passed.
    #[error("credential expired at {0}")]
    Expired(String),

    /// A credential's `issuanceDate` is in the future.
    #[error("credential not yet valid until {0}")]
    NotYetValid(String),

    /// The credential issuer's DID could not be resolved.
    #[error("issuer not resolvable: {0}")]
    IssuerNotResolvable(String),

    /// No key was found for the requested verification method or purpose.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A key exists but is not authorized for the attempted purpose.
    #[error("key not authorized for purpose: {0}")]
    PurposeMismatch(String),

    /// The credential's status entry indicates revocation.
    #[error("credential revoked")]
    Revoked,

    /// The credential's status entry indicates suspension.
    #[error("credential suspended")]
    Suspended,

    /// A status list could not be fetched or decoded.
    #[error("status list unavailable: {0}")]
    StatusUnavailable(String),

    /// A status list has no remaining free indices.
    #[error("status list is full")]
    ListFull,

    /// A status list index is outside the list's bit length.
    #[error("status list index out of range: {0}")]
    IndexOutOfRange(usize),

    /// A status list credential failed structural or encoding validation.
    #[error("invalid status list: {0}")]
    InvalidStatusList(String),

    /// Persisted state (audit log, status list, keyring) failed an internal
    /// consistency check.
    #[error("corrupt state: {0}")]
    CorruptState(String),

    /// The configured KMS backend is unreachable or misconfigured.
    #[error("KMS unavailable: {0}")]
    KmsUnavailable(String),

    /// The caller is not authorized to perform the operation.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The audit log could not accept an append because another writer
    /// holds its append lock.
    #[error("audit log busy")]
    LogBusy,

    /// An error that does not fit any other variant; always carries context.
    #[error("internal error: {0}")]
    InternalError(String),
}

/// The discriminant of an [`Error`], without its message payload.
///
/// Verification pipelines collect these (not the full `Error`) when a
/// single check can legitimately fail in more than one way and every
/// failure should still be reported, not just the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [`Error::MalformedInput`].
    MalformedInput,
    /// See [`Error::InvalidDid`].
    InvalidDid,
    /// See [`Error::MethodNotSupported`].
    MethodNotSupported,
    /// See [`Error::NotFound`].
    NotFound,
    /// See [`Error::NetworkError`].
    NetworkError,
    /// See [`Error::Timeout`].
    Timeout,
    /// See [`Error::Cancelled`].
    Cancelled,
    /// See [`Error::InvalidSignature`].
    InvalidSignature,
    /// See [`Error::MalformedCredential`].
    MalformedCredential,
    /// See [`Error::Expired`].
    Expired,
    /// See [`Error::NotYetValid`].
    NotYetValid,
    /// See [`Error::IssuerNotResolvable`].
    IssuerNotResolvable,
    /// See [`Error::KeyNotFound`].
    KeyNotFound,
    /// See [`Error::PurposeMismatch`].
    PurposeMismatch,
    /// See [`Error::Revoked`].
    Revoked,
    /// See [`Error::Suspended`].
    Suspended,
    /// See [`Error::StatusUnavailable`].
    StatusUnavailable,
    /// See [`Error::ListFull`].
    ListFull,
    /// See [`Error::IndexOutOfRange`].
    IndexOutOfRange,
    /// See [`Error::InvalidStatusList`].
    InvalidStatusList,
    /// See [`Error::CorruptState`].
    CorruptState,
    /// See [`Error::KmsUnavailable`].
    KmsUnavailable,
    /// See [`Error::AccessDenied`].
    AccessDenied,
    /// See [`Error::LogBusy`].
    LogBusy,
    /// See [`Error::InternalError`].
    InternalError,
}

impl Error {
    /// Returns the discriminant of this error, for matching without
    /// consuming or allocating the message payload.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedInput(_) => ErrorKind::MalformedInput,
            Self::InvalidDid(_) => ErrorKind::InvalidDid,
            Self::MethodNotSupported(_) => ErrorKind::MethodNotSupported,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NetworkError(_) => ErrorKind::NetworkError,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::InvalidSignature(_) => ErrorKind::InvalidSignature,
            Self::MalformedCredential(_) => ErrorKind::MalformedCredential,
            Self::Expired(_) => ErrorKind::Expired,
            Self::NotYetValid(_) => ErrorKind::NotYetValid,
            Self::IssuerNotResolvable(_) => ErrorKind::IssuerNotResolvable,
            Self::KeyNotFound(_) => ErrorKind::KeyNotFound,
            Self::PurposeMismatch(_) => ErrorKind::PurposeMismatch,
            Self::Revoked => ErrorKind::Revoked,
            Self::Suspended => ErrorKind::Suspended,
            Self::StatusUnavailable(_) => ErrorKind::StatusUnavailable,
            Self::ListFull => ErrorKind::ListFull,
            Self::IndexOutOfRange(_) => ErrorKind::IndexOutOfRange,
            Self::InvalidStatusList(_) => ErrorKind::InvalidStatusList,
            Self::CorruptState(_) => ErrorKind::CorruptState,
            Self::KmsUnavailable(_) => ErrorKind::KmsUnavailable,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::LogBusy => ErrorKind::LogBusy,
            Self::InternalError(_) => ErrorKind::InternalError,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

/// Convenience for wrapping errors from crates that only expose
/// `std::error::Error`, without pulling `anyhow` into the public API.
pub fn internal<E: std::fmt::Display>(err: E) -> Error {
    Error::InternalError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = Error::KeyNotFound("did:key:z6Mk#0".into());
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    }

    #[test]
    fn unit_variants_have_stable_messages() {
        assert_eq!(Error::Revoked.to_string(), "credential revoked");
        assert_eq!(Error::LogBusy.to_string(), "audit log busy");
    }
}
