//! RFC 8785 JSON Canonicalization Scheme, used before hashing or signing
//! any JSON payload (credentials, proofs, audit entries).

use serde::Serialize;
use trustmesh_core::{Error, Result};

/// Canonicalizes a serializable value into its JCS byte representation.
pub fn canonicalize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json_canonicalizer::to_vec(value)
        .map_err(|e| Error::MalformedInput(format!("JCS canonicalization failed: {e}")))
}

/// Canonicalizes and returns the result as a `String`.
pub fn canonicalize_string<T: Serialize>(value: &T) -> Result<String> {
    let bytes = canonicalize(value)?;
    String::from_utf8(bytes)
        .map_err(|e| Error::MalformedInput(format!("canonical JSON was not UTF-8: {e}")))
}
