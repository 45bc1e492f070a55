//! Mapping between [`Algorithm`] and the JOSE `alg` / Data Integrity
//! `cryptosuite` names trustmesh's proofs carry.

use trustmesh_core::{Error, Result};
use trustmesh_crypto::Algorithm;

/// The JOSE `alg` header value for `algorithm`.
#[must_use]
pub const fn jose_alg(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::EdDsa => "EdDSA",
        Algorithm::Es256k => "ES256K",
    }
}

/// The Data Integrity `cryptosuite` name for `algorithm`.
#[must_use]
pub const fn cryptosuite(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::EdDsa => "eddsa-jcs-2022",
        Algorithm::Es256k => "ecdsa-jcs-2019",
    }
}

/// Recovers the [`Algorithm`] a `cryptosuite` name refers to.
pub fn algorithm_for_cryptosuite(cryptosuite: &str) -> Result<Algorithm> {
    match cryptosuite {
        "eddsa-jcs-2022" => Ok(Algorithm::EdDsa),
        "ecdsa-jcs-2019" => Ok(Algorithm::Es256k),
        other => Err(Error::MalformedCredential(format!("unsupported cryptosuite: {other}"))),
    }
}
