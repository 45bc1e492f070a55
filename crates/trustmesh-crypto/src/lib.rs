//! # TrustMesh Crypto
//!
//! Canonicalization (RFC 8785 JCS), hashing, and the two signature
//! algorithms trustmesh keys speak: Ed25519 and secp256k1. Every other
//! trustmesh crate that signs or verifies something goes through here
//! rather than reaching for a signature crate directly.

mod canon;
mod digest;
mod keypair;

pub use canon::{canonicalize, canonicalize_string};
pub use digest::{keccak256, sha256, sha256_hex};
pub use keypair::{verify, Algorithm, SigningKey, ED25519_CODEC, SECP256K1_CODEC};
