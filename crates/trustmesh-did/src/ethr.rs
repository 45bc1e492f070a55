//! `did:ethr` - an Ethereum address used directly as a DID, with an
//! optional `<chainId>:` network segment (`did:ethr:0x1:0xabc...`, chain
//! id defaults to `1` for mainnet).
//!
//! Without a connection to the `EthereumDIDRegistry` contract this
//! resolver cannot discover delegate or attribute changes, so it produces
//! the synthetic document the method's spec defines as the default: a
//! single `EcdsaSecp256k1RecoveryMethod2020` over the address itself,
//! good for both authentication and assertion.
//!
//! <https://github.com/decentralized-identity/ethr-did-resolver>

use trustmesh_core::{Error, Result};

use crate::document::{Document, MethodType, PublicKeyFormat, VerificationMethod, DID_CONTEXT};
use crate::method::{Did, Method};
use crate::resolver::DidResolver;

const DEFAULT_CHAIN_ID: &str = "1";

/// Resolver for `did:ethr` identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct EthrResolver;

impl DidResolver for EthrResolver {
    async fn resolve(&self, did: &str) -> Result<Document> {
        let parsed: Did = did.parse()?;
        if parsed.method != Method::Ethr {
            return Err(Error::MethodNotSupported(parsed.method.to_string()));
        }
        let (chain_id, address) = split_network(&parsed.msid)?;
        validate_checksum(address)?;

        let did = format!("did:ethr:{}", parsed.msid);
        let vm_id = format!("{did}#controller");
        let vm = VerificationMethod {
            id: vm_id.clone(),
            type_: MethodType::EcdsaSecp256k1RecoveryMethod2020,
            controller: did.clone(),
            key: PublicKeyFormat::BlockchainAccountId {
                blockchain_account_id: format!("eip155:{chain_id}:{address}"),
            },
        };

        Ok(Document {
            context: vec![trustmesh_core::Kind::String(DID_CONTEXT.to_string())],
            id: did,
            verification_method: Some(vec![vm]),
            authentication: Some(vec![trustmesh_core::Kind::String(vm_id.clone())]),
            assertion_method: Some(vec![trustmesh_core::Kind::String(vm_id)]),
            ..Document::default()
        })
    }
}

fn split_network(msid: &str) -> Result<(&str, &str)> {
    match msid.rsplit_once(':') {
        Some((chain_id, address)) => Ok((chain_id, address)),
        None => Ok((DEFAULT_CHAIN_ID, msid)),
    }
}

/// Validates that `address` is a 20-byte hex address with a correct EIP-55
/// mixed-case checksum, when it uses mixed case at all (an all-lowercase
/// or all-uppercase address is accepted unchecksummed, per EIP-55).
fn validate_checksum(address: &str) -> Result<()> {
    let hex = address.strip_prefix("0x").ok_or_else(|| {
        Error::InvalidDid(format!("did:ethr address must start with 0x: {address}"))
    })?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidDid(format!("did:ethr address must be 20 bytes of hex: {address}")));
    }
    if hex == hex.to_lowercase() || hex == hex.to_uppercase() {
        return Ok(());
    }
    let expected = eip55_checksum(&hex.to_lowercase());
    if expected != hex {
        return Err(Error::InvalidDid(format!("did:ethr address fails EIP-55 checksum: {address}")));
    }
    Ok(())
}

fn eip55_checksum(lowercase_hex: &str) -> String {
    let hash = trustmesh_crypto::keccak256(lowercase_hex.as_bytes());
    let mut out = String::with_capacity(40);
    for (i, c) in lowercase_hex.chars().enumerate() {
        if c.is_ascii_digit() {
            out.push(c);
            continue;
        }
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_default_chain() {
        let doc = EthrResolver.resolve("did:ethr:0x0000000000000000000000000000000000000000").await.unwrap();
        assert_eq!(doc.id, "did:ethr:0x0000000000000000000000000000000000000000");
    }

    #[tokio::test]
    async fn resolves_explicit_chain() {
        let doc =
            EthrResolver.resolve("did:ethr:0x5:0x0000000000000000000000000000000000000000").await.unwrap();
        let vm = doc.verification_method.unwrap().remove(0);
        assert!(matches!(vm.key, PublicKeyFormat::BlockchainAccountId { blockchain_account_id } if blockchain_account_id == "eip155:0x5:0x0000000000000000000000000000000000000000"));
    }

    #[tokio::test]
    async fn rejects_bad_checksum() {
        // Mixed-case address with an intentionally wrong case pattern.
        let err = EthrResolver.resolve("did:ethr:0xAbCdefabcdefabcdefabcdefabcdefabcdefabcd").await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn rejects_short_address() {
        assert!(EthrResolver.resolve("did:ethr:0x1234").await.is_err());
    }
}
