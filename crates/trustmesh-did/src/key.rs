//! `did:key` - a self-certifying method that encodes the subject's public
//! key directly in the identifier. Resolution never touches the network.

use trustmesh_core::{Error, Result};
use trustmesh_crypto::{ED25519_CODEC, SECP256K1_CODEC};

use crate::document::{Document, MethodType, PublicKeyFormat, VerificationMethod, DID_CONTEXT};
use crate::method::{Did, Method};
use crate::resolver::DidResolver;

/// Resolver for `did:key` identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyResolver;

impl DidResolver for KeyResolver {
    async fn resolve(&self, did: &str) -> Result<Document> {
        let parsed: Did = did.parse()?;
        if parsed.method != Method::Key {
            return Err(Error::MethodNotSupported(parsed.method.to_string()));
        }
        build_document(&parsed.msid)
    }
}

fn build_document(multibase_key: &str) -> Result<Document> {
    let (_, bytes) = multibase::decode(multibase_key)
        .map_err(|e| Error::InvalidDid(format!("not a valid multibase did:key: {e}")))?;
    if bytes.len() < 2 {
        return Err(Error::InvalidDid("did:key public key too short".into()));
    }
    let prefix = [bytes[0], bytes[1]];
    let type_ = match prefix {
        ED25519_CODEC => MethodType::Ed25519VerificationKey2020,
        SECP256K1_CODEC => MethodType::EcdsaSecp256k1VerificationKey2019,
        _ => return Err(Error::InvalidDid(format!("unsupported did:key multicodec prefix {prefix:?}"))),
    };

    let did = format!("did:key:{multibase_key}");
    let vm_id = format!("{did}#{multibase_key}");
    let vm = VerificationMethod {
        id: vm_id.clone(),
        type_,
        controller: did.clone(),
        key: PublicKeyFormat::PublicKeyMultibase { public_key_multibase: multibase_key.to_string() },
    };

    Ok(Document {
        context: vec![trustmesh_core::Kind::String(DID_CONTEXT.to_string())],
        id: did,
        verification_method: Some(vec![vm]),
        authentication: Some(vec![trustmesh_core::Kind::String(vm_id.clone())]),
        assertion_method: Some(vec![trustmesh_core::Kind::String(vm_id.clone())]),
        capability_invocation: Some(vec![trustmesh_core::Kind::String(vm_id.clone())]),
        capability_delegation: Some(vec![trustmesh_core::Kind::String(vm_id)]),
        ..Document::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustmesh_crypto::SigningKey;

    fn sample_did_key() -> String {
        let key = SigningKey::generate_ed25519();
        let mut bytes = ED25519_CODEC.to_vec();
        bytes.extend_from_slice(&key.verifying_key_bytes());
        let multibase = multibase::encode(multibase::Base::Base58Btc, &bytes);
        format!("did:key:{multibase}")
    }

    #[tokio::test]
    async fn resolves_self_certifying_document() {
        let did = sample_did_key();
        let doc = KeyResolver.resolve(&did).await.unwrap();
        assert_eq!(doc.id, did);
        assert!(doc.authorizes_assertion(&format!("{did}#{}", did.trim_start_matches("did:key:"))));
        let vm = &doc.verification_method.unwrap()[0];
        assert_eq!(vm.type_, MethodType::Ed25519VerificationKey2020);
    }

    #[tokio::test]
    async fn rejects_non_key_method() {
        assert!(KeyResolver.resolve("did:web:example.com").await.is_err());
    }

    #[tokio::test]
    async fn rejects_malformed_multibase() {
        assert!(KeyResolver.resolve("did:key:not-multibase!!").await.is_err());
    }
}
