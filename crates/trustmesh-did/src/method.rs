//! DID method identifiers and the `did:<method>:<msid>` string grammar.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use trustmesh_core::{Error, Result};

/// The four DID methods trustmesh resolves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `did:key` - self-certifying, no network resolution.
    #[default]
    Key,
    /// `did:web` - resolved from a `.well-known/did.json` over HTTPS.
    Web,
    /// `did:ethr` - an Ethereum address, optionally with a registry change log.
    Ethr,
    /// `did:ion` - a Sidetree-anchored DID, resolved via a configured node.
    Ion,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "key" => Ok(Self::Key),
            "web" => Ok(Self::Web),
            "ethr" => Ok(Self::Ethr),
            "ion" => Ok(Self::Ion),
            other => Err(Error::MethodNotSupported(other.to_string())),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => write!(f, "key"),
            Self::Web => write!(f, "web"),
            Self::Ethr => write!(f, "ethr"),
            Self::Ion => write!(f, "ion"),
        }
    }
}

/// A parsed `did:<method>:<method-specific-id>` string, with an optional
/// `#fragment` identifying a specific resource within the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Did {
    /// The resolution method.
    pub method: Method,
    /// The method-specific identifier (everything between the second and
    /// third colon-delimited segment and any fragment).
    pub msid: String,
    /// The DID URL fragment, if present.
    pub fragment: Option<String>,
}

impl Did {
    /// The DID without its fragment, e.g. `did:key:z6Mk...`.
    #[must_use]
    pub fn did(&self) -> String {
        format!("did:{}:{}", self.method, self.msid)
    }

    /// The full DID URL, including fragment if present.
    #[must_use]
    pub fn to_url(&self) -> String {
        match &self.fragment {
            Some(f) => format!("{}#{f}", self.did()),
            None => self.did(),
        }
    }
}

impl FromStr for Did {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (without_fragment, fragment) = match s.split_once('#') {
            Some((head, frag)) => (head, Some(frag.to_string())),
            None => (s, None),
        };
        let mut parts = without_fragment.splitn(3, ':');
        let scheme = parts.next().ok_or_else(|| Error::InvalidDid(s.to_string()))?;
        if scheme != "did" {
            return Err(Error::InvalidDid(s.to_string()));
        }
        let method_str = parts.next().ok_or_else(|| Error::InvalidDid(s.to_string()))?;
        let msid = parts.next().ok_or_else(|| Error::InvalidDid(s.to_string()))?;
        if msid.is_empty() {
            return Err(Error::InvalidDid(s.to_string()));
        }
        Ok(Self { method: Method::from_str(method_str)?, msid: msid.to_string(), fragment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_did_web_with_fragment() {
        let did: Did = "did:web:example.com#key-1".parse().unwrap();
        assert_eq!(did.method, Method::Web);
        assert_eq!(did.msid, "example.com");
        assert_eq!(did.fragment.as_deref(), Some("key-1"));
        assert_eq!(did.did(), "did:web:example.com");
    }

    #[test]
    fn rejects_non_did_scheme() {
        assert!("https:web:example.com".parse::<Did>().is_err());
    }

    #[test]
    fn rejects_unsupported_method() {
        let err = "did:pkh:eip155:1".parse::<Did>().unwrap_err();
        assert_eq!(err.kind(), trustmesh_core::ErrorKind::MethodNotSupported);
    }

    #[test]
    fn rejects_empty_msid() {
        assert!("did:web:".parse::<Did>().is_err());
    }
}
