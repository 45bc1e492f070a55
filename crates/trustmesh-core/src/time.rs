//! Timestamp helpers shared by the credential, status and audit crates.
//!
//! Centralizing this avoids three different "is this RFC 3339 string in the
//! past" implementations drifting out of sync.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Parses an RFC 3339 timestamp, as used by `issuanceDate`/`expirationDate`
/// and audit log entries.
pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::MalformedInput(format!("invalid RFC 3339 timestamp {value}: {e}")))
}

/// Formats a timestamp the way trustmesh writes it out: RFC 3339 with a
/// `Z` suffix, no fractional seconds.
#[must_use]
pub fn to_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips() {
        let s = "2026-07-26T00:00:00Z";
        let dt = parse_rfc3339(s).unwrap();
        assert_eq!(to_rfc3339(dt), s);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_rfc3339("not a date").is_err());
    }
}
