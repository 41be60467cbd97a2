//! Visitor fingerprinting.
//!
//! The fingerprint is the only identity signal in the system: an ordered
//! pair of nullable strings taken straight from request headers. It is
//! recomputed on every request and never persisted; the deterministic
//! selector substitutes for any stored assignment.

use hyper::HeaderMap;
use serde::Deserialize;

fn default_client_ip_header() -> String {
    "x-client-ip".to_string()
}

fn default_region_code_header() -> String {
    "x-region-code".to_string()
}

/// Header names the fingerprint is read from.
///
/// String-typed so each deployment can match whatever its edge proxy sets,
/// without code changes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FingerprintConfig {
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,
    #[serde(default = "default_region_code_header")]
    pub region_code_header: String,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            client_ip_header: default_client_ip_header(),
            region_code_header: default_region_code_header(),
        }
    }
}

/// Ordered (client address, coarse region code) pair. Order matters: it
/// feeds the canonical serialization that gets hashed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fingerprint {
    client_ip: Option<String>,
    region_code: Option<String>,
}

impl Fingerprint {
    pub fn new(client_ip: Option<String>, region_code: Option<String>) -> Self {
        Self {
            client_ip,
            region_code,
        }
    }

    /// Read both signals from the request headers. Absent or non-UTF-8
    /// values pass through as `None`; no validation is applied.
    pub fn from_headers(headers: &HeaderMap, config: &FingerprintConfig) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        Self::new(
            read(&config.client_ip_header),
            read(&config.region_code_header),
        )
    }

    /// Canonical form: a compact JSON array of the two elements, nulls
    /// rendered literally. This exact byte sequence is what gets hashed, so
    /// it must never change shape.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&[&self.client_ip, &self.region_code])
    }
}
