//! Device metadata sent with a signup
//!
//! These values are placeholders the backend stores as-is. The fingerprint
//! is a SHA-256 digest of host, OS and architecture; it is stable for one
//! machine and nothing more.

use sha2::{Digest, Sha256};

use crate::adapters::http::lookup_public_ip;
use crate::domain::DeviceMetadata;

pub const UNKNOWN_IP: &str = "unknown";

pub fn fingerprint(host: &str, os: &str, arch: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(host.as_bytes());
    hasher.update(b"|");
    hasher.update(os.as_bytes());
    hasher.update(b"|");
    hasher.update(arch.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn user_agent() -> String {
    format!(
        "rewards-cli/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

fn host_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "localhost".to_string())
}

/// Collect metadata for this machine
///
/// With no lookup URL, or when the lookup fails, the IP is `"unknown"`.
pub fn collect(ip_lookup_url: Option<&str>) -> DeviceMetadata {
    let ip_address = ip_lookup_url
        .and_then(lookup_public_ip)
        .unwrap_or_else(|| UNKNOWN_IP.to_string());

    DeviceMetadata {
        device_fingerprint: fingerprint(
            &host_name(),
            std::env::consts::OS,
            std::env::consts::ARCH,
        ),
        ip_address,
        user_agent: user_agent(),
    }
}
