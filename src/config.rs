//! Process configuration. Read from the environment once at startup,
//! immutable for the process lifetime.

use std::time::Duration;

pub const DEFAULT_MAX_RESOURCE_BYTES: u64 = 15 * 1024 * 1024;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_BLOCKED_HOSTS: &str = "pornhub.com,xnxx.com";

pub struct Config {
    /// Substrings matched by containment against candidate hostnames.
    pub blocked_hosts: Vec<String>,
    /// Byte ceiling for relayed resources.
    pub max_resource_bytes: u64,
    /// Wall-clock bound on every upstream fetch.
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let blocked = std::env::var("FRAMEGATE_BLOCKED_HOSTS")
            .unwrap_or_else(|_| DEFAULT_BLOCKED_HOSTS.into());
        let max_resource_bytes = std::env::var("FRAMEGATE_MAX_RESOURCE_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RESOURCE_BYTES);
        let timeout_ms = std::env::var("FRAMEGATE_FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_MS);

        Self {
            blocked_hosts: parse_host_list(&blocked),
            max_resource_bytes,
            fetch_timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Substring containment, matching the original blocklist semantics.
    /// This both over-blocks (a benign host containing an entry) and
    /// under-protects (no suffix anchoring) — a known policy quirk kept
    /// pending product confirmation, not a bug to silently fix.
    pub fn host_blocked(&self, hostname: &str) -> bool {
        self.blocked_hosts.iter().any(|h| hostname.contains(h.as_str()))
    }
}

/// Split a comma-separated host list, dropping empty entries.
pub fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
