//! Server configuration parsed from environment variables.
//!
//! Required:
//! - `IDENTITY_URL`: identity service base URL
//!
//! Optional:
//! - `PORT`: default 3000
//! - `SITE_DIR`: static bundle directory, default `site`
//! - `SESSION_COOKIE`: default `session_token`
//! - `PROTECTED_PREFIXES`: comma list, default `/dashboard,/admin`
//! - `COOKIE_SECURE`: bool; inferred from an `https://` `PUBLIC_URL` when unset
//! - `IDENTITY_TIMEOUT_SECS`: default 10
//! - `IDENTITY_CONNECT_TIMEOUT_SECS`: default 5

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SITE_DIR: &str = "site";
pub const DEFAULT_SESSION_COOKIE: &str = "session_token";
pub const DEFAULT_PROTECTED_PREFIXES: &str = "/dashboard,/admin";
pub const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_IDENTITY_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Prefix browsers require for cookies set with `Secure` on HTTPS origins.
pub const SECURE_COOKIE_PREFIX: &str = "__Secure-";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub identity_url: String,
    pub port: u16,
    pub site_dir: PathBuf,
    pub session_cookie: String,
    pub protected_prefixes: Vec<String>,
    pub cookie_secure: bool,
    pub identity_timeouts: IdentityTimeouts,
}

impl Config {
    /// Build config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `IDENTITY_URL` is missing or a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `IDENTITY_URL` is missing or a value fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let identity_url = lookup("IDENTITY_URL")
            .map(|v| v.trim().trim_end_matches('/').to_owned())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("IDENTITY_URL"))?;

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let site_dir = lookup("SITE_DIR").map_or_else(|| PathBuf::from(DEFAULT_SITE_DIR), PathBuf::from);
        let session_cookie = lookup("SESSION_COOKIE")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_owned());
        let protected_prefixes =
            parse_prefixes(lookup("PROTECTED_PREFIXES").as_deref().unwrap_or(DEFAULT_PROTECTED_PREFIXES));

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "COOKIE_SECURE", value: raw })?,
            None => lookup("PUBLIC_URL").is_some_and(|url| url.starts_with("https://")),
        };

        let identity_timeouts = IdentityTimeouts {
            request: Duration::from_secs(parse_or(&lookup, "IDENTITY_TIMEOUT_SECS", DEFAULT_IDENTITY_TIMEOUT_SECS)?),
            connect: Duration::from_secs(parse_or(
                &lookup,
                "IDENTITY_CONNECT_TIMEOUT_SECS",
                DEFAULT_IDENTITY_CONNECT_TIMEOUT_SECS,
            )?),
        };

        Ok(Self { identity_url, port, site_dir, session_cookie, protected_prefixes, cookie_secure, identity_timeouts })
    }

    /// Whether `path` falls under a protected prefix. Matching is
    /// segment-aware: `/dashboard` covers `/dashboard/files` but not
    /// `/dashboards`.
    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    /// Cookie names the session may live under.
    #[must_use]
    pub fn session_cookie_names(&self) -> [String; 2] {
        [self.session_cookie.clone(), format!("{SECURE_COOKIE_PREFIX}{}", self.session_cookie)]
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}

/// Split a comma list into normalized prefixes: leading `/`, no trailing `/`.
pub(crate) fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let trimmed = p.trim_end_matches('/');
            if trimmed.starts_with('/') { trimmed.to_owned() } else { format!("/{trimmed}") }
        })
        .filter(|p| p != "/")
        .collect()
}
