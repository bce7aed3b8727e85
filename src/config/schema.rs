//! Configuration schema definitions.
//!
//! `SpaceConfig` is the typed view of the layered `.tsapp` files. Every field
//! has a default so that an absent or partial file still yields a usable
//! configuration; the credential and path prefix are optional.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Origin used when no `target_server` is configured.
pub const DEFAULT_TARGET_SERVER: &str = "http://tiddlyspace.com";

/// Root configuration for the development proxy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Remote origin that owns the space (e.g., "http://tiddlyspace.com").
    pub target_server: String,

    /// Host the local server binds to.
    pub local_host: String,

    /// Port the local server binds to.
    pub port: u16,

    /// Session credential replayed as the `tiddlyweb_user` cookie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Path prefix the origin serves its API under, without slashes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_prefix: Option<String>,

    /// Upper bound for a single outbound call, in seconds.
    pub remote_timeout_secs: u64,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            target_server: DEFAULT_TARGET_SERVER.to_string(),
            local_host: "0.0.0.0".to_string(),
            port: 8080,
            auth_token: None,
            server_prefix: None,
            remote_timeout_secs: 30,
        }
    }
}

impl SpaceConfig {
    /// Address the local server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.local_host, self.port)
    }

    /// Timeout applied to each outbound call.
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs.max(1))
    }

    /// Configured prefix with surrounding separators removed, if non-empty.
    pub fn prefix(&self) -> Option<&str> {
        self.server_prefix
            .as_deref()
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
    }

    /// Full upstream URI for an already-encoded absolute path.
    ///
    /// The prefix is inserted between origin and path unless the path
    /// already starts with it.
    pub fn upstream_uri(&self, encoded_path: &str, query: Option<&str>) -> String {
        let origin = self.target_server.trim_end_matches('/');
        let mut uri = match self.prefix() {
            Some(prefix) if !starts_with_segment(encoded_path, prefix) => {
                format!("{origin}/{prefix}{encoded_path}")
            }
            _ => format!("{origin}{encoded_path}"),
        };
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            uri.push('?');
            uri.push_str(query);
        }
        uri
    }
}

fn starts_with_segment(path: &str, prefix: &str) -> bool {
    path.strip_prefix('/')
        .and_then(|rest| rest.strip_prefix(prefix))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Partial configuration merged into the local file by `ConfigStore::write`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_timeout_secs: Option<u64>,
}

impl ConfigPatch {
    /// Patch that stores a session credential.
    pub fn auth_token(token: impl Into<String>) -> Self {
        Self {
            auth_token: Some(token.into()),
            ..Self::default()
        }
    }
}

/// Keys that can be removed from the local file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    TargetServer,
    LocalHost,
    Port,
    AuthToken,
    ServerPrefix,
}

impl ConfigKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::TargetServer => "target_server",
            ConfigKey::LocalHost => "local_host",
            ConfigKey::Port => "port",
            ConfigKey::AuthToken => "auth_token",
            ConfigKey::ServerPrefix => "server_prefix",
        }
    }

    /// Keys whose absence means "unset" rather than "use the default".
    pub fn is_optional(self) -> bool {
        matches!(self, ConfigKey::AuthToken | ConfigKey::ServerPrefix)
    }
}
