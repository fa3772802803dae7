use std::path::PathBuf;

use anyhow::Context;
use rand::distributions::{Alphanumeric, DistString};
use serde::Deserialize;

use crate::session::Credentials;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Server configuration.
///
/// Read from the YAML file named by `WEBDESK_CONFIG` when set, then
/// overridden by `LISTEN`, `WEBDESK_USERNAME`, `WEBDESK_PASSWORD` and
/// `WEBDESK_STATIC_ROOT`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub static_files: StaticConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Steady-state worker threads kept in the idle pool.
    pub max_workers: usize,
    /// Idle-read timeout applied to every accepted socket.
    pub read_timeout_secs: u64,
    /// Name sent in the Server header, followed by the crate version.
    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_workers: 3,
            read_timeout_secs: 20,
            server_name: "webdesk".to_string(),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Directory static files are served from. Nothing is served when unset.
    pub root: Option<PathBuf>,
    pub max_file_size: u64,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: None,
            max_file_size: crate::handlers::MAX_FILE_SIZE,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("WEBDESK_CONFIG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {path}"))?;
                Self::from_yaml(&text).with_context(|| format!("parsing config file {path}"))?
            }
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        Ok(cfg)
    }

    /// Applies environment-style overrides looked up through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("LISTEN") {
            self.server.listen_addr = addr;
        }
        if let Some(username) = lookup("WEBDESK_USERNAME") {
            self.auth.username = Some(username);
        }
        if let Some(password) = lookup("WEBDESK_PASSWORD") {
            self.auth.password = Some(password);
        }
        if let Some(root) = lookup("WEBDESK_STATIC_ROOT") {
            self.static_files.root = Some(PathBuf::from(root));
        }
    }

    /// `Server` header value.
    pub fn server_ident(&self) -> String {
        format!("{}/{}", self.server.server_name, env!("CARGO_PKG_VERSION"))
    }
}

impl AuthConfig {
    /// The configured credentials, generating whatever is missing.
    ///
    /// A generated password is logged once so the operator can log in.
    pub fn credentials(&self) -> Credentials {
        let mut rng = rand::thread_rng();
        let username = match self.username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("user-{}", Alphanumeric.sample_string(&mut rng, 6).to_lowercase()),
        };
        let password = match self.password.as_deref() {
            Some(password) if !password.is_empty() => password.to_string(),
            _ => {
                let generated = Alphanumeric.sample_string(&mut rng, 12);
                tracing::warn!(user = %username, password = %generated, "no password configured, generated one");
                generated
            }
        };
        Credentials { username, password }
    }
}
