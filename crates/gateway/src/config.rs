//! Gateway configuration: a small TOML config with environment variable
//! overrides, in the shape of `moltis-config`'s loader — search-path
//! discovery plus env substitution — but scoped to what this service
//! needs: no onboarding/plugin schema.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const CONFIG_FILENAMES: &[&str] = &["vps-agent.toml", "gateway.toml"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".to_string(), port: 8080 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SshDefaults {
    pub ready_timeout_secs: u64,
    pub default_exec_timeout_secs: u64,
}

impl Default for SshDefaults {
    fn default() -> Self {
        Self { ready_timeout_secs: vps_ssh::connection::READY_TIMEOUT_SECS, default_exec_timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub ssh: SshDefaults,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// Loads `path` if it exists, applies `${VAR}` environment substitution,
/// and layers environment variable overrides for bind address/port on top.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path.map(PathBuf::from).or_else(discover) {
        Some(path) => load_file(&path)?,
        None => {
            tracing::debug!("no config file found; using defaults");
            Config::default()
        }
    };

    if let Ok(bind) = env::var("VPS_GATEWAY_BIND") {
        config.server.bind = bind;
    }
    if let Ok(port) = env::var("VPS_GATEWAY_PORT") {
        if let Ok(port) = port.parse() {
            config.server.port = port;
        }
    }

    Ok(config)
}

fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    let substituted = substitute_env(&raw);
    toml::from_str(&substituted).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

fn discover() -> Option<PathBuf> {
    CONFIG_FILENAMES.iter().map(PathBuf::from).find(|p| p.exists())
}

/// Replaces `${VAR}` occurrences with the matching environment variable,
/// leaving unresolved references untouched.
fn substitute_env(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };
        let var_name = &after[..end];
        if let Ok(value) = env::var(var_name) {
            out.push_str(&value);
        } else {
            out.push_str(&rest[start..start + 2 + end + 1]);
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_env_var() {
        env::set_var("VPS_AGENT_TEST_VAR", "hello");
        assert_eq!(substitute_env("value = \"${VPS_AGENT_TEST_VAR}\""), "value = \"hello\"");
        env::remove_var("VPS_AGENT_TEST_VAR");
    }

    #[test]
    fn leaves_unresolved_reference_untouched() {
        assert_eq!(substitute_env("value = \"${NO_SUCH_VAR_XYZ}\""), "value = \"${NO_SUCH_VAR_XYZ}\"");
    }

    #[test]
    fn default_config_has_sensible_bind_port() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
    }
}
