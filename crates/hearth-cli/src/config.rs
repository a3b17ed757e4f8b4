use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HearthConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "~/.hearth/hearth.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_concurrent() -> usize {
    8
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            max_concurrent_requests: default_max_concurrent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub local: Option<LocalProviderConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalProviderConfig {
    #[serde(default = "default_local_base_url")]
    pub base_url: String,
    #[serde(default = "default_local_model")]
    pub model: String,
}

fn default_local_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_local_model() -> String {
    "llama3.2".to_string()
}

/// Mask a secret string for safe display in Debug output / logs.
/// Shows first 3 and last 4 chars for keys longer than 7 chars, otherwise "***".
fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "(empty)".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 7 {
        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", prefix, suffix)
    } else {
        "***".to_string()
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hearth")
}

impl HearthConfig {
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        let path = custom_path
            .clone()
            .unwrap_or_else(|| config_dir().join("config.toml"));

        // Refuse configs other users can read; they may hold API keys.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = std::fs::metadata(&path) {
                let mode = metadata.permissions().mode();
                if mode & 0o077 != 0 {
                    return Err(anyhow::anyhow!(
                        "Config file {:?} has overly permissive permissions ({:o}). \
                         It may contain secrets. Fix with: chmod 600 {:?}",
                        path,
                        mode & 0o777,
                        path
                    ));
                }
            }
        }

        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read config at {}. Run `hearth init` first.",
                path.display()
            )
        })?;

        // Expand environment variables before parsing
        let expanded = expand_env_vars(&content);

        let config: Self = toml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        if config.providers.anthropic.api_key.starts_with("sk-ant-") {
            warn!(
                "API key is hardcoded in config file. For security, use environment variables: api_key = \"${{ANTHROPIC_API_KEY}}\""
            );
        }

        Ok(config)
    }
}

/// Allowlist of environment variable names that may be expanded in config
/// files. Prevents a config edit from reading arbitrary env vars.
const ALLOWED_ENV_VARS: &[&str] = &["ANTHROPIC_API_KEY", "HEARTH_DB_PATH", "HOME", "USER"];

fn expand_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut pos = 0;
    while pos < result.len() {
        if let Some(start) = result[pos..].find("${") {
            let abs_start = pos + start;
            if let Some(end) = result[abs_start..].find('}') {
                let var_name = result[abs_start + 2..abs_start + end].to_string();

                let value = if ALLOWED_ENV_VARS.contains(&var_name.as_str()) {
                    std::env::var(&var_name).unwrap_or_default()
                } else {
                    warn!(
                        "Skipping expansion of unrecognized env var '{}' in config (not in allowlist)",
                        var_name
                    );
                    // Leave the ${VAR} unexpanded so it's obvious
                    pos = abs_start + end + 1;
                    continue;
                };

                let value_len = value.len();
                result = format!(
                    "{}{}{}",
                    &result[..abs_start],
                    value,
                    &result[abs_start + end + 1..]
                );
                pos = abs_start + value_len;
            } else {
                break;
            }
        } else {
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: HearthConfig = toml::from_str(
            r#"
            [providers.anthropic]
            api_key = "sk-ant-test"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.agents.max_concurrent_requests, 8);
        assert_eq!(config.agents.request_timeout_secs, 120);
        assert_eq!(config.database.path, "~/.hearth/hearth.db");
        assert!(config.providers.local.is_none());
    }

    #[test]
    fn test_parse_local_provider() {
        let config: HearthConfig = toml::from_str(
            r#"
            [providers.anthropic]
            api_key = ""

            [providers.local]
            base_url = "http://localhost:11434"
            model = "llama3.2"
            "#,
        )
        .unwrap();
        let local = config.providers.local.unwrap();
        assert_eq!(local.model, "llama3.2");
    }

    #[test]
    fn test_default_template_parses() {
        let raw = include_str!("../../../config/default.toml");
        let expanded = expand_env_vars(raw);
        let config: HearthConfig = toml::from_str(&expanded).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(empty)");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret("sk-ant-1234567890"), "sk-...7890");
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = AnthropicConfig {
            api_key: "sk-ant-supersecret99".to_string(),
            base_url: default_base_url(),
        };
        let output = format!("{:?}", config);
        assert!(!output.contains("supersecret"));
    }

    #[test]
    fn test_expand_env_vars_allowlisted() {
        unsafe { std::env::set_var("ANTHROPIC_API_KEY", "sk-ant-fromenv") };
        let expanded = expand_env_vars("key = \"${ANTHROPIC_API_KEY}\"");
        assert_eq!(expanded, "key = \"sk-ant-fromenv\"");
    }

    #[test]
    fn test_expand_env_vars_skips_unknown() {
        let expanded = expand_env_vars("key = \"${TOTALLY_UNKNOWN_VAR}\"");
        assert_eq!(expanded, "key = \"${TOTALLY_UNKNOWN_VAR}\"");
    }
}
