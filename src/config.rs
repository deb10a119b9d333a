use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Top-level configuration for receipt analysis
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Provider used when none is requested explicitly
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific inference provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "claude-3-5-sonnet-20241022")
    pub model: String,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Environment variable holding the API key, replacing the provider default
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    /// Built-in settings for a known provider
    pub fn builtin(provider_name: &str) -> Option<Self> {
        let model = match provider_name {
            "anthropic" => "claude-3-5-sonnet-20241022",
            "openai" => "gpt-4o",
            "google" => "gemini-1.5-flash",
            _ => return None,
        };

        Some(ProviderConfig {
            enabled: true,
            model: model.to_string(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
            api_key_env: None,
        })
    }
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_enabled() -> bool {
    true
}

pub(crate) fn default_max_tokens() -> u32 {
    1500
}

fn default_timeout() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_provider: default_provider(),
            providers: HashMap::new(),
            timeout: default_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config.toml` and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }

    /// Settings for `provider_name`, falling back to the built-in defaults
    /// when the provider is not listed in the configuration
    pub fn provider_config(&self, provider_name: &str) -> Option<ProviderConfig> {
        self.providers
            .get(provider_name)
            .cloned()
            .or_else(|| ProviderConfig::builtin(provider_name))
    }
}

/// Load configuration from file and environment variables
///
/// Configuration is loaded with the following priority (highest to lowest):
/// 1. Environment variables with RECEIPT__ prefix
/// 2. The given file, or config.toml in the current directory
/// 3. Default values
///
/// Environment variable format: RECEIPT__PROVIDERS__ANTHROPIC__API_KEY
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("config").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore for nested: RECEIPT__PROVIDERS__ANTHROPIC__API_KEY
        .add_source(
            Environment::with_prefix("RECEIPT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        assert_eq!(default_provider(), "anthropic");
        assert_eq!(default_max_tokens(), 1500);
        assert_eq!(default_timeout(), 30);

        let config = AppConfig::default();
        assert!(config.providers.is_empty());
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn test_builtin_provider_configs() {
        let anthropic = ProviderConfig::builtin("anthropic").unwrap();
        assert_eq!(anthropic.model, "claude-3-5-sonnet-20241022");
        assert_eq!(anthropic.max_tokens, 1500);
        assert!(anthropic.enabled);
        assert!(anthropic.api_key.is_none());

        assert!(ProviderConfig::builtin("openai").is_some());
        assert!(ProviderConfig::builtin("google").is_some());
        assert!(ProviderConfig::builtin("ollama").is_none());
    }

    #[test]
    fn test_configured_provider_takes_precedence() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "anthropic".to_string(),
            ProviderConfig {
                enabled: true,
                model: "claude-custom".to_string(),
                max_tokens: 800,
                api_key: Some("test-key".to_string()),
                base_url: None,
                api_key_env: None,
            },
        );

        let provider = config.provider_config("anthropic").unwrap();
        assert_eq!(provider.model, "claude-custom");
        assert_eq!(provider.max_tokens, 800);

        let fallback = config.provider_config("openai").unwrap();
        assert_eq!(fallback.model, "gpt-4o");

        assert!(config.provider_config("unknown").is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
default_provider = "openai"
timeout = 10

[providers.openai]
model = "gpt-4o-mini"
api_key = "file-key"
api_key_env = "TEAM_OPENAI_KEY"
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.timeout, 10);

        let openai = config.provider_config("openai").unwrap();
        assert_eq!(openai.model, "gpt-4o-mini");
        assert_eq!(openai.api_key.as_deref(), Some("file-key"));
        assert_eq!(openai.api_key_env.as_deref(), Some("TEAM_OPENAI_KEY"));
        assert_eq!(openai.max_tokens, 1500);
        assert!(openai.enabled);
    }

    #[test]
    fn test_load_config_missing_explicit_file() {
        let result = load_config(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }
}
