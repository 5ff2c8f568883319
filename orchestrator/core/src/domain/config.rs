// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

// Dexter Configuration
//
// Single YAML document covering:
// - Memory tiers (short-term window, long-term log, learner)
// - Clarification round settings
// - Dexter and Partner chat providers
// - Conversation transcript store
// - HTTP server bind address

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use dexter_cortex::MemoryConfig;

pub const DEFAULT_DEXTER_IDENTITY: &str = "You are Dexter, a personal AI assistant. You orchestrate tasks, generate code, and build skills. You are the primary interface and speak directly to the user.";

pub const DEFAULT_PARTNER_IDENTITY: &str = "You are Partner, working with Dexter in the background. You draft proposals, update knowledge graphs and provide technical expertise. You work silently unless directly addressed.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DexterConfig {
    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub autonomy: AutonomyConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub conversations: ConversationsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomyConfig {
    /// Clarifying questions asked per query
    #[serde(default = "default_minimum_questions")]
    pub minimum_questions: usize,

    #[serde(default)]
    pub question_generator: QuestionGeneratorKind,
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        Self {
            minimum_questions: default_minimum_questions(),
            question_generator: QuestionGeneratorKind::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionGeneratorKind {
    /// Keyword templates, no network
    #[default]
    Template,
    /// Ask the Dexter provider, falling back to templates
    Llm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "ProviderConfig::dexter")]
    pub dexter: ProviderConfig,

    #[serde(default = "ProviderConfig::partner")]
    pub partner: ProviderConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            dexter: ProviderConfig::dexter(),
            partner: ProviderConfig::partner(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// "echo" or "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// System prompt sent ahead of every conversation
    #[serde(default)]
    pub identity: String,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderConfig {
    pub fn dexter() -> Self {
        Self::with_identity(DEFAULT_DEXTER_IDENTITY)
    }

    pub fn partner() -> Self {
        Self::with_identity(DEFAULT_PARTNER_IDENTITY)
    }

    fn with_identity(identity: &str) -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            identity: identity.to_string(),
            enabled: true,
        }
    }

    /// Resolve `env:VAR` references. Plain values pass through.
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        match self.api_key.as_deref() {
            None => Ok(None),
            Some(key) => match key.strip_prefix("env:") {
                Some(var) => std::env::var(var).map(Some).map_err(|_| {
                    anyhow::anyhow!("Environment variable '{}' referenced by api_key is not set", var)
                }),
                None => Ok(Some(key.to_string())),
            },
        }
    }

    fn is_http(&self) -> bool {
        self.provider != "echo"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsConfig {
    #[serde(default = "default_conversations_path")]
    pub database_path: PathBuf,
}

impl Default for ConversationsConfig {
    fn default() -> Self {
        Self {
            database_path: default_conversations_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

const KNOWN_PROVIDERS: &[&str] = &["echo", "ollama"];

fn default_minimum_questions() -> usize {
    3
}

fn default_provider() -> String {
    "echo".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

fn default_conversations_path() -> PathBuf {
    PathBuf::from("./data/conversations.db")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl DexterConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. DEXTER_CONFIG_PATH environment variable
    /// 2. ./dexter-config.yaml (working directory)
    /// 3. ~/.dexter/config.yaml (user home)
    /// 4. /etc/dexter/config.yaml (system, Unix) or C:\ProgramData\Dexter\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("DEXTER_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./dexter-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".dexter").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/dexter/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Dexter\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must exist
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Same as [`Self::apply_env_overrides`] with an injectable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DEXTER_MEMORY_DB") {
            tracing::info!("Environment override: DEXTER_MEMORY_DB={}", val);
            self.memory.long_term.database_path = PathBuf::from(val);
        }

        if let Some(val) = lookup("DEXTER_LEARNER_WEIGHTS") {
            tracing::info!("Environment override: DEXTER_LEARNER_WEIGHTS={}", val);
            self.memory.learner.weights_path = PathBuf::from(val);
        }

        if let Some(val) = lookup("DEXTER_CONVERSATIONS_DB") {
            tracing::info!("Environment override: DEXTER_CONVERSATIONS_DB={}", val);
            self.conversations.database_path = PathBuf::from(val);
        }

        if let Some(val) = lookup("DEXTER_LLM_ENDPOINT") {
            tracing::info!("Environment override: DEXTER_LLM_ENDPOINT={}", val);
            self.llm.dexter.endpoint = val.clone();
            self.llm.partner.endpoint = val;
        }

        if let Some(val) = lookup("DEXTER_LLM_MODEL") {
            tracing::info!("Environment override: DEXTER_LLM_MODEL={}", val);
            self.llm.dexter.model = val.clone();
            self.llm.partner.model = val;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.memory.short_term_limit == 0 {
            anyhow::bail!("memory.short_term_limit must be greater than 0");
        }

        if self.memory.context_limit == 0 {
            anyhow::bail!("memory.context_limit must be greater than 0");
        }

        if self.memory.learner.dimension == 0 {
            anyhow::bail!("memory.learner.dimension must be greater than 0");
        }

        let rate = self.memory.learner.learning_rate;
        if !(rate > 0.0 && rate < 1.0) {
            anyhow::bail!(
                "memory.learner.learning_rate must be in (0, 1), got {}",
                rate
            );
        }

        if self.autonomy.minimum_questions == 0 {
            anyhow::bail!("autonomy.minimum_questions must be at least 1");
        }

        for (name, provider) in [("dexter", &self.llm.dexter), ("partner", &self.llm.partner)] {
            if !KNOWN_PROVIDERS.contains(&provider.provider.as_str()) {
                anyhow::bail!(
                    "Unknown provider '{}' for llm.{}. Expected one of: {}",
                    provider.provider,
                    name,
                    KNOWN_PROVIDERS.join(", ")
                );
            }

            if provider.is_http() && provider.endpoint.trim().is_empty() {
                anyhow::bail!("llm.{}.endpoint cannot be empty for provider '{}'", name, provider.provider);
            }

            if provider.is_http() && provider.model.trim().is_empty() {
                anyhow::bail!("llm.{}.model cannot be empty for provider '{}'", name, provider.provider);
            }
        }

        if self.server.host.trim().is_empty() {
            anyhow::bail!("server.host cannot be empty");
        }

        Ok(())
    }
}
