use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Which model backend answers natural-language requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    Ollama,
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "ollama" | "local" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            other => Err(anyhow!("Unknown model provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Anthropic,
            anthropic_api_key: None,
            anthropic_model: "claude-3-haiku-20240307".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "mistral".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub program: String,
    /// Zero disables the execution timeout.
    pub timeout_secs: u64,
    pub log_commands: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            timeout_secs: 30,
            log_commands: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub max_search_results: usize,
    pub default_python: String,
    /// Empty means `~/venvs`.
    pub venv_root: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_search_results: 10,
            default_python: "python3".to_string(),
            venv_root: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationConfig {
    pub prefer_model: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub shell: ShellConfig,
    pub tools: ToolsConfig,
    pub explanation: ExplanationConfig,
}

impl Config {
    /// Load configuration from file, environment variables, or create default
    pub fn load() -> Result<Self> {
        let mut config = Self::load_persisted()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// The config file as written, without environment overrides.
    pub fn load_persisted() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        match Self::load_from_path(&config_path)? {
            Some(config) => Ok(config),
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Environment variables override the config file.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(api_key) = lookup("ANTHROPIC_API_KEY") {
            if !api_key.trim().is_empty() {
                self.model.anthropic_api_key = Some(api_key);
            }
        }

        if let Some(provider) = lookup("COGNOS_PROVIDER") {
            self.model.provider = provider.parse()?;
        }

        if lookup("COGNOS_USE_MOCK").is_some() {
            self.model.provider = ProviderKind::Mock;
        }

        Ok(())
    }

    fn load_from_path(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(config_path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| anyhow!("Failed to parse {}: {}", config_path.display(), e))?;
        info!("Loaded config from: {}", config_path.display());
        Ok(Some(config))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::get_config_path()?)
    }

    fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        info!("Saved config to: {}", config_path.display());
        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".cognos"))
    }

    /// Writes the API key into the config file, leaving every other setting
    /// as the file has it.
    pub fn store_api_key(api_key: String) -> Result<()> {
        Self::store_api_key_at(&Self::get_config_path()?, api_key)
    }

    fn store_api_key_at(config_path: &Path, api_key: String) -> Result<()> {
        let mut config = Self::load_from_path(config_path)?.unwrap_or_default();
        config.model.anthropic_api_key = Some(api_key);
        config.save_to_path(config_path)?;
        info!("API key saved to config file");
        Ok(())
    }

    pub fn get_api_key(&self) -> Option<&str> {
        self.model
            .anthropic_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn venv_root(&self) -> Result<PathBuf> {
        if !self.tools.venv_root.trim().is_empty() {
            return Ok(PathBuf::from(self.tools.venv_root.trim()));
        }
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join("venvs"))
    }

    pub fn show_config_info(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        println!("Configuration file: {}", config_path.display());
        println!(
            "Status: {}",
            if config_path.exists() { "Found" } else { "Not found (using defaults)" }
        );
        println!("Model provider: {:?}", self.model.provider);
        println!("API Key: {}", if self.get_api_key().is_some() { "Set" } else { "Not set" });
        println!("Shell: {}", self.shell.program);
        if self.shell.timeout_secs > 0 {
            println!(
                "Auto-approved commands time out after {}s (typed and confirmed commands never do)",
                self.shell.timeout_secs
            );
        } else {
            println!("Command timeout: disabled");
        }
        println!("Prefer model explanations: {}", self.explanation.prefer_model);

        println!("\nTo set API key:");
        println!("  cognos --set-api-key <your-key>");
        println!("\nOr set environment variable:");
        println!("  export ANTHROPIC_API_KEY=<your-key>");

        Ok(())
    }
}
