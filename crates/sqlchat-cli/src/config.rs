use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use sqlchat_db::{ConnectionConfig, OutputFormat};
use sqlchat_llm::{DEFAULT_MODEL, OLLAMA_BASE_URL, ProviderConfig, ProviderKind};
use sqlchat_pipeline::PipelineConfig;

use crate::cli::Args;

const ENV_PREFIX: &str = "SQLCHAT";

/// Everything the binary reads from its config file and environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub database: ConnectionConfig,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the variable holding the API key; the key itself never lives in the file.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: None,
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    OLLAMA_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

impl AppConfig {
    /// Default config.toml path: ~/.config/sqlchat/config.toml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlchat")
            .join("config.toml")
    }

    /// Layers defaults, the TOML file, `SQLCHAT_*` variables and the `DB_*` variables, in
    /// that order. An explicitly named file must exist; the default path may be absent.
    pub fn load(
        file: Option<&Path>,
        vars: &config::Map<String, String>,
    ) -> Result<AppConfig> {
        let (path, required) = match file {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        let layered = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .build()
            .wrap_err_with(|| format!("reading configuration from {}", path.display()))?;

        let mut cfg: AppConfig = layered
            .try_deserialize()
            .wrap_err("configuration has an unexpected shape")?;
        cfg.database = cfg
            .database
            .overlay(ConnectionConfig::from_vars(|key| vars.get(key).cloned()));
        Ok(cfg)
    }

    /// Command-line flags win over every other layer.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(model) = &args.model {
            self.llm.model = model.clone();
        }
        if let Some(provider) = args.provider {
            self.llm.provider = provider;
        }
        if let Some(url) = &args.llm_url {
            self.llm.base_url = url.clone();
        }
        if let Some(format) = args.format {
            self.output.format = format;
        }
    }

    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let mut provider = ProviderConfig::new(self.llm.provider, &self.llm.base_url)?;
        if let Some(var) = &self.llm.api_key_env {
            provider = provider.with_api_key_env(var.clone());
        }
        if let Some(secs) = self.llm.timeout_secs {
            provider = provider.with_timeout(Duration::from_secs(secs));
        }
        Ok(provider)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            model: self.llm.model.clone(),
            database: self.database.clone(),
        }
    }

    /// Writes this configuration as TOML, creating parent directories. The database
    /// password is never written; it stays in `DB_PASSWORD` or `SQLCHAT_DATABASE__PASSWORD`.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let mut on_disk = self.clone();
        on_disk.database.password = None;
        let toml_str = toml::to_string_pretty(&on_disk)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_str)
            .wrap_err_with(|| format!("writing configuration to {}", path.display()))?;
        Ok(())
    }
}
