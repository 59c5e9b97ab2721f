//! Configuration management for the Thermo assistant.
//!
//! Configuration is merged from multiple sources, later sources winning:
//! built-in defaults, `.thermo/config.yaml`, environment variables, and
//! command-line flags. All durable state lives under the workspace's
//! `.thermo/` directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .thermo/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Reasoning backend provider (e.g., "ollama")
    pub provider: String,

    /// Model identifier for the reasoning backend
    pub model: String,

    /// Custom endpoint for the reasoning backend
    pub endpoint: Option<String>,

    /// Embedding function settings
    pub embedding: EmbeddingSettings,

    /// Default number of passages retrieved per question
    pub top_k: usize,

    /// Sandbox execution settings
    pub sandbox: SandboxSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Settings for the injected embedding function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensionality
    pub dimensions: usize,

    /// Custom endpoint (Ollama only)
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Settings for the execution sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxSettings {
    /// Interpreter used to run snippets
    pub python_bin: String,

    /// Wall-clock timeout per run, in seconds
    pub timeout_secs: u64,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            python_bin: "python3".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Full configuration file structure (.thermo/config.yaml).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    retrieval: Option<RetrievalSection>,
    sandbox: Option<SandboxSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SandboxSection {
    python_bin: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            endpoint: None,
            embedding: EmbeddingSettings::default(),
            top_k: 4,
            sandbox: SandboxSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file, and environment.
    ///
    /// Environment variables:
    /// - `THERMO_WORKSPACE`: Override workspace path
    /// - `THERMO_CONFIG`: Path to config file
    /// - `THERMO_PROVIDER`: Reasoning backend provider
    /// - `THERMO_MODEL`: Model identifier
    /// - `THERMO_PYTHON`: Sandbox interpreter
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("THERMO_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("THERMO_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".thermo/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("THERMO_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("THERMO_MODEL") {
            config.model = model;
        }

        if let Ok(python_bin) = std::env::var("THERMO_PYTHON") {
            config.sandbox.python_bin = python_bin;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
        }

        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding.provider = provider;
            }
            if let Some(model) = embedding.model {
                result.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding.dimensions = dimensions;
            }
            if embedding.endpoint.is_some() {
                result.embedding.endpoint = embedding.endpoint;
            }
        }

        if let Some(retrieval) = file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                result.top_k = top_k;
            }
        }

        if let Some(sandbox) = file.sandbox {
            if let Some(python_bin) = sandbox.python_bin {
                result.sandbox.python_bin = python_bin;
            }
            if let Some(timeout_secs) = sandbox.timeout_secs {
                result.sandbox.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides, which take precedence over everything else.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .thermo directory.
    pub fn thermo_dir(&self) -> PathBuf {
        self.workspace.join(".thermo")
    }

    /// Get the directory holding the persisted index artifacts.
    pub fn index_dir(&self) -> PathBuf {
        self.thermo_dir().join("index")
    }

    /// Ensure the .thermo directory exists.
    pub fn ensure_thermo_dir(&self) -> AppResult<()> {
        let dir = self.thermo_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .thermo directory: {}", e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.embedding.provider, "trigram");
        assert_eq!(config.embedding.dimensions, 384);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.sandbox.python_bin, "python3");
        assert_eq!(config.sandbox.timeout_secs, 5);
        assert!(!config.verbose);
    }

    #[test]
    fn test_index_dir() {
        let config = AppConfig::default();
        assert!(config.index_dir().ends_with(".thermo/index"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            Some("llama3.1".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.1");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_sections() {
        let dir = std::env::temp_dir().join("thermo-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  model: mistral
embedding:
  provider: ollama
  model: nomic-embed-text
  dimensions: 768
sandbox:
  timeout_secs: 10
retrieval:
  top_k: 8
"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&path).unwrap();

        assert_eq!(merged.model, "mistral");
        assert_eq!(merged.provider, "ollama"); // untouched default
        assert_eq!(merged.embedding.provider, "ollama");
        assert_eq!(merged.embedding.dimensions, 768);
        assert_eq!(merged.sandbox.timeout_secs, 10);
        assert_eq!(merged.top_k, 8);

        std::fs::remove_file(&path).ok();
    }
}
