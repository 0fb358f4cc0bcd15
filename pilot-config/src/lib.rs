//! Loader for Pilot configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added, later ones winning:
//! YAML files / inline snippets first, then `PILOT__`-prefixed environment
//! variables (`PILOT__OCR__AUTH_TOKEN` sets `ocr.auth_token`). After merging,
//! every string is run through `${VAR}` expansion (recursively, up to
//! [`MAXIMUM_ENV_EXPANSION_DEPTH`] hops) so secrets can stay out of the file.
//!
//! Every section is optional and falls back to its defaults:
//!
//! ```yaml
//! version: "1"
//! llm:
//!   provider: openai          # openai | ollama | none
//!   model: gpt-4
//!   auth_token: ${LLM_API_KEY}
//! ocr:
//!   auth_token: ${DEEPSEEK_OCR_API_KEY}
//! browser:
//!   webdriver_url: http://localhost:9515
//!   headless: true
//! engine:
//!   element_timeout_ms: 5000
//! logging:
//!   format: text
//! ```
use config::{Config, ConfigError, Environment, File};
use pilot_common::observability::LoggingConfig;
use pilot_common::{BrowserConfig, EngineConfig, LlmConfig, OcrConfig};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// File name looked up by [`default_config_paths`].
pub const CONFIG_FILE_NAME: &str = "pilot.yaml";

#[derive(Debug, Default, Deserialize)]
pub struct PilotConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `./pilot.yaml`, then `<config dir>/pilot/pilot.yaml`.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pilot").join(CONFIG_FILE_NAME));
    }
    paths
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PilotConfigLoader {
    files: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PilotConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PilotConfigLoader {
    /// Start empty; `PILOT__` env overrides are applied on [`load`](Self::load).
    ///
    /// ```
    /// use pilot_common::LlmConfig;
    /// use pilot_config::PilotConfigLoader;
    ///
    /// let config = PilotConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.llm, LlmConfig::None);
    /// assert_eq!(config.engine.default_wait_ms, 1_000);
    /// ```
    pub fn new() -> Self {
        Self {
            files: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the format is inferred
    /// from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files = self
            .files
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files = self
            .files
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use pilot_common::LlmConfig;
    /// use pilot_config::PilotConfigLoader;
    ///
    /// let cfg = PilotConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: ollama
    ///   model: llama3.2:3b
    /// browser:
    ///   headless: false
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(matches!(cfg.llm, LlmConfig::Ollama { ref endpoint, .. } if endpoint == "http://localhost:11434"));
    /// assert!(!cfg.browser.headless);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.files = self
            .files
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use pilot_common::LlmConfig;
    /// use pilot_config::PilotConfigLoader;
    ///
    /// unsafe { std::env::set_var("PILOT_DOC_API_TOKEN", "injected-from-env"); }
    ///
    /// let config = PilotConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: "openai"
    ///   model: "gpt-4o"
    ///   auth_token: "${PILOT_DOC_API_TOKEN}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.llm {
    ///     LlmConfig::Openai { model, auth_token, endpoint, .. } => {
    ///         assert_eq!(model, "gpt-4o");
    ///         assert_eq!(auth_token, "injected-from-env");
    ///         assert_eq!(endpoint, "https://api.openai.com/v1");
    ///     }
    ///     _ => panic!("expected OpenAI configuration"),
    /// }
    ///
    /// unsafe { std::env::remove_var("PILOT_DOC_API_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<PilotConfig, ConfigError> {
        let cfg = self
            .files
            .add_source(
                Environment::with_prefix("PILOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PilotConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
