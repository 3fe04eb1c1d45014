//! Configuration loading for Lusocite.
//! Reads lusocite.toml from the current directory, the path in the
//! LUSOCITE_CONFIG env var, or the path given with `--config`.

use serde::Deserialize;
use secrecy::SecretString;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LUSOCITE_CONFIG";
pub const ORCID_CLIENT_ID_ENV: &str = "LUSOCITE_ORCID_CLIENT_ID";
pub const ORCID_CLIENT_SECRET_ENV: &str = "LUSOCITE_ORCID_CLIENT_SECRET";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub orcid: OrcidConfig,
    #[serde(default)]
    pub language: LanguageConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_conferences_dir")]
    pub conferences_dir: PathBuf,
    #[serde(default = "default_authors_dir")]
    pub authors_dir: PathBuf,
}

fn default_data_dir()        -> PathBuf { PathBuf::from("data") }
fn default_conferences_dir() -> PathBuf { PathBuf::from("conferences") }
fn default_authors_dir()     -> PathBuf { PathBuf::from("authors") }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir:        default_data_dir(),
            conferences_dir: default_conferences_dir(),
            authors_dir:     default_authors_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Contact address for the Crossref polite pool.
    pub mailto: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn default_user_agent() -> String { format!("lusocite/{}", env!("CARGO_PKG_VERSION")) }

impl Default for HttpConfig {
    fn default() -> Self {
        Self { user_agent: default_user_agent(), mailto: None, timeout_secs: None }
    }
}

impl HttpConfig {
    pub fn full_user_agent(&self) -> String {
        match &self.mailto {
            Some(mailto) => format!("{} (mailto:{mailto})", self.user_agent),
            None => self.user_agent.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrcidConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    #[serde(default)]
    pub sandbox: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageConfig {
    #[serde(default = "default_language_backend")]
    pub backend: String,
    #[serde(default = "default_fasttext_model")]
    pub fasttext_model: PathBuf,
}

fn default_language_backend() -> String  { "whatlang".to_string() }
fn default_fasttext_model()   -> PathBuf { PathBuf::from("lid.176.ftz") }

impl Default for LanguageConfig {
    fn default() -> Self {
        Self { backend: default_language_backend(), fasttext_model: default_fasttext_model() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "bool_true")]
    pub interactive: bool,
}

fn bool_true() -> bool { true }

impl Default for PromptConfig {
    fn default() -> Self {
        Self { interactive: bool_true() }
    }
}


impl Config {
    /// Load configuration.
    /// `path` wins over LUSOCITE_CONFIG, which wins over ./lusocite.toml.
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("lusocite.toml")),
        };

        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?
        } else {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults. Copy lusocite.example.toml to lusocite.toml to customise."
            );
            Self::default()
        };

        Ok(config.with_orcid_env(
            std::env::var(ORCID_CLIENT_ID_ENV).ok(),
            std::env::var(ORCID_CLIENT_SECRET_ENV).ok(),
        ))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Environment credentials override the file.
    pub fn with_orcid_env(mut self, client_id: Option<String>, client_secret: Option<String>) -> Self {
        if let Some(id) = client_id.filter(|s| !s.is_empty()) {
            self.orcid.client_id = Some(id);
        }
        if let Some(secret) = client_secret.filter(|s| !s.is_empty()) {
            self.orcid.client_secret = Some(SecretString::from(secret));
        }
        self
    }
}
