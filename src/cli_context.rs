use crate::client::{CivicClient, IssueApi};
use crate::config::{config_path, load_config_from, save_config_to, Config};
use crate::error::CivicResult;
use crate::identity::Session;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Central context for CLI operations, managing configuration and client instances
pub struct CliContext {
    /// Effective configuration: the file plus `CIVIC_*` overrides.
    config: Config,
    /// The file as read, without overrides. Only this copy is ever saved.
    stored: Config,
    client: Option<Arc<CivicClient>>,
    path: Option<PathBuf>,
}

impl CliContext {
    /// Create a context with default configuration that never writes to disk
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            stored: Config::default(),
            client: None,
            path: None,
        }
    }

    /// Load context from saved configuration and the environment
    pub fn load() -> CivicResult<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load context from the config file at `path`; changes are saved back there.
    pub fn load_from(path: &Path) -> CivicResult<Self> {
        let stored = load_config_from(path)?;
        Ok(Self {
            config: stored.clone().apply_env_overrides(),
            stored,
            client: None,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Session {
        Session::from_config(&self.config)
    }

    /// Get or create the HTTP client. Works without a token; requests are then anonymous.
    pub fn client(&mut self) -> CivicResult<Arc<CivicClient>> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }

        let client = Arc::new(CivicClient::from_config(&self.config)?);
        self.client = Some(client.clone());
        Ok(client)
    }

    /// The client behind the trait the controllers take.
    pub fn api(&mut self) -> CivicResult<Arc<dyn IssueApi>> {
        let client: Arc<dyn IssueApi> = self.client()?;
        Ok(client)
    }

    pub fn has_access_token(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Set (or clear) and save the access token
    pub fn set_access_token(&mut self, token: Option<String>) -> CivicResult<()> {
        let token = token.filter(|t| !t.trim().is_empty());
        self.stored.access_token = token.clone();
        self.config.access_token = token;
        self.client = None;
        self.persist_config()
    }

    /// Set and save the backend base URL
    pub fn set_api_url(&mut self, api_url: String) -> CivicResult<()> {
        self.stored.api_url = api_url.clone();
        self.config.api_url = api_url;
        self.client = None;
        self.persist_config()
    }

    fn persist_config(&self) -> CivicResult<()> {
        if let Some(path) = &self.path {
            save_config_to(&self.stored, path)?;
        }
        Ok(())
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder pattern for creating CLI contexts with specific configurations
pub struct CliContextBuilder {
    api_url: Option<String>,
    access_token: Option<String>,
}

impl CliContextBuilder {
    pub fn new() -> Self {
        Self {
            api_url: None,
            access_token: None,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Explicit values skip the config file entirely and are never saved.
    pub fn build(self) -> CivicResult<CliContext> {
        if self.api_url.is_none() && self.access_token.is_none() {
            return CliContext::load();
        }

        let mut context = CliContext::new();
        if let Some(api_url) = self.api_url {
            context.config.api_url = api_url;
        }
        context.config.access_token = self.access_token;
        Ok(context)
    }
}

impl Default for CliContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
