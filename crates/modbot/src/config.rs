//! Bot configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use modbot_core::scoring::DEFAULT_THRESHOLD;
use modbot_scoring::{
    ChatCompletionClient, ClassifierClient, OpenAiModerationClient, PerspectiveClient,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable overriding the Perspective API key.
pub const PERSPECTIVE_KEY_VAR: &str = "PERSPECTIVE_API_KEY";
/// Environment variable overriding the `OpenAI` API key.
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

/// Settings read from `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// The guild the bot moderates.
    pub guild_id: u64,
    /// Channels whose messages are scored for automatic reports.
    pub public_channels: Vec<String>,
    /// Channel where moderators run reviews.
    pub mod_channel: String,
    /// Perspective API key; the backend is disabled without one.
    pub perspective_api_key: Option<String>,
    /// `OpenAI` API key; the backend is disabled without one.
    pub openai_api_key: Option<String>,
    /// Overrides the Perspective analyze endpoint.
    pub perspective_endpoint: Option<String>,
    /// Overrides the `OpenAI` moderation endpoint.
    pub openai_endpoint: Option<String>,
    /// `OpenAI` moderation model.
    pub openai_model: Option<String>,
    /// `OpenAI` organization sent with chat completion requests.
    pub openai_organization: Option<String>,
    /// Also label messages with an `OpenAI` chat model. Uses the `OpenAI` key.
    pub chat_classifier: bool,
    /// Overrides the chat completion endpoint.
    pub chat_endpoint: Option<String>,
    /// Chat model used for labelling.
    pub chat_model: Option<String>,
    /// Upper bound on each classifier call, in seconds.
    pub request_timeout_secs: u64,
    /// Probability at which a message is reported automatically.
    pub auto_report_threshold: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            guild_id: 1,
            public_channels: vec!["general".to_string()],
            mod_channel: "mod".to_string(),
            perspective_api_key: None,
            openai_api_key: None,
            perspective_endpoint: None,
            openai_endpoint: None,
            openai_model: None,
            openai_organization: None,
            chat_classifier: false,
            chat_endpoint: None,
            chat_model: None,
            request_timeout_secs: 10,
            auto_report_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl BotConfig {
    /// Classifier call timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Replaces API keys with values from `lookup`, when present and non-empty.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |var: &str| lookup(var).filter(|value: &String| !value.trim().is_empty());
        if let Some(key) = non_empty(PERSPECTIVE_KEY_VAR) {
            self.perspective_api_key = Some(key);
        }
        if let Some(key) = non_empty(OPENAI_KEY_VAR) {
            self.openai_api_key = Some(key);
        }
    }

    /// Builds a client for every backend that has an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a configured
    /// endpoint is not a valid URL.
    pub fn classifiers(&self) -> anyhow::Result<Vec<ClassifierClient>> {
        let http_client = reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        let mut clients: Vec<ClassifierClient> = Vec::new();

        match &self.perspective_api_key {
            Some(key) => {
                let mut client = PerspectiveClient::new(key.as_str())?
                    .with_http_client(http_client.clone());
                if let Some(endpoint) = &self.perspective_endpoint {
                    client = client
                        .with_endpoint(endpoint)
                        .context("Invalid perspective_endpoint")?;
                }
                clients.push(client.into());
            }
            None => warn!("No Perspective API key configured; backend disabled"),
        }

        match &self.openai_api_key {
            Some(key) => {
                let mut client = OpenAiModerationClient::new(key.as_str())?
                    .with_http_client(http_client.clone());
                if let Some(endpoint) = &self.openai_endpoint {
                    client = client
                        .with_endpoint(endpoint)
                        .context("Invalid openai_endpoint")?;
                }
                if let Some(model) = &self.openai_model {
                    client = client.with_model(model.as_str());
                }
                clients.push(client.into());
            }
            None => warn!("No OpenAI API key configured; backend disabled"),
        }

        if self.chat_classifier {
            match &self.openai_api_key {
                Some(key) => clients.push(self.chat_client(key, http_client)?.into()),
                None => warn!("Chat classifier enabled without an OpenAI API key; backend disabled"),
            }
        }

        Ok(clients)
    }

    fn chat_client(
        &self,
        key: &str,
        http_client: reqwest::Client,
    ) -> anyhow::Result<ChatCompletionClient> {
        let mut client = ChatCompletionClient::new(key)?.with_http_client(http_client);
        if let Some(endpoint) = &self.chat_endpoint {
            client = client
                .with_endpoint(endpoint)
                .context("Invalid chat_endpoint")?;
        }
        if let Some(model) = &self.chat_model {
            client = client.with_model(model.as_str());
        }
        if let Some(organization) = &self.openai_organization {
            client = client.with_organization(organization.as_str());
        }
        Ok(client)
    }
}

/// Default location of the configuration file.
#[must_use]
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("modbot")
        .join("config.json")
}

/// Finds `--config <path>` in the command-line arguments.
#[must_use]
pub fn path_from_args(args: impl IntoIterator<Item = String>) -> Option<PathBuf> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

/// Loads the configuration.
///
/// An explicit `path` must exist. Without one, the default location is tried
/// and defaults are used if it is absent. API keys from the environment take
/// precedence over the file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load(path: Option<&Path>) -> anyhow::Result<BotConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (default_path(), false),
    };

    let mut config = if !required && !path.exists() {
        info!("No config file at {:?}; using defaults", path);
        BotConfig::default()
    } else {
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: BotConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from {:?}", path);
        config
    };

    config.apply_overrides(|var| std::env::var(var).ok());
    Ok(config)
}
