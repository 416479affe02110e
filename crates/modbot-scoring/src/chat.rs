//! `OpenAI` chat completion used as a labelling classifier.
//!
//! The model is asked to answer with one of three labels. The label is
//! turned into one-hot scores for the `violent` and `hateful` attributes, so
//! "not threatening" scores zero on both.

use modbot_core::{Backend, CategoryScores};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::openai::parse_error;

/// Default chat completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const SYSTEM_PROMPT: &str = "You are a content moderation system. Classify each input as \
either violent speech, hateful speech, or not threatening.";

/// A label returned by the chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Violent speech.
    Violent,
    /// Hateful speech.
    Hateful,
    /// Neither.
    NotThreatening,
}

impl Label {
    /// Reads the label out of the model's free-text answer.
    ///
    /// "not threatening" is checked first since answers often restate the
    /// whole list of options.
    #[must_use]
    pub fn from_answer(answer: &str) -> Option<Self> {
        let answer = answer.to_lowercase();
        if answer.contains("not threatening") {
            Some(Self::NotThreatening)
        } else if answer.contains("violent") {
            Some(Self::Violent)
        } else if answer.contains("hateful") {
            Some(Self::Hateful)
        } else {
            None
        }
    }

    /// One-hot scores over the chat backend's attributes.
    #[must_use]
    pub fn scores(self) -> CategoryScores {
        let [violent, hateful] = match self {
            Self::Violent => [1.0, 0.0],
            Self::Hateful => [0.0, 1.0],
            Self::NotThreatening => [0.0, 0.0],
        };
        Backend::ChatCompletion
            .attributes()
            .iter()
            .copied()
            .zip([violent, hateful])
            .collect()
    }
}

/// Chat completion client.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    api_key: String,
    endpoint: Url,
    model: String,
    organization: Option<String>,
    http_client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AnswerMessage,
}

#[derive(Deserialize)]
struct AnswerMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionClient {
    /// Creates a client for the public endpoint and [`DEFAULT_MODEL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the default endpoint fails to parse.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            model: DEFAULT_MODEL.to_string(),
            organization: None,
            http_client: Client::new(),
        })
    }

    /// Sets the chat completion endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)?;
        Ok(self)
    }

    /// Sets the chat model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sends requests on behalf of `organization`.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Asks the model to label `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service rejects it or the
    /// answer carries no recognisable label.
    pub async fn classify(&self, text: &str) -> Result<CategoryScores> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let mut builder = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request);
        if let Some(organization) = &self.organization {
            builder = builder.header("OpenAI-Organization", organization);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &body));
        }
        parse_response(&body).map(Label::scores)
    }
}

/// Extracts the label from the first choice.
///
/// # Errors
///
/// Returns an error if the body is not a chat completion or its answer has
/// no recognisable label.
pub fn parse_response(body: &str) -> Result<Label> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let answer = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::InvalidResponse("no chat completion choices".to_string()))?;

    Label::from_answer(&answer)
        .ok_or_else(|| Error::InvalidResponse(format!("unrecognised label: {answer}")))
}
