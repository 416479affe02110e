//! `OpenAI` moderation endpoint.

use std::collections::BTreeMap;

use modbot_core::{Backend, CategoryScores};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default moderation endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/moderations";

/// `OpenAI` moderation client.
#[derive(Debug, Clone)]
pub struct OpenAiModerationClient {
    api_key: String,
    endpoint: Url,
    model: Option<String>,
    http_client: Client,
}

#[derive(Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    #[serde(default)]
    category_scores: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

impl OpenAiModerationClient {
    /// Creates a client for the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the default endpoint fails to parse.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            model: None,
            http_client: Client::new(),
        })
    }

    /// Sets the moderation endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)?;
        Ok(self)
    }

    /// Sets the moderation model; the service default is used otherwise.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Scores `text` for the hate and violence categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service rejects it or the
    /// body cannot be parsed.
    pub async fn moderate(&self, text: &str) -> Result<CategoryScores> {
        let request = ModerationRequest {
            input: text,
            model: self.model.as_deref(),
        };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &body));
        }
        parse_response(&body)
    }
}

/// Extracts the relevant category scores of the first result.
///
/// # Errors
///
/// Returns an error if the body is not a moderation response or has no
/// results.
pub fn parse_response(body: &str) -> Result<CategoryScores> {
    let response: ModerationResponse = serde_json::from_str(body)?;
    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidResponse("no moderation results".to_string()))?;

    let wanted = Backend::OpenAi.attributes();
    Ok(result
        .category_scores
        .into_iter()
        .filter(|(category, _)| wanted.contains(&category.as_str()))
        .collect())
}

/// Maps an error response body to an [`Error`].
#[must_use]
pub fn parse_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| body.to_string(), |b| b.error.message);
    Error::api(status, message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_keeps_relevant_categories() {
        let body = r#"{
            "id": "modr-1",
            "model": "omni-moderation-latest",
            "results": [{
                "flagged": true,
                "categories": {"hate": true, "violence": false},
                "category_scores": {
                    "hate": 0.88,
                    "hate/threatening": 0.02,
                    "violence": 0.1,
                    "sexual": 0.4
                }
            }]
        }"#;
        let scores = parse_response(body).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores.get("hate"), Some(0.88));
        assert_eq!(scores.get("sexual"), None);
    }

    #[test]
    fn test_parse_response_without_results() {
        let err = parse_response(r#"{"results": []}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_error() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let err = parse_error(401, body);
        assert_eq!(err.to_string(), "API error (401): Incorrect API key provided");
    }

    #[test]
    fn test_request_omits_default_model() {
        let request = ModerationRequest {
            input: "hi",
            model: None,
        };
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"input":"hi"}"#);
    }
}
