//! Google Perspective comment analyzer.

use std::collections::BTreeMap;

use modbot_core::{Backend, CategoryScores};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default analyze endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze";

const LANGUAGE_NOT_SUPPORTED: &str = "LANGUAGE_NOT_SUPPORTED_BY_ATTRIBUTE";

/// Perspective API client.
#[derive(Debug, Clone)]
pub struct PerspectiveClient {
    api_key: String,
    endpoint: Url,
    http_client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    comment: Comment<'a>,
    requested_attributes: BTreeMap<&'static str, Empty>,
}

#[derive(Serialize)]
struct Comment<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Empty {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    attribute_scores: BTreeMap<String, AttributeScore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f64,
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

impl PerspectiveClient {
    /// Creates a client for the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the default endpoint fails to parse.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            http_client: Client::new(),
        })
    }

    /// Sets the analyze endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Url::parse(endpoint)?;
        Ok(self)
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Scores `text` for the Perspective attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service rejects it or the
    /// body cannot be parsed.
    pub async fn analyze(&self, text: &str) -> Result<CategoryScores> {
        let request = AnalyzeRequest {
            comment: Comment { text },
            requested_attributes: Backend::Perspective
                .attributes()
                .iter()
                .map(|attribute| (*attribute, Empty {}))
                .collect(),
        };

        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self.http_client.post(url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &body));
        }
        parse_response(&body)
    }
}

/// Extracts summary scores from an analyze response body.
///
/// # Errors
///
/// Returns an error if the body is not a valid analyze response.
pub fn parse_response(body: &str) -> Result<CategoryScores> {
    let response: AnalyzeResponse = serde_json::from_str(body)?;
    Ok(response
        .attribute_scores
        .into_iter()
        .map(|(attribute, score)| (attribute, score.summary_score.value))
        .collect())
}

/// Maps an error response body to an [`Error`].
#[must_use]
pub fn parse_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| body.to_string(), |b| b.error.message);
    if body.contains(LANGUAGE_NOT_SUPPORTED) {
        Error::UnsupportedLanguage(message)
    } else {
        Error::api(status, message)
    }
}
