//! A common interface over the classifier backends.

use std::future::Future;
use std::time::Duration;

use modbot_core::{Backend, CategoryScores};
use tracing::{debug, warn};

use crate::chat::ChatCompletionClient;
use crate::error::{Error, Result};
use crate::openai::OpenAiModerationClient;
use crate::perspective::PerspectiveClient;

/// Something that scores text for abuse.
pub trait Classifier {
    /// Which backend this is.
    fn backend(&self) -> Backend;

    /// Scores `text`.
    fn score(&self, text: &str) -> impl Future<Output = Result<CategoryScores>> + Send;
}

impl Classifier for PerspectiveClient {
    fn backend(&self) -> Backend {
        Backend::Perspective
    }

    fn score(&self, text: &str) -> impl Future<Output = Result<CategoryScores>> + Send {
        self.analyze(text)
    }
}

impl Classifier for OpenAiModerationClient {
    fn backend(&self) -> Backend {
        Backend::OpenAi
    }

    fn score(&self, text: &str) -> impl Future<Output = Result<CategoryScores>> + Send {
        self.moderate(text)
    }
}

impl Classifier for ChatCompletionClient {
    fn backend(&self) -> Backend {
        Backend::ChatCompletion
    }

    fn score(&self, text: &str) -> impl Future<Output = Result<CategoryScores>> + Send {
        self.classify(text)
    }
}

/// Any configured classifier.
#[derive(Debug, Clone)]
pub enum ClassifierClient {
    /// Google Perspective.
    Perspective(PerspectiveClient),
    /// `OpenAI` moderation.
    OpenAi(OpenAiModerationClient),
    /// `OpenAI` chat completion labels.
    ChatCompletion(ChatCompletionClient),
}

impl Classifier for ClassifierClient {
    fn backend(&self) -> Backend {
        match self {
            Self::Perspective(client) => client.backend(),
            Self::OpenAi(client) => client.backend(),
            Self::ChatCompletion(client) => client.backend(),
        }
    }

    async fn score(&self, text: &str) -> Result<CategoryScores> {
        match self {
            Self::Perspective(client) => client.analyze(text).await,
            Self::OpenAi(client) => client.moderate(text).await,
            Self::ChatCompletion(client) => client.classify(text).await,
        }
    }
}

impl From<PerspectiveClient> for ClassifierClient {
    fn from(client: PerspectiveClient) -> Self {
        Self::Perspective(client)
    }
}

impl From<OpenAiModerationClient> for ClassifierClient {
    fn from(client: OpenAiModerationClient) -> Self {
        Self::OpenAi(client)
    }
}

impl From<ChatCompletionClient> for ClassifierClient {
    fn from(client: ChatCompletionClient) -> Self {
        Self::ChatCompletion(client)
    }
}

/// Scores `text` with one classifier, bounded by `limit`.
///
/// # Errors
///
/// Returns the classifier's error, or [`Error::Timeout`] if it took too long.
pub async fn score_with<C: Classifier + Sync>(
    classifier: &C,
    text: &str,
    limit: Duration,
) -> Result<CategoryScores> {
    tokio::time::timeout(limit, classifier.score(text))
        .await
        .map_err(|_| Error::Timeout(limit))?
}

/// Scores `text` with every classifier.
///
/// Failures are logged and reported as `None`; they never abort the other
/// backends.
pub async fn score_all<C: Classifier + Sync>(
    classifiers: &[C],
    text: &str,
    limit: Duration,
) -> Vec<(Backend, Option<CategoryScores>)> {
    let mut outcomes = Vec::with_capacity(classifiers.len());
    for classifier in classifiers {
        let backend = classifier.backend();
        let scores = match score_with(classifier, text, limit).await {
            Ok(scores) => {
                debug!(%backend, attributes = scores.len(), "text scored");
                Some(scores)
            }
            Err(e) => {
                warn!(%backend, error = %e, "no score available");
                None
            }
        };
        outcomes.push((backend, scores));
    }
    outcomes
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Fixed(Backend, Option<f64>);

    impl Classifier for Fixed {
        fn backend(&self) -> Backend {
            self.0
        }

        async fn score(&self, _text: &str) -> Result<CategoryScores> {
            match self.1 {
                Some(p) => Ok([("INSULT", p)].into_iter().collect()),
                None => Err(Error::UnsupportedLanguage("xx".to_string())),
            }
        }
    }

    struct Slow;

    impl Classifier for Slow {
        fn backend(&self) -> Backend {
            Backend::OpenAi
        }

        async fn score(&self, _text: &str) -> Result<CategoryScores> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(CategoryScores::new())
        }
    }

    #[tokio::test]
    async fn test_failures_become_none() {
        let classifiers = [Fixed(Backend::Perspective, Some(0.9)), Fixed(Backend::OpenAi, None)];
        let outcomes = score_all(&classifiers, "text", Duration::from_secs(1)).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].1.as_ref().unwrap().get("INSULT"), Some(0.9));
        assert_eq!(outcomes[1], (Backend::OpenAi, None));
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = score_with(&Slow, "text", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[test]
    fn test_client_enum_reports_backend() {
        let client: ClassifierClient = PerspectiveClient::new("key").unwrap().into();
        assert_eq!(client.backend(), Backend::Perspective);
        let client: ClassifierClient = OpenAiModerationClient::new("key").unwrap().into();
        assert_eq!(client.backend(), Backend::OpenAi);
        let client: ClassifierClient = ChatCompletionClient::new("key").unwrap().into();
        assert_eq!(client.backend(), Backend::ChatCompletion);
    }

    #[test]
    fn test_score_all_with_no_classifiers() {
        let outcomes = tokio_test::block_on(score_all::<Fixed>(&[], "text", Duration::from_secs(1)));
        assert!(outcomes.is_empty());
    }
}
