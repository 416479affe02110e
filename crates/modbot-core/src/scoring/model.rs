//! Classifier scores and the models that combine them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A classifier backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Google Perspective comment analyzer.
    Perspective,
    /// `OpenAI` moderation endpoint.
    OpenAi,
    /// `OpenAI` chat completion prompted to label the text.
    ChatCompletion,
}

impl Backend {
    /// All backends in menu order.
    pub const ALL: [Self; 3] = [Self::Perspective, Self::OpenAi, Self::ChatCompletion];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perspective => "Google Perspective",
            Self::OpenAi => "OpenAI Moderation",
            Self::ChatCompletion => "OpenAI Chat Completion",
        }
    }

    /// Attributes requested from the backend.
    #[must_use]
    pub const fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::Perspective => &["IDENTITY_ATTACK", "INSULT", "THREAT"],
            Self::OpenAi => &["hate", "hate/threatening", "violence"],
            Self::ChatCompletion => &["violent", "hateful"],
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-attribute probabilities returned by one backend for one text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryScores(BTreeMap<String, f64>);

impl CategoryScores {
    /// Creates an empty score set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a probability, clamped to `[0, 1]`. Non-finite values are
    /// dropped.
    pub fn insert(&mut self, attribute: impl Into<String>, probability: f64) {
        if probability.is_finite() {
            self.0.insert(attribute.into(), probability.clamp(0.0, 1.0));
        }
    }

    /// Probability for `attribute`, if scored.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<f64> {
        self.0.get(attribute).copied()
    }

    /// Iterates over `(attribute, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of scored attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for CategoryScores {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut scores = Self::new();
        for (attribute, probability) in iter {
            scores.insert(attribute, probability);
        }
        scores
    }
}

/// Turns a backend's attribute scores into one abuse probability.
pub trait ToxicityModel: Send + Sync {
    /// Probability in `[0, 1]` that the scored text is abusive.
    fn probability(&self, scores: &CategoryScores) -> f64;
}

impl<F> ToxicityModel for F
where
    F: Fn(&CategoryScores) -> f64 + Send + Sync,
{
    fn probability(&self, scores: &CategoryScores) -> f64 {
        self(scores)
    }
}

/// Logistic regression over attribute scores.
///
/// `p = sigmoid(intercept + Σ coefficient[a] · score[a])`. Attributes without
/// a coefficient contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Bias term.
    pub intercept: f64,
    /// Weight per attribute.
    pub coefficients: BTreeMap<String, f64>,
}

impl LogisticModel {
    /// Creates a model from its parameters.
    #[must_use]
    pub fn new<K: Into<String>>(
        intercept: f64,
        coefficients: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        Self {
            intercept,
            coefficients: coefficients
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        }
    }

    /// Coefficients fitted on FRENK hate-speech validation data against
    /// Perspective scores.
    #[must_use]
    pub fn perspective() -> Self {
        Self::new(
            -1.843_063_046_112_737_5,
            [
                ("INSULT", 3.066_504_960_519_858_4),
                ("IDENTITY_ATTACK", 0.211_952_430_810_363_08),
                ("THREAT", 0.162_394_768_639_239_74),
            ],
        )
    }

    /// Coefficients fitted on FRENK hate-speech validation data against
    /// `OpenAI` moderation scores.
    #[must_use]
    pub fn openai() -> Self {
        Self::new(
            -1.694_951_695_538_606_8,
            [
                ("hate", 2.514_414_538_130_454),
                ("hate/threatening", -0.118_701_101_562_458_99),
                ("violence", -0.704_072_777_629_372_6),
            ],
        )
    }

    /// The fitted model for `backend`, if one was trained for it.
    #[must_use]
    pub fn for_backend(backend: Backend) -> Option<Self> {
        match backend {
            Backend::Perspective => Some(Self::perspective()),
            Backend::OpenAi => Some(Self::openai()),
            Backend::ChatCompletion => None,
        }
    }

    /// The linear term before the sigmoid.
    #[must_use]
    pub fn logit(&self, scores: &CategoryScores) -> f64 {
        self.intercept
            + scores
                .iter()
                .filter_map(|(attribute, score)| {
                    self.coefficients.get(attribute).map(|weight| weight * score)
                })
                .sum::<f64>()
    }
}

impl ToxicityModel for LogisticModel {
    fn probability(&self, scores: &CategoryScores) -> f64 {
        sigmoid(self.logit(scores))
    }
}

/// Takes the highest attribute score as the probability.
///
/// Suits backends that answer with a label rather than calibrated scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaxScoreModel;

impl ToxicityModel for MaxScoreModel {
    fn probability(&self, scores: &CategoryScores) -> f64 {
        scores.iter().map(|(_, score)| score).fold(0.0, f64::max)
    }
}

/// The default model for `backend`.
#[must_use]
pub fn default_model(backend: Backend) -> Box<dyn ToxicityModel> {
    match LogisticModel::for_backend(backend) {
        Some(model) => Box::new(model),
        None => Box::new(MaxScoreModel),
    }
}

/// The logistic function.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
