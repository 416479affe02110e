//! Classifier scores and the automatic-report decision.
//!
//! The HTTP classifiers live in `modbot-scoring`; this module only knows how
//! to combine their outputs. A backend that failed, timed out or returned no
//! attributes is treated as "no score" and left out of the decision.

mod model;

pub use model::{
    Backend, CategoryScores, LogisticModel, MaxScoreModel, ToxicityModel, default_model, sigmoid,
};

use std::collections::BTreeMap;

use tracing::debug;

/// Default probability at or above which a message is reported automatically.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// The outcome of scoring one message with every backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Verdict {
    /// Combined probability for each backend that produced a score.
    pub probabilities: BTreeMap<Backend, f64>,
    /// Whether any backend reached the threshold.
    pub flagged: bool,
}

impl Verdict {
    /// Returns `true` if no backend produced a score.
    #[must_use]
    pub fn is_unscored(&self) -> bool {
        self.probabilities.is_empty()
    }
}

/// Decides whether a message should be reported automatically.
pub struct AutoFlagger {
    threshold: f64,
    models: BTreeMap<Backend, Box<dyn ToxicityModel>>,
}

impl std::fmt::Debug for AutoFlagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoFlagger")
            .field("threshold", &self.threshold)
            .field("backends", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for AutoFlagger {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl AutoFlagger {
    /// Creates a flagger using [`default_model`] for every backend.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        let models = Backend::ALL
            .into_iter()
            .map(|backend| (backend, default_model(backend)))
            .collect();
        Self { threshold, models }
    }

    /// Replaces the model used for `backend`.
    #[must_use]
    pub fn with_model(mut self, backend: Backend, model: impl ToxicityModel + 'static) -> Self {
        self.models.insert(backend, Box::new(model));
        self
    }

    /// The configured threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Combines per-backend outcomes into a verdict.
    ///
    /// `None` and empty score sets are skipped, as are backends without a
    /// model.
    pub fn evaluate<I>(&self, outcomes: I) -> Verdict
    where
        I: IntoIterator<Item = (Backend, Option<CategoryScores>)>,
    {
        let mut verdict = Verdict::default();
        for (backend, scores) in outcomes {
            let Some(scores) = scores.filter(|s| !s.is_empty()) else {
                debug!(%backend, "no score available");
                continue;
            };
            let Some(model) = self.models.get(&backend) else {
                continue;
            };
            let probability = model.probability(&scores).clamp(0.0, 1.0);
            verdict.probabilities.insert(backend, probability);
            verdict.flagged |= probability >= self.threshold;
        }
        verdict
    }
}
