//! # modbot-scoring
//!
//! HTTP clients for the toxicity classifiers used to file automatic reports.
//!
//! ## Backends
//!
//! - **Google Perspective**: `IDENTITY_ATTACK`, `INSULT` and `THREAT` summary scores
//! - **`OpenAI` moderation**: `hate`, `hate/threatening` and `violence` category scores
//! - **`OpenAI` chat completion**: a `violent` / `hateful` / not threatening label
//!
//! ## Usage
//!
//! ```ignore
//! use std::time::Duration;
//! use modbot_core::AutoFlagger;
//! use modbot_scoring::{ClassifierClient, PerspectiveClient, score_all};
//!
//! let clients = vec![ClassifierClient::from(PerspectiveClient::new("key")?)];
//! let outcomes = score_all(&clients, "some message", Duration::from_secs(5)).await;
//! let verdict = AutoFlagger::default().evaluate(outcomes);
//! ```
//!
//! Every call is bounded by a timeout. A failed or slow backend yields no
//! score rather than an error, so one outage never blocks the others.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod chat;
mod classifier;
mod error;
pub mod openai;
pub mod perspective;

pub use chat::ChatCompletionClient;
pub use classifier::{Classifier, ClassifierClient, score_all, score_with};
pub use error::{Error, Result};
pub use openai::OpenAiModerationClient;
pub use perspective::PerspectiveClient;
