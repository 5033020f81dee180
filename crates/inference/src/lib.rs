//! Deadline-bounded text generation.
//!
//! A [`TextGenerator`] hands back a lazy stream of text fragments. The
//! [`BoundedRunner`] drains that stream under a wall-clock deadline and
//! resolves to exactly one [`GenerationOutcome`]:
//!
//! - `Completed(text)` once the stream ends normally, with the fragments
//!   concatenated and otherwise untouched;
//! - `TimedOut` when the deadline passes first. The generator's cancellation token
//!   fires, the stream is dropped, and partial text is thrown away;
//! - `Failed(reason)` for any other generator error. Nothing is retried here.
//!
//! Cancellation is cooperative (a [`CancellationToken`]) so generators can be
//! thread-backed or purely async.
//!
//! ```
//! use inference::{BoundedRunner, GenerationOutcome, SamplingConfig, Script, ScriptedGenerator};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let generator = Arc::new(ScriptedGenerator::new(Script::complete(["Result:", " 42"])));
//! let runner = BoundedRunner::new(generator);
//! let outcome = runner
//!     .run("What is six times seven?", &SamplingConfig::default(), Duration::from_secs(20))
//!     .await;
//! assert_eq!(outcome, GenerationOutcome::Completed("Result: 42".into()));
//! # }
//! ```

pub mod serde_millis;

mod error;
mod generator;
mod llama_server;
mod runner;
mod scripted;
mod types;

pub use tokio_util::sync::CancellationToken;

pub use crate::error::GenerationError;
pub use crate::generator::{FragmentStream, TextGenerator};
pub use crate::llama_server::{LlamaServerConfig, LlamaServerGenerator};
pub use crate::runner::{run_bounded, BoundedRunner};
pub use crate::scripted::{Script, ScriptEnding, ScriptedGenerator};
pub use crate::types::{GenerationOutcome, GenerationRequest, SamplingConfig, DEFAULT_DEADLINE};
