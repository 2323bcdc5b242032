//! Scripted provider for testing turn handling without network calls.
//!
//! Each call to [`Provider::chat_completion_stream`] consumes the next scripted
//! response. Requests are recorded, so tests can inspect the history that was
//! sent.
//!
//! ```ignore
//! use ai_llm::mock::MockProvider;
//!
//! let provider = MockProvider::new()
//!     .with_chunks(&["Hel", "lo"])
//!     .with_error("overloaded");
//! ```

use std::{collections::VecDeque, sync::Arc};

use ai_conversation::Delta;
use async_stream::stream;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    provider::{DeltaStream, Provider},
    types::request::ChatCompletion,
};

#[derive(Debug, Clone)]
struct Script {
    deltas: Vec<Delta>,

    /// Stay open after the deltas until cancelled.
    stall: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    requests: Arc<Mutex<Vec<ChatCompletion>>>,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response made of the given deltas.
    #[must_use]
    pub fn with_response(self, deltas: Vec<Delta>) -> Self {
        self.scripts.lock().push_back(Script {
            deltas,
            stall: false,
        });
        self
    }

    /// Queue a response streaming the given content fragments.
    #[must_use]
    pub fn with_chunks(self, chunks: &[&str]) -> Self {
        self.with_response(chunks.iter().map(|&c| Delta::content(c)).collect())
    }

    /// Queue a response that fails immediately.
    #[must_use]
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.with_response(vec![Delta::error(message)])
    }

    /// Queue a response that streams `deltas` and then never finishes.
    #[must_use]
    pub fn with_stalled(self, deltas: Vec<Delta>) -> Self {
        self.scripts.lock().push_back(Script {
            deltas,
            stall: true,
        });
        self
    }

    /// The requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatCompletion> {
        self.requests.lock().clone()
    }

    /// Number of scripted responses not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.scripts.lock().len()
    }
}

impl Provider for MockProvider {
    fn chat_completion_stream(
        &self,
        request: &ChatCompletion,
        cancel: CancellationToken,
    ) -> DeltaStream {
        self.requests.lock().push(request.clone());
        let script = self.scripts.lock().pop_front();

        Box::pin(stream! {
            let Some(Script { deltas, stall }) = script else {
                yield Delta::error("mock provider has no scripted response");
                return;
            };

            for delta in deltas {
                // Give the consumer a chance to cancel between deltas.
                tokio::task::yield_now().await;
                if cancel.is_cancelled() {
                    return;
                }

                yield delta;
            }

            if stall {
                cancel.cancelled().await;
            }
        })
    }
}
