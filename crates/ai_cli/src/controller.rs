//! Drives one turn at a time: the user's prompt, the provider's stream, and
//! the re-renders in between.
//!
//! Hosts with their own event loop use the step API ([`Controller::start_turn`],
//! [`Controller::handle_delta`], [`Controller::finish_turn`]). Everyone else
//! calls [`Controller::submit`], which composes the three.

use ai_conversation::{Applied, Conversation, Delta, Role, Turn};
use ai_llm::{
    Provider,
    types::request::{ChatCompletion, history},
};
use ai_preview::RenderCache;
use ai_view::{Projector, Renderer};
use futures::StreamExt as _;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Ready for the next prompt.
    Idle,

    /// A request is outstanding, nothing received yet.
    AwaitingFirstDelta,

    /// Content is arriving.
    Streaming,

    /// The stream ended, the turn is being closed.
    Finalizing,

    /// The stream failed; the turn is closed with the error as content.
    Errored,
}

/// How a call to [`Controller::submit`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The prompt was empty. Nothing was appended or sent.
    Ignored,

    /// Another turn is still running.
    Rejected,

    Completed,

    /// The turn ended with this error text as its content.
    Errored(String),

    /// The turn was cancelled, and keeps whatever content arrived.
    Cancelled,
}

/// Whether to keep consuming the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub model: String,

    /// First turn of a fresh conversation.
    pub system_prompt: Option<String>,

    /// Marker after which an assistant turn summarizes itself.
    pub summary_marker: Option<String>,
}

#[derive(Debug)]
pub struct Controller<P, R> {
    provider: P,
    renderer: R,
    projector: Projector,
    conversation: Conversation,
    cache: RenderCache,
    settings: Settings,
    state: State,
}

impl<P: Provider, R: Renderer> Controller<P, R> {
    pub fn new(provider: P, renderer: R, settings: Settings) -> Self {
        let conversation = fresh(&settings);

        Self {
            provider,
            renderer,
            projector: Projector::new(),
            conversation,
            cache: RenderCache::new(),
            settings,
            state: State::Idle,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Submit `prompt` and stream the reply to completion.
    pub async fn submit(&mut self, prompt: &str, cancel: CancellationToken) -> Result<Outcome> {
        let request = match self.start_turn(prompt) {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(Outcome::Ignored),
            Err(Error::Busy) => return Ok(Outcome::Rejected),
            Err(error) => return Err(error),
        };

        let mut stream = self
            .provider
            .chat_completion_stream(&request, cancel.clone());

        while let Some(delta) = stream.next().await {
            match self.handle_delta(&delta) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(error) => {
                    self.finish_turn(cancel.is_cancelled())?;
                    return Err(error);
                }
            }
        }

        self.finish_turn(cancel.is_cancelled())
    }

    /// Append the user's turn and open an assistant turn.
    ///
    /// Returns the request to send, or `None` if the prompt is empty.
    pub fn start_turn(&mut self, prompt: &str) -> Result<Option<ChatCompletion>> {
        if self.state != State::Idle {
            debug!(state = ?self.state, "Submission rejected, a turn is running.");
            return Err(Error::Busy);
        }

        if !self.conversation.append_user_turn(prompt)? {
            trace!("Ignoring empty submission.");
            return Ok(None);
        }

        let messages = history(
            self.conversation.turns(),
            self.settings.summary_marker.as_deref(),
        );
        let request = ChatCompletion::new(&self.settings.model, messages);

        self.conversation.begin_assistant_turn()?;
        self.state = State::AwaitingFirstDelta;
        info!(
            model = %request.model,
            messages = request.messages.len(),
            "Starting turn."
        );

        self.render();
        Ok(Some(request))
    }

    /// Apply one delta from the stream.
    pub fn handle_delta(&mut self, delta: &Delta) -> Result<Flow> {
        match self.state {
            State::AwaitingFirstDelta | State::Streaming => {}
            State::Errored => {
                trace!(%delta, "Ignoring delta after error.");
                return Ok(Flow::Stop);
            }
            State::Idle | State::Finalizing => return Err(Error::NoTurn),
        }

        let applied = self.conversation.apply_delta(delta).map_err(|error| {
            error!(%error, "Delta applied without an active turn.");
            Error::from(error)
        })?;

        match applied {
            Applied::Ignored => Ok(Flow::Continue),
            Applied::Content => {
                self.state = State::Streaming;
                self.render();
                Ok(Flow::Continue)
            }
            Applied::Error => {
                warn!(%delta, "Turn failed.");
                self.state = State::Errored;
                self.render();
                Ok(Flow::Stop)
            }
        }
    }

    /// Close the active turn and return to [`State::Idle`].
    ///
    /// Completed and errored turns have their preview resolved. A cancelled
    /// turn is partial and stays out of the cache.
    pub fn finish_turn(&mut self, cancelled: bool) -> Result<Outcome> {
        let errored = match self.state {
            State::AwaitingFirstDelta | State::Streaming => false,
            State::Errored => true,
            State::Idle | State::Finalizing => return Err(Error::NoTurn),
        };

        self.state = State::Finalizing;
        self.conversation.end_turn();

        let content = self
            .conversation
            .last()
            .filter(|turn| turn.role() == Role::Assistant)
            .map(|turn| turn.content().to_owned())
            .unwrap_or_default();

        if errored || !cancelled {
            let preview = self.cache.resolve(&content);
            trace!(empty = preview.is_empty(), "Preview resolved.");
        }

        let outcome = if errored {
            Outcome::Errored(content)
        } else if cancelled {
            Outcome::Cancelled
        } else {
            Outcome::Completed
        };

        self.render();
        self.state = State::Idle;
        debug!(?outcome, "Turn finished.");

        Ok(outcome)
    }

    /// Replace the history with `turns`.
    pub fn load(&mut self, turns: Vec<Turn>) -> Result<()> {
        if self.state != State::Idle {
            return Err(Error::Busy);
        }

        self.conversation.replace(turns)?;
        info!(turns = self.conversation.len(), "Loaded conversation.");
        self.render();

        Ok(())
    }

    /// Start over with a fresh conversation.
    pub fn clear(&mut self) -> Result<()> {
        if self.state != State::Idle {
            return Err(Error::Busy);
        }

        self.conversation = fresh(&self.settings);
        self.render();

        Ok(())
    }

    /// Project the current state into the renderer. Renderer failures are
    /// logged and otherwise ignored.
    pub fn render(&mut self) {
        let tree = self.projector.project(&self.conversation, &self.cache);
        if let Err(error) = self.renderer.render(&tree) {
            warn!(%error, "Failed to render conversation.");
        }
    }
}

fn fresh(settings: &Settings) -> Conversation {
    settings
        .system_prompt
        .as_deref()
        .map_or_else(Conversation::new, Conversation::with_system)
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
