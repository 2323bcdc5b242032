use std::pin::Pin;

use ai_conversation::Delta;
use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::types::request::ChatCompletion;

/// A lazy, finite stream of deltas in arrival order.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Delta> + Send>>;

/// Something that can answer a chat completion request with a delta stream.
///
/// Failures are reported in-band: the stream yields a single
/// [`Delta::Error`] and ends. Once `cancel` fires, the stream ends at its next
/// suspension point without yielding anything else.
pub trait Provider: std::fmt::Debug + Send + Sync {
    fn chat_completion_stream(
        &self,
        request: &ChatCompletion,
        cancel: CancellationToken,
    ) -> DeltaStream;
}
