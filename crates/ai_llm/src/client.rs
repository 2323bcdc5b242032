use std::{collections::HashMap, io, time::Duration};

use ai_conversation::Delta;
use async_stream::stream;
use futures::{StreamExt as _, TryStreamExt as _};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tokio_util::{
    codec::{FramedRead, LinesCodec},
    io::StreamReader,
    sync::CancellationToken,
};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::{
    auth::Token,
    error::{Error, Result},
    provider::{DeltaStream, Provider},
    retry::RetryConfig,
    sse::{EventDecoder, Frame},
    types::{request::ChatCompletion, response::Chunk},
};

#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Url,
    token: Option<Token>,
    retry: RetryConfig,
    idle_timeout: Option<Duration>,
    http_client: reqwest::Client,
}

impl Client {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            token: None,
            retry: RetryConfig::default(),
            idle_timeout: None,
            http_client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fail the stream when no data arrives for `timeout`.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout.filter(|d| !d.is_zero());
        self
    }

    /// Build HTTP headers required for making API calls.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            headers.insert(
                AUTHORIZATION,
                token
                    .header_value()
                    .parse()
                    .map_err(|e| Error::Config(format!("Invalid token header format: {e}")))?,
            );
        }

        Ok(headers)
    }

    /// Open the stream, retrying transient failures that happen before any
    /// data is received.
    async fn open(&self, request: &ChatCompletion) -> Result<reqwest::Response> {
        let mut attempt = 0;

        loop {
            match self.send(request).await {
                Ok(response) => return Ok(response),
                Err(error) if error.is_transient() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay(attempt);
                    warn!(
                        attempt,
                        max = self.retry.max_retries,
                        delay_ms = delay.as_millis(),
                        %error,
                        "Request failed. Retrying."
                    );

                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn send(&self, request: &ChatCompletion) -> Result<reqwest::Response> {
        let headers = self.build_headers()?;

        let redacted_headers = headers
            .iter()
            .map(|(k, v)| {
                if k == AUTHORIZATION {
                    return (k.to_string(), "[REDACTED]".to_string());
                }

                (k.to_string(), v.to_str().unwrap_or_default().to_owned())
            })
            .collect::<HashMap<_, _>>();

        trace!(
            url = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            headers = ?redacted_headers,
            "Triggering request."
        );

        let send = self
            .http_client
            .post(self.endpoint.clone())
            .headers(headers)
            .json(request)
            .send();

        let response = idle(self.idle_timeout, send)
            .await
            .ok_or_else(|| Error::Timeout(self.idle_timeout.unwrap_or_default()))??;

        trace!(
            status = response.status().as_u16(),
            content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .map(|v| v.to_str().unwrap_or_default()),
            "Received response."
        );

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(code, %body, "Unexpected response.");

            return Err(Error::Api {
                code,
                message: error_message(&body),
            });
        }

        Ok(response)
    }

    fn stream(&self, request: &ChatCompletion, cancel: CancellationToken) -> DeltaStream {
        let client = self.clone();
        let request = request.clone();

        Box::pin(stream! {
            let response = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("Request cancelled before the stream opened.");
                    return;
                }
                response = client.open(&request) => response,
            };

            let response = match response {
                Ok(response) => response,
                Err(error) => {
                    yield Delta::error(error.to_string());
                    return;
                }
            };

            // Some servers ignore `stream: true` and answer with one JSON
            // document.
            if !is_event_stream(&response) {
                let body = tokio::select! {
                    biased;
                    () = cancel.cancelled() => return,
                    body = idle(client.idle_timeout, response.text()) => body,
                };

                yield match body {
                    None => Delta::error(Error::Timeout(client.idle_timeout.unwrap_or_default()).to_string()),
                    Some(Ok(body)) => parse_chunk(&body),
                    Some(Err(error)) => Delta::error(Error::from(error).to_string()),
                };
                return;
            }

            let byte_stream = response.bytes_stream().map_err(io::Error::other);
            let mut lines = FramedRead::new(StreamReader::new(byte_stream), LinesCodec::new());
            let mut decoder = EventDecoder::new();

            loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("Stream cancelled.");
                        return;
                    }
                    next = idle(client.idle_timeout, lines.next()) => next,
                };

                let (frame, closed) = match next {
                    None => {
                        let timeout = client.idle_timeout.unwrap_or_default();
                        warn!(?timeout, "Stream stalled.");
                        yield Delta::error(Error::Timeout(timeout).to_string());
                        return;
                    }
                    Some(Some(Ok(line))) => (decoder.push_line(&line), false),
                    Some(Some(Err(error))) => {
                        yield Delta::error(Error::Stream(error.to_string()).to_string());
                        return;
                    }
                    Some(None) => (decoder.finish(), true),
                };

                match frame {
                    None => {}
                    Some(Frame::Done) => {
                        trace!("Received end-of-stream marker.");
                        return;
                    }
                    Some(Frame::Comment(_)) => yield Delta::Heartbeat,
                    Some(Frame::Data(data)) => {
                        let delta = parse_chunk(&data);
                        let failed = delta.is_error();
                        yield delta;

                        if failed {
                            return;
                        }
                    }
                }

                if closed {
                    trace!("Transport closed.");
                    return;
                }
            }
        })
    }
}

impl Provider for Client {
    fn chat_completion_stream(
        &self,
        request: &ChatCompletion,
        cancel: CancellationToken,
    ) -> DeltaStream {
        self.stream(request, cancel)
    }
}

/// Decode the data of one event into a delta.
///
/// Unparseable data is a malformed frame and ends the turn with an error.
pub fn parse_chunk(data: &str) -> Delta {
    match serde_json::from_str::<Chunk>(data) {
        Ok(chunk) => chunk.into(),
        Err(error) => {
            warn!(%error, data, "Malformed stream frame.");
            Delta::error(Error::Stream(format!("malformed frame: {error}")).to_string())
        }
    }
}

fn is_event_stream(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_none_or(|v| !v.starts_with("application/json"))
}

/// Extract a readable message from an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Chunk>(body)
        .ok()
        .and_then(|chunk| chunk.error)
        .map_or_else(|| body.trim().to_owned(), |error| error.message())
}

/// Await `future`, or return `None` once `timeout` elapses.
async fn idle<F: Future>(timeout: Option<Duration>, future: F) -> Option<F::Output> {
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, future).await.ok(),
        None => Some(future.await),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
