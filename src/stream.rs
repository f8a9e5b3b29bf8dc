//! Streaming call orchestration.
//!
//! A streaming call sends one request, checks the status, then drives the
//! body through a [`Pipeline`]:
//!
//! ```text
//! bytes -> LineSplitter -> FrameDecoder -> materialize -> correlator -> sink
//! ```
//!
//! The pipeline never awaits. The only suspension points are waiting for
//! the response head and for each body chunk, and both are raced against
//! cancellation and the call deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tracing::Instrument;

use crate::config::{ClientConfig, DonePolicy, FramePolicy};
use crate::correlator::ConversationCorrelator;
use crate::error::{ClientError, ClientResult};
use crate::models::Message;
use crate::sink::StreamSink;
use crate::sse::{materialize, try_materialize, Frame, FrameDecoder, LineSplitter};
use crate::traits::{HttpClient, HttpError, HttpRequest};

/// Upper bound on how much of a non-2xx body is read for its message.
const ERROR_BODY_LIMIT: usize = 8 * 1024;
/// How long a non-2xx body may take before the status is reported anyway.
const ERROR_BODY_WAIT: Duration = Duration::from_secs(2);

/// The three calls whose response is an event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOperation {
    /// New or continuing chat turn
    Chat,
    /// Replace a message and re-run from it
    EditMessage,
    /// Re-run from a message index
    Regenerate,
}

impl StreamOperation {
    pub fn name(&self) -> &'static str {
        match self {
            StreamOperation::Chat => "chat",
            StreamOperation::EditMessage => "edit_message",
            StreamOperation::Regenerate => "regenerate",
        }
    }

    /// Only a chat turn can start a conversation the caller does not know.
    pub fn requires_conversation_id(&self) -> bool {
        matches!(self, StreamOperation::Chat)
    }
}

/// Successful end of a streaming call.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamCompletion {
    /// From the last `done` event carrying one. None means unknown.
    pub conversation_id: Option<String>,
    /// From the `session` event, needed for stop and tool confirmation
    pub session_id: Option<String>,
    pub events_delivered: usize,
    /// Client-side snapshot of the turn, not authoritative history
    pub transcript: Vec<Message>,
}

pub type StreamOutcome = ClientResult<StreamCompletion>;

/// Cancels a streaming call from anywhere. Clones share the same signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Every handle is gone, so nobody can cancel any more.
            std::future::pending::<()>().await;
        }
    }
}

/// Everything needed to run one streaming call.
#[derive(Debug)]
pub struct StreamCall {
    pub operation: StreamOperation,
    pub request: HttpRequest,
    pub correlator: ConversationCorrelator,
    pub cancel: Option<CancelHandle>,
}

impl StreamCall {
    pub fn new(operation: StreamOperation, request: HttpRequest) -> Self {
        Self {
            operation,
            request,
            correlator: ConversationCorrelator::new(),
            cancel: None,
        }
    }

    pub fn with_correlator(mut self, correlator: ConversationCorrelator) -> Self {
        self.correlator = correlator;
        self
    }

    pub fn with_cancel(mut self, cancel: Option<CancelHandle>) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Pure decode state for one response body.
pub struct Pipeline<'s, S: StreamSink + ?Sized> {
    lines: LineSplitter,
    decoder: FrameDecoder,
    correlator: ConversationCorrelator,
    sink: &'s mut S,
    frame_policy: FramePolicy,
    delivered: usize,
}

impl<'s, S: StreamSink + ?Sized> Pipeline<'s, S> {
    pub fn new(correlator: ConversationCorrelator, sink: &'s mut S, frame_policy: FramePolicy) -> Self {
        Self {
            lines: LineSplitter::new(),
            decoder: FrameDecoder::new(),
            correlator,
            sink,
            frame_policy,
            delivered: 0,
        }
    }

    /// Feed one body chunk, delivering every event it completes.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> ClientResult<()> {
        for line in self.lines.push(chunk) {
            if let Some(frame) = self.decoder.feed_line(&line) {
                self.deliver(frame)?;
            }
        }
        Ok(())
    }

    /// End of body. An unterminated trailing frame is only delivered when
    /// `flush_trailing` is set.
    pub fn finish(&mut self, flush_trailing: bool) -> ClientResult<()> {
        if flush_trailing {
            if let Some(line) = self.lines.finish() {
                if let Some(frame) = self.decoder.feed_line(&line) {
                    self.deliver(frame)?;
                }
            }
            if let Some(frame) = self.decoder.finish() {
                self.deliver(frame)?;
            }
        } else if self.decoder.has_pending() || self.lines.pending_len() > 0 {
            tracing::debug!("Stream ended inside a frame, discarding the remainder");
        }
        Ok(())
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn correlator(&self) -> &ConversationCorrelator {
        &self.correlator
    }

    pub fn into_correlator(self) -> ConversationCorrelator {
        self.correlator
    }

    fn deliver(&mut self, frame: Frame) -> ClientResult<()> {
        let event = match self.frame_policy {
            FramePolicy::Skip => match materialize(&frame) {
                Some(event) => event,
                None => return Ok(()),
            },
            FramePolicy::Strict => try_materialize(&frame)?,
        };
        self.correlator.observe(&event);
        self.sink.on_event(event);
        self.delivered += 1;
        Ok(())
    }
}

/// Run one streaming call to completion.
///
/// On failure the sink's `on_error` is called exactly once with the error
/// the outcome resolves with. Events delivered before a failure are not
/// retracted.
pub async fn run_stream<C, S>(
    http: &C,
    config: &ClientConfig,
    call: StreamCall,
    sink: &mut S,
) -> StreamOutcome
where
    C: HttpClient + ?Sized,
    S: StreamSink + ?Sized,
{
    let span = tracing::info_span!(
        "stream",
        operation = call.operation.name(),
        url = %call.request.url
    );

    async move {
        let StreamCall {
            operation,
            request,
            correlator,
            cancel,
        } = call;

        tracing::debug!("Opening stream");
        let work = drive(http, config, operation, request, correlator, &mut *sink);
        let result = guarded(work, config.timeout, cancel.as_ref().map(CancelHandle::token)).await;

        match result {
            Ok(completion) => {
                tracing::info!(
                    conversation_id = completion.conversation_id.as_deref().unwrap_or("-"),
                    events = completion.events_delivered,
                    "Stream completed"
                );
                Ok(completion)
            }
            Err(err) => {
                match &err {
                    ClientError::Cancelled => tracing::info!("Stream cancelled"),
                    other => tracing::warn!(code = other.error_code(), "Stream failed: {}", other),
                }
                sink.on_error(&err);
                Err(err)
            }
        }
    }
    .instrument(span)
    .await
}

/// Race the work against cancellation and the deadline.
async fn guarded<F>(work: F, timeout: Option<Duration>, cancel: Option<CancelToken>) -> StreamOutcome
where
    F: Future<Output = StreamOutcome>,
{
    let cancelled = async move {
        match cancel {
            Some(mut token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };

    let bounded = async move {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Transport(HttpError::Timeout(format!(
                    "no completion within {}s",
                    limit.as_secs_f64()
                )))),
            },
            None => work.await,
        }
    };

    tokio::select! {
        biased;
        _ = cancelled => Err(ClientError::Cancelled),
        result = bounded => result,
    }
}

async fn drive<C, S>(
    http: &C,
    config: &ClientConfig,
    operation: StreamOperation,
    request: HttpRequest,
    correlator: ConversationCorrelator,
    sink: &mut S,
) -> StreamOutcome
where
    C: HttpClient + ?Sized,
    S: StreamSink + ?Sized,
{
    let response = http.send_streaming(request).await?;

    if !response.is_success() {
        let status = response.status;
        let body = response
            .read_prefix(ERROR_BODY_LIMIT, ERROR_BODY_WAIT)
            .await;
        return Err(ClientError::from_status(status, &body));
    }

    let mut body = response.body;
    let mut pipeline = Pipeline::new(correlator, sink, config.frame_policy);
    while let Some(chunk) = body.next().await {
        pipeline.push_chunk(&chunk?)?;
    }
    pipeline.finish(config.flush_trailing_frame)?;

    let events_delivered = pipeline.delivered();
    let correlator = pipeline.into_correlator();
    let conversation_id = correlator.conversation_id().map(str::to_string);

    if conversation_id.is_none() && operation.requires_conversation_id() {
        match config.done_policy {
            DonePolicy::Strict => return Err(ClientError::MissingConversationId),
            DonePolicy::Lenient => {
                tracing::debug!("Stream ended without a conversation id")
            }
        }
    }

    Ok(StreamCompletion {
        conversation_id,
        session_id: correlator.session_id().map(str::to_string),
        events_delivered,
        transcript: correlator.into_transcript(),
    })
}
