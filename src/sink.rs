//! Where a streaming call delivers its events.
//!
//! A sink is driven synchronously from the call's read loop: one
//! `on_event` per materialized event, in arrival order, and at most one
//! `on_error` when the call fails. Nothing is buffered between the decoder
//! and the sink.

use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::sse::ChatEvent;

/// Receiver of one streaming call's events.
pub trait StreamSink: Send {
    fn on_event(&mut self, event: ChatEvent);

    /// Called once, before the call resolves with the same error.
    fn on_error(&mut self, error: &ClientError) {
        let _ = error;
    }
}

impl<S: StreamSink + ?Sized> StreamSink for &mut S {
    fn on_event(&mut self, event: ChatEvent) {
        (**self).on_event(event)
    }

    fn on_error(&mut self, error: &ClientError) {
        (**self).on_error(error)
    }
}

impl<S: StreamSink + ?Sized> StreamSink for Box<S> {
    fn on_event(&mut self, event: ChatEvent) {
        (**self).on_event(event)
    }

    fn on_error(&mut self, error: &ClientError) {
        (**self).on_error(error)
    }
}

fn ignore_error(_: &ClientError) {}

/// Closure-backed sink.
///
/// ```ignore
/// let sink = CallbackSink::new(|event| print!("{}", event.delta().unwrap_or("")))
///     .with_error_handler(|err| eprintln!("stream failed: {}", err));
/// ```
pub struct CallbackSink<E, X> {
    on_event: E,
    on_error: X,
}

impl<E> CallbackSink<E, fn(&ClientError)>
where
    E: FnMut(ChatEvent) + Send,
{
    pub fn new(on_event: E) -> Self {
        Self {
            on_event,
            on_error: ignore_error,
        }
    }
}

impl<E, X> CallbackSink<E, X> {
    pub fn with_error_handler<Y>(self, on_error: Y) -> CallbackSink<E, Y>
    where
        Y: FnMut(&ClientError) + Send,
    {
        CallbackSink {
            on_event: self.on_event,
            on_error,
        }
    }
}

impl<E, X> StreamSink for CallbackSink<E, X>
where
    E: FnMut(ChatEvent) + Send,
    X: FnMut(&ClientError) + Send,
{
    fn on_event(&mut self, event: ChatEvent) {
        (self.on_event)(event)
    }

    fn on_error(&mut self, error: &ClientError) {
        (self.on_error)(error)
    }
}

/// Item forwarded by [`ChannelSink`].
#[derive(Debug, Clone)]
pub enum StreamMessage {
    Event(ChatEvent),
    Error(ClientError),
}

/// Forwards everything to an unbounded channel, for consumers running on
/// another task. A dropped receiver is not an error for the stream.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamMessage>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<StreamMessage>) -> Self {
        Self { tx }
    }

    /// Sink plus the receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StreamSink for ChannelSink {
    fn on_event(&mut self, event: ChatEvent) {
        if self.tx.send(StreamMessage::Event(event)).is_err() {
            tracing::trace!("Stream receiver dropped, discarding event");
        }
    }

    fn on_error(&mut self, error: &ClientError) {
        let _ = self.tx.send(StreamMessage::Error(error.clone()));
    }
}

/// Keeps everything it receives. Mostly useful in tests.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub events: Vec<ChatEvent>,
    pub errors: Vec<ClientError>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_types(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.event_type.as_str()).collect()
    }

    /// Concatenated `content_delta` text.
    pub fn streamed_text(&self) -> String {
        self.events.iter().filter_map(ChatEvent::delta).collect()
    }
}

impl StreamSink for CollectingSink {
    fn on_event(&mut self, event: ChatEvent) {
        self.events.push(event);
    }

    fn on_error(&mut self, error: &ClientError) {
        self.errors.push(error.clone());
    }
}

/// Discards events. For callers that only want the outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StreamSink for NullSink {
    fn on_event(&mut self, _event: ChatEvent) {}
}
