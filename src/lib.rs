//! Client for the NLUI conversational assistant server.
//!
//! The interesting part is the streaming path: chat turns, message edits
//! and regenerations return a `text/event-stream` body that is decoded
//! incrementally and handed to a [`sink::StreamSink`] event by event. The
//! remaining endpoints are plain JSON calls on [`client::NluiClient`].

pub mod adapters;
pub mod client;
pub mod config;
pub mod correlator;
pub mod error;
pub mod logging;
pub mod models;
pub mod prelude;
pub mod sink;
pub mod sse;
pub mod stream;
pub mod traits;
