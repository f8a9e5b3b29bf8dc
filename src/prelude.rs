//! Common imports.
//!
//! ```ignore
//! use nlui_client::prelude::*;
//! ```

pub use crate::client::NluiClient;
pub use crate::config::{ClientConfig, DonePolicy, FramePolicy};
pub use crate::error::{ClientError, ClientResult};
pub use crate::models::{Conversation, Message};
pub use crate::sink::{CallbackSink, ChannelSink, CollectingSink, StreamMessage, StreamSink};
pub use crate::sse::{ChatEvent, EventKind};
pub use crate::stream::{CancelHandle, StreamCompletion, StreamOutcome};
