//! SSE (Server-Sent Events) decoding pipeline.
//!
//! Bytes flow through three pure stages, none of which perform I/O:
//!
//! - `lines` - byte chunks to complete lines ([`LineSplitter`])
//! - `frame` - lines to frames ([`FrameDecoder`])
//! - `event` - frames to typed events ([`materialize`])

mod event;
mod frame;
mod lines;

pub use event::{
    materialize, try_materialize, ChatEvent, EventKind, MaterializeError, CONTENT, CONTENT_DELTA,
    DONE, ERROR, SESSION, TOOL_CALL, TOOL_CONFIRM, TOOL_RESULT, USAGE,
};
pub use frame::{decode_text, parse_sse_line, Frame, FrameDecoder, SseLine, DATA_PREFIX, EVENT_PREFIX};
pub use lines::LineSplitter;
