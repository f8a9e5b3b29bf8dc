//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - transport seam used by every client call

pub mod http;

pub use http::{
    ByteStream, Headers, HttpClient, HttpError, HttpRequest, Method, Response, StreamingResponse,
};
