//! Client configuration.
//!
//! ```ignore
//! use nlui_client::config::{ClientConfig, DonePolicy};
//!
//! let config = ClientConfig::new("http://localhost:9000")
//!     .with_api_key("secret")
//!     .with_done_policy(DonePolicy::Strict);
//! ```

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const ENV_BASE_URL: &str = "NLUI_BASE_URL";
pub const ENV_API_KEY: &str = "NLUI_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "NLUI_TIMEOUT_SECS";
pub const ENV_STRICT: &str = "NLUI_STRICT";

/// How a stream that ends without a `done` identifier is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DonePolicy {
    /// A missing identifier means "unknown", never an error.
    #[default]
    Lenient,
    /// A chat turn that ends without an identifier fails with
    /// [`ClientError::MissingConversationId`]. Edit and regenerate are
    /// unaffected since the caller already knows the conversation.
    Strict,
}

/// What happens to a frame whose data is not a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePolicy {
    /// Drop the frame and keep streaming.
    #[default]
    Skip,
    /// Fail the whole operation with [`ClientError::MalformedFrame`].
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server root, without trailing slash
    pub base_url: String,
    /// Sent as `Authorization: Bearer <key>` when set
    pub api_key: Option<String>,
    /// Deadline for a whole call, streaming included. None disables it.
    pub timeout: Option<Duration>,
    pub done_policy: DonePolicy,
    pub frame_policy: FramePolicy,
    /// Flush a trailing frame that never saw its blank line
    pub flush_trailing_frame: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Some(DEFAULT_TIMEOUT),
            done_policy: DonePolicy::default(),
            frame_policy: FramePolicy::default(),
            flush_trailing_frame: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_done_policy(mut self, policy: DonePolicy) -> Self {
        self.done_policy = policy;
        self
    }

    pub fn with_frame_policy(mut self, policy: FramePolicy) -> Self {
        self.frame_policy = policy;
        self
    }

    pub fn with_trailing_frame_flush(mut self, flush: bool) -> Self {
        self.flush_trailing_frame = flush;
        self
    }

    /// Both strict policies at once.
    pub fn strict(self) -> Self {
        self.with_done_policy(DonePolicy::Strict)
            .with_frame_policy(FramePolicy::Strict)
    }

    /// Build from `NLUI_BASE_URL`, `NLUI_API_KEY`, `NLUI_TIMEOUT_SECS`
    /// (`0` disables the deadline) and `NLUI_STRICT`. Unset variables keep
    /// their defaults.
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(url) = non_empty_var(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }
        if let Some(key) = non_empty_var(ENV_API_KEY) {
            config = config.with_api_key(key);
        }
        if let Some(raw) = non_empty_var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("{} must be a whole number, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(raw) = non_empty_var(ENV_STRICT) {
            if matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on") {
                config = config.strict();
            }
        }

        tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "Loaded client config from environment");
        Ok(config)
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
