//! High-level client for the NLUI server.
//!
//! Three calls stream: [`NluiClient::chat`], [`NluiClient::edit_message`]
//! and [`NluiClient::regenerate_from`]. They share one decode pipeline and
//! differ only in how the request is built. Everything else is a plain JSON
//! request/response.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::correlator::ConversationCorrelator;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Ack, ChatRequest, ConfirmToolRequest, Conversation, CreateConversationRequest,
    EditMessageRequest, FetchModelsRequest, Health, LlmConfig, LlmConfigUpdate, NewTarget,
    ProbeRequest, ProbeResult, ProviderInfo, ProxyConfig, ProxyTestResult, RegenerateRequest,
    ServerInfo, StopChatRequest, TargetChange, TargetInfo, Tool, ToolConfig, ToolSource,
};
use crate::sink::StreamSink;
use crate::stream::{run_stream, CancelHandle, StreamCall, StreamOperation, StreamOutcome};
use crate::traits::{HttpClient, HttpError, HttpRequest, Method, Response};

const EVENT_STREAM: &str = "text/event-stream";

/// Client bound to one server.
///
/// Cheap to clone; clones share the transport. Any number of calls may run
/// concurrently, each with its own decode state.
#[derive(Debug)]
pub struct NluiClient<C: HttpClient = ReqwestHttpClient> {
    http: Arc<C>,
    config: ClientConfig,
}

impl<C: HttpClient> Clone for NluiClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            config: self.config.clone(),
        }
    }
}

impl NluiClient<ReqwestHttpClient> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(ReqwestHttpClient::new(), config)
    }

    /// Client configured from `NLUI_*` environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }
}

impl<C: HttpClient> NluiClient<C> {
    pub fn with_http_client(http: C, config: ClientConfig) -> Self {
        Self::with_shared_http(Arc::new(http), config)
    }

    pub fn with_shared_http(http: Arc<C>, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn http(&self) -> &Arc<C> {
        &self.http
    }

    // ------------------------------------------------------------------
    // Streaming
    // ------------------------------------------------------------------

    /// Start a conversation (`conversation_id` None) or continue one.
    ///
    /// Resolves with the identifier from the stream's `done` event.
    pub async fn chat<S>(
        &self,
        message: &str,
        conversation_id: Option<&str>,
        sink: &mut S,
        cancel: Option<&CancelHandle>,
    ) -> StreamOutcome
    where
        S: StreamSink + ?Sized,
    {
        let body = ChatRequest {
            message: message.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        };
        let request = match self.stream_request(Method::Post, "/api/chat", &body) {
            Ok(request) => request,
            Err(err) => return Self::fail_early(err, sink),
        };
        let call = StreamCall::new(StreamOperation::Chat, request)
            .with_correlator(ConversationCorrelator::new().with_user_message(message))
            .with_cancel(cancel.cloned());
        run_stream(self.http.as_ref(), &self.config, call, sink).await
    }

    /// Replace the message at `index` and stream the re-run.
    ///
    /// The index is sent as given; the server validates it.
    pub async fn edit_message<S>(
        &self,
        conversation_id: &str,
        index: usize,
        content: &str,
        sink: &mut S,
        cancel: Option<&CancelHandle>,
    ) -> StreamOutcome
    where
        S: StreamSink + ?Sized,
    {
        let path = format!(
            "/api/conversations/{}/messages/{}",
            encode(conversation_id),
            index
        );
        let body = EditMessageRequest {
            content: content.to_string(),
        };
        let request = match self.stream_request(Method::Put, &path, &body) {
            Ok(request) => request,
            Err(err) => return Self::fail_early(err, sink),
        };
        let call = StreamCall::new(StreamOperation::EditMessage, request)
            .with_correlator(ConversationCorrelator::new().with_user_message(content))
            .with_cancel(cancel.cloned());
        run_stream(self.http.as_ref(), &self.config, call, sink).await
    }

    /// Drop everything from `from_index` on and stream a fresh answer.
    pub async fn regenerate_from<S>(
        &self,
        conversation_id: &str,
        from_index: usize,
        sink: &mut S,
        cancel: Option<&CancelHandle>,
    ) -> StreamOutcome
    where
        S: StreamSink + ?Sized,
    {
        let path = format!("/api/conversations/{}/regenerate", encode(conversation_id));
        let request =
            match self.stream_request(Method::Post, &path, &RegenerateRequest { from_index }) {
                Ok(request) => request,
                Err(err) => return Self::fail_early(err, sink),
            };
        let call = StreamCall::new(StreamOperation::Regenerate, request)
            .with_cancel(cancel.cloned());
        run_stream(self.http.as_ref(), &self.config, call, sink).await
    }

    // ------------------------------------------------------------------
    // Chat control
    // ------------------------------------------------------------------

    pub async fn health(&self) -> ClientResult<Health> {
        self.get_json("/api/health").await
    }

    pub async fn info(&self) -> ClientResult<ServerInfo> {
        self.get_json("/api/info").await
    }

    /// Stop the running turn of a session.
    pub async fn stop_chat(&self, session_id: &str) -> ClientResult<Ack> {
        let body = StopChatRequest {
            session_id: session_id.to_string(),
        };
        self.send_json(Method::Post, "/api/chat/stop", Some(&body)).await
    }

    /// Answer a pending `tool_confirm` event. The server replies 409 when
    /// nothing is pending.
    pub async fn confirm_tool(&self, session_id: &str, approved: bool) -> ClientResult<Ack> {
        let body = ConfirmToolRequest {
            session_id: session_id.to_string(),
            approved,
        };
        self.send_json(Method::Post, "/api/chat/confirm", Some(&body)).await
    }

    // ------------------------------------------------------------------
    // Conversations
    // ------------------------------------------------------------------

    pub async fn list_conversations(&self) -> ClientResult<Vec<Conversation>> {
        self.get_json("/api/conversations").await
    }

    pub async fn create_conversation(&self, title: &str) -> ClientResult<Conversation> {
        let body = CreateConversationRequest {
            title: title.to_string(),
        };
        self.send_json(Method::Post, "/api/conversations", Some(&body)).await
    }

    pub async fn get_conversation(&self, id: &str) -> ClientResult<Conversation> {
        self.get_json(&format!("/api/conversations/{}", encode(id))).await
    }

    pub async fn delete_conversation(&self, id: &str) -> ClientResult<()> {
        let path = format!("/api/conversations/{}", encode(id));
        self.send_unit(self.request(Method::Delete, &path)).await
    }

    pub async fn delete_message(&self, conversation_id: &str, index: usize) -> ClientResult<Ack> {
        let path = format!(
            "/api/conversations/{}/messages/{}",
            encode(conversation_id),
            index
        );
        self.send_json::<_, ()>(Method::Delete, &path, None).await
    }

    /// Delete the message at `index` and everything after it.
    pub async fn delete_messages_from(
        &self,
        conversation_id: &str,
        index: usize,
    ) -> ClientResult<Ack> {
        let path = format!(
            "/api/conversations/{}/messages/{}/from",
            encode(conversation_id),
            index
        );
        self.send_json::<_, ()>(Method::Delete, &path, None).await
    }

    pub async fn conversation_tools(&self, conversation_id: &str) -> ClientResult<ToolConfig> {
        self.get_json(&format!(
            "/api/conversations/{}/tools",
            encode(conversation_id)
        ))
        .await
    }

    pub async fn update_conversation_tools(
        &self,
        conversation_id: &str,
        tools: &ToolConfig,
    ) -> ClientResult<Ack> {
        let path = format!("/api/conversations/{}/tools", encode(conversation_id));
        self.send_json(Method::Put, &path, Some(tools)).await
    }

    // ------------------------------------------------------------------
    // Targets and tools
    // ------------------------------------------------------------------

    pub async fn list_targets(&self) -> ClientResult<Vec<TargetInfo>> {
        self.get_json("/api/targets").await
    }

    pub async fn add_target(&self, target: &NewTarget) -> ClientResult<TargetChange> {
        self.send_json(Method::Post, "/api/targets", Some(target)).await
    }

    pub async fn remove_target(&self, name: &str) -> ClientResult<TargetChange> {
        let path = format!("/api/targets/{}", encode(name));
        self.send_json::<_, ()>(Method::Delete, &path, None).await
    }

    /// Look for an OpenAPI document under `base_url`.
    pub async fn probe_target(&self, base_url: &str) -> ClientResult<ProbeResult> {
        let body = ProbeRequest {
            base_url: base_url.to_string(),
        };
        self.send_json(Method::Post, "/api/targets/probe", Some(&body)).await
    }

    pub async fn list_tools(&self) -> ClientResult<Vec<Tool>> {
        self.get_json("/api/tools").await
    }

    pub async fn list_tool_sources(&self) -> ClientResult<Vec<ToolSource>> {
        self.get_json("/api/tools/sources").await
    }

    // ------------------------------------------------------------------
    // Server configuration
    // ------------------------------------------------------------------

    pub async fn llm_config(&self) -> ClientResult<LlmConfig> {
        self.get_json("/api/config/llm").await
    }

    pub async fn update_llm_config(&self, update: &LlmConfigUpdate) -> ClientResult<Ack> {
        self.send_json(Method::Put, "/api/config/llm", Some(update)).await
    }

    pub async fn llm_providers(&self) -> ClientResult<Vec<ProviderInfo>> {
        self.get_json("/api/config/llm/providers").await
    }

    /// Ask an OpenAI-compatible endpoint which models it serves.
    pub async fn fetch_models(
        &self,
        api_base: &str,
        api_key: Option<&str>,
    ) -> ClientResult<Vec<String>> {
        let body = FetchModelsRequest {
            api_base: api_base.to_string(),
            api_key: api_key.map(str::to_string),
        };
        self.send_json(Method::Post, "/api/config/llm/models", Some(&body)).await
    }

    pub async fn proxy_config(&self) -> ClientResult<ProxyConfig> {
        self.get_json("/api/config/proxy").await
    }

    pub async fn update_proxy_config(&self, proxy: &str) -> ClientResult<Ack> {
        let body = ProxyConfig {
            proxy: proxy.to_string(),
        };
        self.send_json(Method::Put, "/api/config/proxy", Some(&body)).await
    }

    pub async fn test_proxy(&self, proxy: &str) -> ClientResult<ProxyTestResult> {
        let body = ProxyConfig {
            proxy: proxy.to_string(),
        };
        self.send_json(Method::Post, "/api/config/proxy/test", Some(&body)).await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> HttpRequest {
        let request = HttpRequest::new(method, self.config.url(path));
        match &self.config.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    fn stream_request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<HttpRequest> {
        Ok(self
            .request(method, path)
            .header("Accept", EVENT_STREAM)
            .json_body(encode_body(body)?))
    }

    /// Report a failure that happened before any request was sent through
    /// the same path as every other streaming failure.
    fn fail_early<S: StreamSink + ?Sized>(err: ClientError, sink: &mut S) -> StreamOutcome {
        tracing::warn!("Failed to build stream request: {}", err);
        sink.on_error(&err);
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send_json::<_, ()>(Method::Get, path, None).await
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json_body(encode_body(body)?);
        }

        let response = self.execute(request).await?;
        response
            .json()
            .map_err(|e| ClientError::decode(format!("{} {}", method, path), e))
    }

    async fn send_unit(&self, request: HttpRequest) -> ClientResult<()> {
        self.execute(request).await.map(|_| ())
    }

    async fn execute(&self, request: HttpRequest) -> ClientResult<Response> {
        let method = request.method;
        let url = request.url.clone();
        tracing::debug!(%method, %url, "Sending request");

        let send = self.http.send(request);
        let response = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, send).await.map_err(|_| {
                HttpError::Timeout(format!("no response within {}s", limit.as_secs_f64()))
            })??,
            None => send.await?,
        };

        if !response.is_success() {
            let err = ClientError::from_status(response.status, &response.text_lossy());
            tracing::warn!(%method, %url, status = response.status, "Request failed: {}", err);
            return Err(err);
        }
        Ok(response)
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> ClientResult<String> {
    serde_json::to_string(body).map_err(|e| ClientError::decode("request body", e))
}
