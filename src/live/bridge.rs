use crate::protocol::models::DEFAULT_MODEL;
use crate::protocol::{ClientEvent, SessionConfigMap};
use crate::transport::ws::{self, BETA_HEADER_VALUE, ConnectOptions, WS_BASE_URL};
use crate::transport::{FrameSink, FrameSource};
use crate::Result;

use super::config::{OverrideProvider, ProviderDebug, RealtimeContext, build_session_config};
use super::connection::RealtimeConnection;
use super::request::LiveRequest;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Model provider for live sessions against the OpenAI Realtime API.
pub struct RealtimeBridge {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    beta_header: Option<String>,
    session_overrides: Option<OverrideProvider>,
}

impl std::fmt::Debug for RealtimeBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeBridge")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("beta_header", &self.beta_header)
            .field("session_overrides", &ProviderDebug(&self.session_overrides))
            .finish()
    }
}

impl RealtimeBridge {
    #[must_use]
    pub fn builder() -> RealtimeBridgeBuilder {
        RealtimeBridgeBuilder::new()
    }

    /// Whether `model` names a realtime model this bridge can drive.
    #[must_use]
    pub fn supports_model(model: &str) -> bool {
        model.starts_with("gpt-4o-realtime-") || model.starts_with("gpt-realtime")
    }

    /// Default model for requests that do not name one.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Session settings the handshake would send for `request`.
    ///
    /// # Errors
    /// Returns an error if the tool list cannot be serialized.
    #[allow(clippy::result_large_err)]
    pub fn session_config(
        &self,
        request: &LiveRequest,
        context: Option<&RealtimeContext>,
    ) -> Result<SessionConfigMap> {
        build_session_config(request, self.session_overrides.as_ref(), context)
    }

    /// Open a live session: connect the socket and send the initial
    /// `session.update`.
    ///
    /// # Errors
    /// Returns an error if the handshake fails or the session update cannot be sent.
    pub async fn connect(
        &self,
        request: &LiveRequest,
        context: Option<&RealtimeContext>,
    ) -> Result<RealtimeConnection> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        if !Self::supports_model(model) {
            tracing::warn!("Model {model} is not a known realtime model");
        }
        tracing::info!(
            "OpenAI Realtime connect {} (auth={})",
            ws::realtime_url(&self.endpoint, model)?,
            self.api_key.is_some()
        );

        let (sink, source) = ws::connect(ConnectOptions {
            endpoint: &self.endpoint,
            model,
            api_key: self.api_key.as_deref(),
            beta_header: self.beta_header.as_deref(),
            extra_headers: &request.headers,
        })
        .await?;

        self.attach(sink, source, request, context).await
    }

    /// Start a session over an already open socket.
    ///
    /// # Errors
    /// Returns an error if the session update cannot be built or sent.
    pub async fn attach(
        &self,
        sink: impl FrameSink + 'static,
        source: impl FrameSource + 'static,
        request: &LiveRequest,
        context: Option<&RealtimeContext>,
    ) -> Result<RealtimeConnection> {
        let session = self.session_config(request, context)?;
        tracing::info!("OpenAI Realtime session.update (initial settings)");
        tracing::info!(
            "OpenAI Realtime session settings: {}",
            serde_json::Value::Object(session.clone())
        );

        let connection = RealtimeConnection::new(sink, source);
        connection
            .send(&ClientEvent::SessionUpdate {
                event_id: None,
                session,
            })
            .await?;
        Ok(connection)
    }
}

pub struct RealtimeBridgeBuilder {
    api_key: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    beta_header: Option<String>,
    session_overrides: Option<OverrideProvider>,
}

impl RealtimeBridgeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: None,
            endpoint: None,
            beta_header: Some(BETA_HEADER_VALUE.to_string()),
            session_overrides: None,
        }
    }

    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Read the key from `OPENAI_API_KEY`; an unset or empty variable leaves
    /// the key unset.
    #[must_use]
    pub fn api_key_from_env(mut self) -> Self {
        self.api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the socket URL, e.g. for a proxy.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// `OpenAI-Beta` header value; `None` sends no header.
    #[must_use]
    pub fn beta_header(mut self, value: Option<String>) -> Self {
        self.beta_header = value;
        self
    }

    #[must_use]
    pub fn session_overrides<F>(mut self, provider: F) -> Self
    where
        F: Fn(&LiveRequest) -> Option<SessionConfigMap> + Send + Sync + 'static,
    {
        self.session_overrides = Some(std::sync::Arc::new(provider));
        self
    }

    #[must_use]
    pub fn build(self) -> RealtimeBridge {
        RealtimeBridge {
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: self.endpoint.unwrap_or_else(|| WS_BASE_URL.to_string()),
            beta_header: self.beta_header,
            session_overrides: self.session_overrides,
        }
    }
}

impl Default for RealtimeBridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
