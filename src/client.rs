use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, trace, warn};

use crate::config::GenerationSettings;
use crate::request::{chat_completions_url, GenerationRequest, GenerationResponse};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::{ChatMessage, Generation, TaggedMessage};

/// Client-side limit for one chat completions call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Adapter from chat messages to an OpenAI-compatible
/// chat completions endpoint.
///
/// Holds no per-call state: every call reads the settings, builds a
/// fresh request and performs exactly one POST. Failures are returned
/// as-is, there is no retry.
#[derive(Clone)]
pub struct ChatCompletionAdapter
{   settings: Arc<dyn GenerationSettings>
  , transport: Arc<dyn HttpTransport>
}

impl std::fmt::Debug for ChatCompletionAdapter
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.debug_struct("ChatCompletionAdapter")
          .field("model", &self.settings.chat_model())
          .field("api_base_url", &self.settings.api_base_url())
          .finish_non_exhaustive()
    }
}

impl ChatCompletionAdapter
{   /// Create an adapter that talks HTTP through reqwest
    pub fn new<S>(settings: S) -> Self
    where S: GenerationSettings + 'static
    {   debug!("Creating ChatCompletionAdapter");
        Self::with_transport(settings, ReqwestTransport::new())
    }

    /// Create an adapter over a caller supplied transport
    pub fn with_transport<S, T>(settings: S, transport: T) -> Self
    where S: GenerationSettings + 'static
        , T: HttpTransport + 'static
    {   ChatCompletionAdapter
        {   settings: Arc::new(settings)
          , transport: Arc::new(transport)
        }
    }

    /// Generate the next assistant turn for the conversation.
    ///
    /// The returned future resolves once the single POST has answered,
    /// failed, or hit the 60 s `REQUEST_TIMEOUT`; awaiting it is the
    /// blocking call. Nothing runs in the background and nothing is retried.
    pub async fn generate(
      &self
    , messages: &[ChatMessage]
    ) -> crate::Result<ChatMessage>
    {   self.generate_response(messages)
          .await
          .map(|generation| generation.message)
    }

    /// Same as `generate` for transcripts whose kinds are plain strings.
    /// Every entry is checked before anything goes on the wire.
    pub async fn generate_tagged(
      &self
    , messages: &[TaggedMessage]
    ) -> crate::Result<ChatMessage>
    {   let messages = messages
          .iter()
          .cloned()
          .map(ChatMessage::try_from)
          .collect::<crate::Result<Vec<_>>>()
          .map_err(|e| {
            error!("Rejecting transcript: {}", e);
            e
          })?;
        self.generate(&messages).await
    }

    /// Generate and also report usage and finish reason
    pub async fn generate_response(
      &self
    , messages: &[ChatMessage]
    ) -> crate::Result<Generation>
    {   debug!(
          "Generating response with {} messages",
          messages.len()
        );

        let model = self.settings.chat_model();
        let base_url = self.settings.api_base_url();
        let temperature = self.settings.temperature();
        crate::config::check_settings(&model, &base_url, temperature)
          .map_err(|e| {
            error!("Cannot build request: {}", e);
            e
          })?;

        let request = GenerationRequest::new(model, messages, temperature);
        let body = serde_json::to_string(&request).map_err(|e| {
          error!("Failed to serialize request: {}", e);
          crate::Error::InvalidConfiguration(e.to_string())
        })?;
        trace!("Chat completions request: {}", body);

        let url = chat_completions_url(&base_url);
        debug!("POST {}", url);

        let response = self.transport
          .post_json(&url, body, REQUEST_TIMEOUT)
          .await
          .map_err(|e| {
            error!("Error generating message from {}: {}", url, e);
            crate::Error::TransportFailure(e)
          })?;

        info!("Chat completions response: {}", response.body);
        if !response.is_success()
        {   warn!(
              "Chat completions returned status {}",
              response.status
            );
        }

        GenerationResponse::parse(&response.body)
          .and_then(GenerationResponse::into_generation)
          .map_err(|e| {
            error!("Error generating message from {}: {}", url, e);
            e
          })
    }
}
