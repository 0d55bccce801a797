//! Wire types for the chat completions endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Completion budget sent with every request
pub const MAX_TOKENS: u32 = 2048;

/// Path appended to the configured base URL
const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Join the base URL and the completions path with exactly one slash
pub fn chat_completions_url(base_url: &str) -> String
{   if base_url.ends_with('/')
    {   format!("{}{}", base_url, CHAT_COMPLETIONS_PATH)
    } else
    {   format!("{}/{}", base_url, CHAT_COMPLETIONS_PATH)
    }
}

// ===== Request =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestMessage
{   pub role: &'static str
  , pub content: String
}

impl From<&crate::ChatMessage> for RequestMessage
{   fn from(message: &crate::ChatMessage) -> Self
    {   RequestMessage
        {   role: message.role()
          , content: message.text().to_string()
        }
    }
}

/// Body of POST {base}/chat/completions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest
{   pub model: String
  , pub messages: Vec<RequestMessage>
  , pub temperature: f64
  , pub max_tokens: u32
}

impl GenerationRequest
{   pub fn new(
      model: String
    , messages: &[crate::ChatMessage]
    , temperature: f64
    ) -> Self
    {   GenerationRequest
        {   model
          , messages: messages.iter().map(RequestMessage::from).collect()
          , temperature
          , max_tokens: MAX_TOKENS
        }
    }
}

// ===== Response =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse
{   #[serde(default)]
    pub choices: Option<Vec<Choice>>
  , /// Kept loose: usage never decides success
    #[serde(default)]
    pub usage: Option<Value>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ResponseMessage>
  , #[serde(default)]
    pub finish_reason: Option<Value>
}

/// Role is parsed but never used; replies are always assistant turns
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<Value>
  , #[serde(default)]
    pub content: Option<String>
}

impl GenerationResponse
{   pub fn parse(body: &str) -> crate::Result<Self>
    {   Ok(serde_json::from_str(body)?)
    }

    /// Pull the first choice out as a `Generation`
    pub fn into_generation(self) -> crate::Result<crate::Generation>
    {   let choice = self.choices
          .and_then(|choices| choices.into_iter().next())
          .ok_or(crate::Error::EmptyChoices)?;

        let message = choice.message
          .ok_or_else(|| crate::Error::MalformedResponse(
            "first choice has no message".to_string()
          ))?;

        let text = match message.content
        {   Some(text) if !text.is_empty() => text
          , _ => return Err(crate::Error::EmptyGeneratedText)
        };

        let token_usage = self.usage
          .as_ref()
          .map(read_usage)
          .unwrap_or_default();

        Ok(crate::Generation
        {   message: crate::ChatMessage::Assistant(text)
          , token_usage
          , finish_reason: finish_reason(
              choice.finish_reason.as_ref().and_then(Value::as_str)
            )
        })
    }
}

/// Counts that are missing, null, negative or fractional read as zero
fn read_usage(usage: &Value) -> crate::TokenUsage
{   let count = |key: &str| usage.get(key)
      .and_then(Value::as_u64)
      .and_then(|n| u32::try_from(n).ok())
      .unwrap_or(0);
    crate::TokenUsage
    {   input_tokens: count("prompt_tokens")
      , output_tokens: count("completion_tokens")
    }
}

fn finish_reason(raw: Option<&str>) -> crate::FinishReason
{   match raw
    {   Some("stop") => crate::FinishReason::Stop
      , Some("length") => crate::FinishReason::Length
      , Some("tool_calls") => crate::FinishReason::ToolCalls
      , Some("content_filter") => crate::FinishReason::ContentFilter
      , _ => crate::FinishReason::Other
    }
}
