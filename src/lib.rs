pub mod error;
pub mod config;
pub mod request;
pub mod transport;
pub mod client;

use serde::{Deserialize, Serialize};

pub use client::ChatCompletionAdapter;
pub use config::{AdapterConfig, GenerationSettings, SharedConfig};
pub use error::{Error, Result, TransportError};
pub use transport::{HttpTransport, ReqwestTransport, TransportResponse};

/*

chatgen turns a conversation of role-tagged chat messages into one
request against an OpenAI-compatible chat completions endpoint and
hands back the first choice as an assistant message.

chatgen/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Message types and re-exports
│   ├── error.rs        # Error and TransportError
│   ├── config.rs       # Model, base URL and temperature providers
│   ├── request.rs      # Wire types for chat/completions
│   ├── transport.rs    # HttpTransport trait and reqwest backend
│   └── client.rs       # ChatCompletionAdapter
└── tests/              # Integration tests against wiremock

*/

// ===== CHATGEN STRUCTURES =====

/// One turn in a conversation.
/// The set of kinds is closed; each maps to a fixed wire role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatMessage
{   /// Produced by the model
    Assistant(String)
  , /// Instructions from the host application
    System(String)
  , /// Output of a tool execution fed back to the model
    ToolResult(String)
  , /// Written by the user
    User(String)
}

impl ChatMessage
{   pub fn assistant(text: impl Into<String>) -> Self
    {   ChatMessage::Assistant(text.into())
    }

    pub fn system(text: impl Into<String>) -> Self
    {   ChatMessage::System(text.into())
    }

    pub fn tool_result(text: impl Into<String>) -> Self
    {   ChatMessage::ToolResult(text.into())
    }

    pub fn user(text: impl Into<String>) -> Self
    {   ChatMessage::User(text.into())
    }

    /// Role string sent on the wire
    pub fn role(&self) -> &'static str
    {   match self
        {   ChatMessage::Assistant(_) => "assistant"
          , ChatMessage::System(_) => "system"
          , ChatMessage::ToolResult(_) => "tool"
          , ChatMessage::User(_) => "user"
        }
    }

    pub fn text(&self) -> &str
    {   match self
        {   ChatMessage::Assistant(text)
          | ChatMessage::System(text)
          | ChatMessage::ToolResult(text)
          | ChatMessage::User(text) => text
        }
    }
}

/// A transcript entry as host applications usually store it:
/// a free-form kind string plus the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedMessage
{   pub kind: String
  , pub text: String
}

impl TaggedMessage
{   pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self
    {   TaggedMessage
        {   kind: kind.into()
          , text: text.into()
        }
    }
}

impl TryFrom<TaggedMessage> for ChatMessage
{   type Error = crate::error::Error;

    fn try_from(tagged: TaggedMessage) -> Result<Self>
    {   match tagged.kind.to_ascii_lowercase().as_str()
        {   "assistant" | "ai" => Ok(ChatMessage::Assistant(tagged.text))
          , "system" => Ok(ChatMessage::System(tagged.text))
          , "tool" | "tool_result" => Ok(ChatMessage::ToolResult(tagged.text))
          , "user" => Ok(ChatMessage::User(tagged.text))
          , _ => Err(crate::error::Error::UnsupportedMessageKind(tagged.kind))
        }
    }
}

/// Token accounting for a generation.
/// Zero when the backend does not report usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage
{   pub input_tokens: u32
  , pub output_tokens: u32
}

/// Why the backend stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason
{   Stop
  , Length
  , ToolCalls
  , ContentFilter
  , /// Reason not reported or not inspected
    Other
}

/// Full outcome of one generate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation
{   /// Always `ChatMessage::Assistant`
    pub message: ChatMessage
  , pub token_usage: TokenUsage
  , pub finish_reason: FinishReason
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn roles_follow_the_fixed_table()
    {   assert_eq!(ChatMessage::assistant("a").role(), "assistant");
        assert_eq!(ChatMessage::system("s").role(), "system");
        assert_eq!(ChatMessage::tool_result("t").role(), "tool");
        assert_eq!(ChatMessage::user("u").role(), "user");
    }

    #[test]
    fn tagged_kinds_convert_case_insensitively()
    {   let cases = [
          ("AI", ChatMessage::assistant("x"))
        , ("assistant", ChatMessage::assistant("x"))
        , ("System", ChatMessage::system("x"))
        , ("tool_result", ChatMessage::tool_result("x"))
        , ("tool", ChatMessage::tool_result("x"))
        , ("USER", ChatMessage::user("x"))
        ];
        for (kind, expected) in cases
        {   let converted = ChatMessage::try_from(TaggedMessage::new(kind, "x"));
            assert_eq!(converted, Ok(expected), "kind {}", kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected()
    {   let converted = ChatMessage::try_from(
          TaggedMessage::new("function", "x")
        );
        assert_eq!(
          converted,
          Err(Error::UnsupportedMessageKind("function".to_string()))
        );
    }

    #[test]
    fn tagged_message_deserializes_from_transcript_json()
    {   let parsed: Vec<TaggedMessage> = serde_json::from_str(
          r#"[{"kind":"user","text":"hi"},{"kind":"ai","text":"hello"}]"#
        ).unwrap();
        assert_eq!(parsed[1], TaggedMessage::new("ai", "hello"));
    }
}
