use thiserror::Error;

/// Result alias used throughout chatgen
pub type Result<T> = std::result::Result<T, Error>;

/// Failure raised by the HTTP transport.
/// Implements Clone so it can travel inside `Error`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError
{   /// No response within the request timeout
    #[error("request timed out")]
    Timeout
  , /// Connection could not be established
    #[error("connection failed: {0}")]
    Connect(String)
  , /// Any other I/O or protocol level failure
    #[error("I/O failure: {0}")]
    Io(String)
}

/// Custom error type for chatgen operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error
{   /// Message kind outside assistant/system/tool/user
    #[error("unsupported message kind: {0}")]
    UnsupportedMessageKind(String)
  , /// The HTTP call itself failed
    #[error("failed to generate AI message: transport failure: {0}")]
    TransportFailure(#[from] TransportError)
  , /// Body is not JSON or not a chat completions payload
    #[error("failed to generate AI message: malformed response: {0}")]
    MalformedResponse(String)
  , /// No choices in API response
    #[error("failed to generate AI message: no choices returned in the response")]
    EmptyChoices
  , /// First choice carried no text
    #[error("failed to generate AI message: generated text is null or empty")]
    EmptyGeneratedText
  , /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String)
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::MalformedResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn transport_failure_keeps_its_cause()
    {   let err: Error = TransportError::Timeout.into();
        assert_eq!(err, Error::TransportFailure(TransportError::Timeout));
        let source = std::error::Error::source(&err)
          .map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("request timed out"));
    }

    #[test]
    fn generation_failures_share_a_prefix()
    {   for err in [
          Error::EmptyChoices
        , Error::EmptyGeneratedText
        , Error::MalformedResponse("eof".to_string())
        , Error::TransportFailure(TransportError::Io("reset".to_string()))
        ]
        {   assert!(
              err.to_string().starts_with("failed to generate AI message"),
              "{}", err
            );
        }
    }
}
