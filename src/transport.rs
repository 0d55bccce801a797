//! HTTP transport used by the adapter

use std::time::Duration;

use async_trait::async_trait;
use log::{error, trace};
use reqwest::header::CONTENT_TYPE;

use crate::error::TransportError;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse
{   pub status: u16
  , pub body: String
}

impl TransportResponse
{   pub fn is_success(&self) -> bool
    {   (200..300).contains(&self.status)
    }
}

/// Issues a single JSON POST and waits for the full body
#[async_trait]
pub trait HttpTransport: Send + Sync
{   async fn post_json(
      &self
    , url: &str
    , body: String
    , timeout: Duration
    ) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport
{   http_client: reqwest::Client
}

impl ReqwestTransport
{   pub fn new() -> Self
    {   ReqwestTransport
        {   http_client: reqwest::Client::new()
        }
    }

    /// Reuse a client configured by the host (proxies, TLS roots)
    pub fn with_client(http_client: reqwest::Client) -> Self
    {   ReqwestTransport
        {   http_client
        }
    }
}

fn classify(e: reqwest::Error) -> TransportError
{   if e.is_timeout()
    {   TransportError::Timeout
    } else if e.is_connect()
    {   TransportError::Connect(e.to_string())
    } else
    {   TransportError::Io(e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport
{   async fn post_json(
      &self
    , url: &str
    , body: String
    , timeout: Duration
    ) -> Result<TransportResponse, TransportError>
    {   let response = self.http_client
          .post(url)
          .header(CONTENT_TYPE, "application/json")
          .body(body)
          .timeout(timeout)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            classify(e)
          })?;

        let status = response.status().as_u16();
        trace!("Response status: {}", status);

        let body = response.text().await.map_err(|e| {
          error!("Failed to read response body: {}", e);
          classify(e)
        })?;

        Ok(TransportResponse
        {   status
          , body
        })
    }
}
