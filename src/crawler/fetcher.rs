//! HTTP fetch primitive
//!
//! One pooled reqwest client is shared by every worker: fixed per-request
//! timeout, bounded idle-connection pool, optional SOCKS5 proxy for
//! anonymized fetching, optional user-agent header. Fetch failures are
//! classified rather than propagated, since per-URL failure handling belongs to
//! the scheduler, not the transport.

use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::CrawlerOptions;

/// Fixed per-request timeout; fetches are never retried.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How long idle pooled connections are kept around.
const IDLE_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of fetching one URL
#[derive(Debug)]
pub enum FetchOutcome {
    /// 200 response with its body
    Success { body: Vec<u8> },

    /// A response arrived, but with a non-200 status
    HttpError { status: u16 },

    /// The transport failed before a usable response arrived
    TransportError { error: String },
}

/// Builds the shared HTTP client from the instance options.
pub fn build_http_client(options: &CrawlerOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .pool_max_idle_per_host(options.max_connections)
        .pool_idle_timeout(IDLE_TIMEOUT);

    if let Some(agent) = &options.user_agent {
        builder = builder.user_agent(agent.clone());
    }

    if let Some(proxy) = &options.proxy {
        builder = builder.proxy(reqwest::Proxy::all(format!("socks5://{proxy}"))?);
    }

    builder.build()
}

/// Fetches one URL and classifies the outcome.
pub async fn fetch_url(client: &Client, url: &str) -> FetchOutcome {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            if status != StatusCode::OK {
                return FetchOutcome::HttpError {
                    status: status.as_u16(),
                };
            }
            match response.bytes().await {
                Ok(body) => FetchOutcome::Success {
                    body: body.to_vec(),
                },
                Err(e) => FetchOutcome::TransportError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => FetchOutcome::TransportError {
            error: e.to_string(),
        },
    }
}
