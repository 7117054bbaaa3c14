use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::{fmt::Debug, time::Duration};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The network collaborator the weather client talks through.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Whether a network link is established. Link management itself lives
    /// outside this crate.
    fn link_up(&self) -> bool {
        true
    }

    /// Issue a GET. Errors mean no HTTP status was received at all.
    async fn get(&self, url: &Url) -> Result<HttpResponse>;
}

/// [`Transport`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request")?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read response body")?;

        Ok(HttpResponse { status, body })
    }
}
