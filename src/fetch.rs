// src/fetch.rs
//
// Single seam for outbound HTTP. Everything the crawler requests — feeds,
// archive indexes, documents, the submissions API — goes through one
// `PageFetcher`, so the rate limiter covers every call and tests can swap
// in a scripted double.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::error::CrawlError;
use crate::ratelimit::RateLimiter;

/// One fetched response. Non-200 statuses are returned as pages, not
/// errors; only transport-level failures surface as `Err`.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// One rate-limited GET.
    async fn get(&self, url: &str) -> Result<FetchedPage, CrawlError>;
}

/// Production fetcher: reqwest client with the contact-identifying
/// User-Agent EDGAR requires, gated by the shared rate limiter.
pub struct RateLimitedFetcher {
    client: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl RateLimitedFetcher {
    pub fn new(
        limiter: Arc<RateLimiter>,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("building http client")?;
        Ok(Self { client, limiter })
    }
}

#[async_trait]
impl PageFetcher for RateLimitedFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        self.limiter.acquire().await;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::Network {
                url: url.to_string(),
                source: Box::new(e),
            })?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| CrawlError::Network {
                url: url.to_string(),
                source: Box::new(e),
            })?
            .to_vec();

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            body,
        })
    }
}

// --- Test helper ---

#[derive(Clone)]
enum Scripted {
    Page { status: u16, body: Vec<u8> },
    TransportError,
}

/// Scripted stand-in for tests: canned responses per URL, every request
/// recorded in order. Unrouted URLs answer 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: std::sync::Mutex<HashMap<String, Scripted>>,
    calls: std::sync::Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Scripted::Page {
                status,
                body: body.into(),
            },
        );
        self
    }

    pub fn route_transport_error(self, url: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::TransportError);
        self
    }

    /// Every requested URL, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        self.calls.lock().unwrap().push(url.to_string());
        let routed = self.routes.lock().unwrap().get(url).cloned();
        match routed {
            Some(Scripted::Page { status, body }) => Ok(FetchedPage {
                url: url.to_string(),
                status,
                body,
            }),
            Some(Scripted::TransportError) => Err(CrawlError::Network {
                url: url.to_string(),
                source: "simulated transport failure".into(),
            }),
            None => Ok(FetchedPage {
                url: url.to_string(),
                status: 404,
                body: Vec::new(),
            }),
        }
    }
}
