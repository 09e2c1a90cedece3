//! Crawler - Batched URL fetching with bounded concurrency
//!
//! Fetches a batch of URLs with a semaphore capping in-flight requests, a
//! rate gate spacing request starts, exponential retry on transport
//! failures, and manual redirect tracking so every hop is observable.

mod limiter;

pub use limiter::RateGate;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::CrawlSettings;
use crate::error::{AuditError, Result};

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-GB,en;q=0.9,ar;q=0.8";

/// One hop in a redirect chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectHop {
    pub url: String,
    pub status: u16,
}

/// What one fetch produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// The URL as requested
    pub url: String,
    /// The URL after following redirects
    pub final_url: String,
    /// Final HTTP status; 0 when the connection failed
    pub status: u16,
    pub redirect_chain: Vec<RedirectHop>,
    /// Response headers with lowercased keys
    pub headers: HashMap<String, String>,
    /// Raw HTML body; empty on failure
    pub body: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlResult {
    fn failed(url: &str, error: String, started_at: DateTime<Utc>) -> Self {
        let finished_at = Utc::now();
        Self {
            url: url.to_string(),
            final_url: url.to_string(),
            status: 0,
            redirect_chain: Vec::new(),
            headers: HashMap::new(),
            body: String::new(),
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
            error: Some(error),
        }
    }
}

/// Build the HTTP client the crawler uses.
///
/// Redirects are handled manually so every hop lands in the result.
pub fn build_client(settings: &CrawlSettings) -> Result<Client> {
    let client = Client::builder()
        .user_agent(settings.user_agent.clone())
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}

/// Crawl one batch of URLs, returning results in input order.
///
/// Per-URL failures are encoded in the result rather than raised; only a
/// panicked task surfaces as an error, which the orchestrator turns into a
/// failed batch.
pub async fn crawl_batch(
    client: &Client,
    urls: &[String],
    settings: &CrawlSettings,
    gate: Arc<RateGate>,
) -> Result<Vec<CrawlResult>> {
    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut handles = Vec::with_capacity(urls.len());

    for (index, url) in urls.iter().enumerate() {
        let client = client.clone();
        let url = url.clone();
        let settings = settings.clone();
        let semaphore = Arc::clone(&semaphore);
        let gate = Arc::clone(&gate);

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("Semaphore closed");
            let result = fetch_url(&client, &url, &settings, &gate).await;
            (index, result)
        }));
    }

    let mut slots: Vec<Option<CrawlResult>> = (0..urls.len()).map(|_| None).collect();
    for outcome in futures::future::join_all(handles).await {
        let (index, result) = outcome.map_err(|e| AuditError::StateError {
            run_id: String::new(),
            reason: format!("crawl task panicked: {}", e),
        })?;
        slots[index] = Some(result);
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Fetch a single URL with retries and manual redirect tracking.
pub async fn fetch_url(
    client: &Client,
    url: &str,
    settings: &CrawlSettings,
    gate: &RateGate,
) -> CrawlResult {
    let started_at = Utc::now();
    let mut last_error = String::new();

    for attempt in 0..=settings.max_retries {
        if attempt > 0 {
            let backoff = settings.retry_base_delay_ms * 2u64.pow(attempt - 1);
            warn!("Retry {}/{} for {} in {}ms", attempt, settings.max_retries, url, backoff);
            tokio::time::sleep(Duration::from_millis(backoff)).await;
        }

        match follow_redirects(client, url, settings, gate, started_at).await {
            Ok(result) => return result,
            Err(e) => last_error = e,
        }
    }

    CrawlResult::failed(url, last_error, started_at)
}

/// One attempt: restart redirect tracking from scratch and follow hops.
///
/// Returns `Err` only for transport failures, which participate in the
/// retry budget. Every HTTP response, including 4xx/5xx, is a success.
async fn follow_redirects(
    client: &Client,
    url: &str,
    settings: &CrawlSettings,
    gate: &RateGate,
    started_at: DateTime<Utc>,
) -> std::result::Result<CrawlResult, String> {
    let mut current = url.to_string();
    let mut chain: Vec<RedirectHop> = Vec::new();

    loop {
        gate.wait_turn().await;
        debug!("GET {}", current);

        let response = client
            .get(&current)
            .timeout(Duration::from_millis(settings.timeout_ms))
            .header("Accept", ACCEPT)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Accept-Encoding", "identity")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();

        if (300..400).contains(&status) {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let location = match location {
                Some(loc) => loc,
                None => {
                    let mut result = collect_response(url, &current, response, started_at).await?;
                    result.redirect_chain = chain;
                    result.error = Some("Redirect with no Location header".to_string());
                    return Ok(result);
                }
            };

            let resolved = match url::Url::parse(&current).and_then(|u| u.join(&location)) {
                Ok(u) => u.to_string(),
                Err(e) => {
                    let mut result = collect_response(url, &current, response, started_at).await?;
                    result.redirect_chain = chain;
                    result.error = Some(format!("Unresolvable Location '{}': {}", location, e));
                    return Ok(result);
                }
            };

            chain.push(RedirectHop {
                url: current.clone(),
                status,
            });

            if chain.len() > settings.max_redirects {
                let mut result = collect_response(url, &current, response, started_at).await?;
                result.final_url = resolved;
                result.redirect_chain = chain;
                result.error = Some("Too many redirects".to_string());
                return Ok(result);
            }

            current = resolved;
            continue;
        }

        let mut result = collect_response(url, &current, response, started_at).await?;
        result.redirect_chain = chain;
        return Ok(result);
    }
}

/// Read the full body and lowercase all header keys into a result.
async fn collect_response(
    requested: &str,
    current: &str,
    response: reqwest::Response,
    started_at: DateTime<Utc>,
) -> std::result::Result<CrawlResult, String> {
    let status = response.status().as_u16();

    let mut headers = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_ascii_lowercase(), v.to_string());
        }
    }

    let body = response.text().await.map_err(|e| e.to_string())?;

    let finished_at = Utc::now();
    Ok(CrawlResult {
        url: requested.to_string(),
        final_url: current.to_string(),
        status,
        redirect_chain: Vec::new(),
        headers,
        body,
        started_at,
        finished_at,
        duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
        error: None,
    })
}
