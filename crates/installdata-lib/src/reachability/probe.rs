use super::{ProbeConfig, ProbeFailure};
use crate::decode::KeyPath;
use futures::StreamExt;
use rand::Rng;
use reqwest::header::{LOCATION, RANGE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// What a successful probe saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: u16,
    pub bytes_read: u64,
    /// The body outgrew the requested range and the transfer was abandoned
    pub aborted: bool,
    pub redirected_to: Option<String>,
}

/// Why one attempt failed. Only timeouts are retried.
#[derive(Debug)]
pub(crate) enum AttemptError {
    Timeout,
    Failed(ProbeFailure),
}

fn classify(e: reqwest::Error) -> AttemptError {
    if e.is_timeout() {
        AttemptError::Timeout
    } else {
        AttemptError::Failed(ProbeFailure::NoResponse {
            reason: e.to_string(),
        })
    }
}

/// One logical reachability check: the url, who references it, and its retry state
#[derive(Debug, Clone)]
pub struct PendingProbe {
    pub raw_url: String,
    pub url: Url,
    pub paths: Vec<KeyPath>,
    attempt: u32,
    max_attempts: u32,
}

impl PendingProbe {
    pub fn new(raw_url: &str, url: Url, paths: Vec<KeyPath>, max_attempts: u32) -> Self {
        Self {
            raw_url: raw_url.to_string(),
            url,
            paths,
            attempt: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempt
    }

    /// Connection-limiting key: host and effective port
    pub fn host_key(&self) -> String {
        host_key(&self.url)
    }

    /// Probe until success, a non-timeout failure, or the attempt budget is spent.
    /// `limiter` bounds concurrent connections to this probe's host.
    pub async fn run(
        &mut self,
        client: &Client,
        config: &ProbeConfig,
        limiter: &Semaphore,
    ) -> Result<ProbeOutcome, ProbeFailure> {
        loop {
            self.attempt += 1;
            let result = {
                let _permit = limiter.acquire().await.map_err(|e| ProbeFailure::NoResponse {
                    reason: format!("connection limiter closed: {}", e),
                })?;
                probe_once(client, &self.url, config).await
            };

            match result {
                Ok(outcome) => {
                    log::debug!(
                        "Reachable: {} (status {}, {} bytes, attempt {}/{})",
                        self.raw_url,
                        outcome.status,
                        outcome.bytes_read,
                        self.attempt,
                        self.max_attempts
                    );
                    return Ok(outcome);
                }
                Err(AttemptError::Timeout) if self.attempt < self.max_attempts => {
                    let delay = backoff_delay(config);
                    log::warn!(
                        "Request to {} timed out (attempt {}/{}). Retrying in {:.1}s...",
                        self.raw_url,
                        self.attempt,
                        self.max_attempts,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(AttemptError::Timeout) => {
                    log::error!(
                        "Request to {} timed out after {} attempts",
                        self.raw_url,
                        self.attempt
                    );
                    return Err(ProbeFailure::TimedOut {
                        attempts: self.attempt,
                    });
                }
                Err(AttemptError::Failed(failure)) => return Err(failure),
            }
        }
    }
}

pub fn host_key(url: &Url) -> String {
    format!(
        "{}:{}",
        url.host_str().unwrap_or_default(),
        url.port_or_known_default().unwrap_or_default()
    )
}

/// Randomized delay inside the configured window
fn backoff_delay(config: &ProbeConfig) -> Duration {
    let lo = config.backoff_min.min(config.backoff_max).as_millis() as u64;
    let hi = config.backoff_max.max(config.backoff_min).as_millis() as u64;
    Duration::from_millis(rand::rng().random_range(lo..=hi))
}

async fn send_range(client: &Client, url: &Url, config: &ProbeConfig) -> Result<Response, AttemptError> {
    client
        .get(url.clone())
        .header(RANGE, config.range_header())
        .send()
        .await
        .map_err(classify)
}

/// A single attempt. Redirects are followed by hand, once, because range requests
/// are not reliably re-issued by automatic redirect handling.
pub(crate) async fn probe_once(
    client: &Client,
    url: &Url,
    config: &ProbeConfig,
) -> Result<ProbeOutcome, AttemptError> {
    let response = send_range(client, url, config).await?;

    if !response.status().is_redirection() {
        return accept(response, config, None).await;
    }

    let status = response.status();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AttemptError::Failed(ProbeFailure::NoResponse {
                reason: format!("redirect {} without a Location header", status.as_u16()),
            })
        })?;
    let target = url.join(location).map_err(|e| {
        AttemptError::Failed(ProbeFailure::NoResponse {
            reason: format!("redirect to invalid location {:?}: {}", location, e),
        })
    })?;
    log::debug!("Following redirect ({}) {} -> {}", status.as_u16(), url, target);

    let response = send_range(client, &target, config).await?;
    accept(response, config, Some(target.to_string())).await
}

async fn accept(
    response: Response,
    config: &ProbeConfig,
    redirected_to: Option<String>,
) -> Result<ProbeOutcome, AttemptError> {
    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
        return Err(AttemptError::Failed(ProbeFailure::UnexpectedStatus {
            status: status.as_u16(),
        }));
    }
    if status == StatusCode::OK {
        log::debug!("{} ignored the range header and returned 200", response.url());
    }

    let (bytes_read, aborted) = drain_limited(response, config.oversize_limit()).await;
    Ok(ProbeOutcome {
        status: status.as_u16(),
        bytes_read,
        aborted,
        redirected_to,
    })
}

/// Read the body until it ends or grows past `limit`, then drop the connection.
/// The body is informational only, so read errors are logged rather than returned.
async fn drain_limited(response: Response, limit: u64) -> (u64, bool) {
    let url = response.url().clone();

    if let Some(len) = response.content_length() {
        if len > limit {
            log::debug!(
                "{} announced {} bytes for a {} byte range, aborting transfer",
                url,
                len,
                limit
            );
            return (0, true);
        }
    }

    let mut read: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                read += chunk.len() as u64;
                if read > limit {
                    log::debug!("{} sent more than {} bytes, aborting transfer", url, limit);
                    return (read, true);
                }
            }
            Err(e) => {
                log::debug!("Error while reading body of {}: {}", url, e);
                break;
            }
        }
    }
    (read, false)
}
