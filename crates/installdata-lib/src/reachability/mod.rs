//! Confirms that every url in a listing can be fetched.
//!
//! Each distinct url gets a ranged GET for its first kilobyte. Requests run in a bounded pool
//! with a small per-host connection limit, since the mod server rate limits aggressive clients
//! and self-inflicted congestion shows up as false timeouts.

pub mod probe;

pub use probe::{PendingProbe, ProbeOutcome};

use crate::check::urls::parse_url;
use crate::check::UrlIndex;
use crate::config;
use crate::decode::KeyPath;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub request_timeout: Duration,
    /// Total attempts per url; only timeouts are retried
    pub max_attempts: u32,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
    pub max_connections_per_host: usize,
    pub max_in_flight: usize,
    pub probe_bytes: u64,
    pub oversize_factor: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(config::REQUEST_TIMEOUT_SECS),
            max_attempts: config::MAX_PROBE_ATTEMPTS,
            backoff_min: Duration::from_millis(config::RETRY_BACKOFF_MIN_MS),
            backoff_max: Duration::from_millis(config::RETRY_BACKOFF_MAX_MS),
            max_connections_per_host: config::MAX_CONNECTIONS_PER_HOST,
            max_in_flight: config::MAX_IN_FLIGHT,
            probe_bytes: config::PROBE_BYTES,
            oversize_factor: config::OVERSIZE_FACTOR,
        }
    }
}

impl ProbeConfig {
    pub fn range_header(&self) -> String {
        format!("bytes=0-{}", self.probe_bytes.saturating_sub(1))
    }

    /// Bytes past which a response is treated as ignoring the range
    pub fn oversize_limit(&self) -> u64 {
        self.probe_bytes.saturating_mul(self.oversize_factor.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    #[error("timed out after {attempts} attempt(s)")]
    TimedOut { attempts: u32 },

    #[error("response code was {status}")]
    UnexpectedStatus { status: u16 },

    #[error("unexpected response: {reason}")]
    NoResponse { reason: String },
}

/// A url that could not be fetched, with every document path that references it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to download {url}: {failure}")]
pub struct UnreachableUrl {
    pub url: String,
    pub paths: Vec<KeyPath>,
    pub failure: ProbeFailure,
}

/// A url that answered with 200 or 206
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachableUrl {
    pub url: String,
    pub outcome: ProbeOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct ReachabilityReport {
    pub reachable: Vec<ReachableUrl>,
    pub unreachable: Vec<UnreachableUrl>,
    /// Malformed urls are left to the syntax check and not probed
    pub skipped: Vec<String>,
}

impl ReachabilityReport {
    pub fn is_success(&self) -> bool {
        self.unreachable.is_empty()
    }

    pub fn find(&self, url: &str) -> Option<&UnreachableUrl> {
        self.unreachable.iter().find(|u| u.url == url)
    }

    pub fn outcome(&self, url: &str) -> Option<&ProbeOutcome> {
        self.reachable
            .iter()
            .find(|r| r.url == url)
            .map(|r| &r.outcome)
    }
}

pub struct ReachabilityChecker {
    client: Client,
    config: ProbeConfig,
}

impl ReachabilityChecker {
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("installdata-check/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self::with_client(client, config))
    }

    /// The client should not follow redirects on its own
    pub fn with_client(client: Client, config: ProbeConfig) -> Self {
        Self { client, config }
    }

    /// Probe every distinct url in `index` and wait for all of them to finish
    pub async fn check_all(&self, index: &UrlIndex) -> ReachabilityReport {
        let mut report = ReachabilityReport::default();
        let mut pending = Vec::new();

        for (raw, paths) in index.iter() {
            match parse_url(raw) {
                Ok(url) => pending.push(PendingProbe::new(
                    raw,
                    url,
                    paths.to_vec(),
                    self.config.max_attempts,
                )),
                Err(reason) => {
                    log::debug!("Not probing malformed url {}: {}", raw, reason);
                    report.skipped.push(raw.to_string());
                }
            }
        }

        let total = pending.len();
        if total == 0 {
            return report;
        }
        log::info!(
            "Probing {} url(s), {} at a time, {} per host",
            total,
            self.config.max_in_flight,
            self.config.max_connections_per_host
        );

        let limiters = self.host_limiters(&pending);
        let results = stream::iter(pending)
            .map(|mut probe| {
                let client = self.client.clone();
                let config = self.config.clone();
                let limiter = limiters
                    .get(&probe.host_key())
                    .cloned()
                    .unwrap_or_else(|| Arc::new(Semaphore::new(config.max_connections_per_host.max(1))));

                async move {
                    let result = probe.run(&client, &config, &limiter).await;
                    (probe, result)
                }
            })
            .buffer_unordered(self.config.max_in_flight.max(1))
            .collect::<Vec<_>>()
            .await;

        for (probe, result) in results {
            match result {
                Ok(outcome) => report.reachable.push(ReachableUrl {
                    url: probe.raw_url,
                    outcome,
                }),
                Err(failure) => {
                    log::warn!("Failed to download {}: {}", probe.raw_url, failure);
                    report.unreachable.push(UnreachableUrl {
                        url: probe.raw_url,
                        paths: probe.paths,
                        failure,
                    });
                }
            }
        }
        report.reachable.sort_by(|a, b| a.url.cmp(&b.url));
        report.unreachable.sort_by(|a, b| a.url.cmp(&b.url));

        log::info!(
            "Reachability check finished: {}/{} reachable",
            report.reachable.len(),
            total
        );
        report
    }

    fn host_limiters(&self, pending: &[PendingProbe]) -> HashMap<String, Arc<Semaphore>> {
        let permits = self.config.max_connections_per_host.max(1);
        let mut limiters = HashMap::new();
        for probe in pending {
            limiters
                .entry(probe.host_key())
                .or_insert_with(|| Arc::new(Semaphore::new(permits)));
        }
        limiters
    }
}
