// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Load-balancer address polling

use crate::constants::endpoint::INGRESS_IP_JSONPATH;
use crate::error::Result;
use crate::kubernetes::{args, ClusterCtl};
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};
use url::Url;

/// How often and how long to poll for the external address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub max_attempts: u32,
    pub interval: Duration,
    /// When set, the interval doubles after every attempt up to this cap
    pub max_interval: Option<Duration>,
}

impl PollSchedule {
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            max_interval: None,
        }
    }

    fn next_interval(&self, current: Duration) -> Duration {
        match self.max_interval {
            Some(cap) => (current * 2).min(cap),
            None => current,
        }
    }
}

/// Result of endpoint discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EndpointOutcome {
    Found {
        address: String,
        url: String,
        attempts: u32,
    },
    /// The address was not assigned within the attempt budget
    Unavailable { attempts: u32 },
}

/// Poll the service until the load balancer reports an ingress address.
///
/// Stops at the first non-empty answer. Failed queries count as attempts and
/// are logged with their stderr. Sleeps only between attempts.
#[instrument(skip(ctl, schedule))]
pub async fn discover_external_endpoint<C: ClusterCtl + ?Sized>(
    ctl: &C,
    namespace: &str,
    service: &str,
    schedule: PollSchedule,
) -> Result<EndpointOutcome> {
    let jsonpath = format!("jsonpath={}", INGRESS_IP_JSONPATH);
    let query = args(&["get", "service", service, "-o", &jsonpath, "--namespace", namespace]);
    let mut interval = schedule.interval;

    for attempt in 1..=schedule.max_attempts {
        match ctl.run(&query).await {
            Ok(address) if !address.is_empty() => {
                let url = endpoint_url(&address);
                info!("External address {} assigned after {} attempt(s)", address, attempt);
                return Ok(EndpointOutcome::Found {
                    address,
                    url,
                    attempts: attempt,
                });
            }
            Ok(_) => {}
            Err(e) => warn!("Querying service {}/{} failed: {}", namespace, service, e),
        }

        if attempt < schedule.max_attempts {
            info!(
                "Waiting for external IP... ({}/{}), retrying in {:?}",
                attempt, schedule.max_attempts, interval
            );
            sleep(interval).await;
            interval = schedule.next_interval(interval);
        }
    }

    Ok(EndpointOutcome::Unavailable {
        attempts: schedule.max_attempts,
    })
}

/// Access URL for an address, printed without the root path slash
fn endpoint_url(address: &str) -> String {
    let host = if address.contains(':') && !address.starts_with('[') {
        format!("[{}]", address)
    } else {
        address.to_string()
    };

    Url::parse(&format!("http://{}", host))
        .map(|u| u.as_str().trim_end_matches('/').to_string())
        .unwrap_or_else(|_| format!("http://{}", address))
}
