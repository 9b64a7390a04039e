// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::cli::Args;
use crate::error::{DeployError, Result};
use crate::kubernetes::PollSchedule;
use crate::types::WorkloadSpec;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Behaviour after a stage other than the connectivity check fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure and run the remaining stages
    BestEffort,
    /// Stop the pipeline at the first failure
    Halt,
}

/// Deployer configuration resolved from arguments and environment
#[derive(Debug, Clone)]
pub struct Config {
    pub kubectl: PathBuf,
    /// Explicit cluster selection; `None` falls back to kubectl's own lookup
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub workload: WorkloadSpec,
    pub manifest_dir: PathBuf,
    pub endpoint_poll: PollSchedule,
    pub rollout_timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
    pub report_path: Option<PathBuf>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        validate_name("namespace", &args.namespace)?;
        validate_name("name", &args.name)?;
        // Also the Service name, which must be an RFC 1035 label
        if !args.name.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(DeployError::ConfigError(format!(
                "name '{}' must start with a letter",
                args.name
            )));
        }

        if args.endpoint_attempts == 0 {
            return Err(DeployError::ConfigError(
                "endpoint attempts must be at least 1".to_string(),
            ));
        }

        let interval = Duration::from_secs(args.endpoint_interval);
        let endpoint_poll = PollSchedule {
            max_attempts: args.endpoint_attempts,
            interval,
            max_interval: args
                .endpoint_backoff
                .then(|| Duration::from_secs(args.endpoint_max_interval).max(interval)),
        };

        Ok(Config {
            kubectl: args.kubectl,
            kubeconfig: args.kubeconfig,
            context: args.context,
            workload: WorkloadSpec {
                namespace: args.namespace,
                name: args.name,
                image: args.image,
            },
            manifest_dir: args.manifest_dir.unwrap_or_else(std::env::temp_dir),
            endpoint_poll,
            rollout_timeout: args.rollout_timeout.map(Duration::from_secs),
            failure_policy: args.on_failure,
            report_path: args.report,
        })
    }

    /// Whether the cluster selection was given explicitly and should be checked
    pub fn has_explicit_cluster(&self) -> bool {
        self.kubeconfig.is_some() || self.context.is_some()
    }
}

/// Kubernetes object names here must be RFC 1123 labels
fn validate_name(field: &str, value: &str) -> Result<()> {
    let valid = !value.is_empty()
        && value.len() <= 63
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !value.starts_with('-')
        && !value.ends_with('-');

    if valid {
        Ok(())
    } else {
        Err(DeployError::ConfigError(format!(
            "{} '{}' is not a valid Kubernetes name",
            field, value
        )))
    }
}
