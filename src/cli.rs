// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command-line arguments; every flag can also be set from the environment

use crate::config::FailurePolicy;
use crate::constants::{endpoint, workload, KUBECTL};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gemma3-deploy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deploy the Gemma 3 model server to an existing GKE cluster")]
pub struct Args {
    /// Path to the kubectl executable
    #[arg(long, env = "GEMMA3_KUBECTL", default_value = KUBECTL)]
    pub kubectl: PathBuf,

    /// Kubeconfig file to pass to every kubectl call; without it kubectl's
    /// own lookup (including `KUBECONFIG`) applies
    #[arg(long, env = "GEMMA3_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to pass to every kubectl call
    #[arg(long, env = "GEMMA3_CONTEXT")]
    pub context: Option<String>,

    /// Namespace to deploy into
    #[arg(short, long, env = "GEMMA3_NAMESPACE", default_value = workload::NAMESPACE)]
    pub namespace: String,

    /// Name of the Deployment and Service
    #[arg(long, env = "GEMMA3_APP_NAME", default_value = workload::APP_NAME)]
    pub name: String,

    /// Container image of the model server
    #[arg(long, env = "GEMMA3_IMAGE", default_value = workload::IMAGE)]
    pub image: String,

    /// Directory the rendered manifests are written to (defaults to the system temp dir)
    #[arg(long, env = "GEMMA3_MANIFEST_DIR")]
    pub manifest_dir: Option<PathBuf>,

    /// Number of queries for the load-balancer address
    #[arg(long, env = "GEMMA3_ENDPOINT_ATTEMPTS", default_value_t = endpoint::MAX_ATTEMPTS)]
    pub endpoint_attempts: u32,

    /// Seconds between address queries
    #[arg(long, env = "GEMMA3_ENDPOINT_INTERVAL", default_value_t = endpoint::POLL_INTERVAL_SECS)]
    pub endpoint_interval: u64,

    /// Double the query interval after every attempt
    #[arg(long, env = "GEMMA3_ENDPOINT_BACKOFF")]
    pub endpoint_backoff: bool,

    /// Upper bound in seconds for the backed-off interval
    #[arg(long, env = "GEMMA3_ENDPOINT_MAX_INTERVAL", default_value_t = endpoint::POLL_MAX_INTERVAL_SECS)]
    pub endpoint_max_interval: u64,

    /// Seconds `rollout status` may block before giving up (kubectl default: no limit)
    #[arg(long, env = "GEMMA3_ROLLOUT_TIMEOUT")]
    pub rollout_timeout: Option<u64>,

    /// What to do when a stage after the connectivity check fails
    #[arg(long, env = "GEMMA3_ON_FAILURE", value_enum, default_value_t = FailurePolicy::BestEffort)]
    pub on_failure: FailurePolicy,

    /// Write the deployment report as JSON to this file
    #[arg(long, env = "GEMMA3_REPORT")]
    pub report: Option<PathBuf>,
}
