// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster access through the kubectl command-line tool, kubeconfig checks,
//! namespace management and service endpoint discovery.

pub mod endpoint;
pub mod kubeconfig;
pub mod kubectl;
pub mod namespaces;

use crate::error::{DeployError, Result};
use async_trait::async_trait;

pub use endpoint::{discover_external_endpoint, EndpointOutcome, PollSchedule};
pub use kubeconfig::verify_kubeconfig;
pub use kubectl::Kubectl;
pub use namespaces::ensure_namespace_exists;

/// Captured output of a single cluster-control invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandResult {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }

    /// Turn a failed invocation into an error carrying its stderr
    pub fn into_stdout(self, args: &[String]) -> Result<String> {
        if self.success {
            Ok(self.stdout.trim().to_string())
        } else {
            Err(DeployError::CommandFailed {
                command: args.join(" "),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// The seam between the pipeline and the cluster-control executable
#[async_trait]
pub trait ClusterCtl: Send + Sync {
    /// Run one invocation with the given subcommand arguments, optionally
    /// feeding `stdin` to the process.
    ///
    /// A non-zero exit is reported through `CommandResult::success`; only a
    /// failure to launch the process is an `Err`.
    async fn exec(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult>;

    /// Run an invocation and return its trimmed stdout, or the failure with stderr
    async fn run(&self, args: &[String]) -> Result<String> {
        self.exec(args, None).await?.into_stdout(args)
    }
}

/// Build an owned argument vector from string slices
pub fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
