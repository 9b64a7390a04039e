// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Process-backed implementation of `ClusterCtl`

use crate::error::{DeployError, Result};
use crate::kubernetes::{ClusterCtl, CommandResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Runs the kubectl executable, pinning every call to an explicit
/// kubeconfig and context when configured.
#[derive(Debug, Clone)]
pub struct Kubectl {
    program: PathBuf,
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
}

impl Kubectl {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            kubeconfig: None,
            context: None,
        }
    }

    pub fn with_kubeconfig(mut self, kubeconfig: Option<PathBuf>) -> Self {
        self.kubeconfig = kubeconfig;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    /// Global flags placed in front of every subcommand
    fn global_args(&self) -> Vec<String> {
        let mut global = Vec::new();
        if let Some(path) = &self.kubeconfig {
            global.push("--kubeconfig".to_string());
            global.push(path.display().to_string());
        }
        if let Some(context) = &self.context {
            global.push("--context".to_string());
            global.push(context.clone());
        }
        global
    }
}

#[async_trait]
impl ClusterCtl for Kubectl {
    #[instrument(skip(self, stdin), fields(program = %self.program.display()))]
    async fn exec(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult> {
        let program = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .args(self.global_args())
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DeployError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Feed stdin alongside the output readers; a child that exits without
        // reading it must still report its own stderr and status
        let writer = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.to_owned();
                Some(tokio::spawn(async move {
                    let written = pipe.write_all(input.as_bytes()).await;
                    drop(pipe);
                    written
                }))
            }
            _ => None,
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| DeployError::Wait {
                program: program.clone(),
                source,
            })?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("{} did not consume stdin: {}", program, e),
                Err(e) => debug!("stdin writer for {} aborted: {}", program, e),
            }
        }

        debug!("Exited with {}", output.status);

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::args;

    #[tokio::test]
    async fn test_exec_captures_stdout() {
        let ctl = Kubectl::new("echo");

        let result = ctl.exec(&args(&["get", "nodes"]), None).await.unwrap();

        assert!(result.success);
        assert_eq!(result.stdout.trim(), "get nodes");
    }

    #[tokio::test]
    async fn test_exec_prepends_kubeconfig_and_context() {
        let ctl = Kubectl::new("echo")
            .with_kubeconfig(Some(PathBuf::from("/etc/kube/gke.yaml")))
            .with_context(Some("gke_demo".to_string()));

        let result = ctl.exec(&args(&["get", "nodes"]), None).await.unwrap();

        assert_eq!(
            result.stdout.trim(),
            "--kubeconfig /etc/kube/gke.yaml --context gke_demo get nodes"
        );
    }

    #[tokio::test]
    async fn test_exec_reports_non_zero_exit() {
        let ctl = Kubectl::new("false");

        let result = ctl.exec(&args(&["get", "nodes"]), None).await.unwrap();

        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_exec_feeds_stdin() {
        let ctl = Kubectl::new("cat");

        let result = ctl
            .exec(&[], Some("kind: Namespace\n"))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.stdout, "kind: Namespace\n");
    }

    #[tokio::test]
    async fn test_exec_keeps_stderr_when_stdin_is_not_read() {
        let ctl = Kubectl::new("sh");
        let input = "x".repeat(1024 * 1024);

        let result = ctl
            .exec(
                &args(&["-c", "echo 'Forbidden: denied' >&2; exit 1"]),
                Some(input.as_str()),
            )
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.stderr.trim(), "Forbidden: denied");
    }

    #[tokio::test]
    async fn test_exec_missing_program_is_spawn_error() {
        let ctl = Kubectl::new("/nonexistent/kubectl");

        let err = ctl.exec(&args(&["get", "nodes"]), None).await.unwrap_err();

        assert!(matches!(err, DeployError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_run_surfaces_stderr_on_failure() {
        let ctl = Kubectl::new("sh");

        let err = ctl
            .run(&args(&["-c", "echo 'connection refused' >&2; exit 1"]))
            .await
            .unwrap_err();

        match err {
            DeployError::CommandFailed { stderr, .. } => assert_eq!(stderr, "connection refused"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
