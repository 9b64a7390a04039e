// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Runs the deployment stages in order against the cluster.

use crate::config::{Config, FailurePolicy};
use crate::error::{DeployError, Result};
use crate::kubernetes::{
    args, discover_external_endpoint, ensure_namespace_exists, ClusterCtl, EndpointOutcome,
};
use crate::manifests::{deployment_document, service_document, ManifestDocument};
use crate::pipeline::report::{DeployReport, Stage, StageOutcome};
use tracing::{error, info, instrument, warn};

/// Linear deploy pipeline: connectivity, namespace, manifests, rollout,
/// endpoint, summary.
///
/// Only the connectivity check is fatal. What happens after any later
/// failure is decided by the configured `FailurePolicy`.
pub struct DeploymentOrchestrator<C> {
    ctl: C,
    config: Config,
}

impl<C: ClusterCtl> DeploymentOrchestrator<C> {
    pub fn new(ctl: C, config: Config) -> Self {
        Self { ctl, config }
    }

    pub async fn run(&self) -> Result<DeployReport> {
        let workload = &self.config.workload;
        let mut report = DeployReport::new(self.config.failure_policy);

        info!(
            "Deploying {} to namespace {}",
            workload.name, workload.namespace
        );

        self.check_cluster_connectivity().await?;
        report.record(Stage::Connectivity, StageOutcome::Succeeded);

        'stages: {
            let outcome = self.ensure_namespace(&workload.namespace).await;
            if !self.proceed(&mut report, Stage::Namespace, outcome) {
                break 'stages;
            }

            let outcome = match render_documents(&self.config) {
                Ok((deployment, service)) => self.apply_manifests(&deployment, &service).await,
                Err(e) => StageOutcome::from(Err::<(), _>(e)),
            };
            if !self.proceed(&mut report, Stage::Manifests, outcome) {
                break 'stages;
            }

            let outcome = self
                .wait_for_rollout(&workload.namespace, &workload.name)
                .await;
            if !self.proceed(&mut report, Stage::Rollout, outcome) {
                break 'stages;
            }

            let endpoint = self
                .discover_external_endpoint(&workload.namespace, &workload.name)
                .await;
            let outcome = match endpoint {
                Ok(found) => {
                    report.endpoint = Some(found);
                    StageOutcome::Succeeded
                }
                Err(e) => StageOutcome::from(Err::<(), _>(e)),
            };
            self.proceed(&mut report, Stage::Endpoint, outcome);
        }

        let outcome = self.print_summary(&workload.namespace).await;
        report.record(Stage::Summary, outcome);

        Ok(report)
    }

    /// Record a stage and decide whether the pipeline continues
    fn proceed(&self, report: &mut DeployReport, stage: Stage, outcome: StageOutcome) -> bool {
        let failed = outcome.is_failed();
        if let StageOutcome::Failed { diagnostic } = &outcome {
            error!("Stage '{}' failed: {}", stage, diagnostic);
        }
        report.record(stage, outcome);

        if failed && self.config.failure_policy == FailurePolicy::Halt {
            warn!("Halting deployment after failed stage '{}'", stage);
            report.halted_at = Some(stage);
            return false;
        }
        true
    }

    /// Read-only query proving the control plane answers
    #[instrument(skip(self))]
    pub async fn check_cluster_connectivity(&self) -> Result<()> {
        info!("Checking kubectl configuration...");

        match self.ctl.run(&args(&["get", "nodes"])).await {
            Ok(nodes) => {
                let count = nodes.lines().filter(|l| !l.trim().is_empty()).count();
                info!("Cluster reachable ({} line(s) of node output)", count);
                Ok(())
            }
            Err(DeployError::CommandFailed { stderr, .. }) => {
                Err(DeployError::ClusterUnreachable(stderr))
            }
            Err(e) => Err(DeployError::ClusterUnreachable(e.to_string())),
        }
    }

    #[instrument(skip(self))]
    pub async fn ensure_namespace(&self, name: &str) -> StageOutcome {
        info!("Creating namespace {}...", name);
        ensure_namespace_exists(&self.ctl, name).await.into()
    }

    /// Write both documents, then submit each one independently
    #[instrument(skip_all)]
    pub async fn apply_manifests(
        &self,
        deployment: &ManifestDocument,
        service: &ManifestDocument,
    ) -> StageOutcome {
        info!("Applying manifests...");
        let dir = &self.config.manifest_dir;

        let paths = match (deployment.write_to(dir).await, service.write_to(dir).await) {
            (Ok(d), Ok(s)) => [d, s],
            (Err(e), _) | (_, Err(e)) => return Err::<(), _>(e).into(),
        };

        let mut failures = Vec::new();
        for path in &paths {
            let apply = args(&["apply", "-f", &path.display().to_string()]);
            match self.ctl.run(&apply).await {
                Ok(out) => info!("{}", out),
                Err(e) => failures.push(e.to_string()),
            }
        }

        if failures.is_empty() {
            StageOutcome::Succeeded
        } else {
            StageOutcome::Failed {
                diagnostic: failures.join("; "),
            }
        }
    }

    /// Blocks inside kubectl until the deployment is available
    #[instrument(skip(self))]
    pub async fn wait_for_rollout(&self, namespace: &str, workload: &str) -> StageOutcome {
        info!("Waiting for deployment {} to be ready...", workload);

        let target = format!("deployment/{}", workload);
        let mut status = args(&["rollout", "status", &target, "--namespace", namespace]);
        if let Some(timeout) = self.config.rollout_timeout {
            status.push(format!("--timeout={}s", timeout.as_secs()));
        }

        let result = self.ctl.run(&status).await;
        if let Ok(out) = &result {
            info!("{}", out);
        }
        result.into()
    }

    #[instrument(skip(self))]
    pub async fn discover_external_endpoint(
        &self,
        namespace: &str,
        service: &str,
    ) -> Result<EndpointOutcome> {
        info!("Getting external IP address...");

        let outcome =
            discover_external_endpoint(&self.ctl, namespace, service, self.config.endpoint_poll)
                .await?;

        match &outcome {
            EndpointOutcome::Found { url, .. } => {
                info!("{} has been deployed successfully!", service);
                println!("You can access the API at: {}", url);
            }
            EndpointOutcome::Unavailable { attempts } => {
                warn!(
                    "{} deployment is in progress, but the external IP is not available after {} attempts",
                    service, attempts
                );
                println!(
                    "You can check its status with: kubectl -n {} get service {}",
                    namespace, service
                );
            }
        }

        Ok(outcome)
    }

    /// Dump deployments, pods and services; failures are only logged
    #[instrument(skip(self))]
    pub async fn print_summary(&self, namespace: &str) -> StageOutcome {
        info!("Deployment summary:");

        match self
            .ctl
            .run(&args(&["get", "deployments,pods,services", "--namespace", namespace]))
            .await
        {
            Ok(table) => {
                println!("{}", table);
                StageOutcome::Succeeded
            }
            Err(e) => {
                warn!("Could not fetch deployment summary: {}", e);
                StageOutcome::Failed {
                    diagnostic: e.to_string(),
                }
            }
        }
    }
}

fn render_documents(config: &Config) -> Result<(ManifestDocument, ManifestDocument)> {
    Ok((
        deployment_document(&config.workload)?,
        service_document(&config.workload)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::{CommandResult, PollSchedule};
    use crate::test_utils::MockCluster;
    use crate::types::WorkloadSpec;
    use std::path::Path;
    use std::time::Duration;

    fn make_config(dir: &Path, policy: FailurePolicy) -> Config {
        Config {
            kubectl: "kubectl".into(),
            kubeconfig: None,
            context: None,
            workload: WorkloadSpec::default(),
            manifest_dir: dir.to_path_buf(),
            endpoint_poll: PollSchedule::fixed(30, Duration::from_secs(5)),
            rollout_timeout: None,
            failure_policy: policy,
            report_path: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = MockCluster::healthy("34.91.10.20");
        let orchestrator =
            DeploymentOrchestrator::new(ctl.clone(), make_config(dir.path(), FailurePolicy::Halt));

        let report = orchestrator.run().await.unwrap();

        assert!(report.failed_stages().is_empty());
        assert!(report.halted_at.is_none());
        assert!(matches!(report.endpoint, Some(EndpointOutcome::Found { attempts: 1, .. })));
        assert_eq!(report.stages.len(), 6);
        assert!(dir.path().join("gemma3-deployment.yaml").exists());
        assert!(dir.path().join("gemma3-service.yaml").exists());
    }

    #[tokio::test]
    async fn test_connectivity_failure_is_fatal_before_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = MockCluster::healthy("34.91.10.20").on(
            &["get", "nodes"],
            CommandResult::failed("The connection to the server localhost:8080 was refused"),
        );
        let orchestrator = DeploymentOrchestrator::new(
            ctl.clone(),
            make_config(dir.path(), FailurePolicy::BestEffort),
        );

        let err = orchestrator.run().await.unwrap_err();

        match err {
            DeployError::ClusterUnreachable(stderr) => assert!(stderr.contains("was refused")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctl.calls().len(), 1);
        assert!(!dir.path().join("gemma3-deployment.yaml").exists());
        assert!(!dir.path().join("gemma3-service.yaml").exists());
    }

    #[tokio::test]
    async fn test_apply_failure_surfaces_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let deployment_path = dir.path().join("gemma3-deployment.yaml");
        let ctl = MockCluster::healthy("34.91.10.20").on(
            &["apply", "-f", deployment_path.to_str().unwrap()],
            CommandResult::failed("error: unable to recognize: no matches for kind \"Deployment\""),
        );
        let orchestrator = DeploymentOrchestrator::new(
            ctl.clone(),
            make_config(dir.path(), FailurePolicy::BestEffort),
        );
        let spec = WorkloadSpec::default();

        let outcome = orchestrator
            .apply_manifests(
                &deployment_document(&spec).unwrap(),
                &service_document(&spec).unwrap(),
            )
            .await;

        match outcome {
            StageOutcome::Failed { diagnostic } => assert!(diagnostic.contains("no matches for kind")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        // The service is still submitted after the deployment failed
        assert_eq!(ctl.count(&["apply", "-f"]), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_best_effort_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = MockCluster::healthy("34.91.10.20")
            .on(&["apply", "-f"], CommandResult::failed("forbidden"));
        let orchestrator = DeploymentOrchestrator::new(
            ctl.clone(),
            make_config(dir.path(), FailurePolicy::BestEffort),
        );

        let report = orchestrator.run().await.unwrap();

        assert_eq!(report.failed_stages(), vec![Stage::Manifests]);
        assert!(report.halted_at.is_none());
        assert_eq!(ctl.count(&["rollout", "status"]), 1);
        assert_eq!(ctl.count(&["get", "service"]), 1);
    }

    #[tokio::test]
    async fn test_halt_policy_skips_remaining_stages() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = MockCluster::healthy("34.91.10.20")
            .on(&["apply", "-f"], CommandResult::failed("forbidden"));
        let orchestrator =
            DeploymentOrchestrator::new(ctl.clone(), make_config(dir.path(), FailurePolicy::Halt));

        let report = orchestrator.run().await.unwrap();

        assert_eq!(report.halted_at, Some(Stage::Manifests));
        assert_eq!(ctl.count(&["rollout", "status"]), 0);
        assert_eq!(ctl.count(&["get", "service"]), 0);
        // Summary still runs for diagnosis
        assert_eq!(ctl.count(&["get", "deployments,pods,services"]), 1);
        assert_eq!(report.outcome(Stage::Rollout), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_endpoint_unavailable_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = MockCluster::healthy("");
        let orchestrator =
            DeploymentOrchestrator::new(ctl.clone(), make_config(dir.path(), FailurePolicy::Halt));

        let report = orchestrator.run().await.unwrap();

        assert_eq!(report.endpoint, Some(EndpointOutcome::Unavailable { attempts: 30 }));
        assert!(report.failed_stages().is_empty());
        assert_eq!(ctl.count(&["get", "service"]), 30);
    }

    #[tokio::test]
    async fn test_rollout_passes_namespace_and_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = MockCluster::healthy("34.91.10.20");
        let mut config = make_config(dir.path(), FailurePolicy::Halt);
        config.rollout_timeout = Some(Duration::from_secs(600));
        let orchestrator = DeploymentOrchestrator::new(ctl.clone(), config);

        let outcome = orchestrator.wait_for_rollout("gemma3", "gemma3").await;

        assert_eq!(outcome, StageOutcome::Succeeded);
        assert_eq!(
            ctl.calls()[0].args,
            args(&[
                "rollout",
                "status",
                "deployment/gemma3",
                "--namespace",
                "gemma3",
                "--timeout=600s",
            ])
        );
    }

    #[tokio::test]
    async fn test_summary_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = MockCluster::new();
        let orchestrator =
            DeploymentOrchestrator::new(ctl, make_config(dir.path(), FailurePolicy::Halt));

        let outcome = orchestrator.print_summary("gemma3").await;

        assert!(outcome.is_failed());
    }
}
