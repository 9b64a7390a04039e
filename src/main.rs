// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gemma3_deployer::cli::Args;
use gemma3_deployer::config::Config;
use gemma3_deployer::error::DeployError;
use gemma3_deployer::kubernetes::{verify_kubeconfig, Kubectl};
use gemma3_deployer::pipeline::DeploymentOrchestrator;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_args(Args::parse())?;
    info!(
        "Configuration loaded: namespace={}, name={}, manifest_dir={}",
        config.workload.namespace,
        config.workload.name,
        config.manifest_dir.display()
    );

    if config.has_explicit_cluster() {
        verify_kubeconfig(config.kubeconfig.as_deref(), config.context.as_deref())?;
    }

    let kubectl = Kubectl::new(&config.kubectl)
        .with_kubeconfig(config.kubeconfig.clone())
        .with_context(config.context.clone());
    let report_path = config.report_path.clone();

    let orchestrator = DeploymentOrchestrator::new(kubectl, config);
    let report = match orchestrator.run().await {
        Ok(report) => report,
        Err(DeployError::ClusterUnreachable(reason)) => {
            error!("kubectl not configured correctly: {}", reason);
            error!(
                "Run the kubectl configure command from the Terraform outputs, or pass --kubeconfig and --context"
            );
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(path) = report_path {
        report.write_json(&path).await?;
        info!("Report written to {}", path.display());
    }

    if let Some(stage) = report.halted_at {
        error!("Deployment halted at stage '{}'", stage);
        return Ok(ExitCode::FAILURE);
    }

    let failed = report.failed_stages();
    if !failed.is_empty() {
        let names: Vec<String> = failed.iter().map(|s| s.to_string()).collect();
        warn!("Deployment finished with failed stages: {}", names.join(", "));
    }

    Ok(ExitCode::SUCCESS)
}
