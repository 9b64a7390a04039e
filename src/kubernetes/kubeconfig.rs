// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Up-front validation of the cluster selection

use crate::error::{DeployError, Result};
use kube::config::Kubeconfig;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Check that the kubeconfig parses and that the requested context exists.
///
/// With no explicit path the standard lookup (`KUBECONFIG`, then
/// `~/.kube/config`) is used. Returns the context name kubectl will use.
#[instrument]
pub fn verify_kubeconfig(path: Option<&Path>, context: Option<&str>) -> Result<String> {
    let kubeconfig = match path {
        Some(p) => Kubeconfig::read_from(p).map_err(|e| {
            DeployError::KubeconfigError(format!("Failed to read {}: {}", p.display(), e))
        })?,
        None => Kubeconfig::read().map_err(|e| {
            DeployError::KubeconfigError(format!("Failed to read default kubeconfig: {}", e))
        })?,
    };

    select_context(&kubeconfig, context)
}

fn select_context(kubeconfig: &Kubeconfig, context: Option<&str>) -> Result<String> {
    let Some(name) = context
        .map(str::to_string)
        .or_else(|| kubeconfig.current_context.clone())
    else {
        return Err(DeployError::KubeconfigError(
            "No context given and kubeconfig has no current-context".to_string(),
        ));
    };

    if !kubeconfig.contexts.iter().any(|c| c.name == name) {
        let known: Vec<&str> = kubeconfig.contexts.iter().map(|c| c.name.as_str()).collect();
        return Err(DeployError::KubeconfigError(format!(
            "Context '{}' not found in kubeconfig (available: {})",
            name,
            known.join(", ")
        )));
    }

    debug!("Kubeconfig declares {} contexts", kubeconfig.contexts.len());
    info!("Using cluster context '{}'", name);
    Ok(name)
}
