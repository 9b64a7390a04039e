// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-stage results of a deployment run

use crate::config::FailurePolicy;
use crate::error::{DeployError, Result};
use crate::kubernetes::EndpointOutcome;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Connectivity,
    Namespace,
    Manifests,
    Rollout,
    Endpoint,
    Summary,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Connectivity => "connectivity check",
            Stage::Namespace => "namespace",
            Stage::Manifests => "manifest apply",
            Stage::Rollout => "rollout wait",
            Stage::Endpoint => "endpoint discovery",
            Stage::Summary => "summary",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Succeeded,
    Failed { diagnostic: String },
}

impl StageOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed { .. })
    }
}

impl<T> From<Result<T>> for StageOutcome {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(_) => StageOutcome::Succeeded,
            Err(e) => StageOutcome::Failed {
                diagnostic: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub policy: FailurePolicy,
    pub stages: Vec<StageReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointOutcome>,
    /// Set when the halt policy stopped the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_at: Option<Stage>,
}

impl DeployReport {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            stages: Vec::new(),
            endpoint: None,
            halted_at: None,
        }
    }

    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        self.stages.push(StageReport { stage, outcome });
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.outcome)
    }

    pub fn failed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|r| r.outcome.is_failed())
            .map(|r| r.stage)
            .collect()
    }

    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| DeployError::Io {
            path: path.display().to_string(),
            source: e.into(),
        })?;

        tokio::fs::write(path, json)
            .await
            .map_err(|source| DeployError::Io {
                path: path.display().to_string(),
                source,
            })
    }
}
