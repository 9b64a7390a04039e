// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rendering the workload resources to YAML documents on disk

use crate::error::{DeployError, Result};
use crate::types::WorkloadSpec;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Rendered text of one resource and the file it is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    pub file_name: String,
    pub content: String,
}

impl ManifestDocument {
    fn render<T: Serialize>(file_name: String, resource: &T) -> Result<Self> {
        Ok(Self {
            file_name,
            content: serde_yaml::to_string(resource)?,
        })
    }

    /// Write the document into `dir`, returning the full path.
    ///
    /// The file is complete once this returns; it is left in place after the run.
    #[instrument(skip(self), fields(file = %self.file_name))]
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| DeployError::Io {
                path: dir.display().to_string(),
                source,
            })?;

        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.content.as_bytes())
            .await
            .map_err(|source| DeployError::Io {
                path: path.display().to_string(),
                source,
            })?;

        debug!("Wrote {} bytes to {}", self.content.len(), path.display());
        Ok(path)
    }
}

/// Deployment document for the workload
pub fn deployment_document(spec: &WorkloadSpec) -> Result<ManifestDocument> {
    ManifestDocument::render(format!("{}-deployment.yaml", spec.name), &spec.deployment())
}

/// Service document for the workload
pub fn service_document(spec: &WorkloadSpec) -> Result<ManifestDocument> {
    ManifestDocument::render(format!("{}-service.yaml", spec.name), &spec.service())
}
