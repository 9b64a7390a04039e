// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Cluster not reachable: {0}")]
    ClusterUnreachable(String),

    #[error("Command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Manifest rendering failed: {0}")]
    ManifestError(#[from] serde_yaml::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DeployError>;
