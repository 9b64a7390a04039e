// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Identity of the deployed workload
pub mod workload {
    pub const NAMESPACE: &str = "gemma3";
    pub const APP_NAME: &str = "gemma3";
    pub const IMAGE: &str = "ghcr.io/google-deepmind/gemma:latest";
    /// Label key used for selectors
    pub const APP_LABEL: &str = "app";
    /// Node label key the workload is pinned to
    pub const NODE_SELECTOR_KEY: &str = "model";
    /// Taint key on the dedicated node pool
    pub const TOLERATION_KEY: &str = "dedicated";
}

/// Container and service shape
pub mod container {
    pub const REPLICAS: i32 = 1;
    pub const PORT: i32 = 8080;
    pub const PORT_NAME: &str = "http";
    pub const SERVICE_PORT: i32 = 80;
    pub const CPU_REQUEST: &str = "2";
    pub const CPU_LIMIT: &str = "4";
    pub const MEMORY_REQUEST: &str = "8Gi";
    pub const MEMORY_LIMIT: &str = "16Gi";
    pub const MODEL_PATH_ENV: &str = "MODEL_PATH";
    pub const MODEL_PATH: &str = "/models/gemma-3";
    pub const MODEL_VOLUME: &str = "model-storage";
    pub const MODEL_MOUNT_PATH: &str = "/models";
}

/// External endpoint polling configuration
pub mod endpoint {
    /// Number of service queries before giving up
    pub const MAX_ATTEMPTS: u32 = 30;
    /// Delay between queries in seconds
    pub const POLL_INTERVAL_SECS: u64 = 5;
    /// Cap for the interval when exponential backoff is enabled
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
    pub const INGRESS_IP_JSONPATH: &str = "{.status.loadBalancer.ingress[0].ip}";
}

/// Default cluster-control executable
pub const KUBECTL: &str = "kubectl";
