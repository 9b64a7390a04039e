// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::error::Result;
use crate::kubernetes::{args, ClusterCtl};
use tracing::{debug, info, instrument};

/// Ensure a namespace exists in the cluster, create if it doesn't.
///
/// Renders the namespace client-side and feeds it to `apply`, so running it
/// against an existing namespace leaves it unchanged.
#[instrument(skip(ctl))]
pub async fn ensure_namespace_exists<C: ClusterCtl + ?Sized>(ctl: &C, namespace: &str) -> Result<()> {
    let rendered = ctl
        .run(&args(&[
            "create",
            "namespace",
            namespace,
            "--dry-run=client",
            "-o",
            "yaml",
        ]))
        .await?;
    debug!("Rendered namespace manifest:\n{}", rendered);

    let apply = args(&["apply", "-f", "-"]);
    let outcome = ctl
        .exec(&apply, Some(rendered.as_str()))
        .await?
        .into_stdout(&apply)?;

    info!("Namespace {}: {}", namespace, outcome);
    Ok(())
}
