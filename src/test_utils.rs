// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for scripting cluster-control responses.

use crate::error::Result;
use crate::kubernetes::{ClusterCtl, CommandResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

/// A fake cluster-control tool that answers from a script keyed by argument prefix.
///
/// Each prefix owns a queue of results; the last result in a queue repeats
/// once the others have been consumed.
#[derive(Clone, Default)]
pub struct MockCluster {
    responses: Arc<Mutex<Vec<(Vec<String>, VecDeque<CommandResult>)>>>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer invocations starting with `prefix` with `result`
    pub fn on(self, prefix: &[&str], result: CommandResult) -> Self {
        self.on_sequence(prefix, vec![result])
    }

    /// Answer successive invocations starting with `prefix` from `results`
    pub fn on_sequence(self, prefix: &[&str], results: Vec<CommandResult>) -> Self {
        self.responses.lock().unwrap().push((
            prefix.iter().map(|s| s.to_string()).collect(),
            results.into(),
        ));
        self
    }

    /// A cluster where every stage succeeds and the service has an address
    pub fn healthy(address: &str) -> Self {
        Self::new()
            .on(&["get", "nodes"], CommandResult::ok("gke-node-1   Ready"))
            .on(
                &["create", "namespace"],
                CommandResult::ok(namespace_yaml("gemma3")),
            )
            .on(&["apply", "-f"], CommandResult::ok("configured"))
            .on(
                &["rollout", "status"],
                CommandResult::ok("deployment \"gemma3\" successfully rolled out"),
            )
            .on(&["get", "service"], CommandResult::ok(address))
            .on(
                &["get", "deployments,pods,services"],
                CommandResult::ok("NAME READY"),
            )
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded invocations whose arguments start with `prefix`
    pub fn count(&self, prefix: &[&str]) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| starts_with(&c.args, prefix))
            .count()
    }

    fn find_response(&self, args: &[String]) -> Option<CommandResult> {
        let mut responses = self.responses.lock().unwrap();

        // Longest matching prefix wins, later registrations break ties
        let (_, queue) = responses
            .iter_mut()
            .filter(|(prefix, _)| {
                let prefix: Vec<&str> = prefix.iter().map(String::as_str).collect();
                starts_with(args, &prefix)
            })
            .max_by_key(|(prefix, _)| prefix.len())?;

        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl ClusterCtl for MockCluster {
    async fn exec(&self, args: &[String], stdin: Option<&str>) -> Result<CommandResult> {
        self.calls.lock().unwrap().push(Invocation {
            args: args.to_vec(),
            stdin: stdin.map(str::to_string),
        });

        // Unscripted invocations fail like an unknown kubectl subcommand
        Ok(self.find_response(args).unwrap_or_else(|| {
            CommandResult::failed(format!("error: unknown command \"{}\"", args.join(" ")))
        }))
    }
}

fn starts_with(args: &[String], prefix: &[&str]) -> bool {
    args.len() >= prefix.len() && args.iter().zip(prefix).all(|(a, p)| a == p)
}

/// The YAML kubectl prints for `create namespace --dry-run=client -o yaml`
pub fn namespace_yaml(name: &str) -> String {
    format!(
        "apiVersion: v1\nkind: Namespace\nmetadata:\n  creationTimestamp: null\n  name: {}\nspec: {{}}\nstatus: {{}}\n",
        name
    )
}
