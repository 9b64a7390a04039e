// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The ordered deployment stages and their results.

pub mod orchestrator;
pub mod report;

pub use orchestrator::DeploymentOrchestrator;
pub use report::{DeployReport, Stage, StageOutcome, StageReport};
