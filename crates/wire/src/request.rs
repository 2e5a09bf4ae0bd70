// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use nd_core::{JobId, StepKey};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verified job credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Seconds since the epoch after which the step may be killed
    pub expiration_time: u64,
    /// Signature bytes; the leading bytes double as the client's I/O key
    #[serde(default)]
    pub signature: Vec<u8>,
}

/// Launch the tasks of an interactive job step on this node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub job_id: u32,
    pub job_step_id: u32,
    pub uid: u32,
    /// Total tasks in the step, across all nodes
    pub nprocs: u32,
    pub nnodes: u32,
    /// This node's index within the step
    pub srun_node_id: u32,
    /// Tasks to start on this node
    pub tasks_to_launch: u32,
    #[serde(default)]
    pub slurmd_debug: u16,
    pub credential: Credential,
    #[serde(default)]
    pub task_flags: u16,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub argv: Vec<String>,
    pub cwd: PathBuf,
    pub resp_port: u16,
    pub io_port: u16,
    #[serde(default)]
    pub ofname: Option<PathBuf>,
    #[serde(default)]
    pub efname: Option<PathBuf>,
    #[serde(default)]
    pub ifname: Option<PathBuf>,
    /// Global id of each task started here, indexed by local task id
    #[serde(default)]
    pub global_task_ids: Vec<u32>,
}

impl LaunchRequest {
    pub fn key(&self) -> StepKey {
        StepKey::new(self.job_id, self.job_step_id)
    }
}

/// Start a batch job script on this node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub job_id: u32,
    pub uid: u32,
    pub work_dir: PathBuf,
    #[serde(default)]
    pub environment: Vec<String>,
    /// Argument slots to reserve for the script invocation
    #[serde(default)]
    pub argc: u32,
    #[serde(default)]
    pub out: Option<PathBuf>,
    #[serde(default)]
    pub err: Option<PathBuf>,
}

impl BatchRequest {
    pub fn key(&self) -> StepKey {
        StepKey::batch(JobId(self.job_id))
    }
}
