// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Building job records from inbound launch and batch requests.
//!
//! Both paths stage everything in a [`JobBuilder`] and open the handoff pipe
//! last; any failure drops the builder, so nothing from a failed attempt
//! outlives the call.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use nd_adapters::{
    IdentityAdapter, IdentityError, NameContext, NameTemplate, OsPipes, PatternNames, PipeAdapter,
    SystemIdentity,
};
use nd_core::{AuthKey, ClientEndpoint, JobBuilder, JobRecord};
use nd_wire::{BatchRequest, LaunchRequest};
use thiserror::Error;
use tracing::{debug, error};

use crate::env::DEFAULT_BATCH_OUTPUT;

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("identity resolution failed: {0}")]
    IdentityResolution(#[from] IdentityError),
    #[error("could not allocate handoff pipe: {0}")]
    ResourceExhaustion(#[source] std::io::Error),
}

/// Collaborators used while building a job record.
#[derive(Clone)]
pub struct CreateDeps {
    pub identity: Arc<dyn IdentityAdapter>,
    pub pipes: Arc<dyn PipeAdapter>,
    pub names: Arc<dyn NameTemplate>,
    /// Output pattern for batch jobs that name none
    pub batch_output: String,
}

impl CreateDeps {
    pub fn new(
        identity: Arc<dyn IdentityAdapter>,
        pipes: Arc<dyn PipeAdapter>,
        names: Arc<dyn NameTemplate>,
    ) -> Self {
        Self { identity, pipes, names, batch_output: DEFAULT_BATCH_OUTPUT.to_string() }
    }

    /// Password database, OS pipes and the default templates.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemIdentity), Arc::new(OsPipes), Arc::new(PatternNames))
    }

    pub fn batch_output(mut self, pattern: impl Into<String>) -> Self {
        self.batch_output = pattern.into();
        self
    }

    fn seal(&self, builder: JobBuilder) -> Result<JobRecord, CreateError> {
        let handoff = self.pipes.open().map_err(|e| {
            error!(job = %builder.key(), error = %e, "pipe allocation failed");
            CreateError::ResourceExhaustion(e)
        })?;
        Ok(builder.build(handoff))
    }
}

/// Build the record for an interactive step.
///
/// The response and I/O addresses are the client's address with the ports
/// carried in the request.
pub fn create_from_launch(
    req: &LaunchRequest,
    client: SocketAddr,
    deps: &CreateDeps,
) -> Result<JobRecord, CreateError> {
    let key = req.key();
    debug!(job = %key, tasks = req.tasks_to_launch, "creating job from launch request");

    let user = deps.identity.lookup_user(req.uid).inspect_err(|e| {
        error!(job = %key, uid = req.uid, error = %e, "user lookup failed");
    })?;

    let resp_addr = SocketAddr::new(client.ip(), req.resp_port);
    let io_addr = SocketAddr::new(client.ip(), req.io_port);
    let mut endpoint = ClientEndpoint::new(
        AuthKey::from_slice(&req.credential.signature),
        Some(resp_addr),
        Some(io_addr),
    );
    endpoint.ofname = req.ofname.clone();
    endpoint.efname = req.efname.clone();
    endpoint.ifname = req.ifname.clone();

    let builder = JobBuilder::new(key, user, endpoint)
        .nprocs(req.nprocs)
        .nnodes(req.nnodes)
        .node_id(req.srun_node_id)
        .ntasks(req.tasks_to_launch)
        .debug(req.slurmd_debug)
        .timelimit(req.credential.expiration_time)
        .task_flags(req.task_flags)
        .env(&req.env)
        .argv(&req.argv)
        .cwd(&req.cwd)
        .init_tasks(&req.global_task_ids);

    deps.seal(builder)
}

/// Build the record for a batch job: one task, no step, output to a file.
///
/// The script path is not known yet, so the argument vector only reserves
/// slots (at least two) to be filled in with [`JobRecord::set_arg`].
pub fn create_from_batch(req: &BatchRequest, deps: &CreateDeps) -> Result<JobRecord, CreateError> {
    let key = req.key();
    debug!(job = %key, "creating batch job");

    let user = deps.identity.lookup_user(req.uid).inspect_err(|e| {
        error!(job = %key, uid = req.uid, error = %e, "user lookup failed");
    })?;

    let ctx = NameContext {
        job_id: key.job_id,
        step_id: key.step_id,
        user: user.name.clone(),
        node_id: 0,
        cwd: req.work_dir.clone(),
    };
    let pattern = req.out.as_ref().map(|p| p.to_string_lossy().into_owned());
    let ofname = deps.names.resolve(&ctx, pattern.as_deref().unwrap_or(&deps.batch_output));
    let efname = req.err.clone().unwrap_or_else(|| ofname.clone());

    let endpoint = ClientEndpoint::new(AuthKey::default(), None, None)
        .ofname(ofname)
        .efname(efname)
        .ifname(PathBuf::from("/dev/null"));

    let slots = if req.argc > 0 { req.argc as usize } else { 2 };
    let builder = JobBuilder::new(key, user, endpoint)
        .ntasks(1)
        .batch(true)
        .env(&req.environment)
        .argv_slots(slots)
        .cwd(&req.work_dir)
        .init_tasks(&[0]);

    deps.seal(builder)
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod tests;
