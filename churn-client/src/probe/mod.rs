//! Probe abstractions for the container runtime and consensus leadership.
//!
//! # Design
//!
//! The probes are async and per-container:
//! - `is_running()` queries one container's live state
//! - `restart()` issues a restart and reports success/failure
//! - `is_leader()` asks one consensus-group member whether it currently
//!   believes itself the leader
//!
//! Every implementation bounds its queries with a timeout; the control
//! loop treats any per-container failure as the conservative default
//! (not running / not leader) and keeps going.

mod docker;
mod mock;

pub use docker::DockerProbe;
pub use mock::MockProbe;

use async_trait::async_trait;
use churn_core::ContainerId;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by probe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Docker API error.
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// Command execution failed inside a container.
    #[error("exec failed in {container}: exit={exit_code}, stderr={stderr}")]
    ExecFailed {
        /// Container the command ran in.
        container: ContainerId,
        /// Exit code from the command.
        exit_code: i64,
        /// Standard error output.
        stderr: String,
    },

    /// A probe command produced output we could not interpret.
    #[error("invalid probe output: {0}")]
    InvalidOutput(String),

    /// The probe did not answer within its bound.
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    /// Injected failure (mock probe).
    #[error("probe failed: {0}")]
    Failed(String),
}

/// Queries and perturbs the live state of individual containers.
#[async_trait]
pub trait RuntimeProbe: Send + Sync {
    /// Whether the container is currently running.
    async fn is_running(&self, id: &ContainerId) -> Result<bool, ProbeError>;

    /// Issue a restart and wait for the runtime to acknowledge it.
    ///
    /// Failure carries the diagnostic output; the caller decides whether
    /// to care. No retry happens at this layer.
    async fn restart(&self, id: &ContainerId) -> Result<(), ProbeError>;
}

/// Queries one consensus-group member for leadership.
#[async_trait]
pub trait LeaderProbe: Send + Sync {
    /// Whether the member currently believes itself the leader.
    async fn is_leader(&self, id: &ContainerId) -> Result<bool, ProbeError>;
}
