//! Docker-backed probe implementation over the bollard API client.

use super::{LeaderProbe, ProbeError, RuntimeProbe};
use async_trait::async_trait;
use bollard::container::RestartContainerOptions;
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::Docker;
use churn_core::ContainerId;
use futures_util::StreamExt;
use serde::Deserialize;
use std::time::Duration;

/// Command asked of an etcd member to report its endpoint status.
const ETCD_STATUS_CMD: &[&str] = &[
    "etcdctl",
    "--endpoints=http://localhost:2379",
    "endpoint",
    "status",
    "--write-out=json",
];

/// Probes containers through the Docker daemon.
pub struct DockerProbe {
    docker: Docker,
    /// Bound applied to every Docker API call.
    timeout: Duration,
    /// Grace period Docker gives a container to stop during a restart.
    stop_timeout: Duration,
}

impl DockerProbe {
    /// Create a probe over an existing Docker connection.
    pub fn new(docker: Docker, timeout: Duration, stop_timeout: Duration) -> Self {
        Self {
            docker,
            timeout,
            stop_timeout,
        }
    }

    /// Connect using the platform's default Docker socket.
    pub fn with_local_defaults(
        timeout: Duration,
        stop_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self::new(docker, timeout, stop_timeout))
    }

    /// Execute a command inside a container and collect its output.
    async fn exec(&self, id: &ContainerId, cmd: Vec<String>) -> Result<ExecOutput, ProbeError> {
        let options = CreateExecOptions {
            cmd: Some(cmd),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let exec = self.docker.create_exec(id.as_str(), options).await?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        if let StartExecResults::Attached { mut output, .. } =
            self.docker.start_exec(&exec.id, None).await?
        {
            while let Some(Ok(msg)) = output.next().await {
                match msg {
                    bollard::container::LogOutput::StdOut { message } => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    bollard::container::LogOutput::StdErr { message } => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    _ => {}
                }
            }
        }

        let inspect = self.docker.inspect_exec(&exec.id).await?;
        let exit_code = inspect.exit_code.unwrap_or(-1);

        Ok(ExecOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

/// Output of a command executed inside a container.
struct ExecOutput {
    stdout: String,
    stderr: String,
    exit_code: i64,
}

#[async_trait]
impl RuntimeProbe for DockerProbe {
    async fn is_running(&self, id: &ContainerId) -> Result<bool, ProbeError> {
        let inspect = tokio::time::timeout(
            self.timeout,
            self.docker.inspect_container(id.as_str(), None),
        )
        .await
        .map_err(|_| ProbeError::Timeout(self.timeout))??;

        Ok(inspect
            .state
            .and_then(|state| state.running)
            .unwrap_or(false))
    }

    async fn restart(&self, id: &ContainerId) -> Result<(), ProbeError> {
        let options = RestartContainerOptions {
            t: self.stop_timeout.as_secs() as isize,
        };

        // The restart has to outlive the stop grace period.
        let bound = self.timeout + self.stop_timeout;
        tokio::time::timeout(
            bound,
            self.docker.restart_container(id.as_str(), Some(options)),
        )
        .await
        .map_err(|_| ProbeError::Timeout(bound))??;

        Ok(())
    }
}

#[async_trait]
impl LeaderProbe for DockerProbe {
    async fn is_leader(&self, id: &ContainerId) -> Result<bool, ProbeError> {
        let cmd = ETCD_STATUS_CMD.iter().map(|s| s.to_string()).collect();

        let output = tokio::time::timeout(self.timeout, self.exec(id, cmd))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        if output.exit_code != 0 {
            return Err(ProbeError::ExecFailed {
                container: id.clone(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        let statuses: Vec<EndpointStatus> = serde_json::from_str(output.stdout.trim())
            .map_err(|e| ProbeError::InvalidOutput(format!("etcdctl status: {e}")))?;

        // A member leads when its own id matches the leader its status
        // header reports.
        Ok(statuses
            .iter()
            .any(|s| s.status.leader == s.status.header.member_id))
    }
}

/// One entry of `etcdctl endpoint status --write-out=json`.
#[derive(Debug, Deserialize)]
struct EndpointStatus {
    #[serde(rename = "Status")]
    status: MemberStatus,
}

#[derive(Debug, Deserialize)]
struct MemberStatus {
    header: StatusHeader,
    leader: u64,
}

#[derive(Debug, Deserialize)]
struct StatusHeader {
    member_id: u64,
}
