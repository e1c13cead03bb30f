//! # churn-client
//!
//! Probe layer for the churn controller: queries container state, resolves
//! consensus leadership and issues restarts against the Docker API.
//!
//! The probes are `async_trait` seams so the control loop in `churn-daemon`
//! is testable without a Docker daemon:
//! - [`RuntimeProbe`] / [`LeaderProbe`] define the collaborator contracts
//! - [`DockerProbe`] implements both over bollard
//! - [`MockProbe`] scripts container state and captures restarts for tests
//!
//! On top of the probes sit the two I/O-bound pieces of a disruption
//! cycle: [`resolve_leader`] (in-order, short-circuiting leadership
//! search) and [`restart_batch`] (concurrent fan-out with a join barrier).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
pub mod leader;
pub mod probe;

pub use executor::{restart_batch, RestartOutcome};
pub use leader::resolve_leader;
pub use probe::{DockerProbe, LeaderProbe, MockProbe, ProbeError, RuntimeProbe};
