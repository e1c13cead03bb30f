//! Fleet and container identity types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// An opaque identifier naming one container instance.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Create an identifier from a container name.
    ///
    /// Leading and trailing whitespace is stripped, matching how the
    /// fleet list is cleaned up when read from configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({})", self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ContainerId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Errors produced when constructing a [`Fleet`].
#[derive(Debug, Error)]
pub enum FleetError {
    /// The configured container list was empty.
    #[error("fleet has no containers")]
    Empty,

    /// Two entries name the same container.
    #[error("duplicate container in fleet: {0}")]
    Duplicate(ContainerId),
}

/// The fixed, ordered set of containers under management.
///
/// Supplied once at construction and immutable thereafter; every member
/// is unique. How the membership is discovered is not this crate's
/// concern - it arrives as configuration.
#[derive(Debug, Clone)]
pub struct Fleet {
    members: Vec<ContainerId>,
}

impl Fleet {
    /// Build a fleet from the configured container names.
    ///
    /// Fails on an empty list or a duplicate identifier; both are
    /// configuration errors and fatal to startup.
    pub fn new(members: Vec<ContainerId>) -> Result<Self, FleetError> {
        if members.is_empty() {
            return Err(FleetError::Empty);
        }

        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.clone()) {
                return Err(FleetError::Duplicate(member.clone()));
            }
        }

        Ok(Self { members })
    }

    /// Members in their configured order.
    pub fn members(&self) -> &[ContainerId] {
        &self.members
    }

    /// Number of containers in the fleet.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the fleet has no members. Always false after construction.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the fleet's naming marks it as a consensus group.
    ///
    /// The convention is a prefix match on the first member's identifier,
    /// e.g. a fleet starting with `etcd-1` is recognized with the prefix
    /// `"etcd"`. An empty prefix never matches.
    pub fn is_consensus_group(&self, prefix: &str) -> bool {
        !prefix.is_empty()
            && self
                .members
                .first()
                .is_some_and(|m| m.as_str().starts_with(prefix))
    }
}
