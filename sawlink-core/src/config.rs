//! Node roles and per-node protocol configuration

use crate::constants::{DEFAULT_TIMEOUT_MULTIPLIER, HOST_DATA_LINK, RELAY_DATA_LINK};
use crate::link::LinkId;
use serde::{Deserialize, Serialize};

/// Part a node plays on the path
///
/// The role only changes how inbound data frames are handled; the frame
/// format is the same everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sole source of application payloads
    Originator,
    /// Forwards accepted data frames toward the next hop
    Relay,
    /// Final consumer, delivers payloads to its application
    Sink,
}

impl Role {
    /// Link a node of this role sends data frames on unless configured otherwise
    pub const fn default_data_link(&self) -> LinkId {
        match self {
            Role::Originator | Role::Sink => LinkId(HOST_DATA_LINK),
            Role::Relay => LinkId(RELAY_DATA_LINK),
        }
    }
}

/// Configuration for one protocol engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Role of this node
    pub role: Role,

    /// Outgoing link for data frames
    pub data_link: LinkId,

    /// Retransmission timeout as a multiple of the estimated transit time
    #[serde(default = "default_timeout_multiplier")]
    pub timeout_multiplier: u32,
}

fn default_timeout_multiplier() -> u32 {
    DEFAULT_TIMEOUT_MULTIPLIER
}

impl NodeConfig {
    /// Configuration with the role's default data link and timeout multiplier
    pub fn new(role: Role) -> Self {
        Self {
            role,
            data_link: role.default_data_link(),
            timeout_multiplier: DEFAULT_TIMEOUT_MULTIPLIER,
        }
    }

    /// Override the outgoing data link
    pub fn with_data_link(mut self, link: LinkId) -> Self {
        self.data_link = link;
        self
    }

    /// Override the timeout multiplier
    pub fn with_timeout_multiplier(mut self, multiplier: u32) -> Self {
        self.timeout_multiplier = multiplier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_default_links() {
        assert_eq!(NodeConfig::new(Role::Originator).data_link, LinkId(1));
        assert_eq!(NodeConfig::new(Role::Relay).data_link, LinkId(2));
        assert_eq!(NodeConfig::new(Role::Sink).data_link, LinkId(1));
    }

    #[test]
    fn test_builder_overrides() {
        let config = NodeConfig::new(Role::Relay)
            .with_data_link(LinkId(3))
            .with_timeout_multiplier(5);
        assert_eq!(config.data_link, LinkId(3));
        assert_eq!(config.timeout_multiplier, 5);
    }
}
