//! The link environment the engine runs inside
//!
//! The engine never touches a medium, a clock or an application directly.
//! Everything it needs from the outside world goes through
//! [`LinkEnvironment`], which the host implements and passes into every
//! handler call.

use crate::error::LinkError;
use bytes::Bytes;
use core::fmt;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Identifier of a physical link attached to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u32);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a one-shot timer issued by the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerHandle(pub u64);

/// Physical parameters of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Bandwidth in bits per second
    pub bandwidth_bps: u64,

    /// One-way propagation delay in microseconds
    pub propagation_delay_us: u64,
}

impl LinkInfo {
    /// Create link parameters
    pub const fn new(bandwidth_bps: u64, propagation_delay_us: u64) -> Self {
        Self {
            bandwidth_bps,
            propagation_delay_us,
        }
    }

    /// Propagation delay as a duration
    pub const fn propagation_delay(&self) -> Duration {
        Duration::from_micros(self.propagation_delay_us)
    }

    /// Reject parameters that cannot size a timeout
    pub fn validate(&self, link: LinkId) -> Result<(), LinkError> {
        if self.bandwidth_bps == 0 {
            return Err(LinkError::InvalidLink(link, "bandwidth is zero".into()));
        }
        Ok(())
    }
}

impl Default for LinkInfo {
    /// 56 kbps with 2.5 ms of propagation delay
    fn default() -> Self {
        Self::new(56_000, 2_500)
    }
}

/// Primitives the engine consumes from its host
///
/// Handlers are invoked one at a time and every primitive must return
/// without waiting on another handler.
pub trait LinkEnvironment {
    /// Transmit raw frame bytes on an outgoing link
    fn write_link(&mut self, link: LinkId, frame: Bytes) -> Result<(), LinkError>;

    /// Hand a received payload to the local application
    fn write_application(&mut self, payload: Bytes) -> Result<(), LinkError>;

    /// Allow the application to offer its next payload
    fn enable_application(&mut self);

    /// Stop the application from offering payloads
    fn disable_application(&mut self);

    /// Arm a one-shot timer
    fn start_timer(&mut self, after: Duration) -> TimerHandle;

    /// Cancel a timer; cancelling an expired or unknown handle is a no-op
    fn cancel_timer(&mut self, handle: TimerHandle);

    /// Physical parameters of a link
    fn link_info(&self, link: LinkId) -> Result<LinkInfo, LinkError>;
}
