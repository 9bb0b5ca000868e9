//! Error types for Sawlink operations

use crate::config::Role;
use crate::link::LinkId;
use alloc::string::String;

/// Errors that can occur while encoding or decoding a frame
///
/// To the engine every decode error means the same thing: the frame never
/// arrived.
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Incomplete frame - not enough data
    #[cfg_attr(feature = "std", error("Incomplete frame: expected {expected} bytes, got {actual}"))]
    IncompleteFrame {
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually found.
        actual: usize,
    },

    /// Payload size exceeds maximum allowed
    #[cfg_attr(feature = "std", error("Payload size {0} exceeds maximum {1}"))]
    PayloadTooLarge(usize, usize),

    /// Bytes left over after the declared payload
    #[cfg_attr(feature = "std", error("{0} trailing bytes after payload"))]
    TrailingBytes(usize),

    /// Checksum mismatch
    #[cfg_attr(feature = "std", error("Checksum mismatch: expected {expected:x}, got {actual:x}"))]
    ChecksumMismatch {
        /// The checksum carried by the frame.
        expected: u32,
        /// The checksum calculated over the received bytes.
        actual: u32,
    },

    /// Unknown frame kind byte
    #[cfg_attr(feature = "std", error("Unknown frame kind: 0x{0:02x}"))]
    UnknownFrameKind(u8),

    /// Sequence field outside the 0/1 domain
    #[cfg_attr(feature = "std", error("Invalid sequence number: {0}"))]
    InvalidSequence(u8),

    /// Invalid frame structure
    #[cfg_attr(feature = "std", error("Invalid frame structure: {0}"))]
    InvalidStructure(String),
}

/// Failures reported by a [`crate::link::LinkEnvironment`]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The node has no link with this identifier
    #[cfg_attr(feature = "std", error("Unknown link: {0}"))]
    UnknownLink(LinkId),

    /// Link parameters cannot size a timeout
    #[cfg_attr(feature = "std", error("Invalid parameters for link {0}: {1}"))]
    InvalidLink(LinkId, String),

    /// The physical layer refused the frame
    #[cfg_attr(feature = "std", error("Write to link {0} failed: {1}"))]
    WriteFailed(LinkId, String),

    /// The application layer refused a delivered payload
    #[cfg_attr(feature = "std", error("Application delivery failed: {0}"))]
    ApplicationRejected(String),
}

/// Errors returned by [`crate::engine::ProtocolEngine`] entry points
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Only an originator accepts application payloads
    #[cfg_attr(feature = "std", error("Node role {0:?} does not originate payloads"))]
    NotOriginator(Role),

    /// A payload was offered while a data frame is still unacknowledged
    #[cfg_attr(feature = "std", error("Window full: a data frame is awaiting acknowledgement"))]
    WindowFull,

    /// The outbound frame could not be built
    #[cfg_attr(feature = "std", error("Frame error: {0}"))]
    Frame(FrameError),

    /// The link environment reported a failure
    #[cfg_attr(feature = "std", error("Link error: {0}"))]
    Link(LinkError),
}

impl From<FrameError> for EngineError {
    fn from(err: FrameError) -> Self {
        EngineError::Frame(err)
    }
}

impl From<LinkError> for EngineError {
    fn from(err: LinkError) -> Self {
        EngineError::Link(err)
    }
}
