//! # Sawlink Core
//!
//! A stop-and-wait ARQ data-link layer for a point-to-point channel that may
//! corrupt or drop frames but never reorders them.
//!
//! ## Modules
//!
//! - `constants`: Frame format constants and limits
//! - `types`: Core types (Frame, FrameHeader, FrameKind, Seq)
//! - `encoder`: Frame encoding and checksum computation
//! - `decoder`: Strict frame decoding
//! - `config`: Node role and per-node configuration
//! - `link`: The link environment the engine runs inside
//! - `sequence`: Alternating-bit sequence state and the relay flow-control gate
//! - `timer`: Retransmission timeout sizing
//! - `engine`: The send/acknowledge/retransmit state machine
//! - `sim`: Deterministic simulated link environment (feature `sim`)

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod link;
pub mod sequence;
#[cfg(feature = "sim")]
pub mod sim;
pub mod timer;
pub mod types;

// Re-export commonly used types
pub use config::{NodeConfig, Role};
pub use engine::{NodeStats, ProtocolEngine, ReceiveOutcome};
pub use error::{EngineError, FrameError, LinkError};
pub use link::{LinkEnvironment, LinkId, LinkInfo, TimerHandle};
pub use types::{Frame, FrameHeader, FrameKind, Seq};

/// Result type alias for Sawlink frame operations
pub type Result<T> = core::result::Result<T, FrameError>;
