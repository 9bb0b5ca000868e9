//! Library entry for sawlink-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use sawlink_core::FrameKind;

/// Frame kind as accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FrameKindArg {
    /// Data frame carrying a payload
    Data,
    /// Acknowledgement frame
    Ack,
}

impl From<FrameKindArg> for FrameKind {
    fn from(kind: FrameKindArg) -> Self {
        match kind {
            FrameKindArg::Data => FrameKind::Data,
            FrameKindArg::Ack => FrameKind::Ack,
        }
    }
}

// Re-export commonly used items
pub use crate::commands::simulate;
