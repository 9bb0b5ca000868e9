//! Core types for Sawlink frames

use crate::constants::{KIND_ACK, KIND_DATA, MAX_MESSAGE_SIZE};
use crate::error::FrameError;
use alloc::format;
use bytes::Bytes;
use core::fmt;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// What a frame carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Application payload
    Data,
    /// Positive acknowledgement of a data frame
    Ack,
}

impl FrameKind {
    /// Wire representation
    pub const fn as_u8(&self) -> u8 {
        match self {
            FrameKind::Data => KIND_DATA,
            FrameKind::Ack => KIND_ACK,
        }
    }

    /// Parse the wire representation
    pub fn from_u8(v: u8) -> Result<Self, FrameError> {
        match v {
            KIND_DATA => Ok(FrameKind::Data),
            KIND_ACK => Ok(FrameKind::Ack),
            other => Err(FrameError::UnknownFrameKind(other)),
        }
    }
}

/// Alternating single-bit sequence number
///
/// Arithmetic never leaves the 0/1 domain; the only transition is [`Seq::flip`].
///
/// Serializes as the wire bit, `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Seq {
    /// Sequence bit 0
    #[default]
    Zero,
    /// Sequence bit 1
    One,
}

impl Seq {
    /// The other bit
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Seq::Zero => Seq::One,
            Seq::One => Seq::Zero,
        }
    }

    /// Flip in place
    pub fn flip(&mut self) {
        *self = self.next();
    }

    /// Wire representation
    pub const fn as_u8(self) -> u8 {
        match self {
            Seq::Zero => 0,
            Seq::One => 1,
        }
    }

    /// Parse the wire representation
    pub fn from_u8(v: u8) -> Result<Self, FrameError> {
        match v {
            0 => Ok(Seq::Zero),
            1 => Ok(Seq::One),
            other => Err(FrameError::InvalidSequence(other)),
        }
    }
}

impl TryFrom<u8> for Seq {
    type Error = FrameError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Seq::from_u8(v)
    }
}

impl From<Seq> for u8 {
    fn from(seq: Seq) -> u8 {
        seq.as_u8()
    }
}

impl Serialize for Seq {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Seq {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bit = u8::deserialize(deserializer)?;
        Seq::from_u8(bit).map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Unsigned(u64::from(bit)), &"sequence bit 0 or 1")
        })
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Frame header
///
/// The checksum is not stored here: it is a property of the encoded bytes,
/// written by the encoder and verified by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    /// Data or acknowledgement
    pub kind: FrameKind,

    /// Alternating sequence bit
    pub seq: Seq,

    /// Length of the payload in bytes (0 for acknowledgements)
    pub length: u32,
}

impl FrameHeader {
    /// Header for a data frame carrying `length` bytes
    pub fn data(seq: Seq, length: u32) -> Self {
        Self {
            kind: FrameKind::Data,
            seq,
            length,
        }
    }

    /// Header for an acknowledgement
    pub fn ack(seq: Seq) -> Self {
        Self {
            kind: FrameKind::Ack,
            seq,
            length: 0,
        }
    }

    /// Validate the header
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.length as usize > MAX_MESSAGE_SIZE {
            return Err(FrameError::PayloadTooLarge(
                self.length as usize,
                MAX_MESSAGE_SIZE,
            ));
        }

        if self.kind == FrameKind::Ack && self.length != 0 {
            return Err(FrameError::InvalidStructure(format!(
                "Acknowledgement carries {} payload bytes",
                self.length
            )));
        }

        Ok(())
    }
}

/// Complete Sawlink frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame header
    pub header: FrameHeader,

    /// Frame payload (empty for acknowledgements)
    pub payload: Bytes,
}

impl Frame {
    /// Create a data frame
    pub fn data(seq: Seq, payload: Bytes) -> Self {
        Self {
            header: FrameHeader::data(seq, payload.len() as u32),
            payload,
        }
    }

    /// Create an acknowledgement frame
    pub fn ack(seq: Seq) -> Self {
        Self {
            header: FrameHeader::ack(seq),
            payload: Bytes::new(),
        }
    }

    /// Validate the frame
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.payload.len() > MAX_MESSAGE_SIZE {
            return Err(FrameError::PayloadTooLarge(
                self.payload.len(),
                MAX_MESSAGE_SIZE,
            ));
        }

        self.header.validate()?;

        if self.payload.len() != self.header.length as usize {
            return Err(FrameError::InvalidStructure(format!(
                "Payload length mismatch: header says {}, actual {}",
                self.header.length,
                self.payload.len()
            )));
        }

        Ok(())
    }

    /// Encoded size in bytes: header plus the occupied payload only
    pub fn total_size(&self) -> usize {
        crate::constants::HEADER_SIZE + self.payload.len()
    }

    /// Frame kind
    pub fn kind(&self) -> FrameKind {
        self.header.kind
    }

    /// Sequence bit
    pub fn seq(&self) -> Seq {
        self.header.seq
    }
}
