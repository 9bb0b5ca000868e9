//! Frame encoding

use crate::constants::{HEADER_SIZE, OFF_CHECKSUM};
use crate::error::FrameError;
use crate::types::{Frame, FrameHeader, FrameKind, Seq};
use alloc::format;
use bytes::{BufMut, Bytes, BytesMut};

/// Encode a frame into bytes
///
/// The frame is encoded with the following layout:
/// 1. Header:
///    - Kind (1 byte): 0 = data, 1 = ack
///    - Sequence (1 byte): 0 or 1
///    - Payload length (4 bytes, big-endian)
///    - Checksum (4 bytes, big-endian)
/// 2. Payload (exactly `length` bytes)
///
/// The checksum is computed last, over the header and payload with the
/// checksum field zeroed.
pub fn encode_frame(header: &FrameHeader, payload: &[u8]) -> Result<Bytes, FrameError> {
    header.validate()?;

    if payload.len() != header.length as usize {
        return Err(FrameError::InvalidStructure(format!(
            "Payload length mismatch: header says {}, actual {}",
            header.length,
            payload.len()
        )));
    }

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());

    // Write header with a zero checksum placeholder
    buf.put_u8(header.kind.as_u8());
    buf.put_u8(header.seq.as_u8());
    buf.put_u32(header.length);
    buf.put_u32(0);

    // Write payload
    buf.put_slice(payload);

    let checksum = compute_checksum(&buf);
    buf[OFF_CHECKSUM..OFF_CHECKSUM + 4].copy_from_slice(&checksum.to_be_bytes());

    Ok(buf.freeze())
}

/// Encode a complete Frame struct
pub fn encode_frame_struct(frame: &Frame) -> Result<Bytes, FrameError> {
    encode_frame(&frame.header, &frame.payload)
}

/// Compute the CRC32C checksum of the occupied frame bytes
///
/// The caller is responsible for zeroing the checksum field first.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Builder for constructing data and acknowledgement frames
pub struct FrameBuilder {
    kind: FrameKind,
    seq: Seq,
    payload: Bytes,
}

impl FrameBuilder {
    /// Start a data frame
    pub fn data(seq: Seq) -> Self {
        Self {
            kind: FrameKind::Data,
            seq,
            payload: Bytes::new(),
        }
    }

    /// Start an acknowledgement frame
    pub fn ack(seq: Seq) -> Self {
        Self {
            kind: FrameKind::Ack,
            seq,
            payload: Bytes::new(),
        }
    }

    /// Set the payload
    pub fn payload(mut self, payload: Bytes) -> Self {
        self.payload = payload;
        self
    }

    /// Build and encode the frame
    pub fn build(self) -> Result<Bytes, FrameError> {
        encode_frame_struct(&self.build_struct()?)
    }

    /// Build the frame struct without encoding
    pub fn build_struct(self) -> Result<Frame, FrameError> {
        let frame = Frame {
            header: FrameHeader {
                kind: self.kind,
                seq: self.seq,
                length: self.payload.len() as u32,
            },
            payload: self.payload,
        };

        frame.validate()?;

        Ok(frame)
    }
}
