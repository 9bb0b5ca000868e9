//! Frame decoding (strict mode)

use crate::constants::{
    CHECKSUM_SIZE, HEADER_SIZE, MAX_MESSAGE_SIZE, OFF_CHECKSUM, OFF_KIND, OFF_LENGTH, OFF_SEQ,
};
use crate::encoder::compute_checksum;
use crate::error::FrameError;
use crate::types::{Frame, FrameHeader, FrameKind, Seq};
use bytes::Bytes;

/// Decode a frame from a byte slice
///
/// This function performs strict validation:
/// - Validates the declared length against the buffer and the message limit
/// - Validates the checksum over the occupied bytes
/// - Validates kind and sequence fields
///
/// The payload is copied out of `data`.
pub fn decode_frame_from_bytes(data: &[u8]) -> Result<Frame, FrameError> {
    decode_frame_from_bytes_zero_copy(Bytes::copy_from_slice(data))
}

/// Decode a frame from a byte buffer without copying the payload
///
/// The input `buf` must contain exactly one complete frame. The returned
/// `Frame` shares `buf`'s storage for its payload.
pub fn decode_frame_from_bytes_zero_copy(buf: Bytes) -> Result<Frame, FrameError> {
    let length = verify_checksum(&buf)?;

    let kind = FrameKind::from_u8(buf[OFF_KIND])?;
    let seq = Seq::from_u8(buf[OFF_SEQ])?;

    let header = FrameHeader {
        kind,
        seq,
        length: length as u32,
    };
    header.validate()?;

    let payload = buf.slice(HEADER_SIZE..HEADER_SIZE + length);

    Ok(Frame { header, payload })
}

/// Check framing and checksum of an encoded frame
///
/// Returns the payload length on success. The checksum is recomputed over
/// the header and exactly `length` payload bytes with the checksum field
/// zeroed, the same way the encoder produced it.
pub fn verify_checksum(buf: &[u8]) -> Result<usize, FrameError> {
    if buf.len() < HEADER_SIZE {
        return Err(FrameError::IncompleteFrame {
            expected: HEADER_SIZE,
            actual: buf.len(),
        });
    }

    let length = read_u32(buf, OFF_LENGTH) as usize;
    if length > MAX_MESSAGE_SIZE {
        return Err(FrameError::PayloadTooLarge(length, MAX_MESSAGE_SIZE));
    }

    let total = HEADER_SIZE + length;
    if buf.len() < total {
        return Err(FrameError::IncompleteFrame {
            expected: total,
            actual: buf.len(),
        });
    }
    if buf.len() > total {
        return Err(FrameError::TrailingBytes(buf.len() - total));
    }

    let expected = read_u32(buf, OFF_CHECKSUM);

    let actual = compute_checksum(&buf[..OFF_CHECKSUM]);
    let actual = crc32c::crc32c_append(actual, &[0u8; CHECKSUM_SIZE]);
    let actual = crc32c::crc32c_append(actual, &buf[OFF_CHECKSUM + CHECKSUM_SIZE..]);

    if actual != expected {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    Ok(length)
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FrameBuilder;

    fn data_frame(seq: Seq, payload: &'static [u8]) -> Bytes {
        FrameBuilder::data(seq)
            .payload(Bytes::from_static(payload))
            .build()
            .unwrap()
    }

    #[test]
    fn test_decode_valid_frame() {
        let encoded = data_frame(Seq::One, b"Hello, link!");
        let frame = decode_frame_from_bytes(&encoded).unwrap();

        assert_eq!(frame.kind(), FrameKind::Data);
        assert_eq!(frame.seq(), Seq::One);
        assert_eq!(frame.header.length, 12);
        assert_eq!(&frame.payload[..], b"Hello, link!");
    }

    #[test]
    fn test_decode_ack() {
        let encoded = FrameBuilder::ack(Seq::Zero).build().unwrap();
        let frame = decode_frame_from_bytes(&encoded).unwrap();
        assert_eq!(frame, Frame::ack(Seq::Zero));
    }

    #[test]
    fn test_decode_corrupted_payload() {
        let mut encoded = data_frame(Seq::Zero, b"test").to_vec();
        encoded[HEADER_SIZE + 1] ^= 0x01;

        let result = decode_frame_from_bytes(&encoded);
        assert!(matches!(result, Err(FrameError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_decode_corrupted_sequence_is_checksum_failure() {
        let mut encoded = data_frame(Seq::Zero, b"test").to_vec();
        encoded[OFF_SEQ] ^= 0x01;

        let result = decode_frame_from_bytes(&encoded);
        assert!(matches!(result, Err(FrameError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_decode_truncated() {
        let encoded = data_frame(Seq::Zero, b"test");
        let result = decode_frame_from_bytes(&encoded[..HEADER_SIZE + 2]);
        assert_eq!(
            result,
            Err(FrameError::IncompleteFrame {
                expected: HEADER_SIZE + 4,
                actual: HEADER_SIZE + 2,
            })
        );

        let result = decode_frame_from_bytes(&encoded[..3]);
        assert!(matches!(result, Err(FrameError::IncompleteFrame { .. })));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut encoded = data_frame(Seq::Zero, b"test").to_vec();
        encoded.extend_from_slice(&[0, 0]);
        assert_eq!(
            decode_frame_from_bytes(&encoded),
            Err(FrameError::TrailingBytes(2))
        );
    }

    #[test]
    fn test_decode_zero_copy_shares_buffer() {
        let encoded = data_frame(Seq::One, b"shared");
        let frame = decode_frame_from_bytes_zero_copy(encoded.clone()).unwrap();
        assert_eq!(frame.payload.as_ptr(), encoded[HEADER_SIZE..].as_ptr());
    }

    #[test]
    fn test_checksum_covers_zeroed_field() {
        let mut encoded = data_frame(Seq::Zero, b"test").to_vec();
        encoded[OFF_CHECKSUM..OFF_CHECKSUM + CHECKSUM_SIZE].fill(0);
        let recomputed = compute_checksum(&encoded);

        encoded[OFF_CHECKSUM..OFF_CHECKSUM + CHECKSUM_SIZE].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            verify_checksum(&encoded),
            Err(FrameError::ChecksumMismatch {
                expected: 0xdead_beef,
                actual: recomputed,
            })
        );

        encoded[OFF_CHECKSUM..OFF_CHECKSUM + CHECKSUM_SIZE].copy_from_slice(&recomputed.to_be_bytes());
        assert_eq!(verify_checksum(&encoded), Ok(4));
    }
}
