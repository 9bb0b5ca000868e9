//! Fixed byte layouts of the frame format

use bytes::Bytes;
use sawlink_core::{
    constants::{HEADER_SIZE, OFF_CHECKSUM},
    decoder::decode_frame_from_bytes,
    encoder::{compute_checksum, FrameBuilder},
    FrameError, FrameKind, Seq,
};

#[test]
fn test_crc32c_check_value() {
    // Standard CRC-32C check value
    assert_eq!(compute_checksum(b"123456789"), 0xE306_9283);
}

#[test]
fn test_data_frame_header_layout() {
    let encoded = FrameBuilder::data(Seq::One)
        .payload(Bytes::from_static(b"abc"))
        .build()
        .unwrap();

    assert_eq!(
        &encoded[..OFF_CHECKSUM],
        &[0x00, 0x01, 0x00, 0x00, 0x00, 0x03]
    );
    assert_eq!(&encoded[HEADER_SIZE..], b"abc");
}

#[test]
fn test_ack_frame_layout() {
    let encoded = FrameBuilder::ack(Seq::Zero).build().unwrap();

    assert_eq!(encoded.len(), 10);
    assert_eq!(&encoded[..OFF_CHECKSUM], &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let mut zeroed = encoded.to_vec();
    zeroed[OFF_CHECKSUM..].fill(0);
    assert_eq!(
        &encoded[OFF_CHECKSUM..],
        &compute_checksum(&zeroed).to_be_bytes()
    );
}

#[test]
fn test_hand_built_frame_decodes() {
    let mut frame = vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0, 0, 0, 0, b'h', b'i'];
    let checksum = compute_checksum(&frame);
    frame[OFF_CHECKSUM..HEADER_SIZE].copy_from_slice(&checksum.to_be_bytes());

    let decoded = decode_frame_from_bytes(&frame).unwrap();
    assert_eq!(decoded.kind(), FrameKind::Data);
    assert_eq!(decoded.seq(), Seq::Zero);
    assert_eq!(&decoded.payload[..], b"hi");
}

#[test]
fn test_unknown_kind_with_valid_checksum() {
    let mut frame = vec![0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0, 0, 0, 0];
    let checksum = compute_checksum(&frame);
    frame[OFF_CHECKSUM..HEADER_SIZE].copy_from_slice(&checksum.to_be_bytes());

    assert_eq!(
        decode_frame_from_bytes(&frame),
        Err(FrameError::UnknownFrameKind(7))
    );
}

#[test]
fn test_sequence_out_of_domain_with_valid_checksum() {
    let mut frame = vec![0x01, 0x02, 0x00, 0x00, 0x00, 0x00, 0, 0, 0, 0];
    let checksum = compute_checksum(&frame);
    frame[OFF_CHECKSUM..HEADER_SIZE].copy_from_slice(&checksum.to_be_bytes());

    assert_eq!(
        decode_frame_from_bytes(&frame),
        Err(FrameError::InvalidSequence(2))
    );
}

#[test]
fn test_oversized_length_field() {
    let frame = [0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0];
    assert!(matches!(
        decode_frame_from_bytes(&frame),
        Err(FrameError::PayloadTooLarge(_, _))
    ));
}

#[test]
fn test_hex_vector_round_trip() {
    let encoded = FrameBuilder::ack(Seq::One).build().unwrap();
    let text = hex::encode(&encoded);
    assert!(text.starts_with("010100000000"));
    let bytes = hex::decode(text).unwrap();
    assert_eq!(decode_frame_from_bytes(&bytes).unwrap().seq(), Seq::One);
}
