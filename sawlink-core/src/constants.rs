//! Constants and limits for the Sawlink frame format

/// Maximum payload size carried by a single data frame
pub const MAX_MESSAGE_SIZE: usize = 8192;

/// Header size: kind (1) + sequence (1) + length (4) + checksum (4) = 10 bytes
pub const HEADER_SIZE: usize = 10;

/// Maximum encoded frame size
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_MESSAGE_SIZE;

/// Byte offset of the frame kind
pub const OFF_KIND: usize = 0;

/// Byte offset of the sequence bit
pub const OFF_SEQ: usize = 1;

/// Byte offset of the payload length (big-endian u32)
pub const OFF_LENGTH: usize = 2;

/// Byte offset of the checksum (big-endian u32)
pub const OFF_CHECKSUM: usize = 6;

/// Size of the CRC32C checksum in bytes
pub const CHECKSUM_SIZE: usize = 4;

/// Wire value of a data frame
pub const KIND_DATA: u8 = 0;

/// Wire value of an acknowledgement frame
pub const KIND_ACK: u8 = 1;

/// Retransmission timeout as a multiple of the estimated one-way transit time
pub const DEFAULT_TIMEOUT_MULTIPLIER: u32 = 3;

/// Link used for outbound data by end hosts (originator and sink)
pub const HOST_DATA_LINK: u32 = 1;

/// Link used for outbound data by relays
pub const RELAY_DATA_LINK: u32 = 2;
