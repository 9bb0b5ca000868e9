//! Retransmission timeout sizing
//!
//! One-way transit time is estimated from the frame size, the link bandwidth
//! and its propagation delay:
//!
//! ```text
//! transit = ceil(bytes * 8 * 1_000_000 / bandwidth_bps) µs + propagation_delay
//! timeout = multiplier * transit
//! ```

use crate::link::LinkInfo;
use core::time::Duration;

/// Estimated one-way transit time of a frame of `frame_len` bytes
pub fn transit_time(frame_len: usize, link: &LinkInfo) -> Duration {
    let bits = frame_len as u128 * 8 * 1_000_000;
    let bandwidth = link.bandwidth_bps.max(1) as u128;
    let serialization_us = bits.div_ceil(bandwidth);
    let serialization_us = u64::try_from(serialization_us).unwrap_or(u64::MAX);

    Duration::from_micros(serialization_us).saturating_add(link.propagation_delay())
}

/// Retransmission timeout for a frame of `frame_len` bytes
pub fn retransmission_timeout(frame_len: usize, link: &LinkInfo, multiplier: u32) -> Duration {
    transit_time(frame_len, link).saturating_mul(multiplier)
}
