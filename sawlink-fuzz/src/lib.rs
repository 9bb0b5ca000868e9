//! Fuzzing harnesses for sawlink-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_decoder

use bytes::Bytes;
use sawlink_core::{
    LinkEnvironment, LinkError, LinkId, LinkInfo, NodeConfig, ProtocolEngine, Role, TimerHandle,
};
use std::time::Duration;

pub fn fuzz_decode(data: &[u8]) {
    use sawlink_core::decoder::decode_frame_from_bytes;

    // Try to decode - should never panic
    let _ = decode_frame_from_bytes(data);
}

/// Host that accepts everything and keeps nothing
struct NullHost {
    next_timer: u64,
}

impl LinkEnvironment for NullHost {
    fn write_link(&mut self, _link: LinkId, _frame: Bytes) -> Result<(), LinkError> {
        Ok(())
    }

    fn write_application(&mut self, _payload: Bytes) -> Result<(), LinkError> {
        Ok(())
    }

    fn enable_application(&mut self) {}

    fn disable_application(&mut self) {}

    fn start_timer(&mut self, _after: Duration) -> TimerHandle {
        self.next_timer += 1;
        TimerHandle(self.next_timer)
    }

    fn cancel_timer(&mut self, _handle: TimerHandle) {}

    fn link_info(&self, _link: LinkId) -> Result<LinkInfo, LinkError> {
        Ok(LinkInfo::default())
    }
}

/// Feed arbitrary bytes to the receive path of every role
pub fn fuzz_receive(data: &[u8]) {
    for role in [Role::Originator, Role::Relay, Role::Sink] {
        let mut host = NullHost { next_timer: 0 };
        let mut engine = ProtocolEngine::new(NodeConfig::new(role));

        // Should never panic or error with a host that never fails
        let result = engine.on_link_frame(&mut host, LinkId(1), Bytes::copy_from_slice(data));
        assert!(result.is_ok());
    }
}
