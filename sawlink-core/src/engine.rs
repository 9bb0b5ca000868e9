//! The stop-and-wait protocol engine
//!
//! A [`ProtocolEngine`] owns all protocol state of one node: the three
//! sequence bits, the last-sent buffer, the relay flow-control gate and the
//! handle of the single live retransmission timer. The host drives it through
//! three entry points and passes its [`LinkEnvironment`] into each call:
//!
//! - [`ProtocolEngine::on_application_payload`]: a new payload to originate
//! - [`ProtocolEngine::on_link_frame`]: raw bytes arrived on a link
//! - [`ProtocolEngine::on_timer_expiry`]: a retransmission timer fired
//!
//! Nothing here is fatal. Every abnormal inbound condition degrades to
//! "drop and let the sender's timeout retry", reported as a
//! [`ReceiveOutcome`] rather than an error.

use crate::config::{NodeConfig, Role};
use crate::constants::MAX_MESSAGE_SIZE;
use crate::decoder::decode_frame_from_bytes_zero_copy;
use crate::encoder::FrameBuilder;
use crate::error::{EngineError, FrameError};
use crate::link::{LinkEnvironment, LinkId, TimerHandle};
use crate::sequence::{FlowGate, LastSent, SequenceState};
use crate::timer::retransmission_timeout;
use crate::types::{Frame, FrameKind, Seq};
use bytes::Bytes;
use core::time::Duration;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// What the receive path did with an inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Frame failed validation and was dropped without reply
    Corrupt(FrameError),

    /// Acknowledgement for the outstanding data frame
    AckAccepted(Seq),

    /// Acknowledgement for a frame that is no longer outstanding
    StaleAck(Seq),

    /// New data handed to the local application
    Delivered(Seq),

    /// New data relayed onward
    Forwarded {
        /// Sequence bit of the inbound frame
        received: Seq,
        /// Sequence bit used on the outgoing link
        sent: Seq,
    },

    /// Repeat of the last accepted frame; re-acknowledged, payload dropped
    Duplicate(Seq),

    /// Relay slot busy; dropped without acknowledgement
    RelayBusy(Seq),
}

/// Per-node counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeStats {
    /// Data frames written to the link, retransmissions included
    pub data_sent: u64,
    /// Data frames resent after a timeout
    pub retransmissions: u64,
    /// Acknowledgements written to the link
    pub acks_sent: u64,
    /// Acknowledgements that completed an outstanding frame
    pub acks_accepted: u64,
    /// Acknowledgements ignored as stale or duplicate
    pub stale_acks: u64,
    /// Payloads delivered to the local application
    pub delivered: u64,
    /// Payloads relayed toward the next hop
    pub forwarded: u64,
    /// Duplicate data frames re-acknowledged
    pub duplicates: u64,
    /// Data frames dropped because the relay slot was busy
    pub relay_busy_drops: u64,
    /// Frames dropped for failing validation
    pub corrupt_dropped: u64,
}

/// Stop-and-wait engine for one node
#[derive(Debug, Clone)]
pub struct ProtocolEngine {
    config: NodeConfig,
    state: SequenceState,
    last_sent: LastSent,
    gate: FlowGate,
    timer: Option<TimerHandle>,
    last_timeout: Duration,
    awaiting_ack: bool,
    stats: NodeStats,
}

/// A data frame ready to go out, with the timeout it will be armed with
struct Outgoing {
    frame: Bytes,
    timeout: Duration,
}

impl ProtocolEngine {
    /// Create an engine with all sequence bits at zero
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config,
            state: SequenceState::default(),
            last_sent: LastSent::default(),
            gate: FlowGate::default(),
            timer: None,
            last_timeout: Duration::ZERO,
            awaiting_ack: false,
            stats: NodeStats::default(),
        }
    }

    /// Node configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Node role
    pub fn role(&self) -> Role {
        self.config.role
    }

    /// Snapshot of the three sequence bits (read-only debug hook)
    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Counters
    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// Whether a data frame is awaiting acknowledgement
    pub fn in_flight(&self) -> bool {
        self.awaiting_ack
    }

    /// Whether the relay slot is held by an unacknowledged forward
    pub fn relay_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Payload that a timeout would retransmit
    pub fn last_sent(&self) -> &Bytes {
        self.last_sent.payload()
    }

    /// Handle of the live retransmission timer, if any
    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Originate a new application payload
    ///
    /// Only an originator accepts payloads, and only while nothing is in
    /// flight. Application intake is disabled until the frame is acknowledged.
    pub fn on_application_payload<E>(
        &mut self,
        env: &mut E,
        payload: Bytes,
    ) -> Result<(), EngineError>
    where
        E: LinkEnvironment + ?Sized,
    {
        if self.config.role != Role::Originator {
            return Err(EngineError::NotOriginator(self.config.role));
        }
        if self.awaiting_ack {
            return Err(EngineError::WindowFull);
        }
        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(FrameError::PayloadTooLarge(payload.len(), MAX_MESSAGE_SIZE).into());
        }

        let seq = self.state.next_to_send;
        let outgoing = self.prepare_data(env, payload.clone(), seq)?;

        #[cfg(feature = "logging")]
        debug!("Down from application, seq={} ({} bytes)", seq, payload.len());

        env.disable_application();
        self.last_sent.store(payload);
        self.awaiting_ack = true;
        self.state.next_to_send.flip();

        self.transmit_data(env, outgoing)
    }

    /// Process raw bytes that arrived on `link`
    pub fn on_link_frame<E>(
        &mut self,
        env: &mut E,
        link: LinkId,
        bytes: Bytes,
    ) -> Result<ReceiveOutcome, EngineError>
    where
        E: LinkEnvironment + ?Sized,
    {
        let frame = match decode_frame_from_bytes_zero_copy(bytes) {
            Ok(frame) => frame,
            Err(err) => {
                #[cfg(feature = "logging")]
                warn!("Bad frame on link {} ignored: {}", link, err);

                self.stats.corrupt_dropped += 1;
                return Ok(ReceiveOutcome::Corrupt(err));
            }
        };

        match frame.kind() {
            FrameKind::Ack => Ok(self.handle_ack(env, frame.seq())),
            FrameKind::Data => self.handle_data(env, link, frame),
        }
    }

    /// Handle expiry of a retransmission timer
    ///
    /// Returns `true` if the buffered frame was resent. Expiry of a handle
    /// other than the live one is ignored.
    pub fn on_timer_expiry<E>(&mut self, env: &mut E, handle: TimerHandle) -> Result<bool, EngineError>
    where
        E: LinkEnvironment + ?Sized,
    {
        if self.timer != Some(handle) {
            #[cfg(feature = "logging")]
            debug!("Ignoring expiry of superseded timer {:?}", handle);

            return Ok(false);
        }
        self.timer = None;

        if !self.awaiting_ack {
            return Ok(false);
        }

        let seq = self.state.ack_expected;
        let payload = self.last_sent.payload().clone();

        #[cfg(feature = "logging")]
        debug!("Timeout, resending seq={}", seq);

        match self.prepare_data(env, payload, seq) {
            Ok(outgoing) => {
                self.stats.retransmissions += 1;
                self.transmit_data(env, outgoing)?;
                Ok(true)
            }
            Err(err) => {
                // Keep the frame on a timer so a recovered link resumes it
                self.timer = Some(env.start_timer(self.last_timeout));
                Err(err)
            }
        }
    }

    fn handle_ack<E>(&mut self, env: &mut E, seq: Seq) -> ReceiveOutcome
    where
        E: LinkEnvironment + ?Sized,
    {
        if !self.awaiting_ack || seq != self.state.ack_expected {
            #[cfg(feature = "logging")]
            debug!("Stale ACK ignored, seq={}", seq);

            self.stats.stale_acks += 1;
            return ReceiveOutcome::StaleAck(seq);
        }

        #[cfg(feature = "logging")]
        debug!("ACK received, seq={}", seq);

        if let Some(timer) = self.timer.take() {
            env.cancel_timer(timer);
        }
        self.state.ack_expected.flip();
        self.awaiting_ack = false;
        self.gate.release();
        self.stats.acks_accepted += 1;

        if self.config.role == Role::Originator {
            env.enable_application();
        }

        ReceiveOutcome::AckAccepted(seq)
    }

    fn handle_data<E>(
        &mut self,
        env: &mut E,
        link: LinkId,
        frame: Frame,
    ) -> Result<ReceiveOutcome, EngineError>
    where
        E: LinkEnvironment + ?Sized,
    {
        let seq = frame.seq();

        if seq != self.state.expected_from_peer {
            #[cfg(feature = "logging")]
            debug!("DATA received, seq={}, ignored (duplicate)", seq);

            self.stats.duplicates += 1;
            self.send_ack(env, link, seq)?;
            return Ok(ReceiveOutcome::Duplicate(seq));
        }

        let outcome = match self.config.role {
            Role::Sink | Role::Originator => {
                #[cfg(feature = "logging")]
                debug!("DATA received, seq={}, up to application", seq);

                // A rejected payload is neither acked nor counted as received
                env.write_application(frame.payload)?;
                self.state.expected_from_peer.flip();
                self.stats.delivered += 1;
                ReceiveOutcome::Delivered(seq)
            }
            Role::Relay => {
                if !self.gate.try_acquire() {
                    #[cfg(feature = "logging")]
                    debug!("DATA received, seq={}, dropped (relay busy)", seq);

                    self.stats.relay_busy_drops += 1;
                    return Ok(ReceiveOutcome::RelayBusy(seq));
                }

                let sent = self.state.ack_expected;
                let outgoing = match self.prepare_data(env, frame.payload.clone(), sent) {
                    Ok(outgoing) => outgoing,
                    Err(err) => {
                        self.gate.release();
                        return Err(err);
                    }
                };

                #[cfg(feature = "logging")]
                debug!("DATA received, seq={}, forwarding as seq={}", seq, sent);

                self.state.expected_from_peer.flip();
                self.last_sent.store(frame.payload);
                self.awaiting_ack = true;

                // Once buffered and timed, the frame is ours to deliver:
                // ack upstream even if this first write fails
                let forwarded = self.transmit_data(env, outgoing);
                self.stats.forwarded += 1;
                self.send_ack(env, link, seq)?;
                forwarded?;
                return Ok(ReceiveOutcome::Forwarded { received: seq, sent });
            }
        };

        self.send_ack(env, link, seq)?;
        Ok(outcome)
    }

    /// Encode a data frame and size its timeout from the data link
    ///
    /// Touches no engine state, so callers run it before committing.
    fn prepare_data<E>(&self, env: &E, payload: Bytes, seq: Seq) -> Result<Outgoing, EngineError>
    where
        E: LinkEnvironment + ?Sized,
    {
        let frame = FrameBuilder::data(seq).payload(payload).build()?;

        let link = self.config.data_link;
        let info = env.link_info(link)?;
        info.validate(link)?;
        let timeout = retransmission_timeout(frame.len(), &info, self.config.timeout_multiplier);

        Ok(Outgoing { frame, timeout })
    }

    /// Arm the retransmission timer and hand a prepared frame to the link
    ///
    /// Arming supersedes any previously armed timer. The timer is armed
    /// before the write, so a failed write is recovered like a lost frame.
    fn transmit_data<E>(&mut self, env: &mut E, outgoing: Outgoing) -> Result<(), EngineError>
    where
        E: LinkEnvironment + ?Sized,
    {
        let link = self.config.data_link;

        if let Some(previous) = self.timer.take() {
            env.cancel_timer(previous);
        }
        self.timer = Some(env.start_timer(outgoing.timeout));
        self.last_timeout = outgoing.timeout;

        #[cfg(feature = "logging")]
        debug!(
            "DATA transmitted, link={}, {} bytes, timeout={:?}",
            link,
            outgoing.frame.len(),
            outgoing.timeout
        );

        self.stats.data_sent += 1;
        env.write_link(link, outgoing.frame)?;
        Ok(())
    }

    /// Transmit an acknowledgement; acknowledgements are never timed
    fn send_ack<E>(&mut self, env: &mut E, link: LinkId, seq: Seq) -> Result<(), EngineError>
    where
        E: LinkEnvironment + ?Sized,
    {
        let encoded = FrameBuilder::ack(seq).build()?;

        #[cfg(feature = "logging")]
        debug!("ACK transmitted, seq={}, link={}", seq, link);

        self.stats.acks_sent += 1;
        env.write_link(link, encoded)?;
        Ok(())
    }
}
