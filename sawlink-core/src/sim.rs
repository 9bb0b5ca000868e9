//! Deterministic simulated link environment
//!
//! Runs a chain `Originator → Relay × N → Sink` as a discrete-event
//! simulation. Every node is a [`ProtocolEngine`]; the simulator implements
//! [`LinkEnvironment`] for whichever node is handling an event, collects the
//! primitives it invokes, and turns them into future events.
//!
//! The channel model is driven by a seeded RNG, so a run is reproducible
//! from its [`SimulationConfig`]:
//!
//! | Fault      | Description                                          |
//! |------------|------------------------------------------------------|
//! | Loss       | Frame silently dropped with probability `loss`.      |
//! | Corruption | One random bit flipped with probability `corruption`.|
//!
//! Links never reorder: arrivals on one link direction are clamped to be
//! monotonic, even when a short frame follows a long one.

use crate::config::{NodeConfig, Role};
use crate::engine::{NodeStats, ProtocolEngine};
use crate::error::{EngineError, LinkError};
use crate::link::{LinkEnvironment, LinkId, LinkInfo, TimerHandle};
use crate::sequence::SequenceState;
use crate::timer::transit_time;
use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::time::Duration;

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// Parameters of a simulated chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of relays between originator and sink
    pub relays: usize,

    /// Number of application messages the originator sends
    pub messages: usize,

    /// Size of each generated message in bytes
    pub message_size: usize,

    /// Parameters shared by every link in the chain
    pub link: LinkInfo,

    /// Probability that a transmitted frame is lost
    pub loss: f64,

    /// Probability that a transmitted frame has one bit flipped
    pub corruption: f64,

    /// RNG seed
    pub seed: u64,

    /// Simulated time after which the run is abandoned, in milliseconds
    pub time_limit_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            relays: 0,
            messages: 10,
            message_size: 64,
            link: LinkInfo::default(),
            loss: 0.0,
            corruption: 0.0,
            seed: 0,
            time_limit_ms: 600_000,
        }
    }
}

impl SimulationConfig {
    /// Reject parameters the simulator cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        for (name, p) in [("loss", self.loss), ("corruption", self.corruption)] {
            if !(0.0..1.0).contains(&p) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} probability {p} must be in [0, 1)"
                )));
            }
        }
        self.link
            .validate(LinkId(1))
            .map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        if self.message_size > crate::constants::MAX_MESSAGE_SIZE {
            return Err(SimError::InvalidConfig(format!(
                "message_size {} exceeds maximum {}",
                self.message_size,
                crate::constants::MAX_MESSAGE_SIZE
            )));
        }
        Ok(())
    }

    /// The payloads a run of this configuration originates
    ///
    /// Each message starts with its index so in-order delivery is checkable.
    pub fn generate_messages(&self) -> Vec<Bytes> {
        (0..self.messages)
            .map(|i| {
                let mut payload = format!("msg-{i:06}|").into_bytes();
                payload.resize(self.message_size.max(payload.len()), b'.');
                payload.truncate(self.message_size);
                Bytes::from(payload)
            })
            .collect()
    }
}

/// Errors from driving a simulation
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration rejected before the run
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    /// An engine handler returned an error
    #[error("Node {node} failed: {source}")]
    Engine {
        /// Index of the failing node
        node: usize,
        /// Engine error
        source: EngineError,
    },
}

/// Channel-level counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Frames handed to the channel
    pub transmitted: u64,
    /// Frames the channel dropped
    pub lost: u64,
    /// Frames the channel corrupted
    pub corrupted: u64,
}

/// Summary of one node after a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeReport {
    /// Position in the chain
    pub node: usize,
    /// Node role
    pub role: Role,
    /// Final sequence bits
    pub state: SequenceState,
    /// Engine counters
    pub stats: NodeStats,
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Every message reached the sink
    pub completed: bool,
    /// Messages originated
    pub messages_sent: usize,
    /// Messages delivered at the sink
    pub messages_delivered: usize,
    /// Sink received exactly the originated sequence
    pub delivered_in_order: bool,
    /// Simulated time at the last processed event, in microseconds
    pub elapsed_us: u64,
    /// Channel counters
    pub channel: ChannelStats,
    /// Per-node summaries
    pub nodes: Vec<NodeReport>,
}

#[derive(Debug, Clone)]
enum EventKind {
    ApplicationReady { node: usize },
    FrameArrival { node: usize, link: LinkId, frame: Bytes },
    TimerExpiry { node: usize, handle: TimerHandle },
}

#[derive(Debug)]
struct Scheduled {
    at: u64,
    order: u64,
    kind: EventKind,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.order == other.order
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.order).cmp(&(other.at, other.order))
    }
}

/// One end of a link attached to a node
#[derive(Debug, Clone, Copy)]
struct Port {
    info: LinkInfo,
    peer: usize,
    peer_link: LinkId,
}

#[derive(Debug)]
struct SimNode {
    engine: ProtocolEngine,
    ports: HashMap<LinkId, Port>,
    app_enabled: bool,
    outbox: VecDeque<Bytes>,
    delivered: Vec<Bytes>,
}

/// Primitive invoked by a node during one handler call
enum Action {
    Transmit { link: LinkId, frame: Bytes },
    StartTimer { handle: TimerHandle, after: Duration },
    CancelTimer(TimerHandle),
    Deliver(Bytes),
    SetApplication(bool),
}

/// [`LinkEnvironment`] view of one node for the duration of a handler call
struct NodeContext<'a> {
    ports: &'a HashMap<LinkId, Port>,
    next_timer: &'a mut u64,
    actions: Vec<Action>,
}

impl LinkEnvironment for NodeContext<'_> {
    fn write_link(&mut self, link: LinkId, frame: Bytes) -> Result<(), LinkError> {
        if !self.ports.contains_key(&link) {
            return Err(LinkError::UnknownLink(link));
        }
        self.actions.push(Action::Transmit { link, frame });
        Ok(())
    }

    fn write_application(&mut self, payload: Bytes) -> Result<(), LinkError> {
        self.actions.push(Action::Deliver(payload));
        Ok(())
    }

    fn enable_application(&mut self) {
        self.actions.push(Action::SetApplication(true));
    }

    fn disable_application(&mut self) {
        self.actions.push(Action::SetApplication(false));
    }

    fn start_timer(&mut self, after: Duration) -> TimerHandle {
        *self.next_timer += 1;
        let handle = TimerHandle(*self.next_timer);
        self.actions.push(Action::StartTimer { handle, after });
        handle
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        self.actions.push(Action::CancelTimer(handle));
    }

    fn link_info(&self, link: LinkId) -> Result<LinkInfo, LinkError> {
        self.ports
            .get(&link)
            .map(|port| port.info)
            .ok_or(LinkError::UnknownLink(link))
    }
}

/// Discrete-event simulator for a chain of stop-and-wait nodes
pub struct Simulator {
    config: SimulationConfig,
    nodes: Vec<SimNode>,
    queue: BinaryHeap<Reverse<Scheduled>>,
    cancelled: HashSet<TimerHandle>,
    last_arrival: HashMap<(usize, LinkId), u64>,
    rng: StdRng,
    now: u64,
    order: u64,
    next_timer: u64,
    channel: ChannelStats,
    originated: Vec<Bytes>,
    corrupt_next: usize,
}

impl Simulator {
    /// Build a chain and queue the generated messages at the originator
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let messages = config.generate_messages();
        Self::with_messages(config, messages)
    }

    /// Build a chain that originates exactly `messages`
    pub fn with_messages(config: SimulationConfig, messages: Vec<Bytes>) -> Result<Self, SimError> {
        config.validate()?;

        let count = config.relays + 2;
        let mut nodes = Vec::with_capacity(count);
        for i in 0..count {
            let role = if i == 0 {
                Role::Originator
            } else if i == count - 1 {
                Role::Sink
            } else {
                Role::Relay
            };

            // Upstream neighbour on link 1; relays reach downstream on link 2,
            // the originator on link 1.
            let mut ports = HashMap::new();
            if i > 0 {
                let peer_link = if i - 1 == 0 { LinkId(1) } else { LinkId(2) };
                ports.insert(
                    LinkId(1),
                    Port {
                        info: config.link,
                        peer: i - 1,
                        peer_link,
                    },
                );
            }
            if i < count - 1 {
                let link = role.default_data_link();
                ports.insert(
                    link,
                    Port {
                        info: config.link,
                        peer: i + 1,
                        peer_link: LinkId(1),
                    },
                );
            }

            nodes.push(SimNode {
                engine: ProtocolEngine::new(NodeConfig::new(role)),
                ports,
                app_enabled: false,
                outbox: VecDeque::new(),
                delivered: Vec::new(),
            });
        }

        nodes[0].outbox = messages.iter().cloned().collect();

        let mut sim = Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            nodes,
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            last_arrival: HashMap::new(),
            now: 0,
            order: 0,
            next_timer: 0,
            channel: ChannelStats::default(),
            originated: messages,
            corrupt_next: 0,
        };

        // Originator starts with application intake enabled
        sim.set_application(0, true);

        #[cfg(feature = "logging")]
        info!(
            "Simulating {} nodes, {} messages, loss={}, corruption={}, seed={}",
            count,
            sim.originated.len(),
            sim.config.loss,
            sim.config.corruption,
            sim.config.seed
        );

        Ok(sim)
    }

    /// Force the next `n` transmissions to be corrupted regardless of the RNG
    pub fn corrupt_next_transmissions(&mut self, n: usize) {
        self.corrupt_next = n;
    }

    /// Current simulated time in microseconds
    pub fn now_us(&self) -> u64 {
        self.now
    }

    /// Number of nodes in the chain
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Engine of node `index`
    pub fn engine(&self, index: usize) -> &ProtocolEngine {
        &self.nodes[index].engine
    }

    /// Payloads delivered to the application at node `index`
    pub fn delivered(&self, index: usize) -> &[Bytes] {
        &self.nodes[index].delivered
    }

    /// Payloads delivered at the sink
    pub fn sink_delivered(&self) -> &[Bytes] {
        self.delivered(self.nodes.len() - 1)
    }

    /// Channel counters
    pub fn channel_stats(&self) -> ChannelStats {
        self.channel
    }

    /// Whether no events remain
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Process the next event
    ///
    /// Returns `false` when the queue is empty or the next event lies past the
    /// time limit.
    pub fn step(&mut self) -> Result<bool, SimError> {
        let limit = self.config.time_limit_ms.saturating_mul(1_000);
        match self.queue.peek() {
            Some(Reverse(next)) if next.at <= limit => {}
            _ => return Ok(false),
        }
        let Some(Reverse(event)) = self.queue.pop() else {
            return Ok(false);
        };
        self.now = event.at;

        match event.kind {
            EventKind::ApplicationReady { node } => {
                let sim_node = &mut self.nodes[node];
                if !sim_node.app_enabled {
                    return Ok(true);
                }
                let Some(payload) = sim_node.outbox.pop_front() else {
                    return Ok(true);
                };
                self.dispatch(node, |engine, ctx| engine.on_application_payload(ctx, payload))?;
            }
            EventKind::FrameArrival { node, link, frame } => {
                self.dispatch(node, |engine, ctx| {
                    engine.on_link_frame(ctx, link, frame).map(|_| ())
                })?;
            }
            EventKind::TimerExpiry { node, handle } => {
                if self.cancelled.remove(&handle) {
                    return Ok(true);
                }
                self.dispatch(node, |engine, ctx| {
                    engine.on_timer_expiry(ctx, handle).map(|_| ())
                })?;
            }
        }

        Ok(true)
    }

    /// Run until idle or the time limit, then summarize
    pub fn run(&mut self) -> Result<SimulationReport, SimError> {
        while self.step()? {}
        Ok(self.report())
    }

    /// Summarize the current state
    pub fn report(&self) -> SimulationReport {
        let delivered = self.sink_delivered();
        let messages_delivered = delivered.len();
        let delivered_in_order = delivered == &self.originated[..messages_delivered.min(self.originated.len())];

        SimulationReport {
            completed: messages_delivered == self.originated.len() && delivered_in_order,
            messages_sent: self.originated.len(),
            messages_delivered,
            delivered_in_order,
            elapsed_us: self.now,
            channel: self.channel,
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(node, n)| NodeReport {
                    node,
                    role: n.engine.role(),
                    state: n.engine.state(),
                    stats: n.engine.stats(),
                })
                .collect(),
        }
    }

    fn dispatch<F>(&mut self, node: usize, handler: F) -> Result<(), SimError>
    where
        F: FnOnce(&mut ProtocolEngine, &mut NodeContext<'_>) -> Result<(), EngineError>,
    {
        let sim_node = &mut self.nodes[node];
        let mut ctx = NodeContext {
            ports: &sim_node.ports,
            next_timer: &mut self.next_timer,
            actions: Vec::new(),
        };
        let result = handler(&mut sim_node.engine, &mut ctx);
        let actions = ctx.actions;

        // Apply whatever the handler did before it failed
        self.apply(node, actions);
        result.map_err(|source| SimError::Engine { node, source })
    }

    fn apply(&mut self, node: usize, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Transmit { link, frame } => self.transmit(node, link, frame),
                Action::StartTimer { handle, after } => {
                    let at = self.now.saturating_add(after.as_micros() as u64);
                    self.schedule(at, EventKind::TimerExpiry { node, handle });
                }
                Action::CancelTimer(handle) => {
                    self.cancelled.insert(handle);
                }
                Action::Deliver(payload) => self.nodes[node].delivered.push(payload),
                Action::SetApplication(enabled) => self.set_application(node, enabled),
            }
        }
    }

    fn set_application(&mut self, node: usize, enabled: bool) {
        self.nodes[node].app_enabled = enabled;
        if enabled && !self.nodes[node].outbox.is_empty() {
            self.schedule(self.now, EventKind::ApplicationReady { node });
        }
    }

    fn transmit(&mut self, node: usize, link: LinkId, frame: Bytes) {
        let Some(port) = self.nodes[node].ports.get(&link).copied() else {
            return;
        };
        self.channel.transmitted += 1;

        if self.config.loss > 0.0 && self.rng.gen_bool(self.config.loss) {
            #[cfg(feature = "logging")]
            debug!("Channel lost frame from node {} on link {}", node, link);

            self.channel.lost += 1;
            return;
        }

        let force = self.corrupt_next > 0;
        let frame = if force || (self.config.corruption > 0.0 && self.rng.gen_bool(self.config.corruption)) {
            self.corrupt_next = self.corrupt_next.saturating_sub(1);
            self.channel.corrupted += 1;
            self.flip_random_bit(&frame)
        } else {
            frame
        };

        let transit = transit_time(frame.len(), &port.info).as_micros() as u64;
        let key = (node, link);
        let earliest = self.last_arrival.get(&key).copied().unwrap_or(0);
        let at = self.now.saturating_add(transit).max(earliest);
        self.last_arrival.insert(key, at);

        self.schedule(
            at,
            EventKind::FrameArrival {
                node: port.peer,
                link: port.peer_link,
                frame,
            },
        );
    }

    fn flip_random_bit(&mut self, frame: &Bytes) -> Bytes {
        let mut bytes = frame.to_vec();
        if bytes.is_empty() {
            return frame.clone();
        }
        let index = self.rng.gen_range(0..bytes.len());
        let bit = self.rng.gen_range(0..8);
        bytes[index] ^= 1 << bit;
        Bytes::from(bytes)
    }

    fn schedule(&mut self, at: u64, kind: EventKind) {
        self.order += 1;
        self.queue.push(Reverse(Scheduled {
            at,
            order: self.order,
            kind,
        }));
    }
}
