//! Lossy relay example: originator → relay → sink over a noisy channel
//!
//! Every loss and corruption is repaired by the sender's timeout alone.

use sawlink_core::sim::{SimulationConfig, Simulator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sawlink Lossy Relay Example\n");

    let config = SimulationConfig {
        relays: 1,
        messages: 20,
        loss: 0.2,
        corruption: 0.1,
        seed: 42,
        ..Default::default()
    };

    let mut sim = Simulator::new(config)?;
    let report = sim.run()?;

    println!("Completed:          {}", report.completed);
    println!("Delivered in order: {}", report.delivered_in_order);
    println!(
        "Channel:            {} sent, {} lost, {} corrupted",
        report.channel.transmitted, report.channel.lost, report.channel.corrupted
    );

    for node in &report.nodes {
        println!(
            "Node {} ({:?}): {} retransmissions, {} duplicates, {} relay-busy drops, {} corrupt drops",
            node.node,
            node.role,
            node.stats.retransmissions,
            node.stats.duplicates,
            node.stats.relay_busy_drops,
            node.stats.corrupt_dropped
        );
    }

    Ok(())
}
