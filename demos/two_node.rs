//! Two-node example: one originator, one sink, clean link

use sawlink_core::sim::{SimulationConfig, Simulator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sawlink Two-Node Example\n");

    let config = SimulationConfig {
        messages: 5,
        message_size: 24,
        ..Default::default()
    };

    let mut sim = Simulator::new(config)?;
    let report = sim.run()?;

    for payload in sim.sink_delivered() {
        println!("  delivered: {}", String::from_utf8_lossy(payload));
    }

    println!("\nElapsed: {:.1} ms", report.elapsed_us as f64 / 1000.0);
    println!("Frames on the wire: {}", report.channel.transmitted);
    println!("\nOriginator state:\n{}", sim.engine(0).state());
    println!("\nSink state:\n{}", sim.engine(1).state());

    Ok(())
}
