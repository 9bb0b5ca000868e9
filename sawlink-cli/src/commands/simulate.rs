use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sawlink_core::sim::{SimulationConfig, SimulationReport, Simulator};
use std::fs;
use tracing::info;

/// Command-line values that take precedence over the scenario file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Number of relays
    pub relays: Option<usize>,
    /// Number of messages
    pub messages: Option<usize>,
    /// Message size in bytes
    pub message_size: Option<usize>,
    /// Loss probability
    pub loss: Option<f64>,
    /// Corruption probability
    pub corruption: Option<f64>,
    /// RNG seed
    pub seed: Option<u64>,
}

/// Build the scenario from an optional JSON file plus flag overrides
pub fn load_config(path: Option<&str>, overrides: &Overrides) -> Result<SimulationConfig> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(relays) = overrides.relays {
        config.relays = relays;
    }
    if let Some(messages) = overrides.messages {
        config.messages = messages;
    }
    if let Some(message_size) = overrides.message_size {
        config.message_size = message_size;
    }
    if let Some(loss) = overrides.loss {
        config.loss = loss;
    }
    if let Some(corruption) = overrides.corruption {
        config.corruption = corruption;
    }
    if let Some(seed) = overrides.seed {
        config.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

pub fn execute(
    config_path: Option<&str>,
    overrides: &Overrides,
    output: Option<&str>,
    progress: bool,
) -> Result<SimulationReport> {
    let config = load_config(config_path, overrides)?;

    info!(
        "Simulating {} relay(s), {} messages of {} bytes",
        config.relays, config.messages, config.message_size
    );

    let total = config.messages as u64;
    let mut sim = Simulator::new(config).context("Failed to build simulation")?;

    let bar = if progress {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} delivered")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    while sim.step()? {
        if let Some(pb) = &bar {
            pb.set_position(sim.sink_delivered().len() as u64);
        }
    }

    if let Some(pb) = bar {
        pb.finish_and_clear();
    }

    let report = sim.report();

    let retransmissions: u64 = report.nodes.iter().map(|n| n.stats.retransmissions).sum();
    info!(
        "Run finished after {} us: {} retransmission(s), {} frame(s) lost, {} corrupted",
        report.elapsed_us, retransmissions, report.channel.lost, report.channel.corrupted
    );

    print_report(&report);

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize simulation report")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Report written to: {}", output_path);
    }

    Ok(report)
}

fn print_report(report: &SimulationReport) {
    println!("\n=== Simulation Results ===");
    println!("Messages sent:      {}", report.messages_sent);
    println!("Messages delivered: {}", report.messages_delivered);
    println!("Elapsed:            {:.3} ms", report.elapsed_us as f64 / 1000.0);

    println!("\n=== Channel ===");
    println!("Frames transmitted: {}", report.channel.transmitted);
    println!("Frames lost:        {}", report.channel.lost);
    println!("Frames corrupted:   {}", report.channel.corrupted);

    println!("\n=== Nodes ===");
    for node in &report.nodes {
        println!(
            "Node {} ({:?}): sent={} retx={} acks={} delivered={} forwarded={} dup={} busy={} corrupt={}",
            node.node,
            node.role,
            node.stats.data_sent,
            node.stats.retransmissions,
            node.stats.acks_sent,
            node.stats.delivered,
            node.stats.forwarded,
            node.stats.duplicates,
            node.stats.relay_busy_drops,
            node.stats.corrupt_dropped
        );
    }

    println!("\n=== Summary ===");
    if report.completed {
        println!("{} All messages delivered once, in order", "✓".green());
    } else if !report.delivered_in_order {
        println!("{} Sink received out-of-order or duplicate data", "✗".red());
    } else {
        println!(
            "{} Time limit reached with {} of {} messages delivered",
            "!".yellow(),
            report.messages_delivered,
            report.messages_sent
        );
    }
}
