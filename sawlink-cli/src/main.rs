use anyhow::Result;
use clap::{Parser, Subcommand};
use sawlink_cli::{commands, FrameKindArg};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sawlink")]
#[command(about = "Sawlink - Stop-and-wait reliable data link", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated originator → relays → sink chain
    Simulate {
        /// JSON scenario file; flags below override its fields
        #[arg(short, long)]
        config: Option<String>,

        /// Number of relays between originator and sink
        #[arg(long)]
        relays: Option<usize>,

        /// Number of messages to send
        #[arg(long)]
        messages: Option<usize>,

        /// Size of each message in bytes
        #[arg(long)]
        message_size: Option<usize>,

        /// Frame loss probability
        #[arg(long)]
        loss: Option<f64>,

        /// Frame corruption probability
        #[arg(long)]
        corruption: Option<f64>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output JSON file for the run report
        #[arg(short, long)]
        output: Option<String>,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Encode a single frame and print it as hex
    Encode {
        /// Frame kind
        #[arg(long, value_enum, default_value = "data")]
        kind: FrameKindArg,

        /// Sequence bit (0 or 1)
        #[arg(long, default_value = "0")]
        seq: u8,

        /// Payload text (data frames only)
        #[arg(long)]
        payload: Option<String>,
    },

    /// Decode and verify a hex-encoded frame
    Decode {
        /// Hex string, or "-" to read it from stdin
        #[arg(short, long)]
        input: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Simulate {
            config,
            relays,
            messages,
            message_size,
            loss,
            corruption,
            seed,
            output,
            progress,
        } => {
            let overrides = commands::simulate::Overrides {
                relays,
                messages,
                message_size,
                loss,
                corruption,
                seed,
            };
            commands::simulate::execute(config.as_deref(), &overrides, output.as_deref(), progress)
                .map(|_| ())
        }

        Commands::Encode { kind, seq, payload } => {
            commands::encode::execute(kind, seq, payload.as_deref()).map(|_| ())
        }

        Commands::Decode { input } => commands::decode::execute(&input).map(|_| ()),
    }
}
