//! CLI for chaoscope — race noisy entropy providers into one resilient seed.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chaoscope")]
#[command(about = "chaoscope — race noisy entropy providers into one resilient seed")]
#[command(version = chaoscope_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered entropy source
    Scan,

    /// Run the fallback chain once and print the winning result envelope.
    /// Use --source to fetch one specific source instead.
    Harvest {
        /// Fetch a single source by name instead of walking the chain
        #[arg(long)]
        source: Option<String>,

        /// Samples to request per fetch
        #[arg(long, default_value = "64")]
        samples: usize,

        /// Minimum samples a result needs to be accepted
        #[arg(long, default_value = "16")]
        min_samples: usize,

        /// Print the raw result envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch every chain source and fold the results into a chaos seed
    Mix {
        /// Samples to request per source
        #[arg(long, default_value = "64")]
        samples: usize,

        /// Print the seed as JSON
        #[arg(long)]
        json: bool,
    },

    /// Harvest samples and print a chaos/complexity analysis report
    Analyze {
        /// Analyze a single source by name instead of the chain winner
        #[arg(long)]
        source: Option<String>,

        /// Samples to harvest before analyzing
        #[arg(long, default_value = "512")]
        samples: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a stochastic sample path
    Generate {
        /// Process kind: levy, fbm, jump_diffusion, entropy_diffusion
        #[arg(long, default_value = "levy")]
        kind: String,

        /// Path length
        #[arg(long, default_value = "256")]
        length: usize,

        /// Explicit seed (defaults to a locally mixed one)
        #[arg(long)]
        seed: Option<u64>,

        /// Lévy stability index α ∈ (0, 2]
        #[arg(long, default_value = "1.5")]
        alpha: f64,

        /// Lévy skewness β ∈ [−1, 1]
        #[arg(long, default_value = "0.0")]
        beta: f64,

        /// Lévy scale
        #[arg(long, default_value = "1.0")]
        scale: f64,

        /// fBm Hurst exponent H ∈ (0, 1)
        #[arg(long, default_value = "0.7")]
        hurst: f64,

        /// Jump-diffusion time step
        #[arg(long, default_value = "0.01")]
        dt: f64,

        /// Jump-diffusion drift
        #[arg(long, default_value = "0.0")]
        mu: f64,

        /// Jump-diffusion volatility
        #[arg(long, default_value = "1.0")]
        sigma: f64,

        /// Jump intensity
        #[arg(long, default_value = "0.5")]
        lambda: f64,

        /// Entropy-diffusion step size
        #[arg(long, default_value = "0.1")]
        step_size: f64,

        /// Write the path as CSV to this file instead of stdout
        #[arg(long)]
        output: Option<String>,

        /// Print the path as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Run the background collector until Ctrl-C, printing periodic reports
    Monitor {
        /// Poll and report interval in seconds
        #[arg(long, default_value = "10")]
        interval_secs: u64,

        /// Stop after this many seconds (default: run until Ctrl-C)
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// Record harvest cycles to a JSONL session file
    Record {
        /// Session file path
        #[arg(long)]
        output: String,

        /// Number of harvest cycles to record
        #[arg(long, default_value = "5")]
        cycles: u64,

        /// Samples to request per source per cycle
        #[arg(long, default_value = "64")]
        samples: usize,

        /// Seconds between cycles
        #[arg(long, default_value = "2")]
        interval_secs: u64,
    },

    /// Start the collector and serve the HTTP query surface
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "3327")]
        port: u16,

        /// Collector poll interval in seconds
        #[arg(long, default_value = "10")]
        interval_secs: u64,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let exit = match cli.command {
        Commands::Scan => commands::scan::run(),
        Commands::Harvest {
            source,
            samples,
            min_samples,
            json,
        } => commands::harvest::run(source, samples, min_samples, json),
        Commands::Mix { samples, json } => commands::harvest::run_mix(samples, json),
        Commands::Analyze {
            source,
            samples,
            json,
        } => commands::analyze::run(source, samples, json),
        Commands::Generate {
            kind,
            length,
            seed,
            alpha,
            beta,
            scale,
            hurst,
            dt,
            mu,
            sigma,
            lambda,
            step_size,
            output,
            json,
        } => commands::generate::run(commands::generate::GenerateArgs {
            kind,
            length,
            seed,
            alpha,
            beta,
            scale,
            hurst,
            dt,
            mu,
            sigma,
            lambda,
            step_size,
            output,
            json,
        }),
        Commands::Monitor {
            interval_secs,
            duration_secs,
        } => commands::monitor::run(interval_secs, duration_secs),
        Commands::Record {
            output,
            cycles,
            samples,
            interval_secs,
        } => commands::record::run(&output, cycles, samples, interval_secs),
        Commands::Serve {
            host,
            port,
            interval_secs,
        } => commands::serve::run(&host, port, interval_secs),
    };

    std::process::exit(exit);
}
