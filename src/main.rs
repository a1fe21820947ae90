use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use elevator::sim::{self, Scenario, Trace};
use elevator::Options;

#[derive(Parser)]
#[command(name = "elevator", version)]
#[command(about = "Elevator: eased scroll-to-floor rides, checked and simulated headlessly")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an options file and print the resolved settings
    Check {
        /// Options JSON file
        file: PathBuf,
    },

    /// Simulate one ride frame by frame
    Simulate {
        /// Options JSON file (defaults apply when omitted)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Floor to ride to
        #[arg(long, default_value = "1")]
        floor: String,

        /// Comma-separated target offsets, one per floor
        #[arg(long, value_delimiter = ',', default_value = "0,500,1200")]
        offsets: Vec<f64>,

        /// Scroll position when the trigger is clicked
        #[arg(long, default_value_t = 0.0)]
        start: f64,

        /// Frames per second delivered by the simulated host
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Lose window focus after this many milliseconds
        #[arg(long)]
        blur_after: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// Output format for the simulate command.
#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One line per frame
    Table,
    /// The full trace as JSON
    Json,
}

fn load_options(path: &Path) -> anyhow::Result<Options> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    Options::from_json(&text).with_context(|| format!("in '{}'", path.display()))
}

fn print_table(trace: &Trace) {
    println!(
        "floor {}: {} -> {} over {:.0} ms",
        trace.floor, trace.start_position, trace.end_position, trace.duration_ms
    );
    for f in &trace.frames {
        println!("{:>9.1} ms  {:>10.2}", f.elapsed_ms, f.position);
    }
    for a in &trace.audio {
        println!("audio: {a}");
    }
    match &trace.outcome {
        Some(o) if o.arrived() => println!("arrived at {}", trace.final_position),
        Some(_) => println!("interrupted, snapped to {}", trace.final_position),
        None => println!("ride did not start"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            let settings = match load_options(&file).and_then(|o| o.resolve().map_err(Into::into)) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    process::exit(1);
                }
            };
            if settings.floors == 0 {
                eprintln!("warning: no floors configured, nothing will be bound");
            }
            match serde_json::to_string_pretty(&settings) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    process::exit(1);
                }
            }
        }

        Commands::Simulate {
            options,
            floor,
            offsets,
            start,
            fps,
            blur_after,
            format,
        } => {
            if fps.is_nan() || fps <= 0.0 {
                eprintln!("error: --fps must be positive");
                process::exit(2);
            }
            let opts = match options {
                Some(path) => match load_options(&path) {
                    Ok(o) => o,
                    Err(e) => {
                        eprintln!("error: {e:#}");
                        process::exit(1);
                    }
                },
                None => Options::default(),
            };
            let scenario = Scenario {
                floor_offsets: offsets,
                start_scroll: start,
                floor,
                frame_interval_ms: 1000.0 / fps,
                blur_after_ms: blur_after,
                ..Scenario::default()
            };

            let trace = match sim::simulate(&opts, &scenario) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("error: {e}");
                    process::exit(1);
                }
            };

            match format {
                OutputFormat::Table => print_table(&trace),
                OutputFormat::Json => match serde_json::to_string_pretty(&trace) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        process::exit(1);
                    }
                },
            }
        }
    }
}
