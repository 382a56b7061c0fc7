// ABOUTME: CLI binary for the Scout media source resolver.
// ABOUTME: Resolves page URLs and prints the playable media reference for each one.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use castkit_scout::{Resolution, Resolver, DEFAULT_MAX_DEPTH};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Resolve web page URLs into playable media references")]
struct Args {
    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output Resolution objects as JSON instead of one reference per line
    #[arg(long = "json")]
    json_output: bool,

    /// Ask player add-ons not to record history
    #[arg(long = "incognito")]
    incognito: bool,

    /// Maximum number of nested pages to follow
    #[arg(long = "max-depth", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    /// HTTP timeout in seconds
    #[arg(long = "timeout", default_value_t = 30)]
    timeout: u64,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Log extractor decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// URLs to resolve
    #[arg(required = true)]
    urls: Vec<String>,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn format_output(results: &[Resolution], json_output: bool) -> serde_json::Result<String> {
    if !json_output {
        return Ok(results
            .iter()
            .map(|r| r.file.as_str())
            .collect::<Vec<_>>()
            .join("\n"));
    }
    if results.len() == 1 {
        serde_json::to_string_pretty(&results[0])
    } else {
        serde_json::to_string_pretty(results)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let resolver = Resolver::builder()
        .allow_private_networks(args.allow_private_networks)
        .max_depth(args.max_depth)
        .timeout(Duration::from_secs(args.timeout))
        .build();

    let start = Instant::now();
    let mut results: Vec<Resolution> = Vec::new();
    let mut had_error = false;

    for url in &args.urls {
        match resolver.resolve(url, args.incognito).await {
            Ok(resolution) => results.push(resolution),
            Err(e) => {
                eprintln!("error resolving {}: {}", url, e);
                had_error = true;
            }
        }
    }

    let elapsed = start.elapsed();

    if !results.is_empty() {
        match format_output(&results, args.json_output) {
            Ok(output_str) => {
                if let Some(output_path) = &args.output {
                    if let Err(e) = fs::write(output_path, format!("{}\n", output_str)) {
                        eprintln!("error writing to {:?}: {}", output_path, e);
                        had_error = true;
                    }
                } else {
                    println!("{}", output_str);
                }
            }
            Err(e) => {
                eprintln!("error serializing results: {}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
