use anyhow::Result;
use clap::Parser;
use colored::*;
use std::time::{Duration, Instant};

use testing_tools::output::{print_message, print_summary, ProbeSummary};
use testing_tools::stream_client::{DuplicateTracker, Subscription};

#[derive(Parser)]
#[command(name = "stream-probe")]
#[command(about = "Follows a gateway's event stream and flags repeated messages")]
struct Cli {
    /// Base URL of the gateway (e.g., http://localhost:8000)
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Stop after this many messages
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Give up when no message arrives within this many seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!(
        "{} Subscribing to {}/events",
        "→".blue(),
        cli.base_url.trim_end_matches('/')
    );
    let mut subscription = Subscription::open(&cli.base_url).await?;

    let started = Instant::now();
    let timeout = Duration::from_secs(cli.timeout_secs);
    let mut tracker = DuplicateTracker::default();
    let mut closed_by_server = false;

    while tracker.received() < cli.count {
        match subscription.next_message(timeout).await? {
            Some(message) => {
                let duplicate = tracker.observe(&message.raw);
                print_message(tracker.received(), &message, duplicate);
            }
            None => {
                closed_by_server = true;
                break;
            }
        }
    }

    let summary = ProbeSummary {
        received: tracker.received(),
        duplicates: tracker.duplicates(),
        duration: started.elapsed(),
        closed_by_server,
    };
    print_summary(&summary);

    if !summary.passed() {
        std::process::exit(1);
    }
    Ok(())
}
