use colored::*;
use std::time::Duration;

use crate::stream_client::Message;

#[derive(Debug)]
pub struct ProbeSummary {
    pub received: usize,
    pub duplicates: usize,
    pub duration: Duration,
    pub closed_by_server: bool,
}

impl ProbeSummary {
    pub fn passed(&self) -> bool {
        self.duplicates == 0
    }
}

pub fn print_message(index: usize, message: &Message, duplicate: bool) {
    let label = format!("#{index}");
    let label = if duplicate {
        label.red().bold()
    } else {
        label.bright_blue().bold()
    };

    println!("\n[{}] message received", label);
    if duplicate {
        println!("   {}", "repeats the previous message".red());
    }

    match &message.data {
        Some(data) => {
            if let Ok(pretty) = serde_json::to_string_pretty(data) {
                println!("   {}", pretty.dimmed());
            }
        }
        None => println!("   {}", message.raw.dimmed()),
    }
}

pub fn print_summary(summary: &ProbeSummary) {
    println!("\n{}", "=== PROBE SUMMARY ===".bright_white().bold());

    let status = if summary.passed() {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };

    println!(
        "[{}] {} messages in {:?}, {} duplicates",
        status,
        summary.received,
        summary.duration,
        summary.duplicates.to_string().red()
    );

    if summary.closed_by_server {
        println!("      {}", "stream closed by the server".dimmed());
    }
}
