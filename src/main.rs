mod cli;
mod interactive;
mod p2p;
mod report;
mod session;

#[cfg(test)]
mod tests;

use cli::Cli;
use interactive::InteractiveCli;
use p2p::log::{LogLevel, Logger};
use p2p::utils::parse_hash_hex;
use std::process::ExitCode;
use std::sync::mpsc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = LogLevel::from_str(&cli.verbosity).unwrap_or(LogLevel::Info);
    let (log_tx, log_rx) = mpsc::channel();
    let logger = Logger::spawn(level, log_rx);

    let config = match cli.peer_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.interactive {
        let mut shell = InteractiveCli::new(config, cli.json, log_tx.clone());
        shell.run().map_err(p2p::error::P2pError::from)
    } else if cli.probe {
        session::discover(&config, &log_tx).map(|peers| {
            println!("🌐 {} reachable peers", peers.len());
            for addr in peers {
                println!("   {}", addr);
            }
        })
    } else if let Some(hash) = &cli.block {
        parse_hash_hex(hash)
            .and_then(|hash| session::run_fetch(&config, &log_tx, hash))
            .map(|report| render(&report, cli.json))
    } else {
        session::run_watch(&config, &log_tx, |report| render(report, cli.json)).map(|count| {
            println!("\n🎯 Fetched {} blocks", count);
        })
    };

    drop(log_tx);
    let _ = logger.join();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn render(report: &p2p::p2p_client::BlockReport, json: bool) {
    if json {
        report::print_json(report);
    } else {
        report::print_block(report);
    }
}
