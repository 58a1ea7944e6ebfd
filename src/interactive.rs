use colored::*;
use std::io::{self, Write};
use std::sync::mpsc::Sender;

use crate::cli::print_config;
use crate::p2p::config::PeerConfig;
use crate::p2p::log::{log, Event, LogLevel, LogMessage};
use crate::p2p::p2p_client::BlockReport;
use crate::p2p::utils::parse_hash_hex;
use crate::session;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Fetch(String),
    Probe,
    Status,
    Config,
    SetHost(String),
    SetPort(u16),
    Help,
    Exit,
    Clear,
    Unknown,
}

impl Command {
    pub fn from_str(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts.first().copied() {
            Some("start") => Command::Start,
            Some("fetch") => match parts.get(1) {
                Some(hash) => Command::Fetch(hash.to_string()),
                None => Command::Unknown,
            },
            Some("probe") => Command::Probe,
            Some("status") => Command::Status,
            Some("config") => Command::Config,
            Some("sethost") => match parts.get(1) {
                Some(host) => Command::SetHost(host.to_string()),
                None => Command::Unknown,
            },
            Some("setport") => match parts.get(1).and_then(|p| p.parse().ok()) {
                Some(port) => Command::SetPort(port),
                None => Command::Unknown,
            },
            Some("help") => Command::Help,
            Some("exit") | Some("quit") => Command::Exit,
            Some("clear") => Command::Clear,
            _ => Command::Unknown,
        }
    }
}

#[derive(Debug, Default)]
struct SessionStats {
    fetched: usize,
    verified: usize,
    last_error: Option<String>,
}

impl SessionStats {
    fn record(&mut self, report: &BlockReport) {
        self.fetched += 1;
        if report.verified {
            self.verified += 1;
        }
    }
}

pub struct InteractiveCli {
    config: PeerConfig,
    json: bool,
    running: bool,
    stats: SessionStats,
    log_tx: Sender<LogMessage>,
}

impl InteractiveCli {
    pub fn new(config: PeerConfig, json: bool, log_tx: Sender<LogMessage>) -> Self {
        Self {
            config,
            json,
            running: true,
            stats: SessionStats::default(),
            log_tx,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        println!("{}", "🚀 Bitcoin block watcher".bold().green());
        println!("{}", "Type 'help' to list the available commands".italic());

        while self.running {
            print!("\n> ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }

            let command = Command::from_str(&input);
            self.handle_command(command)?;
        }
        Ok(())
    }

    fn handle_command(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Help => self.show_help(),
            Command::Start => self.start_watch(),
            Command::Fetch(hash) => self.fetch(&hash),
            Command::Probe => self.probe(),
            Command::Status => self.show_status(),
            Command::Config => print_config(&self.config),
            Command::SetHost(host) => {
                self.config.host = Some(host);
                println!("✅ Host set to: {}", self.config.host());
            }
            Command::SetPort(port) => {
                self.config.port = Some(port);
                println!("✅ Port set to: {}", self.config.port());
            }
            Command::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                io::stdout().flush()?;
            }
            Command::Exit => {
                println!("👋 Bye");
                self.running = false;
            }
            Command::Unknown => println!("❌ Unknown command. Type 'help' for help."),
        }
        Ok(())
    }

    fn show_help(&self) {
        println!("\n📚 Commands:");
        println!("   help              - Show this help");
        println!("   start             - Connect and fetch announced blocks");
        println!("   fetch <hash>      - Connect and fetch one block by hash");
        println!("   probe             - Resolve the seed and probe its addresses");
        println!("   status            - Show results of previous sessions");
        println!("   config            - Show the current configuration");
        println!("   sethost <host>    - Set the seed host");
        println!("   setport <port>    - Set the peer port");
        println!("   clear             - Clear the screen");
        println!("   exit              - Quit");
    }

    fn render(&self, report: &BlockReport) {
        if self.json {
            crate::report::print_json(report);
        } else {
            crate::report::print_block(report);
        }
    }

    fn start_watch(&mut self) {
        log(&self.log_tx, LogLevel::Info, Event::Custom(format!("Watching {}", self.config.socket_addr())));

        let mut reports = Vec::new();
        let result = session::run_watch(&self.config, &self.log_tx, |report| {
            self.render(report);
            reports.push(report.verified);
        });

        self.stats.fetched += reports.len();
        self.stats.verified += reports.iter().filter(|&&ok| ok).count();
        match result {
            Ok(count) => println!("🎯 Fetched {} blocks", count),
            Err(e) => self.report_error(e.to_string()),
        }
    }

    fn fetch(&mut self, hash: &str) {
        let hash = match parse_hash_hex(hash) {
            Ok(hash) => hash,
            Err(e) => return println!("❌ {}", e),
        };
        match session::run_fetch(&self.config, &self.log_tx, hash) {
            Ok(report) => {
                self.render(&report);
                self.stats.record(&report);
            }
            Err(e) => self.report_error(e.to_string()),
        }
    }

    fn probe(&mut self) {
        match session::discover(&self.config, &self.log_tx) {
            Ok(peers) if peers.is_empty() => println!("🌐 No reachable peers."),
            Ok(peers) => {
                println!("🌐 Reachable peers:");
                for addr in peers {
                    println!("   {}", addr);
                }
            }
            Err(e) => self.report_error(e.to_string()),
        }
    }

    fn show_status(&self) {
        println!("📊 Blocks fetched: {}", self.stats.fetched);
        println!("   Verified: {}", self.stats.verified);
        if let Some(err) = &self.stats.last_error {
            println!("   Last error: {}", err.red());
        }
    }

    fn report_error(&mut self, err: String) {
        log(&self.log_tx, LogLevel::Error, Event::Custom(err.clone()));
        println!("❌ {}", err);
        self.stats.last_error = Some(err);
    }
}
