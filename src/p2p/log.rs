use colored::*;
use std::fmt;
use std::net::SocketAddr;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::p2p::utils::hash_hex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info"  => Some(LogLevel::Info),
            "warn"  => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Resolved(String, usize),
    Reachable(SocketAddr, u128),
    FailedConnection(SocketAddr, String),
    Connected(SocketAddr),
    StateChanged(String),
    PeerVersion(i32, String),
    Sent(String, usize),
    Received(String, usize),
    Inventory(usize, usize),
    BlockRequested([u8; 32]),
    BlockVerified([u8; 32], bool),
    Deferred(String),
    Custom(String),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Resolved(host, count) => write!(f, "Resolved {} to {} addresses", host, count),
            Event::Reachable(addr, ms) => write!(f, "Peer {} reachable ({} ms)", addr, ms),
            Event::FailedConnection(addr, reason) => write!(f, "Failed to connect to {}: {}", addr, reason),
            Event::Connected(addr) => write!(f, "Connected to peer {}", addr),
            Event::StateChanged(state) => write!(f, "Handshake state -> {}", state),
            Event::PeerVersion(version, agent) => write!(f, "Peer runs protocol {} ({:?})", version, agent),
            Event::Sent(cmd, len) => write!(f, "Sent: {} ({} bytes payload)", cmd, len),
            Event::Received(cmd, len) => write!(f, "Received: {} ({} bytes)", cmd, len),
            Event::Inventory(total, blocks) => write!(f, "Inventory of {} items, {} blocks", total, blocks),
            Event::BlockRequested(hash) => write!(f, "Requesting block {}", hash_hex(hash)),
            Event::BlockVerified(hash, true) => write!(f, "Block {} verified", hash_hex(hash)),
            Event::BlockVerified(hash, false) => write!(f, "Block {} failed hash verification", hash_hex(hash)),
            Event::Deferred(cmd) => write!(f, "Deferring '{}' until the pending block arrives", cmd),
            Event::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogMessage {
    pub level: LogLevel,
    pub event: Event,
}

impl LogMessage {
    pub fn new(level: LogLevel, event: Event) -> Self {
        LogMessage { level, event }
    }
}

pub struct Logger {
    min_level: LogLevel,
    rx: Receiver<LogMessage>,
}

impl Logger {
    /// The thread exits once every sender has been dropped.
    pub fn spawn(min_level: LogLevel, rx: Receiver<LogMessage>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let logger = Logger { min_level, rx };
            logger.run();
        })
    }

    fn run(self) {
        while let Ok(msg) = self.rx.recv() {
            if msg.level >= self.min_level {
                let prefix = match msg.level {
                    LogLevel::Trace => "[TRACE]".dimmed(),
                    LogLevel::Debug => "[DEBUG]".blue(),
                    LogLevel::Info  => "[INFO ]".green(),
                    LogLevel::Warn  => "[WARN ]".yellow(),
                    LogLevel::Error => "[ERROR]".red().bold(),
                };
                eprintln!("{} {}", prefix, msg.event);
            }
        }
    }
}

pub fn log(sender: &Sender<LogMessage>, level: LogLevel, event: Event) {
    let _ = sender.send(LogMessage::new(level, event));
}
