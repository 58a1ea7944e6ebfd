use clap::Parser;
use std::path::PathBuf;

use crate::p2p::config::PeerConfig;
use crate::p2p::error::P2pError;
use crate::p2p::network::Network;

/// Connects to one Bitcoin peer, completes the handshake and fetches the
/// blocks it announces, verifying each block's hash.
#[derive(Parser, Debug, Clone)]
#[command(name = "bitcoin-block-watcher")]
#[command(about = "Fetch and verify announced Bitcoin blocks from a single peer")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Network whose magic bytes, port and seed to use
    #[arg(long, value_enum)]
    pub network: Option<Network>,

    /// Seed hostname or peer address to connect to
    #[arg(long)]
    pub host: Option<String>,

    /// Peer port (defaults to the network's port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Connection timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Read timeout in seconds
    #[arg(long)]
    pub read_timeout: Option<u64>,

    /// Blocks to fetch before exiting (0 = until the peer disconnects)
    #[arg(long)]
    pub max_blocks: Option<usize>,

    /// Fetch this block (hex, display order) instead of waiting for announcements
    #[arg(long)]
    pub block: Option<String>,

    /// Protocol version to advertise
    #[arg(long)]
    pub protocol_version: Option<i32>,

    /// User agent to advertise
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Start height to advertise
    #[arg(long)]
    pub start_height: Option<i32>,

    /// Ask the peer to relay transactions
    #[arg(long)]
    pub relay: bool,

    /// Use a random version nonce instead of the configured one
    #[arg(long)]
    pub random_nonce: bool,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print fetched blocks as JSON
    #[arg(long)]
    pub json: bool,

    /// Only probe the seed's addresses and exit
    #[arg(long)]
    pub probe: bool,

    /// Start the interactive shell
    #[arg(short, long)]
    pub interactive: bool,

    /// Verbosity level for logging (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub verbosity: String,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Effective configuration: the config file (or defaults) with flags
    /// applied on top.
    pub fn peer_config(&self) -> Result<PeerConfig, P2pError> {
        let mut config = match &self.config {
            Some(path) => PeerConfig::load_from_file(path)?,
            None => PeerConfig::default(),
        };

        if let Some(network) = self.network {
            config.network = network;
        }
        if self.host.is_some() {
            config.host = self.host.clone();
        }
        if self.port.is_some() {
            config.port = self.port;
        }
        if let Some(timeout) = self.timeout {
            config.connect_timeout_secs = timeout;
        }
        if let Some(timeout) = self.read_timeout {
            config.read_timeout_secs = timeout;
        }
        if let Some(max) = self.max_blocks {
            config.max_blocks = max;
        }
        if let Some(version) = self.protocol_version {
            config.version.protocol_version = version;
        }
        if let Some(agent) = &self.user_agent {
            config.version.user_agent = agent.clone();
        }
        if let Some(height) = self.start_height {
            config.version.start_height = height;
        }
        if self.relay {
            config.version.relay = true;
        }
        if self.random_nonce {
            config.version.nonce = rand::random();
        }
        Ok(config)
    }
}

/// Print the current configuration
pub fn print_config(config: &PeerConfig) {
    println!("🔧 Configuration:");
    println!("   Network: {}", config.network);
    println!("   Host: {}", config.host());
    println!("   Port: {}", config.port());
    println!("   Socket: {}", config.socket_addr());
    println!("   Connect timeout: {}s", config.connect_timeout_secs);
    println!("   Read timeout: {}s", config.read_timeout_secs);
    println!("   Max blocks: {}", config.max_blocks);
    println!("   Protocol version: {}", config.version.protocol_version);
    println!("   User agent: {:?}", config.version.user_agent);
    println!("   Start height: {}", config.version.start_height);
    println!("   Relay: {}", config.version.relay);
    println!("   Nonce: {}", config.version.nonce);
    println!();
}
