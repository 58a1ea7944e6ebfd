use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::p2p::error::P2pError;
use crate::p2p::network::Network;
use crate::p2p::version::NetAddr;

/// Fields of the outbound version message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionConfig {
    pub protocol_version: i32,
    pub services: u64,
    pub nonce: u64,
    pub receiver: NetAddr,
    pub sender: NetAddr,
    pub user_agent: String,
    pub start_height: i32,
    pub relay: bool,
}

impl Default for VersionConfig {
    fn default() -> Self {
        VersionConfig {
            protocol_version: 70015,
            services: 0,
            nonce: 0,
            receiver: NetAddr::unspecified(8333),
            sender: NetAddr::unspecified(8333),
            user_agent: String::new(),
            start_height: 0,
            relay: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    pub network: Network,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    /// Blocks to fetch before the watch loop returns; 0 runs until the peer
    /// disconnects.
    pub max_blocks: usize,
    pub version: VersionConfig,
}

impl Default for PeerConfig {
    fn default() -> Self {
        PeerConfig {
            network: Network::Mainnet,
            host: None,
            port: None,
            connect_timeout_secs: 10,
            read_timeout_secs: 180,
            max_blocks: 1,
            version: VersionConfig::default(),
        }
    }
}

impl PeerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, P2pError> {
        let data = fs::read_to_string(path)
            .map_err(|e| P2pError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&data).map_err(|e| P2pError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or_else(|| self.network.default_seed())
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.network.default_port())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}
