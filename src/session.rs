use std::net::{SocketAddr, TcpStream};
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::p2p::config::PeerConfig;
use crate::p2p::error::P2pError;
use crate::p2p::log::{log, Event, LogLevel, LogMessage};
use crate::p2p::p2p_client::{BitcoinClient, BlockReport};
use crate::p2p::probe::reachable_peers;

/// Resolves the configured seed once and probes its addresses.
pub fn discover(config: &PeerConfig, log_tx: &Sender<LogMessage>) -> Result<Vec<SocketAddr>, P2pError> {
    let rt = tokio::runtime::Runtime::new()?;
    let timeout = Duration::from_secs(config.connect_timeout_secs);
    let peers = rt.block_on(reachable_peers(config.host(), config.port(), timeout, log_tx.clone()))?;
    Ok(peers)
}

/// Connects to the first reachable address and completes the handshake.
pub fn connect(config: &PeerConfig, log_tx: &Sender<LogMessage>) -> Result<BitcoinClient<TcpStream>, P2pError> {
    let candidates = discover(config, log_tx)?;
    connect_any(config, log_tx, candidates)
}

/// Tries `candidates` in order until one completes the handshake.
pub fn connect_any(
    config: &PeerConfig,
    log_tx: &Sender<LogMessage>,
    candidates: Vec<SocketAddr>,
) -> Result<BitcoinClient<TcpStream>, P2pError> {
    let mut last_err = P2pError::NoReachablePeers(config.socket_addr());
    let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
    let read_timeout = Duration::from_secs(config.read_timeout_secs);

    for addr in candidates {
        let stream = match TcpStream::connect_timeout(&addr, connect_timeout) {
            Ok(s) => s,
            Err(e) => {
                log(log_tx, LogLevel::Warn, Event::FailedConnection(addr, e.to_string()));
                last_err = e.into();
                continue;
            }
        };
        stream.set_read_timeout(Some(read_timeout))?;
        stream.set_write_timeout(Some(read_timeout))?;
        log(log_tx, LogLevel::Info, Event::Connected(addr));

        let mut client = BitcoinClient::new(stream, config.network, config.version.clone())
            .with_peer_addr(addr)
            .with_logger(log_tx.clone());

        // A failed handshake is final for this peer; the next address gets a
        // fresh connection.
        match client.handshake() {
            Ok(()) => return Ok(client),
            Err(e) => {
                let reason = format!("{} (handshake {})", e, client.state());
                log(log_tx, LogLevel::Warn, Event::FailedConnection(addr, reason));
                last_err = e;
            }
        }
    }
    Err(last_err)
}

/// Waits for block announcements and fetches them.
pub fn run_watch<F>(config: &PeerConfig, log_tx: &Sender<LogMessage>, on_block: F) -> Result<usize, P2pError>
where
    F: FnMut(&BlockReport),
{
    let mut client = connect(config, log_tx)?;
    client.watch(config.max_blocks, on_block)
}

/// Fetches one known block.
pub fn run_fetch(config: &PeerConfig, log_tx: &Sender<LogMessage>, hash: [u8; 32]) -> Result<BlockReport, P2pError> {
    let mut client = connect(config, log_tx)?;
    client.fetch_block(hash)
}
