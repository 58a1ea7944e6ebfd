use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::mpsc::Sender;

use crate::p2p::block::{self, Block};
use crate::p2p::config::VersionConfig;
use crate::p2p::error::P2pError;
use crate::p2p::framer::{Envelope, MessageStream};
use crate::p2p::handshake::HandshakeState;
use crate::p2p::inventory::{block_hashes, build_getdata_payload, parse_inv, InventoryItem};
use crate::p2p::log::{log, Event, LogLevel, LogMessage};
use crate::p2p::network::Network;
use crate::p2p::utils::{hash_hex, CMD_BLOCK, CMD_GETDATA, CMD_INV, CMD_NOTFOUND, CMD_PING, CMD_PONG, CMD_VERACK, CMD_VERSION};
use crate::p2p::verify::verify;
use crate::p2p::version::{PeerVersion, VersionPayload};

const MAX_DEFERRED: usize = 64;

/// A fetched block together with its verification result.
#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub block: Block,
    pub verified: bool,
}

/// One peer connection: the framed stream, its handshake state and the
/// per-connection bookkeeping. Nothing here is shared with other connections.
#[derive(Debug)]
pub struct BitcoinClient<S> {
    stream: MessageStream<S>,
    state: HandshakeState,
    version: VersionConfig,
    peer_addr: Option<SocketAddr>,
    seen_blocks: HashSet<[u8; 32]>,
    deferred: VecDeque<Envelope>,
    log_tx: Option<Sender<LogMessage>>,
}

impl<S: Read + Write> BitcoinClient<S> {
    pub fn new(stream: S, network: Network, version: VersionConfig) -> Self {
        BitcoinClient {
            stream: MessageStream::new(stream, network.magic()),
            state: HandshakeState::Connecting,
            version,
            peer_addr: None,
            seen_blocks: HashSet::new(),
            deferred: VecDeque::new(),
            log_tx: None,
        }
    }

    pub fn with_logger(mut self, log_tx: Sender<LogMessage>) -> Self {
        self.log_tx = Some(log_tx);
        self
    }

    pub fn with_peer_addr(mut self, addr: SocketAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    #[cfg(test)]
    pub fn stream(&self) -> &MessageStream<S> {
        &self.stream
    }

    /// Drives the connection from `Connecting` to `Ready`.
    pub fn handshake(&mut self) -> Result<(), P2pError> {
        match self.state {
            HandshakeState::Connecting => {}
            HandshakeState::Ready => return Ok(()),
            _ => return Err(P2pError::NotReady(self.state.to_string())),
        }

        let timestamp = chrono::Utc::now().timestamp();
        let payload = VersionPayload::from_config(&self.version, timestamp)
            .addressed_to(self.peer_addr)
            .to_bytes();
        if let Err(e) = self.send(CMD_VERSION, &payload) {
            return Err(self.fail(e));
        }
        self.transition(HandshakeState::VersionSent);

        while !self.state.is_ready() {
            let envelope = match self.stream.read_message() {
                Ok(envelope) => envelope,
                Err(e) => return Err(self.fail(e)),
            };
            let command = envelope.command();
            self.emit(LogLevel::Debug, Event::Received(command.clone(), envelope.payload.len()));

            let next = self.state.on_message(&command);
            if let HandshakeState::Failed(_) = next {
                let err = P2pError::UnexpectedMessage {
                    command,
                    state: self.state.to_string(),
                };
                self.transition(next);
                return Err(err);
            }

            if self.state == HandshakeState::VersionSent && next == HandshakeState::VersionReceived {
                if let Ok(peer) = PeerVersion::parse(&envelope.payload) {
                    self.emit(LogLevel::Info, Event::PeerVersion(peer.version, peer.user_agent));
                }
                self.transition(next);
                if let Err(e) = self.send(CMD_VERACK, &[]) {
                    return Err(self.fail(e));
                }
                continue;
            }

            if command == CMD_PING {
                if let Err(e) = self.send(CMD_PONG, &envelope.payload) {
                    return Err(self.fail(e));
                }
            }
            self.transition(next);
        }
        Ok(())
    }

    /// Next message, serving deferred ones first.
    pub fn next_message(&mut self) -> Result<Envelope, P2pError> {
        if let Some(envelope) = self.deferred.pop_front() {
            return Ok(envelope);
        }
        let envelope = self.stream.read_message()?;
        self.emit(LogLevel::Debug, Event::Received(envelope.command(), envelope.payload.len()));
        Ok(envelope)
    }

    /// Parses an `inv` payload and fetches every block it announces that has
    /// not been fetched on this connection yet. Returns the number fetched.
    pub fn dispatch_inventory<F>(&mut self, payload: &[u8], on_block: &mut F) -> Result<usize, P2pError>
    where
        F: FnMut(&BlockReport),
    {
        self.ensure_ready()?;

        let items = parse_inv(payload)?;
        let hashes = block_hashes(&items);
        self.emit(LogLevel::Info, Event::Inventory(items.len(), hashes.len()));
        for item in &items {
            self.emit(LogLevel::Trace, Event::Custom(format!("  {} - {}", item.inv_type.name(), item.hash_hex())));
        }

        let mut fetched = 0;
        for hash in hashes {
            if !self.seen_blocks.insert(hash) {
                self.emit(LogLevel::Debug, Event::Custom(format!("Already fetched {}, skipping", hash_hex(&hash))));
                continue;
            }
            let report = self.fetch_block(hash)?;
            on_block(&report);
            fetched += 1;
        }
        Ok(fetched)
    }

    /// Sends `getdata` for one block and reads until its `block` reply.
    pub fn fetch_block(&mut self, hash: [u8; 32]) -> Result<BlockReport, P2pError> {
        self.ensure_ready()?;

        self.emit(LogLevel::Info, Event::BlockRequested(hash));
        let payload = build_getdata_payload(&[InventoryItem::block(hash)]);
        self.send(CMD_GETDATA, &payload)?;
        self.seen_blocks.insert(hash);

        loop {
            let envelope = self.stream.read_message()?;
            let command = envelope.command();
            self.emit(LogLevel::Debug, Event::Received(command.clone(), envelope.payload.len()));

            match command.as_str() {
                CMD_BLOCK => {
                    let block = block::decode(&envelope.payload, hash)?;
                    let verified = verify(&block);
                    let level = if verified { LogLevel::Info } else { LogLevel::Warn };
                    self.emit(level, Event::BlockVerified(hash, verified));
                    return Ok(BlockReport { block, verified });
                }
                CMD_NOTFOUND => {
                    let missing = parse_inv(&envelope.payload)?;
                    if missing.iter().any(|item| item.hash == hash) {
                        return Err(P2pError::NotFound(hash_hex(&hash)));
                    }
                }
                CMD_PING => self.send(CMD_PONG, &envelope.payload)?,
                _ => self.defer(envelope),
            }
        }
    }

    /// Handles messages until `max_blocks` blocks have been fetched. With 0 it
    /// runs until the peer disconnects or stays silent past the read timeout.
    /// Returns the number of blocks fetched.
    pub fn watch<F>(&mut self, max_blocks: usize, mut on_block: F) -> Result<usize, P2pError>
    where
        F: FnMut(&BlockReport),
    {
        self.ensure_ready()?;

        let mut fetched = 0;
        while max_blocks == 0 || fetched < max_blocks {
            let envelope = match self.next_message() {
                Ok(envelope) => envelope,
                Err(e @ (P2pError::ConnectionClosed | P2pError::Timeout)) if max_blocks == 0 => {
                    self.emit(LogLevel::Info, Event::Custom(format!("Watch ended: {}", e)));
                    break;
                }
                Err(e) => return Err(e),
            };
            match envelope.command().as_str() {
                CMD_INV => fetched += self.dispatch_inventory(&envelope.payload, &mut on_block)?,
                CMD_PING => self.send(CMD_PONG, &envelope.payload)?,
                other => self.emit(LogLevel::Trace, Event::Custom(format!("Ignoring '{}'", other))),
            }
        }
        Ok(fetched)
    }

    fn defer(&mut self, envelope: Envelope) {
        if self.deferred.len() >= MAX_DEFERRED {
            if let Some(dropped) = self.deferred.pop_front() {
                self.emit(LogLevel::Warn, Event::Custom(format!("Deferred queue full, dropping '{}'", dropped.command())));
            }
        }
        self.emit(LogLevel::Debug, Event::Deferred(envelope.command()));
        self.deferred.push_back(envelope);
    }

    fn ensure_ready(&self) -> Result<(), P2pError> {
        if self.state.is_ready() {
            Ok(())
        } else {
            Err(P2pError::NotReady(self.state.to_string()))
        }
    }

    fn send(&mut self, command: &str, payload: &[u8]) -> Result<(), P2pError> {
        self.stream.send(command, payload)?;
        self.emit(LogLevel::Debug, Event::Sent(command.to_string(), payload.len()));
        Ok(())
    }

    fn transition(&mut self, next: HandshakeState) {
        if next != self.state {
            self.emit(LogLevel::Info, Event::StateChanged(next.to_string()));
            self.state = next;
        }
    }

    fn fail(&mut self, err: P2pError) -> P2pError {
        let next = self.state.on_error(&err);
        self.transition(next);
        err
    }

    fn emit(&self, level: LogLevel, event: Event) {
        if let Some(tx) = &self.log_tx {
            log(tx, level, event);
        }
    }
}
