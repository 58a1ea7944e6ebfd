use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum P2pError {
    #[error("truncated input: {needed} bytes needed at offset {offset}, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("truncated inventory: {declared} entries declared, room for {fits}")]
    TruncatedInventory { declared: u64, fits: usize },

    #[error("invalid command name {0:?}")]
    InvalidCommand(String),

    #[error("bad magic: expected {}, got {}", hex::encode(.expected), hex::encode(.actual))]
    BadMagic { expected: [u8; 4], actual: [u8; 4] },

    #[error("checksum mismatch on '{command}': header {}, payload {}", hex::encode(.expected), hex::encode(.actual))]
    ChecksumMismatch {
        command: String,
        expected: [u8; 4],
        actual: [u8; 4],
    },

    #[error("payload of {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: u64, limit: u32 },

    #[error("unexpected '{command}' message while {state}")]
    UnexpectedMessage { command: String, state: String },

    #[error("connection not ready (state: {0})")]
    NotReady(String),

    #[error("peer does not have block {0}")]
    NotFound(String),

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("timed out waiting for peer")]
    Timeout,

    #[error("no reachable peers for {0}")]
    NoReachablePeers(String),

    #[error("invalid block hash: {0}")]
    InvalidHash(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl P2pError {
    pub fn truncated(len: usize, offset: usize, needed: usize) -> Self {
        P2pError::TruncatedInput {
            offset,
            needed,
            available: len.saturating_sub(offset),
        }
    }
}

// Read timeouts surface as WouldBlock on unix and TimedOut on windows.
impl From<io::Error> for P2pError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => P2pError::Timeout,
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => P2pError::ConnectionClosed,
            _ => P2pError::Io(e),
        }
    }
}
