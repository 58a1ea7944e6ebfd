use std::fmt;

use crate::p2p::error::P2pError;
use crate::p2p::utils::{CMD_PING, CMD_VERACK, CMD_VERSION};

/// Feature negotiation messages a peer may send between its version and its
/// verack.
const NEGOTIATION_COMMANDS: &[&str] = &[
    "wtxidrelay",
    "sendaddrv2",
    "sendheaders",
    "sendcmpct",
    "feefilter",
    CMD_PING,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    UnexpectedMessage(String),
    Timeout,
    ConnectionClosed,
    Protocol(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    Connecting,
    VersionSent,
    VersionReceived,
    Ready,
    Failed(FailureReason),
}

impl HandshakeState {
    pub fn is_ready(&self) -> bool {
        matches!(self, HandshakeState::Ready)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, HandshakeState::Ready | HandshakeState::Failed(_))
    }

    /// State after `command` arrives. Messages do not move `Ready` or
    /// `Failed`.
    pub fn on_message(&self, command: &str) -> HandshakeState {
        use HandshakeState::*;

        match self {
            VersionSent if command == CMD_VERSION => VersionReceived,
            VersionReceived if command == CMD_VERACK => Ready,
            VersionReceived if NEGOTIATION_COMMANDS.contains(&command) => VersionReceived,
            Connecting | VersionSent | VersionReceived => {
                Failed(FailureReason::UnexpectedMessage(command.to_string()))
            }
            Ready | Failed(_) => self.clone(),
        }
    }

    pub fn on_error(&self, err: &P2pError) -> HandshakeState {
        if self.is_terminal() && !self.is_ready() {
            return self.clone();
        }
        let reason = match err {
            P2pError::Timeout => FailureReason::Timeout,
            P2pError::ConnectionClosed => FailureReason::ConnectionClosed,
            P2pError::UnexpectedMessage { command, .. } => FailureReason::UnexpectedMessage(command.clone()),
            other => FailureReason::Protocol(other.to_string()),
        };
        HandshakeState::Failed(reason)
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeState::Connecting => write!(f, "CONNECTING"),
            HandshakeState::VersionSent => write!(f, "VERSION_SENT"),
            HandshakeState::VersionReceived => write!(f, "VERSION_RECEIVED"),
            HandshakeState::Ready => write!(f, "READY"),
            HandshakeState::Failed(FailureReason::UnexpectedMessage(cmd)) => {
                write!(f, "FAILED (unexpected '{}')", cmd)
            }
            HandshakeState::Failed(FailureReason::Timeout) => write!(f, "FAILED (timeout)"),
            HandshakeState::Failed(FailureReason::ConnectionClosed) => write!(f, "FAILED (connection closed)"),
            HandshakeState::Failed(FailureReason::Protocol(msg)) => write!(f, "FAILED ({})", msg),
        }
    }
}
