use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::p2p::config::VersionConfig;
use crate::p2p::error::P2pError;
use crate::p2p::utils::{read_i32, read_u64, skip_prefixed, take};
use crate::p2p::varint;

const NET_ADDR_SIZE: usize = 26;

/// Network address as carried in a version message (no timestamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetAddr {
    pub services: u64,
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl NetAddr {
    pub fn unspecified(port: u16) -> Self {
        NetAddr {
            services: 0,
            ip: Ipv4Addr::UNSPECIFIED,
            port,
        }
    }

    /// The IPv4 address goes into the 16-byte field as an IPv4-mapped IPv6
    /// address; the port is big-endian.
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.services.to_le_bytes());
        out.extend(self.ip.to_ipv6_mapped().octets());
        out.extend(self.port.to_be_bytes());
    }
}

impl From<SocketAddrV4> for NetAddr {
    fn from(addr: SocketAddrV4) -> Self {
        NetAddr {
            services: 0,
            ip: *addr.ip(),
            port: addr.port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPayload {
    pub version: i32,
    pub services: u64,
    pub timestamp: i64,
    pub receiver: NetAddr,
    pub sender: NetAddr,
    pub nonce: u64,
    pub user_agent: String,
    pub start_height: i32,
    pub relay: bool,
}

impl VersionPayload {
    pub fn from_config(config: &VersionConfig, timestamp: i64) -> Self {
        VersionPayload {
            version: config.protocol_version,
            services: config.services,
            timestamp,
            receiver: config.receiver,
            sender: config.sender,
            nonce: config.nonce,
            user_agent: config.user_agent.clone(),
            start_height: config.start_height,
            relay: config.relay,
        }
    }

    /// Uses the connected peer as the receiver address when it is IPv4 and
    /// none was configured.
    pub fn addressed_to(mut self, peer: Option<SocketAddr>) -> Self {
        if let Some(SocketAddr::V4(v4)) = peer {
            if self.receiver.ip.is_unspecified() {
                self.receiver = NetAddr {
                    services: self.receiver.services,
                    ..NetAddr::from(v4)
                };
            }
        }
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(86 + self.user_agent.len());
        payload.extend(self.version.to_le_bytes());
        payload.extend(self.services.to_le_bytes());
        payload.extend(self.timestamp.to_le_bytes());
        self.receiver.encode(&mut payload);
        self.sender.encode(&mut payload);
        payload.extend(self.nonce.to_le_bytes());
        payload.extend(varint::encode(self.user_agent.len() as u64));
        payload.extend(self.user_agent.as_bytes());
        payload.extend(self.start_height.to_le_bytes());
        payload.push(self.relay as u8);
        payload
    }
}

/// The few fields of an inbound version worth logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerVersion {
    pub version: i32,
    pub services: u64,
    pub user_agent: String,
}

impl PeerVersion {
    pub fn parse(payload: &[u8]) -> Result<Self, P2pError> {
        let mut c = 0;
        let version = read_i32(payload, &mut c)?;
        let services = read_u64(payload, &mut c)?;
        // timestamp, addr_recv, addr_from, nonce
        take(payload, &mut c, 8 + 2 * NET_ADDR_SIZE + 8)?;
        let len = skip_prefixed(payload, &mut c)?;
        let user_agent = String::from_utf8_lossy(&payload[c - len..c]).to_string();

        Ok(PeerVersion {
            version,
            services,
            user_agent,
        })
    }
}
