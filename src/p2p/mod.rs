pub mod block;
pub mod config;
pub mod error;
pub mod framer;
pub mod handshake;
pub mod inventory;
pub mod log;
pub mod messageheader;
pub mod network;
pub mod p2p_client;
pub mod probe;
pub mod utils;
pub mod varint;
pub mod verify;
pub mod version;
