use crate::p2p::error::P2pError;
use crate::p2p::utils::sha256d;

pub const HEADER_SIZE: usize = 24;
pub const COMMAND_SIZE: usize = 12;
pub const MAX_PAYLOAD_SIZE: u32 = 0x0200_0000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub magic: [u8; 4],
    pub command: [u8; COMMAND_SIZE],
    pub payload_size: u32,
    pub checksum: [u8; 4],
}

impl MessageHeader {
    pub fn new(magic: [u8; 4], command: &str, payload: &[u8]) -> Result<Self, P2pError> {
        let command = encode_command(command)?;

        if payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(P2pError::PayloadTooLarge {
                size: payload.len() as u64,
                limit: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(MessageHeader {
            magic,
            command,
            payload_size: payload.len() as u32,
            checksum: checksum(payload),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..16].copy_from_slice(&self.command);
        bytes[16..20].copy_from_slice(&self.payload_size.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.checksum);
        bytes
    }

    pub fn from_bytes(data: &[u8; HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        let mut command = [0u8; COMMAND_SIZE];
        let mut checksum = [0u8; 4];

        magic.copy_from_slice(&data[0..4]);
        command.copy_from_slice(&data[4..16]);
        let payload_size = u32::from_le_bytes([data[16], data[17], data[18], data[19]]);
        checksum.copy_from_slice(&data[20..24]);

        MessageHeader {
            magic,
            command,
            payload_size,
            checksum,
        }
    }

    pub fn command_str(&self) -> String {
        let end = self.command.iter().position(|&b| b == 0).unwrap_or(COMMAND_SIZE);
        String::from_utf8_lossy(&self.command[..end]).to_string()
    }
}

/// First four bytes of the payload's double SHA-256.
pub fn checksum(payload: &[u8]) -> [u8; 4] {
    let digest = sha256d(payload);
    [digest[0], digest[1], digest[2], digest[3]]
}

fn encode_command(command: &str) -> Result<[u8; COMMAND_SIZE], P2pError> {
    if command.len() > COMMAND_SIZE || !command.is_ascii() || command.contains('\0') {
        return Err(P2pError::InvalidCommand(command.to_string()));
    }
    let mut cmd_bytes = [0u8; COMMAND_SIZE];
    cmd_bytes[..command.len()].copy_from_slice(command.as_bytes());
    Ok(cmd_bytes)
}
