//! Message framing over an arbitrary byte stream.
//!
//! A transport read may return part of a header, a header and half a payload,
//! or several messages at once. [`MessageStream`] keeps whatever it has read
//! in its own buffer and only hands out a message once the full header and
//! the declared payload are present. Leftover bytes stay buffered for the
//! next call.

use std::io::{self, Read, Write};

use crate::p2p::error::P2pError;
use crate::p2p::messageheader::{checksum, MessageHeader, HEADER_SIZE, MAX_PAYLOAD_SIZE};

const READ_CHUNK: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub header: MessageHeader,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn command(&self) -> String {
        self.header.command_str()
    }
}

/// Serializes a complete message: header followed by payload.
pub fn build(magic: [u8; 4], command: &str, payload: &[u8]) -> Result<Vec<u8>, P2pError> {
    let header = MessageHeader::new(magic, command, payload)?;
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.extend_from_slice(&header.to_bytes());
    message.extend_from_slice(payload);
    Ok(message)
}

#[derive(Debug)]
pub struct MessageStream<S> {
    stream: S,
    magic: [u8; 4],
    buffer: Vec<u8>,
}

impl<S> MessageStream<S> {
    pub fn new(stream: S, magic: [u8; 4]) -> Self {
        MessageStream {
            stream,
            magic,
            buffer: Vec::new(),
        }
    }

    /// Bytes received but not yet returned as part of a message.
    #[cfg(test)]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &S {
        &self.stream
    }
}

impl<S: Read> MessageStream<S> {
    /// Reads exactly one message.
    ///
    /// On `BadMagic` only the header is dropped; on `ChecksumMismatch` the
    /// whole message is dropped. In both cases the buffer stays aligned for
    /// the caller to decide whether to continue.
    pub fn read_message(&mut self) -> Result<Envelope, P2pError> {
        self.fill(HEADER_SIZE)?;

        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(&self.buffer[..HEADER_SIZE]);
        let header = MessageHeader::from_bytes(&raw);

        if header.magic != self.magic {
            self.buffer.drain(..HEADER_SIZE);
            return Err(P2pError::BadMagic {
                expected: self.magic,
                actual: header.magic,
            });
        }

        if header.payload_size > MAX_PAYLOAD_SIZE {
            self.buffer.drain(..HEADER_SIZE);
            return Err(P2pError::PayloadTooLarge {
                size: header.payload_size as u64,
                limit: MAX_PAYLOAD_SIZE,
            });
        }

        let total = HEADER_SIZE + header.payload_size as usize;
        self.fill(total)?;

        let payload = self.buffer[HEADER_SIZE..total].to_vec();
        self.buffer.drain(..total);

        let actual = checksum(&payload);
        if actual != header.checksum {
            return Err(P2pError::ChecksumMismatch {
                command: header.command_str(),
                expected: header.checksum,
                actual,
            });
        }

        Ok(Envelope { header, payload })
    }

    fn fill(&mut self, wanted: usize) -> Result<(), P2pError> {
        let mut chunk = [0u8; READ_CHUNK];
        while self.buffer.len() < wanted {
            match self.stream.read(&mut chunk) {
                Ok(0) => return Err(P2pError::ConnectionClosed),
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl<S: Write> MessageStream<S> {
    pub fn send(&mut self, command: &str, payload: &[u8]) -> Result<(), P2pError> {
        let message = build(self.magic, command, payload)?;
        self.stream.write_all(&message)?;
        self.stream.flush()?;
        Ok(())
    }
}
