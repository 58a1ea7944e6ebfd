use std::io::{self, Cursor, Read, Write};
use std::sync::mpsc;

use crate::interactive::Command;
use crate::p2p::block::{decode, BlockHeader};
use crate::p2p::config::{PeerConfig, VersionConfig};
use crate::p2p::error::P2pError;
use crate::p2p::framer::{build, MessageStream};
use crate::p2p::handshake::{FailureReason, HandshakeState};
use crate::p2p::inventory::{build_getdata_payload, parse_inv, InventoryItem, InventoryType};
use crate::p2p::messageheader::{MessageHeader, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::p2p::network::Network;
use crate::p2p::p2p_client::{BitcoinClient, BlockReport};
use crate::p2p::utils::{hash_hex, parse_hash_hex, sha256d};
use crate::p2p::varint;
use crate::p2p::verify::verify;
use crate::p2p::version::{PeerVersion, VersionPayload};
use crate::report::format_timestamp;
use crate::session::connect_any;

const MAGIC: [u8; 4] = [0xF9, 0xBE, 0xB4, 0xD9];

/// In-memory peer: serves scripted bytes at most `chunk` at a time and
/// records everything written to it. A stalling stream reports a read
/// timeout once the script is exhausted instead of end-of-stream.
struct MockStream {
    incoming: Vec<u8>,
    pos: usize,
    chunk: usize,
    stall: bool,
    outgoing: Vec<u8>,
}

impl MockStream {
    fn new(incoming: Vec<u8>, chunk: usize) -> Self {
        MockStream {
            incoming,
            pos: 0,
            chunk,
            stall: false,
            outgoing: Vec::new(),
        }
    }

    fn stalling(incoming: Vec<u8>, chunk: usize) -> Self {
        MockStream {
            stall: true,
            ..MockStream::new(incoming, chunk)
        }
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.incoming.len() - self.pos;
        if remaining == 0 && self.stall {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "read timed out"));
        }
        let n = remaining.min(buf.len()).min(self.chunk);
        buf[..n].copy_from_slice(&self.incoming[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outgoing.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn frame(command: &str, payload: &[u8]) -> Vec<u8> {
    build(MAGIC, command, payload).unwrap()
}

fn sample_header() -> BlockHeader {
    BlockHeader {
        version: 0x2000_0000,
        prev_block_hash: [0x11; 32],
        merkle_root: [0x22; 32],
        timestamp: 1_700_000_000,
        bits: 0x1703_a30c,
        nonce: 42,
    }
}

/// Block payload with one transaction per entry, each holding the given
/// output values and a 25-byte script per output.
fn block_payload(header: &BlockHeader, txs: &[&[u64]]) -> Vec<u8> {
    let mut payload = header.to_bytes().to_vec();
    payload.extend(varint::encode(txs.len() as u64));
    for outputs in txs {
        payload.extend(1i32.to_le_bytes());
        payload.extend(varint::encode(outputs.len() as u64));
        for value in outputs.iter() {
            payload.extend(value.to_le_bytes());
            payload.extend(varint::encode(25));
            payload.extend([0x76; 25]);
        }
    }
    payload
}

fn inv_payload(items: &[(u32, [u8; 32])]) -> Vec<u8> {
    let mut payload = varint::encode(items.len() as u64);
    for (inv_type, hash) in items {
        payload.extend(inv_type.to_le_bytes());
        payload.extend(hash);
    }
    payload
}

fn handshake_bytes() -> Vec<u8> {
    let peer_version = VersionPayload::from_config(
        &VersionConfig {
            user_agent: "/Satoshi:27.0.0/".to_string(),
            ..VersionConfig::default()
        },
        1_700_000_000,
    );
    let mut bytes = frame("version", &peer_version.to_bytes());
    bytes.extend(frame("verack", &[]));
    bytes
}

fn client(incoming: Vec<u8>) -> BitcoinClient<MockStream> {
    BitcoinClient::new(MockStream::new(incoming, 7), Network::Mainnet, VersionConfig::default())
}

fn stalling_client(incoming: Vec<u8>) -> BitcoinClient<MockStream> {
    BitcoinClient::new(MockStream::stalling(incoming, 7), Network::Mainnet, VersionConfig::default())
}

fn sent_commands(client: &BitcoinClient<MockStream>) -> Vec<(String, Vec<u8>)> {
    let outgoing = client.stream().get_ref().outgoing.clone();
    let total = outgoing.len();
    let mut reader = MessageStream::new(Cursor::new(outgoing), MAGIC);
    let mut sent = Vec::new();
    let mut consumed = 0;
    while consumed < total {
        let envelope = reader.read_message().unwrap();
        consumed += HEADER_SIZE + envelope.payload.len();
        sent.push((envelope.command(), envelope.payload));
    }
    sent
}

#[test]
fn test_varint_round_trip_boundaries() {
    let cases = [
        (0u64, 1usize),
        (0xfc, 1),
        (0xfd, 3),
        (0xffff, 3),
        (0x1_0000, 5),
        (0xffff_ffff, 5),
        (0x1_0000_0000, 9),
        (u64::MAX, 9),
    ];
    for (value, len) in cases {
        let encoded = varint::encode(value);
        assert_eq!(encoded.len(), len, "width of {:#x}", value);
        assert_eq!(varint::decode(&encoded, 0).unwrap(), (value, len));
    }
}

#[test]
fn test_varint_decode_at_offset() {
    let data = [0xAA, 0xFD, 0x10, 0x00];
    assert_eq!(varint::decode(&data, 1).unwrap(), (16, 3));
}

#[test]
fn test_varint_truncated() {
    let data = [0xFD, 0x01];
    assert!(matches!(
        varint::decode(&data, 0),
        Err(P2pError::TruncatedInput { offset: 1, needed: 2, available: 1 })
    ));
    assert!(matches!(varint::decode(&[], 0), Err(P2pError::TruncatedInput { .. })));
}

#[test]
fn test_command_longer_than_twelve_bytes_rejected() {
    assert!(matches!(
        MessageHeader::new(MAGIC, "thirteenchars", &[]),
        Err(P2pError::InvalidCommand(_))
    ));
    assert!(MessageHeader::new(MAGIC, "twelve_chars", &[]).is_ok());
}

#[test]
fn test_header_layout() {
    let bytes = frame("verack", &[]);
    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(&bytes[0..4], &MAGIC);
    assert_eq!(&bytes[4..16], b"verack\0\0\0\0\0\0");
    assert_eq!(&bytes[16..20], &[0, 0, 0, 0]);
    // sha256d of the empty string starts with 5df6e0e2
    assert_eq!(&bytes[20..24], &[0x5d, 0xf6, 0xe0, 0xe2]);
}

#[test]
fn test_framer_round_trip() {
    let payload: Vec<u8> = (0..=255u8).collect();
    let mut stream = MessageStream::new(MockStream::new(frame("getdata", &payload), 4096), MAGIC);
    let envelope = stream.read_message().unwrap();
    assert_eq!(envelope.command(), "getdata");
    assert_eq!(envelope.payload, payload);
    assert_eq!(envelope.header.payload_size, 256);
}

#[test]
fn test_framer_one_byte_at_a_time() {
    let payload = b"fragmented payload".to_vec();
    let mut stream = MessageStream::new(MockStream::new(frame("inv", &payload), 1), MAGIC);
    let envelope = stream.read_message().unwrap();
    assert_eq!(envelope.command(), "inv");
    assert_eq!(envelope.payload, payload);
    assert_eq!(stream.buffered(), 0);
}

#[test]
fn test_framer_keeps_bytes_of_next_message() {
    let mut bytes = frame("ping", &7u64.to_le_bytes());
    bytes.extend(frame("verack", &[]));
    let mut stream = MessageStream::new(MockStream::new(bytes, 4096), MAGIC);

    let first = stream.read_message().unwrap();
    assert_eq!(first.command(), "ping");
    assert_eq!(stream.buffered(), HEADER_SIZE);

    let second = stream.read_message().unwrap();
    assert_eq!(second.command(), "verack");
    assert!(second.payload.is_empty());
}

#[test]
fn test_framer_rejects_any_flipped_payload_bit() {
    let payload = [0x01, 0x02, 0x03, 0x04];
    let original = frame("inv", &payload);
    for byte in HEADER_SIZE..original.len() {
        for bit in 0..8 {
            let mut corrupted = original.clone();
            corrupted[byte] ^= 1 << bit;
            let mut stream = MessageStream::new(MockStream::new(corrupted, 4096), MAGIC);
            assert!(
                matches!(stream.read_message(), Err(P2pError::ChecksumMismatch { .. })),
                "bit {} of byte {} accepted",
                bit,
                byte
            );
        }
    }
}

#[test]
fn test_framer_rejects_foreign_magic() {
    let bytes = build(Network::Testnet.magic(), "verack", &[]).unwrap();
    let mut stream = MessageStream::new(MockStream::new(bytes, 4096), MAGIC);
    assert!(matches!(stream.read_message(), Err(P2pError::BadMagic { .. })));
}

#[test]
fn test_framer_rejects_oversized_payload() {
    let mut header = MessageHeader::new(MAGIC, "block", &[]).unwrap();
    header.payload_size = MAX_PAYLOAD_SIZE + 1;
    let mut stream = MessageStream::new(MockStream::new(header.to_bytes().to_vec(), 4096), MAGIC);
    assert!(matches!(stream.read_message(), Err(P2pError::PayloadTooLarge { .. })));
}

#[test]
fn test_framer_reports_closed_stream_mid_payload() {
    let mut bytes = frame("inv", &[0u8; 40]);
    bytes.truncate(HEADER_SIZE + 10);
    let mut stream = MessageStream::new(MockStream::new(bytes, 3), MAGIC);
    assert!(matches!(stream.read_message(), Err(P2pError::ConnectionClosed)));
}

#[test]
fn test_parse_inv_two_entries() {
    let mut payload = vec![0x02];
    payload.extend(2u32.to_le_bytes());
    payload.extend([0xAA; 32]);
    payload.extend(1u32.to_le_bytes());
    payload.extend([0xBB; 32]);

    let items = parse_inv(&payload).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].inv_type, InventoryType::Block);
    assert_eq!(items[0].hash, [0xAA; 32]);
    assert_eq!(items[1].inv_type, InventoryType::Transaction);
    assert_eq!(items[1].hash, [0xBB; 32]);
}

#[test]
fn test_parse_inv_rejects_short_payload() {
    let mut payload = inv_payload(&[(2, [0xAA; 32])]);
    payload[0] = 0x02;
    assert!(matches!(
        parse_inv(&payload),
        Err(P2pError::TruncatedInventory { declared: 2, fits: 1 })
    ));
}

#[test]
fn test_build_getdata_payload_single_block() {
    let payload = build_getdata_payload(&[InventoryItem::block([0xCD; 32])]);
    assert_eq!(payload.len(), 37);
    assert_eq!(payload[0], 1);
    assert_eq!(&payload[1..5], &2u32.to_le_bytes());
    assert_eq!(&payload[5..], &[0xCD; 32]);
}

#[test]
fn test_inventory_type_from_u32() {
    assert_eq!(InventoryType::from_u32(1), InventoryType::Transaction);
    assert_eq!(InventoryType::from_u32(2), InventoryType::Block);
    assert_eq!(InventoryType::from_u32(0x40000002), InventoryType::WitnessBlock);
    assert_eq!(InventoryType::from_u32(999999), InventoryType::Unknown(999999));
    assert_eq!(InventoryType::Unknown(999999).as_u32(), 999999);
    assert_eq!(InventoryType::WitnessBlock.name(), "WITNESS_BLOCK");
}

#[test]
fn test_decode_minimal_block() {
    let mut payload = vec![0u8; 80];
    payload[0] = 1;
    payload.push(0x00);

    let block = decode(&payload, [0u8; 32]).unwrap();
    assert_eq!(block.header.version, 1);
    assert_eq!(block.header.prev_block_hash, [0u8; 32]);
    assert_eq!(block.header.merkle_root, [0u8; 32]);
    assert_eq!(block.header.timestamp, 0);
    assert_eq!(block.header.bits, 0);
    assert_eq!(block.header.nonce, 0);
    assert!(block.transactions.is_empty());
}

#[test]
fn test_decode_block_outputs() {
    let header = sample_header();
    let payload = block_payload(&header, &[&[5_000_000_000], &[1_000, 2_500]]);

    let block = decode(&payload, header.hash()).unwrap();
    assert_eq!(block.header, header);
    assert_eq!(block.transactions.len(), 2);
    assert_eq!(block.transactions[0].outputs[0].value, 5_000_000_000);
    assert_eq!(block.transactions[1].outputs.len(), 2);
    assert_eq!(block.transactions[1].outputs[1].script_len, 25);
    assert_eq!(block.transactions[1].total_value(), 3_500);
    assert_eq!(block.computed_hash, header.hash());
}

#[test]
fn test_decode_truncated_block() {
    assert!(matches!(decode(&[0u8; 79], [0u8; 32]), Err(P2pError::TruncatedInput { .. })));

    let header = sample_header();
    let mut payload = block_payload(&header, &[&[1_000]]);
    payload.truncate(payload.len() - 1);
    assert!(matches!(decode(&payload, header.hash()), Err(P2pError::TruncatedInput { .. })));

    // Declares two transactions but carries one.
    let mut payload = block_payload(&header, &[&[1_000]]);
    payload[80] = 2;
    assert!(matches!(decode(&payload, header.hash()), Err(P2pError::TruncatedInput { .. })));
}

#[test]
fn test_genesis_header_hash() {
    let merkle_root =
        parse_hash_hex("4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b").unwrap();
    let genesis = BlockHeader {
        version: 1,
        prev_block_hash: [0u8; 32],
        merkle_root,
        timestamp: 1231006505,
        bits: 0x1d00ffff,
        nonce: 2083236893,
    };
    assert_eq!(
        hash_hex(&genesis.hash()),
        "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
    );
}

#[test]
fn test_verify_detects_mutated_header() {
    let header = sample_header();
    let payload = block_payload(&header, &[]);
    let real_hash = sha256d(&header.to_bytes());

    let block = decode(&payload, real_hash).unwrap();
    assert!(verify(&block));

    let mut mutated = payload.clone();
    mutated[76] ^= 0x01;
    let block = decode(&mutated, real_hash).unwrap();
    assert!(!verify(&block));
}

#[test]
fn test_hash_hex_round_trip() {
    let hash: [u8; 32] = std::array::from_fn(|i| i as u8);
    assert_eq!(parse_hash_hex(&hash_hex(&hash)).unwrap(), hash);
    assert!(hash_hex(&hash).starts_with("1f1e1d"));
    assert!(matches!(parse_hash_hex("abcd"), Err(P2pError::InvalidHash(_))));
}

#[test]
fn test_version_payload_layout() {
    let config = VersionConfig {
        nonce: 0x0102030405060708,
        relay: true,
        ..VersionConfig::default()
    };
    let payload = VersionPayload::from_config(&config, 1_700_000_000).to_bytes();

    assert_eq!(payload.len(), 86);
    assert_eq!(&payload[0..4], &70015i32.to_le_bytes());
    assert_eq!(&payload[12..20], &1_700_000_000i64.to_le_bytes());
    assert_eq!(&payload[38..40], &[0xFF, 0xFF]);
    assert_eq!(&payload[44..46], &8333u16.to_be_bytes());
    assert_eq!(&payload[72..80], &0x0102030405060708u64.to_le_bytes());
    assert_eq!(payload[80], 0);
    assert_eq!(payload[85], 1);
}

#[test]
fn test_peer_version_parse() {
    let config = VersionConfig {
        protocol_version: 70016,
        services: 1033,
        user_agent: "/Satoshi:27.0.0/".to_string(),
        ..VersionConfig::default()
    };
    let payload = VersionPayload::from_config(&config, 0).to_bytes();
    let peer = PeerVersion::parse(&payload).unwrap();
    assert_eq!(peer.version, 70016);
    assert_eq!(peer.services, 1033);
    assert_eq!(peer.user_agent, "/Satoshi:27.0.0/");
}

#[test]
fn test_handshake_state_transitions() {
    let sent = HandshakeState::VersionSent;
    assert_eq!(sent.on_message("version"), HandshakeState::VersionReceived);
    assert_eq!(
        sent.on_message("inv"),
        HandshakeState::Failed(FailureReason::UnexpectedMessage("inv".to_string()))
    );

    let received = HandshakeState::VersionReceived;
    assert_eq!(received.on_message("verack"), HandshakeState::Ready);
    assert_eq!(received.on_message("sendcmpct"), HandshakeState::VersionReceived);
    assert!(matches!(received.on_message("inv"), HandshakeState::Failed(_)));
    assert!(matches!(received.on_message("version"), HandshakeState::Failed(_)));

    assert_eq!(HandshakeState::Ready.on_message("inv"), HandshakeState::Ready);
    assert_eq!(
        sent.on_error(&P2pError::Timeout),
        HandshakeState::Failed(FailureReason::Timeout)
    );
}

#[test]
fn test_handshake_reaches_ready() {
    let mut client = client(handshake_bytes());
    client.handshake().unwrap();
    assert_eq!(client.state(), &HandshakeState::Ready);

    let sent = sent_commands(&client);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "version");
    assert_eq!(sent[0].1.len(), 86);
    assert_eq!(sent[1], ("verack".to_string(), Vec::new()));
}

#[test]
fn test_handshake_fails_on_inv_before_version() {
    let mut client = client(frame("inv", &inv_payload(&[(2, [0xAA; 32])])));
    let err = client.handshake().unwrap_err();
    assert!(matches!(err, P2pError::UnexpectedMessage { .. }));
    assert_eq!(
        client.state(),
        &HandshakeState::Failed(FailureReason::UnexpectedMessage("inv".to_string()))
    );

    // Inventory is never dispatched from a failed connection.
    let mut on_block = |_: &BlockReport| panic!("dispatched from failed handshake");
    assert!(matches!(
        client.dispatch_inventory(&inv_payload(&[(2, [0xAA; 32])]), &mut on_block),
        Err(P2pError::NotReady(_))
    ));
}

#[test]
fn test_handshake_fails_on_inv_before_verack() {
    let mut bytes = handshake_bytes();
    bytes.truncate(bytes.len() - HEADER_SIZE);
    bytes.extend(frame("inv", &inv_payload(&[(2, [0xAA; 32])])));

    let mut client = client(bytes);
    assert!(client.handshake().is_err());
    assert!(matches!(client.state(), HandshakeState::Failed(FailureReason::UnexpectedMessage(_))));
}

#[test]
fn test_handshake_connection_closed() {
    let mut client = client(Vec::new());
    assert!(matches!(client.handshake(), Err(P2pError::ConnectionClosed)));
    assert_eq!(client.state(), &HandshakeState::Failed(FailureReason::ConnectionClosed));
}

#[test]
fn test_handshake_read_timeout() {
    let mut bytes = handshake_bytes();
    bytes.truncate(bytes.len() - HEADER_SIZE);

    let mut client = stalling_client(bytes);
    assert!(matches!(client.handshake(), Err(P2pError::Timeout)));
    assert_eq!(client.state(), &HandshakeState::Failed(FailureReason::Timeout));
}

#[test]
fn test_io_error_kinds() {
    let kind = |k| P2pError::from(io::Error::new(k, "x"));
    assert!(matches!(kind(io::ErrorKind::WouldBlock), P2pError::Timeout));
    assert!(matches!(kind(io::ErrorKind::TimedOut), P2pError::Timeout));
    assert!(matches!(kind(io::ErrorKind::ConnectionReset), P2pError::ConnectionClosed));
    assert!(matches!(kind(io::ErrorKind::PermissionDenied), P2pError::Io(_)));
}

#[test]
fn test_fetch_requires_ready() {
    let mut client = client(Vec::new());
    assert!(matches!(client.fetch_block([0u8; 32]), Err(P2pError::NotReady(_))));
}

#[test]
fn test_watch_fetches_announced_block() {
    let header = sample_header();
    let hash = header.hash();

    let mut bytes = handshake_bytes();
    bytes.extend(frame("inv", &inv_payload(&[(1, [0xBB; 32]), (2, hash)])));
    bytes.extend(frame("block", &block_payload(&header, &[&[625_000_000]])));

    let mut client = client(bytes);
    client.handshake().unwrap();

    let mut reports = Vec::new();
    let fetched = client.watch(1, |report| reports.push(report.clone())).unwrap();
    assert_eq!(fetched, 1);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].verified);
    assert_eq!(reports[0].block.transactions[0].outputs[0].value, 625_000_000);

    let sent = sent_commands(&client);
    assert_eq!(sent[2].0, "getdata");
    assert_eq!(sent[2].1, build_getdata_payload(&[InventoryItem::block(hash)]));
}

#[test]
fn test_watch_reports_unrelated_block_as_unverified() {
    let header = sample_header();
    let announced = [0x99; 32];

    let mut bytes = handshake_bytes();
    bytes.extend(frame("inv", &inv_payload(&[(2, announced)])));
    bytes.extend(frame("block", &block_payload(&header, &[])));

    let mut client = client(bytes);
    client.handshake().unwrap();

    let mut verdicts = Vec::new();
    client.watch(1, |report| verdicts.push(report.verified)).unwrap();
    assert_eq!(verdicts, vec![false]);
}

#[test]
fn test_fetch_answers_ping_and_defers_inventory() {
    let header = sample_header();
    let hash = header.hash();
    let later_inv = inv_payload(&[(1, [0xBB; 32])]);

    let mut bytes = handshake_bytes();
    bytes.extend(frame("ping", &99u64.to_le_bytes()));
    bytes.extend(frame("inv", &later_inv));
    bytes.extend(frame("block", &block_payload(&header, &[])));

    let mut client = client(bytes);
    client.handshake().unwrap();

    let report = client.fetch_block(hash).unwrap();
    assert!(report.verified);

    let sent = sent_commands(&client);
    assert!(sent.contains(&("pong".to_string(), 99u64.to_le_bytes().to_vec())));

    let deferred = client.next_message().unwrap();
    assert_eq!(deferred.command(), "inv");
    assert_eq!(deferred.payload, later_inv);
}

#[test]
fn test_fetch_not_found() {
    let hash = [0x42; 32];
    let mut bytes = handshake_bytes();
    bytes.extend(frame("notfound", &inv_payload(&[(2, hash)])));

    let mut client = client(bytes);
    client.handshake().unwrap();
    assert!(matches!(client.fetch_block(hash), Err(P2pError::NotFound(_))));
}

#[test]
fn test_watch_skips_already_fetched_block() {
    let header = sample_header();
    let hash = header.hash();
    let announcement = inv_payload(&[(2, hash)]);

    let mut bytes = handshake_bytes();
    bytes.extend(frame("inv", &announcement));
    bytes.extend(frame("block", &block_payload(&header, &[])));
    bytes.extend(frame("inv", &announcement));

    let mut client = client(bytes);
    client.handshake().unwrap();

    // Runs until the scripted peer hangs up.
    let fetched = client.watch(0, |_| {}).unwrap();
    assert_eq!(fetched, 1);
    let getdata_count = sent_commands(&client).iter().filter(|(cmd, _)| cmd == "getdata").count();
    assert_eq!(getdata_count, 1);
}

#[test]
fn test_unbounded_watch_ends_on_silence() {
    let mut bytes = handshake_bytes();
    bytes.extend(frame("ping", &5u64.to_le_bytes()));

    let mut client = stalling_client(bytes);
    client.handshake().unwrap();

    assert_eq!(client.watch(0, |_| {}).unwrap(), 0);
    let sent = sent_commands(&client);
    assert_eq!(sent.last(), Some(&("pong".to_string(), 5u64.to_le_bytes().to_vec())));
}

#[test]
fn test_bounded_watch_reports_timeout() {
    let mut client = stalling_client(handshake_bytes());
    client.handshake().unwrap();
    assert!(matches!(client.watch(1, |_| {}), Err(P2pError::Timeout)));
}

#[test]
fn test_connect_without_candidates() {
    let (tx, _rx) = mpsc::channel();
    let config = PeerConfig::default();
    match connect_any(&config, &tx, Vec::new()) {
        Err(P2pError::NoReachablePeers(seed)) => assert_eq!(seed, "seed.bitcoin.sipa.be:8333"),
        other => panic!("expected NoReachablePeers, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_default_read_timeout_outlasts_ping_interval() {
    assert!(PeerConfig::default().read_timeout_secs > 120);
}

#[test]
fn test_peer_config_partial_json() {
    let json = r#"{ "network": "testnet", "max_blocks": 3, "version": { "user_agent": "/watcher:0.1/" } }"#;
    let config: PeerConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.network, Network::Testnet);
    assert_eq!(config.port(), 18333);
    assert_eq!(config.max_blocks, 3);
    assert_eq!(config.version.user_agent, "/watcher:0.1/");
    assert_eq!(config.version.protocol_version, 70015);
    assert_eq!(config.socket_addr(), "testnet-seed.bitcoin.jonasschnelli.ch:18333");
}

#[test]
fn test_interactive_command_parsing() {
    assert_eq!(Command::from_str("start"), Command::Start);
    assert_eq!(Command::from_str("fetch abcd"), Command::Fetch("abcd".to_string()));
    assert_eq!(Command::from_str("fetch"), Command::Unknown);
    assert_eq!(Command::from_str("setport 18444"), Command::SetPort(18444));
    assert_eq!(Command::from_str("setport nope"), Command::Unknown);
    assert_eq!(Command::from_str("quit"), Command::Exit);
}

#[test]
fn test_format_timestamp() {
    assert_eq!(format_timestamp(1231006505), "03 January 2009 at 18:15");
}
