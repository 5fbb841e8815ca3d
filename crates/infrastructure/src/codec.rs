//! Wire codec adapter over `hickory-proto`.
//!
//! The relay never interprets full DNS messages. Decoding extracts the
//! transaction ID and the first question; encoding builds a fresh upstream
//! query for that question. Everything else in the message stays opaque.

use dot_relay_domain::{QueryDescriptor, RelayError};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// DNS header size; also the minimum length of anything we will re-tag.
const HEADER_LEN: usize = 12;

/// Decode an inbound message into the minimal descriptor the relay needs.
///
/// A message carrying more than one question is truncated to its first;
/// a message carrying none is malformed for our purposes.
pub fn decode(raw: &[u8]) -> Result<QueryDescriptor, RelayError> {
    let message =
        Message::from_vec(raw).map_err(|e| RelayError::Decode(format!("Malformed query: {e}")))?;

    let question = message
        .queries()
        .first()
        .ok_or_else(|| RelayError::Decode("Query carries no question".to_string()))?;

    Ok(QueryDescriptor::new(
        message.id(),
        question.name().to_string(),
        u16::from(question.query_type()),
        u16::from(question.query_class()),
    ))
}

/// Build a fresh upstream query for the descriptor's question.
///
/// The wire ID is freshly generated; correlation back to the client happens
/// by overwriting the response ID, not by reusing the inbound one.
pub fn encode_upstream_query(descriptor: &QueryDescriptor) -> Result<Vec<u8>, RelayError> {
    let name = Name::from_str(&descriptor.name)
        .map_err(|e| RelayError::Encode(format!("Invalid name '{}': {e}", descriptor.name)))?;

    let mut question = Query::new();
    question.set_name(name);
    question.set_query_type(RecordType::from(descriptor.record_type));
    question.set_query_class(DNSClass::from(descriptor.record_class));

    let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(question);

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| RelayError::Encode(format!("Failed to serialize query: {e}")))?;

    Ok(buf)
}

/// Stamp `id` into the transaction-ID field (bytes 0..2, big-endian) of a
/// wire message. This is the client-correlation step: whatever ID was used
/// upstream, the client must see the ID it sent.
pub fn overwrite_transaction_id(raw: &mut [u8], id: u16) -> Result<(), RelayError> {
    if raw.len() < HEADER_LEN {
        return Err(RelayError::InvalidUpstreamResponse(format!(
            "Response shorter than a DNS header: {} bytes",
            raw.len()
        )));
    }
    raw[0..2].copy_from_slice(&id.to_be_bytes());
    Ok(())
}
