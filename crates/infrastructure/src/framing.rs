//! DNS-over-TCP framing: 2-byte big-endian length prefix per message.
//!
//! Used on both sides of the relay — the client-facing TCP listener and the
//! TLS stream to the upstream carry identically framed messages.

use dot_relay_domain::RelayError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Hard ceiling regardless of the configured buffer size; a length prefix is
/// 16 bits so nothing larger can be framed anyway.
pub const MAX_FRAME_LEN: usize = 65535;

pub async fn write_frame<S>(stream: &mut S, message_bytes: &[u8]) -> Result<(), RelayError>
where
    S: AsyncWriteExt + Unpin,
{
    if message_bytes.len() > MAX_FRAME_LEN {
        return Err(RelayError::Io(format!(
            "Message too large to frame: {} bytes",
            message_bytes.len()
        )));
    }
    let length = (message_bytes.len() as u16).to_be_bytes();

    stream
        .write_all(&length)
        .await
        .map_err(|e| RelayError::Io(format!("Failed to write length prefix: {e}")))?;
    stream
        .write_all(message_bytes)
        .await
        .map_err(|e| RelayError::Io(format!("Failed to write DNS message: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| RelayError::Io(format!("Failed to flush stream: {e}")))?;

    Ok(())
}

pub async fn read_frame<S>(stream: &mut S, max_len: usize) -> Result<Vec<u8>, RelayError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| RelayError::Io(format!("Failed to read length prefix: {e}")))?;

    let message_len = u16::from_be_bytes(len_buf) as usize;
    if message_len > max_len {
        return Err(RelayError::Io(format!(
            "Framed message too large: {message_len} bytes (max {max_len})"
        )));
    }

    let mut message = vec![0u8; message_len];
    stream
        .read_exact(&mut message)
        .await
        .map_err(|e| RelayError::Io(format!("Failed to read message body: {e}")))?;

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frame_roundtrip() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let payload = b"\x12\x34rest of a dns message".to_vec();

        write_frame(&mut client, &payload).await.unwrap();
        let read_back = read_frame(&mut server, MAX_FRAME_LEN).await.unwrap();
        assert_eq!(read_back, payload);
    }

    #[tokio::test]
    async fn prefix_is_big_endian_length() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let payload = vec![0u8; 300];

        write_frame(&mut client, &payload).await.unwrap();
        let mut prefix = [0u8; 2];
        server.read_exact(&mut prefix).await.unwrap();
        assert_eq!(u16::from_be_bytes(prefix), 300);
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected_on_read() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        let payload = vec![0u8; 600];

        write_frame(&mut client, &payload).await.unwrap();
        assert!(read_frame(&mut server, 512).await.is_err());
    }

    #[tokio::test]
    async fn truncated_body_is_an_error() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        // Prefix promises 100 bytes, only 3 arrive before EOF.
        client.write_all(&100u16.to_be_bytes()).await.unwrap();
        client.write_all(&[1, 2, 3]).await.unwrap();
        drop(client);

        assert!(read_frame(&mut server, MAX_FRAME_LEN).await.is_err());
    }
}
