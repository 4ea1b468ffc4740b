//! Stop-and-wait message transfer: one value frame per chunk, each
//! acknowledged before the next is sent, then an end frame.

use crate::error::{RelayError, Result};
use crate::wire::{Frame, parse_number, read_frame, write_frame};
use num_bigint::BigUint;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;

pub async fn send_message<S>(stream: &mut S, chunks: &[BigUint], ack_timeout: Duration) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    for chunk in chunks {
        write_frame(stream, &Frame::value(chunk)).await?;
        let reply = timeout(ack_timeout, read_frame(stream))
            .await
            .map_err(|_| RelayError::Timeout("chunk acknowledgement"))??;
        match reply {
            Some(Frame::Ack) => {}
            Some(other) => {
                return Err(RelayError::UnexpectedFrame { expected: "ack", found: other.kind() });
            }
            None => return Err(RelayError::ConnectionClosed),
        }
    }
    write_frame(stream, &Frame::End).await
}

/// Receives one message. `Ok(None)` if the stream ended before a new
/// message started.
pub async fn receive_message<S>(stream: &mut S) -> Result<Option<Vec<BigUint>>>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let mut chunks = Vec::new();
    loop {
        match read_frame(stream).await? {
            Some(Frame::Value(digits)) => {
                chunks.push(parse_number(&digits)?);
                write_frame(stream, &Frame::Ack).await?;
            }
            Some(Frame::End) => return Ok(Some(chunks)),
            Some(Frame::Ack) => {
                return Err(RelayError::UnexpectedFrame { expected: "value or end", found: "ack" });
            }
            None if chunks.is_empty() => return Ok(None),
            None => return Err(RelayError::ConnectionClosed),
        }
    }
}
