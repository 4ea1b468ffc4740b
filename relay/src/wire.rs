//! Frame codec for the control and relay sockets.
//!
//! Every unit on the wire is length-prefixed and typed:
//!
//! ```text
//! [u32 LE length] [u8 type] [payload: length-1 bytes]
//! ```
//!
//! Frame types:
//! - `0x01`: value, an ASCII decimal integer (key halves, identity, chunks)
//! - `0x02`: ack, payload `"1"`
//! - `0x03`: end of message, empty payload

use crate::error::{RelayError, Result};
use num_bigint::BigUint;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest accepted frame, type byte included.
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

pub const ACK_PAYLOAD: &[u8] = b"1";

pub mod frame_type {
    pub const VALUE: u8 = 0x01;
    pub const ACK: u8 = 0x02;
    pub const END: u8 = 0x03;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Decimal digits, validated on decode.
    Value(String),
    Ack,
    End,
}

impl Frame {
    pub fn value(n: &BigUint) -> Self {
        Frame::Value(n.to_str_radix(10))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Value(_) => "value",
            Frame::Ack => "ack",
            Frame::End => "end",
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Frame::Value(digits) => encode_raw(frame_type::VALUE, digits.as_bytes()),
            Frame::Ack => encode_raw(frame_type::ACK, ACK_PAYLOAD),
            Frame::End => encode_raw(frame_type::END, &[]),
        }
    }
}

fn encode_raw(frame_type: u8, payload: &[u8]) -> Vec<u8> {
    let length = (payload.len() + 1) as u32;
    let mut buf = Vec::with_capacity(5 + payload.len());
    buf.extend_from_slice(&length.to_le_bytes());
    buf.push(frame_type);
    buf.extend_from_slice(payload);
    buf
}

fn decode_frame(frame_type: u8, payload: &[u8]) -> Result<Frame> {
    match frame_type {
        frame_type::VALUE => {
            if payload.is_empty() || !payload.iter().all(u8::is_ascii_digit) {
                return Err(RelayError::MalformedNumber(String::from_utf8_lossy(payload).into_owned()));
            }
            // all ASCII digits, so valid UTF-8
            Ok(Frame::Value(payload.iter().map(|&b| b as char).collect()))
        }
        frame_type::ACK => {
            if payload != ACK_PAYLOAD {
                return Err(RelayError::InvalidFrame(format!("ack payload {:?}", payload)));
            }
            Ok(Frame::Ack)
        }
        frame_type::END => {
            if !payload.is_empty() {
                return Err(RelayError::InvalidFrame(format!("end frame carries {} bytes", payload.len())));
            }
            Ok(Frame::End)
        }
        other => Err(RelayError::InvalidFrame(format!("unknown frame type 0x{other:02x}"))),
    }
}

/// Parses the digits of a value frame.
pub fn parse_number(digits: &str) -> Result<BigUint> {
    BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| RelayError::MalformedNumber(digits.to_string()))
}

pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(&frame.encode()).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one frame. `Ok(None)` means the stream ended cleanly on a frame
/// boundary; ending anywhere else is [`RelayError::ConnectionClosed`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Frame>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(RelayError::ConnectionClosed);
        }
        filled += n;
    }

    let length = u32::from_le_bytes(header);
    if length == 0 {
        return Err(RelayError::InvalidFrame("zero length".into()));
    }
    if length > MAX_FRAME_SIZE {
        return Err(RelayError::InvalidFrame(format!("{length} bytes exceeds {MAX_FRAME_SIZE}")));
    }

    let mut body = vec![0u8; length as usize];
    reader.read_exact(&mut body).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => RelayError::ConnectionClosed,
        _ => RelayError::Io(e),
    })?;

    decode_frame(body[0], &body[1..]).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_survive_a_byte_stream() {
        let frames = vec![
            Frame::Value("65537".into()),
            Frame::Ack,
            Frame::Value("0".into()),
            Frame::End,
        ];
        let mut wire = Vec::new();
        for frame in &frames {
            wire.extend_from_slice(&frame.encode());
        }

        let mut reader = wire.as_slice();
        for expected in &frames {
            assert_eq!(read_frame(&mut reader).await.unwrap().as_ref(), Some(expected));
        }
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[test]
    fn test_ack_layout() {
        assert_eq!(Frame::Ack.encode(), vec![2, 0, 0, 0, frame_type::ACK, b'1']);
        assert_eq!(Frame::End.encode(), vec![1, 0, 0, 0, frame_type::END]);
    }

    #[tokio::test]
    async fn test_minus_one_is_not_a_terminator() {
        // a value frame cannot carry "-1", and an end frame is unambiguous
        let wire = encode_raw(frame_type::VALUE, b"-1");
        let mut reader = wire.as_slice();
        assert!(matches!(read_frame(&mut reader).await, Err(RelayError::MalformedNumber(_))));
    }

    #[tokio::test]
    async fn test_truncated_frame_is_connection_closed() {
        let wire = Frame::value(&BigUint::from(123_456u32)).encode();
        let mut reader = &wire[..wire.len() - 2];
        assert!(matches!(read_frame(&mut reader).await, Err(RelayError::ConnectionClosed)));

        let mut header_only = &wire[..2];
        assert!(matches!(read_frame(&mut header_only).await, Err(RelayError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_zero_length_rejected() {
        let wire = [0u8; 4];
        let mut reader = &wire[..];
        assert!(matches!(read_frame(&mut reader).await, Err(RelayError::InvalidFrame(_))));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let wire = (MAX_FRAME_SIZE + 1).to_le_bytes();
        let mut reader = &wire[..];
        assert!(matches!(read_frame(&mut reader).await, Err(RelayError::InvalidFrame(_))));
    }

    #[tokio::test]
    async fn test_unknown_type_and_bad_ack_rejected() {
        let unknown = encode_raw(0x7f, b"");
        assert!(matches!(read_frame(&mut unknown.as_slice()).await, Err(RelayError::InvalidFrame(_))));

        let bad_ack = encode_raw(frame_type::ACK, b"0");
        assert!(matches!(read_frame(&mut bad_ack.as_slice()).await, Err(RelayError::InvalidFrame(_))));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("55687").unwrap(), BigUint::from(55_687u32));
        assert!(parse_number("").is_err());
    }
}
