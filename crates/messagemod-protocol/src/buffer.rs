//! Submission buffer framing.
//!
//! A submission travels as a self-delimiting binary buffer:
//!
//! ```text
//! [varint length][length bytes of encoded MessageBody]
//! ```
//!
//! The length prefix is an explicit byte count, not a sentinel, so the
//! receiver never guesses boundaries. The varint is the LEB128-style
//! 7-bits-per-byte encoding (at most 5 bytes for a `u32`). There is no
//! compression and no version field, just a single fixed schema.

use crate::{Codec, MessageBody, ProtocolError};

/// Upper bound on the varint length prefix (5 × 7 bits covers a `u32`).
const VARINT_MAX_BYTES: usize = 5;

/// Encodes `text` into a submission buffer.
///
/// The body is serialized by `codec` and prefixed with its byte length.
///
/// # Errors
/// Returns an encode error from the codec; the framing itself cannot fail.
pub fn encode_submission<C: Codec>(
    codec: &C,
    text: &str,
) -> Result<Vec<u8>, ProtocolError> {
    let body = codec.encode(&MessageBody {
        text: text.to_owned(),
    })?;
    let mut buf = Vec::with_capacity(VARINT_MAX_BYTES + body.len());
    write_varint(&mut buf, body.len() as u32);
    buf.extend_from_slice(&body);
    Ok(buf)
}

/// Decodes a submission buffer back into its text.
///
/// Exact inverse of [`encode_submission`] for any buffer it produced.
///
/// # Errors
/// Returns [`ProtocolError::MalformedPayload`] when the length prefix is
/// unreadable, when the declared length does not match the available
/// bytes (short or trailing), or when the body does not parse. No partial
/// string is ever constructed from a bad buffer.
pub fn decode_submission<C: Codec>(
    codec: &C,
    buf: &[u8],
) -> Result<String, ProtocolError> {
    let (declared, prefix_len) = read_varint(buf)?;
    let body = &buf[prefix_len..];
    if body.len() != declared as usize {
        return Err(ProtocolError::MalformedPayload(format!(
            "declared {} bytes, found {}",
            declared,
            body.len()
        )));
    }
    let body: MessageBody = codec
        .decode(body)
        .map_err(|e| ProtocolError::MalformedPayload(e.to_string()))?;
    Ok(body.text)
}

fn write_varint(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Reads a varint from the front of `buf`, returning the value and the
/// number of prefix bytes consumed.
fn read_varint(buf: &[u8]) -> Result<(u32, usize), ProtocolError> {
    let mut value: u32 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= VARINT_MAX_BYTES {
            return Err(ProtocolError::MalformedPayload(
                "length prefix too long".into(),
            ));
        }
        value |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(ProtocolError::MalformedPayload(
        "unterminated length prefix".into(),
    ))
}

// =========================================================================
// Tests
// =========================================================================
