//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//! All multi-byte integers are big-endian.
//!
//! ## Wire Format
//!
//! ### Request Preamble
//! ```text
//! ┌────────────────┬──────────────┬──────────────┐
//! │ Secret key (4) │ Msg type (2) │ Reserved (2) │
//! └────────────────┴──────────────┴──────────────┘
//! ```
//!
//! ### Body by Message Type
//! - SET:    name (16, NUL padded) + len (2) + value
//! - GET:    name (16, NUL padded)
//! - DIGEST: len (2) + data
//! - RUN:    selector (8, NUL padded; `services` fills it exactly)
//!
//! ### Response Format
//! ```text
//! ┌───────────┬──────────────┬─────────┬──────────────┐
//! │ Status(1) │ Reserved (3) │ Len (2) │ Data (≤ 100) │
//! └───────────┴──────────────┴─────────┴──────────────┘
//! ```
//!
//! Decoders read exactly the number of bytes the fixed fields and declared
//! lengths call for. A declared length above its bound fails before the
//! payload is read.

use std::io::{self, Read, Write};

use bytes::{Buf, BufMut};

use super::message::{
    check_len, validate_name, MessageType, Preamble, Request, Selector, MAX_DIGEST_LEN,
    MAX_NAME_LEN, MAX_VALUE_LEN, NAME_FIELD_SIZE, PREAMBLE_SIZE, SELECTOR_FIELD_SIZE,
};
use super::response::{Response, Status, MAX_DATA_LEN};
use crate::error::{Result, SmallError};

/// Response header size: status (1) + reserved (3) + length (2)
pub const RESPONSE_HEADER_SIZE: usize = 6;

/// Size of every length specifier in the protocol
const LENGTH_FIELD_SIZE: usize = 2;

// =============================================================================
// Preamble Encoding/Decoding
// =============================================================================

/// Encode a request preamble
pub fn encode_preamble(secret_key: u32, msg_type: MessageType) -> [u8; PREAMBLE_SIZE] {
    let mut out = [0u8; PREAMBLE_SIZE];
    let mut buf = &mut out[..];
    buf.put_u32(secret_key);
    buf.put_u16(msg_type as u16);
    buf.put_u16(0);
    out
}

/// Decode a request preamble
///
/// Fails if the type code is not one of the four known message types.
pub fn decode_preamble(bytes: &[u8; PREAMBLE_SIZE]) -> Result<Preamble> {
    let mut buf = &bytes[..];
    let secret_key = buf.get_u32();
    let msg_type = MessageType::try_from(buf.get_u16())?;
    Ok(Preamble {
        secret_key,
        msg_type,
    })
}

/// Read exactly one preamble from a stream
pub fn read_preamble<R: Read>(reader: &mut R) -> Result<Preamble> {
    let bytes = read_array::<PREAMBLE_SIZE, _>(reader)?;
    decode_preamble(&bytes)
}

// =============================================================================
// Body Encoding
// =============================================================================

/// Encode a SET body
pub fn encode_set_body(name: &str, value: &[u8]) -> Result<Vec<u8>> {
    check_len("value", value.len(), MAX_VALUE_LEN)?;
    let mut buf = Vec::with_capacity(NAME_FIELD_SIZE + LENGTH_FIELD_SIZE + value.len());
    put_name(&mut buf, name)?;
    buf.put_u16(value.len() as u16);
    buf.put_slice(value);
    Ok(buf)
}

/// Encode a GET body
pub fn encode_get_body(name: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(NAME_FIELD_SIZE);
    put_name(&mut buf, name)?;
    Ok(buf)
}

/// Encode a DIGEST body
pub fn encode_digest_body(data: &[u8]) -> Result<Vec<u8>> {
    check_len("digest data", data.len(), MAX_DIGEST_LEN)?;
    let mut buf = Vec::with_capacity(LENGTH_FIELD_SIZE + data.len());
    buf.put_u16(data.len() as u16);
    buf.put_slice(data);
    Ok(buf)
}

/// Encode a RUN body
pub fn encode_run_body(selector: Selector) -> Vec<u8> {
    let mut field = [0u8; SELECTOR_FIELD_SIZE];
    let token = selector.as_str().as_bytes();
    field[..token.len()].copy_from_slice(token);
    field.to_vec()
}

/// Encode the body of any request
pub fn encode_body(request: &Request) -> Result<Vec<u8>> {
    match request {
        Request::Set { name, value } => encode_set_body(name, value),
        Request::Get { name } => encode_get_body(name),
        Request::Digest { data } => encode_digest_body(data),
        Request::Run { selector } => Ok(encode_run_body(*selector)),
    }
}

/// Encode a complete request: preamble + body
pub fn encode_request(secret_key: u32, request: &Request) -> Result<Vec<u8>> {
    let body = encode_body(request)?;
    let mut message = Vec::with_capacity(PREAMBLE_SIZE + body.len());
    message.put_slice(&encode_preamble(secret_key, request.message_type()));
    message.put_slice(&body);
    Ok(message)
}

fn put_name(buf: &mut Vec<u8>, name: &str) -> Result<()> {
    validate_name(name)?;
    let mut field = [0u8; NAME_FIELD_SIZE];
    field[..name.len()].copy_from_slice(name.as_bytes());
    buf.put_slice(&field);
    Ok(())
}

// =============================================================================
// Body Decoding
// =============================================================================

/// Decode a SET body from a stream
pub fn decode_set_body<R: Read>(reader: &mut R) -> Result<(String, Vec<u8>)> {
    let name_field = read_array::<NAME_FIELD_SIZE, _>(reader)?;
    let value = read_length_prefixed(reader, "value", MAX_VALUE_LEN)?;
    let name = parse_name(&name_field)?;
    Ok((name, value))
}

/// Decode a GET body from a stream
pub fn decode_get_body<R: Read>(reader: &mut R) -> Result<String> {
    let name_field = read_array::<NAME_FIELD_SIZE, _>(reader)?;
    parse_name(&name_field)
}

/// Decode a DIGEST body from a stream
pub fn decode_digest_body<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    read_length_prefixed(reader, "digest data", MAX_DIGEST_LEN)
}

/// Decode a RUN body from a stream
pub fn decode_run_body<R: Read>(reader: &mut R) -> Result<Selector> {
    let field = read_array::<SELECTOR_FIELD_SIZE, _>(reader)?;
    // `services` fills the whole field, so the terminator is optional here.
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let token = &field[..end];
    let token = std::str::from_utf8(token)
        .map_err(|_| SmallError::InvalidSelector(String::from_utf8_lossy(token).into_owned()))?;
    token.parse()
}

/// Decode the body that follows a preamble of type `msg_type`
pub fn read_body<R: Read>(reader: &mut R, msg_type: MessageType) -> Result<Request> {
    match msg_type {
        MessageType::Set => {
            let (name, value) = decode_set_body(reader)?;
            Ok(Request::Set { name, value })
        }
        MessageType::Get => Ok(Request::Get {
            name: decode_get_body(reader)?,
        }),
        MessageType::Digest => Ok(Request::Digest {
            data: decode_digest_body(reader)?,
        }),
        MessageType::Run => Ok(Request::Run {
            selector: decode_run_body(reader)?,
        }),
    }
}

/// Read a complete request (preamble + body) from a stream
pub fn read_request<R: Read>(reader: &mut R) -> Result<(Preamble, Request)> {
    let preamble = read_preamble(reader)?;
    let request = read_body(reader, preamble.msg_type)?;
    Ok((preamble, request))
}

/// Decode a complete request from bytes
pub fn decode_request(bytes: &[u8]) -> Result<(Preamble, Request)> {
    let mut cursor = bytes;
    read_request(&mut cursor).map_err(|e| match e {
        SmallError::Io(ref io) if io.kind() == io::ErrorKind::UnexpectedEof => {
            SmallError::Protocol(format!("Incomplete request: only {} bytes", bytes.len()))
        }
        other => other,
    })
}

/// Write a complete request to a stream
pub fn write_request<W: Write>(writer: &mut W, secret_key: u32, request: &Request) -> Result<()> {
    let bytes = encode_request(secret_key, request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn parse_name(field: &[u8; NAME_FIELD_SIZE]) -> Result<String> {
    let raw = terminated(field, "name", MAX_NAME_LEN)?;
    let name = std::str::from_utf8(raw)
        .map_err(|_| SmallError::InvalidName(String::from_utf8_lossy(raw).into_owned()))?;
    validate_name(name)?;
    Ok(name.to_string())
}

/// The bytes before the first NUL; a field with no NUL holds an oversize token
fn terminated<'a>(field: &'a [u8], what: &'static str, max: usize) -> Result<&'a [u8]> {
    let end = field
        .iter()
        .position(|&b| b == 0)
        .ok_or(SmallError::FieldTooLong {
            field: what,
            len: field.len(),
            max,
        })?;
    Ok(&field[..end])
}

fn read_length_prefixed<R: Read>(reader: &mut R, what: &'static str, max: usize) -> Result<Vec<u8>> {
    let len = u16::from_be_bytes(read_array::<LENGTH_FIELD_SIZE, _>(reader)?) as usize;
    check_len(what, len, max)?;

    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;
    Ok(data)
}

fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + reserved (3) + data_len (2) + data
pub fn encode_response(response: &Response) -> Vec<u8> {
    let data = response.data();
    let mut message = Vec::with_capacity(RESPONSE_HEADER_SIZE + data.len());
    message.put_i8(response.status().code());
    message.put_bytes(0, 3);
    message.put_u16(data.len() as u16);
    message.put_slice(data);
    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < RESPONSE_HEADER_SIZE {
        return Err(SmallError::Protocol(format!(
            "Incomplete response header: expected {} bytes, got {}",
            RESPONSE_HEADER_SIZE,
            bytes.len()
        )));
    }

    let (status, data_len) = parse_response_header(&bytes[..RESPONSE_HEADER_SIZE])?;

    let total_len = RESPONSE_HEADER_SIZE + data_len;
    if bytes.len() < total_len {
        return Err(SmallError::Protocol(format!(
            "Incomplete response payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok(Response::new(status, &bytes[RESPONSE_HEADER_SIZE..total_len]))
}

/// Read a complete response from a stream
///
/// A stream that ends before the first byte means the server dropped the
/// request without answering.
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let mut header = [0u8; RESPONSE_HEADER_SIZE];
    let got = read_until_full(reader, &mut header)?;
    if got == 0 {
        return Err(SmallError::ConnectionClosed);
    }
    if got < RESPONSE_HEADER_SIZE {
        return Err(SmallError::Protocol(format!(
            "Incomplete response header: expected {} bytes, got {}",
            RESPONSE_HEADER_SIZE, got
        )));
    }

    let (status, data_len) = parse_response_header(&header)?;

    let mut data = vec![0u8; data_len];
    let got = read_until_full(reader, &mut data)?;
    if got < data_len {
        return Err(SmallError::Protocol(format!(
            "Incomplete response payload: expected {} bytes, got {}",
            data_len, got
        )));
    }

    Ok(Response::new(status, data))
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn parse_response_header(header: &[u8]) -> Result<(Status, usize)> {
    let mut buf = header;
    let status = Status::from_code(buf.get_i8());
    buf.advance(3);
    let data_len = buf.get_u16() as usize;

    if data_len > MAX_DATA_LEN {
        return Err(SmallError::Protocol(format!(
            "Response payload too large: {} bytes (max {})",
            data_len, MAX_DATA_LEN
        )));
    }
    Ok((status, data_len))
}

/// Like `read_exact`, but reports how much was read before EOF
fn read_until_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
