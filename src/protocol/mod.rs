//! Protocol Module
//!
//! Defines the fixed-layout binary protocol shared by client and server.
//!
//! ## Request Format
//! ```text
//! ┌────────────────┬──────────────┬──────────────┬──────────────────────┐
//! │ Secret key (4) │ Msg type (2) │ Reserved (2) │ Type-specific body   │
//! └────────────────┴──────────────┴──────────────┴──────────────────────┘
//! ```
//!
//! ### Message Types
//! - 0: SET    - Body: name (16) + len (2) + value (≤ 100)
//! - 1: GET    - Body: name (16)
//! - 2: DIGEST - Body: len (2) + data (≤ 100)
//! - 3: RUN    - Body: selector (8), one of `inet`, `hosts`, `services`
//!
//! ## Response Format
//! ```text
//! ┌───────────┬──────────────┬─────────┬──────────────┐
//! │ Status(1) │ Reserved (3) │ Len (2) │ Data (≤ 100) │
//! └───────────┴──────────────┴─────────┴──────────────┘
//! ```
//!
//! ### Status Codes
//! - 0: success
//! - negative (-1): failure of any kind

mod codec;
mod message;
mod response;

pub use codec::{
    decode_digest_body, decode_get_body, decode_preamble, decode_request, decode_response,
    decode_run_body, decode_set_body, encode_body, encode_digest_body, encode_get_body,
    encode_preamble, encode_request, encode_response, encode_run_body, encode_set_body,
    read_body, read_preamble, read_request, read_response, write_request, write_response,
    RESPONSE_HEADER_SIZE,
};
pub use message::{
    validate_name, MessageType, Preamble, Request, Selector, MAX_DIGEST_LEN, MAX_NAME_LEN,
    MAX_VALUE_LEN, NAME_FIELD_SIZE, PREAMBLE_SIZE, SELECTOR_FIELD_SIZE,
};
pub use response::{Response, Status, MAX_DATA_LEN};
