//! rps-protocol
//!
//! Wire-level encoding/decoding for the round server.
//!
//! Turns logical messages (`rps_core::ClientMessage` / `ServerMessage`)
//! into the `key:value; key:value` text protocol and back again.
//!
//! - [`text_codec`] : field parsing, client message decoding, server
//!   message formatting

pub mod text_codec;

pub use text_codec::{
    DecodeError,
    Fields,
    decode,
    encode_client_message,
    encode_fields,
    encode_server_message,
    parse_client_message,
};
