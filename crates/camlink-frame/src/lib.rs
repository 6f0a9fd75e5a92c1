//! Wire framing and checksum validation for the camlink device protocol.
//!
//! Requests are framed as:
//! - A fixed header byte
//! - The command opcode
//! - Zero or more parameter bytes
//! - A CRC-8/DVB-S2 checksum over everything preceding it
//!
//! Two response formats exist on the wire. Current-protocol devices reply
//! with frames whose CRC-8/DVB-S2 folds to zero when run over the whole
//! frame; first-generation devices reply with a fixed five-byte record
//! using a different polynomial and a tail-byte quirk. Both are handled by
//! [`validate_response`].

pub mod codec;
pub mod command;
pub mod crc;
pub mod error;

pub use codec::{
    encode_request, validate_response, ProtocolVersion, LEGACY_RESPONSE_LEN, MAX_FRAME_LEN,
    MAX_PARAM_LEN, PROTOCOL_HEADER,
};
pub use command::{command_name, expected_response_len, parse_command};
pub use error::{FrameError, Result};
