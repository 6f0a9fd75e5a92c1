use crate::crc::{crc8_dvb_s2, crc8_dvb_s2_update, crc8_poly31};
use crate::error::{FrameError, Result};

/// Fixed header byte opening every request frame.
pub const PROTOCOL_HEADER: u8 = 0x00;

/// Maximum total frame size on the wire, in bytes.
pub const MAX_FRAME_LEN: usize = 64;

/// Maximum parameter payload: frame budget minus header, command, and
/// checksum bytes.
pub const MAX_PARAM_LEN: usize = MAX_FRAME_LEN - 3;

/// Fixed length of a first-generation reply record.
pub const LEGACY_RESPONSE_LEN: usize = 5;

/// Which framing/checksum rule a response follows.
///
/// First-generation devices answer with a fixed five-byte record checked
/// by [`ProtocolVersion::Legacy`]; everything current uses
/// [`ProtocolVersion::V1`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// Fixed five-byte replies, CRC-8 poly 0x31 with the tail-byte swap.
    Legacy,
    /// Variable-length frames whose CRC-8/DVB-S2 folds to zero.
    V1,
}

/// Encode a request frame into `dst`, returning the encoded length.
///
/// Layout:
/// ```text
/// ┌────────────┬────────────┬─────────────────┬──────────────┐
/// │ Header (1) │ Command(1) │ Params (0..=61) │ CRC8/DVB-S2  │
/// │ 0x00       │            │                 │ over 0..len-1│
/// └────────────┴────────────┴─────────────────┴──────────────┘
/// ```
pub fn encode_request(command: u8, params: &[u8], dst: &mut [u8]) -> Result<usize> {
    if params.len() > MAX_PARAM_LEN {
        return Err(FrameError::ParamsTooLong {
            len: params.len(),
            max: MAX_PARAM_LEN,
        });
    }

    let needed = params.len() + 3;
    if dst.len() < needed {
        return Err(FrameError::BufferTooSmall {
            needed,
            capacity: dst.len(),
        });
    }

    dst[0] = PROTOCOL_HEADER;
    dst[1] = command;
    dst[2..2 + params.len()].copy_from_slice(params);
    dst[needed - 1] = crc8_dvb_s2_update(0, &dst[..needed - 1]);
    Ok(needed)
}

/// Validate a complete response against its framing rule.
///
/// `Legacy` replies carry the checksum at index 3 and a tail byte at
/// index 4; on the wire the tail byte participates in the checksum *in
/// the checksum's position*. Validation therefore swaps the tail byte
/// into index 3 before recomputing, mutating `buf` in place — the swap is
/// part of the wire format and the post-swap bytes are what callers see.
///
/// `V1` replies are valid iff CRC-8/DVB-S2 folded over every byte,
/// trailing checksum included, is zero.
pub fn validate_response(buf: &mut [u8], version: ProtocolVersion) -> Result<()> {
    match version {
        ProtocolVersion::Legacy => {
            if buf.len() != LEGACY_RESPONSE_LEN {
                return Err(FrameError::ResponseLength {
                    len: buf.len(),
                    expected: LEGACY_RESPONSE_LEN,
                });
            }
            let expected = buf[3];
            buf[3] = buf[4];
            let actual = crc8_poly31(&buf[..4]);
            if actual != expected {
                return Err(FrameError::ChecksumMismatch { expected, actual });
            }
            Ok(())
        }
        ProtocolVersion::V1 => {
            if buf.len() < 2 {
                return Err(FrameError::ResponseLength {
                    len: buf.len(),
                    expected: 2,
                });
            }
            let folded = buf.iter().fold(0u8, |crc, &byte| crc8_dvb_s2(crc, byte));
            if folded != 0 {
                return Err(FrameError::ChecksumMismatch {
                    expected: 0,
                    actual: folded,
                });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::GET_DEVICE_INFO;
    use crate::crc::crc8_dvb_s2_update;

    /// Build a valid V1 frame with the given interior bytes.
    fn v1_frame(body: &[u8]) -> Vec<u8> {
        let mut frame = body.to_vec();
        frame.push(crc8_dvb_s2_update(0, body));
        frame
    }

    #[test]
    fn encode_layout_and_checksum() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_request(GET_DEVICE_INFO, &[], &mut buf).unwrap();

        assert_eq!(len, 3);
        assert_eq!(buf[0], PROTOCOL_HEADER);
        assert_eq!(buf[1], GET_DEVICE_INFO);
        assert_eq!(buf[2], crc8_dvb_s2_update(0, &buf[..2]));
    }

    #[test]
    fn encode_with_params() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_request(0x04, &[0x01], &mut buf).unwrap();

        assert_eq!(len, 4);
        assert_eq!(&buf[..3], &[PROTOCOL_HEADER, 0x04, 0x01]);
        assert_eq!(buf[3], crc8_dvb_s2_update(0, &buf[..3]));
    }

    #[test]
    fn encoded_frame_self_validates_as_v1() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_request(0x02, &[0x03], &mut buf).unwrap();
        assert!(validate_response(&mut buf[..len], ProtocolVersion::V1).is_ok());
    }

    #[test]
    fn encode_rejects_oversized_params() {
        let params = [0u8; MAX_PARAM_LEN + 1];
        let mut buf = [0u8; MAX_FRAME_LEN + 8];
        let err = encode_request(0x01, &params, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::ParamsTooLong { .. }));
    }

    #[test]
    fn encode_rejects_short_buffer() {
        let mut buf = [0u8; 3];
        let err = encode_request(0x01, &[0xAA], &mut buf).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferTooSmall {
                needed: 4,
                capacity: 3
            }
        );
    }

    #[test]
    fn max_params_exactly_fill_frame() {
        let params = [0x5A; MAX_PARAM_LEN];
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = encode_request(0x01, &params, &mut buf).unwrap();
        assert_eq!(len, MAX_FRAME_LEN);
    }

    #[test]
    fn v1_valid_frame_accepted() {
        let mut frame = v1_frame(&[PROTOCOL_HEADER, 0x00, 0x05, 0x03, 0x00]);
        assert!(validate_response(&mut frame, ProtocolVersion::V1).is_ok());
    }

    #[test]
    fn v1_any_corrupted_byte_rejected() {
        let frame = v1_frame(&[PROTOCOL_HEADER, 0x00, 0x05, 0x03, 0x00]);
        for i in 0..frame.len() {
            let mut corrupted = frame.clone();
            corrupted[i] ^= 0x01;
            assert!(
                matches!(
                    validate_response(&mut corrupted, ProtocolVersion::V1),
                    Err(FrameError::ChecksumMismatch { .. })
                ),
                "corruption at byte {i} went undetected"
            );
        }
    }

    #[test]
    fn v1_too_short_rejected() {
        let mut frame = [0x00u8];
        assert!(matches!(
            validate_response(&mut frame, ProtocolVersion::V1),
            Err(FrameError::ResponseLength { .. })
        ));
    }

    #[test]
    fn legacy_tail_swap_vector() {
        // Checksum covers bytes 0..3 with the tail byte standing in at
        // index 3.
        let crc = crc8_poly31(&[0x01, 0x02, 0x03, 0x99]);
        let mut frame = [0x01, 0x02, 0x03, crc, 0x99];
        assert!(validate_response(&mut frame, ProtocolVersion::Legacy).is_ok());
        // The swap is left in place.
        assert_eq!(frame[3], 0x99);
    }

    #[test]
    fn legacy_altered_tail_byte_rejected() {
        let crc = crc8_poly31(&[0x01, 0x02, 0x03, 0x99]);
        let mut frame = [0x01, 0x02, 0x03, crc, 0x98];
        assert!(matches!(
            validate_response(&mut frame, ProtocolVersion::Legacy),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn legacy_wrong_length_rejected() {
        let mut frame = [0x01, 0x02, 0x03, 0x04];
        assert!(matches!(
            validate_response(&mut frame, ProtocolVersion::Legacy),
            Err(FrameError::ResponseLength {
                len: 4,
                expected: LEGACY_RESPONSE_LEN
            })
        ));
    }
}
