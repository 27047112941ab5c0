//! Decoding of base64 PCM payloads.
//!
//! The speech backend sends raw signed 16-bit little-endian mono samples,
//! base64 encoded. Decoding is strict: malformed base64 or an odd number of
//! bytes is a `BackendError::Decode`, never a truncated clip.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use moonlit_core::BackendError;

/// Decode a base64 payload into i16 samples.
pub fn decode_base64(encoded: &str) -> Result<Vec<i16>, BackendError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| BackendError::Decode {
            what: "audio base64",
            reason: e.to_string(),
        })?;
    samples_from_le_bytes(&bytes)
}

/// Reinterpret little-endian bytes as i16 samples.
pub fn samples_from_le_bytes(bytes: &[u8]) -> Result<Vec<i16>, BackendError> {
    if bytes.len() % 2 != 0 {
        return Err(BackendError::Decode {
            what: "audio samples",
            reason: format!("odd byte length {}", bytes.len()),
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode samples as base64 little-endian PCM.
#[must_use]
pub fn encode_base64(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian_samples() {
        // 0x0001, 0xFFFF, 0x7FFF, 0x8000
        let encoded = STANDARD.encode([0x01, 0x00, 0xFF, 0xFF, 0xFF, 0x7F, 0x00, 0x80]);
        assert_eq!(decode_base64(&encoded).unwrap(), vec![1, -1, 32767, -32768]);
    }

    #[test]
    fn odd_length_is_a_decode_error() {
        let encoded = STANDARD.encode([0x01, 0x00, 0x02]);
        let err = decode_base64(&encoded).unwrap_err();
        assert!(matches!(
            err,
            BackendError::Decode {
                what: "audio samples",
                ..
            }
        ));
    }

    #[test]
    fn malformed_base64_is_a_decode_error() {
        let err = decode_base64("not base64!!").unwrap_err();
        assert!(matches!(
            err,
            BackendError::Decode {
                what: "audio base64",
                ..
            }
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn encode_matches_decode() {
        let samples = [0, 12, -12, i16::MAX, i16::MIN];
        assert_eq!(decode_base64(&encode_base64(&samples)).unwrap(), samples);
    }

    #[test]
    fn empty_payload_decodes_to_no_samples() {
        assert!(decode_base64("").unwrap().is_empty());
    }
}
