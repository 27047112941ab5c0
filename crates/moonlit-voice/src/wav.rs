//! PCM to WAV transcoding.
//!
//! Produces a canonical 44-byte RIFF header followed by the samples:
//!
//! | Offset | Field            | Value                      |
//! |--------|------------------|----------------------------|
//! | 0      | chunk id         | `RIFF`                     |
//! | 4      | chunk size       | 36 + data size             |
//! | 8      | format           | `WAVE`                     |
//! | 12     | subchunk 1 id    | `fmt `                     |
//! | 16     | subchunk 1 size  | 16                         |
//! | 20     | audio format     | 1 (PCM)                    |
//! | 22     | channels         | caller supplied            |
//! | 24     | sample rate      | caller supplied            |
//! | 28     | byte rate        | rate * block align         |
//! | 32     | block align      | channels * 2               |
//! | 34     | bits per sample  | 16                         |
//! | 36     | subchunk 2 id    | `data`                     |
//! | 40     | data size        | samples * 2                |
//!
//! All integers are little-endian.

use std::time::Duration;

use moonlit_core::BackendError;

/// Size of the header written by [`to_container`].
pub const HEADER_LEN: usize = 44;

/// Largest data section the 32-bit RIFF size field can describe.
pub const MAX_DATA_LEN: u32 = u32::MAX - 36;

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u16 = BITS_PER_SAMPLE / 8;

/// Byte length of the data section for `sample_count` samples, if it fits.
fn data_len(sample_count: usize) -> Option<u32> {
    sample_count
        .checked_mul(usize::from(BYTES_PER_SAMPLE))
        .and_then(|bytes| u32::try_from(bytes).ok())
        .filter(|bytes| *bytes <= MAX_DATA_LEN)
}

/// Wrap 16-bit samples in a WAV container.
///
/// Pure and deterministic. `sample_rate` and `channels` are written verbatim.
/// A clip whose data section exceeds [`MAX_DATA_LEN`] is a
/// `BackendError::Decode` rather than a header with wrapped sizes.
pub fn to_container(
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<Vec<u8>, BackendError> {
    let data_len = data_len(samples.len()).ok_or_else(|| BackendError::Decode {
        what: "audio samples",
        reason: format!(
            "{} samples exceed the {MAX_DATA_LEN} byte WAV data limit",
            samples.len()
        ),
    })?;
    let block_align = channels.saturating_mul(BYTES_PER_SAMPLE);
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));

    let mut out = Vec::with_capacity(HEADER_LEN + samples.len() * 2);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(data_len + 36).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    Ok(out)
}

/// Fields of a canonical header, as read back by [`WavHeader::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavHeader {
    /// Read the header of a container produced by [`to_container`].
    ///
    /// Returns `None` for anything that is not a 16-bit PCM canonical header.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN
            || &bytes[0..4] != b"RIFF"
            || &bytes[8..12] != b"WAVE"
            || &bytes[12..16] != b"fmt "
            || &bytes[36..40] != b"data"
        {
            return None;
        }
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        if u16_at(20) != 1 || u16_at(34) != BITS_PER_SAMPLE {
            return None;
        }
        Some(Self {
            channels: u16_at(22),
            sample_rate: u32_at(24),
            bits_per_sample: u16_at(34),
            data_len: u32_at(40),
        })
    }

    /// Number of sample frames in the data section.
    #[must_use]
    pub fn frames(&self) -> u64 {
        let frame_bytes = u64::from(self.channels) * u64::from(self.bits_per_sample / 8);
        if frame_bytes == 0 {
            return 0;
        }
        u64::from(self.data_len) / frame_bytes
    }

    /// Playback length of the data section.
    #[must_use]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let micros = self.frames().saturating_mul(1_000_000) / u64::from(self.sample_rate);
        Duration::from_micros(micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::samples_from_le_bytes;

    #[test]
    fn empty_input_is_header_only() {
        let wav = to_container(&[], 44_100, 1).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36);
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 0);
    }

    #[test]
    fn four_samples_at_16k_are_laid_out_exactly() {
        let wav = to_container(&[1, -1, 32767, -32768], 16_000, 1).unwrap();
        assert_eq!(wav.len(), 52);
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 44);
        assert_eq!(&wav[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes(wav[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes([wav[20], wav[21]]), 1);
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(u32::from_le_bytes(wav[24..28].try_into().unwrap()), 16_000);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 32_000);
        assert_eq!(u16::from_le_bytes([wav[32], wav[33]]), 2);
        assert_eq!(wav[34], 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 8);
        assert_eq!(
            &wav[44..],
            &[0x01, 0x00, 0xFF, 0xFF, 0xFF, 0x7F, 0x00, 0x80]
        );
    }

    #[test]
    fn data_section_reads_back_as_the_input() {
        let samples: Vec<i16> = (-500..500).map(|s| s * 37).collect();
        let wav = to_container(&samples, 22_050, 1).unwrap();
        assert_eq!(samples_from_le_bytes(&wav[HEADER_LEN..]).unwrap(), samples);
    }

    #[test]
    fn stereo_header_uses_channel_count() {
        let wav = to_container(&[0; 4], 48_000, 2).unwrap();
        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.channels, 2);
        assert_eq!(header.frames(), 2);
        assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 192_000);
    }

    #[test]
    fn header_parse_recovers_duration() {
        let wav = to_container(&[0; 24_000], 24_000, 1).unwrap();
        let header = WavHeader::parse(&wav).unwrap();
        assert_eq!(header.sample_rate, 24_000);
        assert_eq!(header.duration(), Duration::from_secs(1));
    }

    #[test]
    fn data_section_size_is_bounded_by_the_riff_field() {
        assert_eq!(data_len(0), Some(0));
        assert_eq!(data_len(4), Some(8));
        let largest = (MAX_DATA_LEN / 2) as usize;
        assert_eq!(data_len(largest), Some(MAX_DATA_LEN - 1));
        assert_eq!(data_len(largest + 1), None);
        assert_eq!(data_len(usize::MAX), None);
    }

    #[test]
    fn header_parse_rejects_foreign_bytes() {
        assert!(WavHeader::parse(b"not a wav").is_none());
        let mut wav = to_container(&[], 8_000, 1).unwrap();
        wav[0] = b'X';
        assert!(WavHeader::parse(&wav).is_none());
    }
}
