// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::{fmt, time::Duration};

/// Error types for PCM format descriptors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Channel count must be at least 1, got {0}")]
    InvalidChannels(u16),

    #[error("Sample rate must be greater than 0")]
    InvalidSampleRate,

    #[error("Unsupported PCM layout: {channels} channel(s) at {bits_per_sample} bits")]
    UnsupportedLayout { channels: u16, bits_per_sample: u16 },

    #[error("Frame size of {channels} channel(s) at {bits_per_sample} bits overflows")]
    BlockAlignOverflow { channels: u16, bits_per_sample: u16 },

    #[error("Byte rate of {block_align} byte frames at {sample_rate}Hz overflows")]
    ByteRateOverflow { sample_rate: u32, block_align: u16 },
}

/// Describes a PCM stream. The block alignment and byte rate are always derived
/// from the other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    block_align: u16,
    average_bytes_per_second: u32,
}

impl AudioFormat {
    /// Creates a new AudioFormat
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Result<Self, FormatError> {
        if channels < 1 {
            return Err(FormatError::InvalidChannels(channels));
        }
        if sample_rate == 0 {
            return Err(FormatError::InvalidSampleRate);
        }

        let block_align = channels.checked_mul(bits_per_sample / 8).ok_or(
            FormatError::BlockAlignOverflow {
                channels,
                bits_per_sample,
            },
        )?;
        let average_bytes_per_second = sample_rate.checked_mul(block_align as u32).ok_or(
            FormatError::ByteRateOverflow {
                sample_rate,
                block_align,
            },
        )?;

        Ok(AudioFormat {
            channels,
            sample_rate,
            bits_per_sample,
            block_align,
            average_bytes_per_second,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Bytes in one frame (one sample for every channel).
    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    pub fn average_bytes_per_second(&self) -> u32 {
        self.average_bytes_per_second
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }

    /// Returns how long `bytes` of this format take to play.
    pub fn duration_of(&self, bytes: usize) -> Duration {
        if self.average_bytes_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(bytes as f64 / self.average_bytes_per_second as f64)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = match self.channels {
            1 => "mono".to_string(),
            2 => "stereo".to_string(),
            n => format!("{} channels", n),
        };
        write!(
            f,
            "{}Hz {}-bit {}",
            self.sample_rate, self.bits_per_sample, layout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_format_derived_fields() {
        let format = AudioFormat::new(22050, 1, 8).unwrap();
        assert_eq!(format.channels(), 1);
        assert_eq!(format.sample_rate(), 22050);
        assert_eq!(format.bits_per_sample(), 8);
        assert_eq!(format.block_align(), 1);
        assert_eq!(format.average_bytes_per_second(), 22050);
        assert!(!format.is_stereo());

        let format = AudioFormat::new(44100, 2, 16).unwrap();
        assert_eq!(format.block_align(), 4);
        assert_eq!(format.average_bytes_per_second(), 176400);
        assert!(format.is_stereo());
    }

    #[test]
    fn test_audio_format_invalid() {
        assert_eq!(
            AudioFormat::new(22050, 0, 8),
            Err(FormatError::InvalidChannels(0))
        );
        assert_eq!(
            AudioFormat::new(0, 1, 8),
            Err(FormatError::InvalidSampleRate)
        );
    }

    #[test]
    fn test_audio_format_overflow() {
        assert_eq!(
            AudioFormat::new(22050, 4096, 256),
            Err(FormatError::BlockAlignOverflow {
                channels: 4096,
                bits_per_sample: 256
            })
        );
        assert_eq!(
            AudioFormat::new(u32::MAX, 2, 16),
            Err(FormatError::ByteRateOverflow {
                sample_rate: u32::MAX,
                block_align: 4
            })
        );

        let format = AudioFormat::new(u32::MAX, 1, 8).unwrap();
        assert_eq!(format.average_bytes_per_second(), u32::MAX);
    }

    #[test]
    fn test_audio_format_duration() {
        let format = AudioFormat::new(11025, 1, 16).unwrap();
        assert_eq!(format.duration_of(22050), Duration::from_secs(1));
        assert_eq!(format.duration_of(0), Duration::ZERO);
    }

    #[test]
    fn test_audio_format_display() {
        let format = AudioFormat::new(22050, 1, 8).unwrap();
        assert_eq!(format!("{}", format), "22050Hz 8-bit mono");

        let format = AudioFormat::new(48000, 6, 24).unwrap();
        assert_eq!(format!("{}", format), "48000Hz 24-bit 6 channels");
    }

    #[test]
    fn test_audio_format_equality() {
        let format1 = AudioFormat::new(44100, 2, 16).unwrap();
        let format2 = AudioFormat::new(44100, 2, 16).unwrap();
        let format3 = AudioFormat::new(48000, 2, 16).unwrap();

        assert_eq!(format1, format2);
        assert_ne!(format1, format3);
    }
}
