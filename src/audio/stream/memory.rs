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
use super::AudioStream;
use crate::audio::format::{AudioFormat, FormatError};

/// How raw PCM bytes are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PcmFlags {
    /// 8-bit samples are unsigned (centered on 128).
    pub unsigned: bool,
    /// 16-bit samples are little endian.
    pub little_endian: bool,
}

/// A stream that produces samples from memory.
///
/// Samples are stored interleaved, exactly as they are handed to the mixer.
pub struct MemoryStream {
    samples: Vec<i16>,
    position: usize,
    stereo: bool,
    rate: u32,
}

impl MemoryStream {
    /// Creates a new memory stream from interleaved samples. A trailing
    /// half-frame in a stereo buffer is dropped.
    pub fn new(mut samples: Vec<i16>, stereo: bool, rate: u32) -> Self {
        if stereo && samples.len() % 2 != 0 {
            samples.pop();
        }

        Self {
            samples,
            position: 0,
            stereo,
            rate,
        }
    }

    /// Converts raw PCM bytes into a stream. Only mono and stereo 8-bit or
    /// 16-bit data is accepted; trailing bytes that don't form a whole frame
    /// are ignored.
    pub fn from_pcm(bytes: &[u8], format: &AudioFormat, flags: PcmFlags) -> Result<Self, FormatError> {
        let channels = format.channels();
        let bits_per_sample = format.bits_per_sample();
        if channels > 2 || (bits_per_sample != 8 && bits_per_sample != 16) {
            return Err(FormatError::UnsupportedLayout {
                channels,
                bits_per_sample,
            });
        }

        let block_align = format.block_align() as usize;
        let usable = bytes.len() - bytes.len() % block_align;
        let bytes = &bytes[..usable];

        let samples: Vec<i16> = match bits_per_sample {
            8 if flags.unsigned => bytes.iter().map(|&b| (b as i16 - 128) << 8).collect(),
            8 => bytes.iter().map(|&b| (b as i8 as i16) << 8).collect(),
            _ if flags.little_endian => bytes
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
            _ => bytes
                .chunks_exact(2)
                .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
                .collect(),
        };

        Ok(Self::new(samples, format.is_stereo(), format.sample_rate()))
    }

    /// Returns the total number of frames
    pub fn total_frames(&self) -> usize {
        if self.stereo {
            self.samples.len() / 2
        } else {
            self.samples.len()
        }
    }
}

impl AudioStream for MemoryStream {
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        let available = self.samples.len() - self.position;
        let to_copy = available.min(buffer.len());

        buffer[..to_copy].copy_from_slice(&self.samples[self.position..self.position + to_copy]);
        self.position += to_copy;

        to_copy
    }

    fn is_stereo(&self) -> bool {
        self.stereo
    }

    fn rate(&self) -> u32 {
        self.rate
    }

    fn end_of_data(&self) -> bool {
        self.position >= self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_buffer_partial() {
        let mut stream = MemoryStream::new(vec![1, 2, 3, 4, 5], false, 22050);
        let mut buffer = [0i16; 3];

        assert_eq!(stream.read_buffer(&mut buffer), 3);
        assert_eq!(buffer, [1, 2, 3]);
        assert!(!stream.end_of_data());

        assert_eq!(stream.read_buffer(&mut buffer), 2);
        assert_eq!(&buffer[..2], &[4, 5]);
        assert!(stream.end_of_data());

        assert_eq!(stream.read_buffer(&mut buffer), 0);
    }

    #[test]
    fn test_stereo_drops_half_frame() {
        let stream = MemoryStream::new(vec![1, 2, 3], true, 44100);
        assert_eq!(stream.total_frames(), 1);
        assert!(stream.is_stereo());
        assert_eq!(stream.rate(), 44100);
    }

    #[test]
    fn test_from_pcm_unsigned_8bit() {
        let format = AudioFormat::new(22050, 1, 8).unwrap();
        let flags = PcmFlags {
            unsigned: true,
            ..Default::default()
        };
        let mut stream = MemoryStream::from_pcm(&[0x80, 0xFF, 0x00], &format, flags).unwrap();

        let mut buffer = [0i16; 3];
        assert_eq!(stream.read_buffer(&mut buffer), 3);
        assert_eq!(buffer, [0, 127 << 8, -128 << 8]);
    }

    #[test]
    fn test_from_pcm_signed_8bit() {
        let format = AudioFormat::new(22050, 1, 8).unwrap();
        let mut stream = MemoryStream::from_pcm(&[0x7F, 0x80], &format, PcmFlags::default()).unwrap();

        let mut buffer = [0i16; 2];
        assert_eq!(stream.read_buffer(&mut buffer), 2);
        assert_eq!(buffer, [127 << 8, -128 << 8]);
    }

    #[test]
    fn test_from_pcm_16bit_endianness() {
        let format = AudioFormat::new(44100, 2, 16).unwrap();
        let bytes = [0x34, 0x12, 0xFF, 0xFF, 0x01];

        let little = PcmFlags {
            little_endian: true,
            ..Default::default()
        };
        let mut stream = MemoryStream::from_pcm(&bytes, &format, little).unwrap();
        let mut buffer = [0i16; 4];
        assert_eq!(stream.read_buffer(&mut buffer), 2);
        assert_eq!(&buffer[..2], &[0x1234, -1]);

        let mut stream = MemoryStream::from_pcm(&bytes, &format, PcmFlags::default()).unwrap();
        assert_eq!(stream.read_buffer(&mut buffer), 2);
        assert_eq!(&buffer[..2], &[0x3412, -1]);
    }

    #[test]
    fn test_from_pcm_rejects_unsupported_layouts() {
        let surround = AudioFormat::new(44100, 6, 16).unwrap();
        assert!(MemoryStream::from_pcm(&[], &surround, PcmFlags::default()).is_err());

        let float = AudioFormat::new(44100, 2, 32).unwrap();
        assert_eq!(
            MemoryStream::from_pcm(&[], &float, PcmFlags::default()).err(),
            Some(FormatError::UnsupportedLayout {
                channels: 2,
                bits_per_sample: 32
            })
        );
    }
}
