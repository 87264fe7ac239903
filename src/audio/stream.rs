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
pub mod memory;

pub use memory::{MemoryStream, PcmFlags};

/// A readable source of signed 16-bit PCM samples. Stereo streams produce
/// interleaved samples (`L,R,L,R,...`).
pub trait AudioStream: Send {
    /// Fills `buffer` with up to `buffer.len()` samples and returns how many
    /// samples were written. Fewer than requested signals that the stream is
    /// close to exhaustion; zero means nothing is left right now.
    ///
    /// Stereo streams are always asked for an even number of samples.
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize;

    /// Whether the stream produces two interleaved channels.
    fn is_stereo(&self) -> bool;

    /// The sample rate of this stream in Hz.
    fn rate(&self) -> u32;

    /// True once no further samples will be produced.
    fn end_of_data(&self) -> bool;
}

/// Blanket implementation for Box<dyn AudioStream>
/// This allows Box<dyn AudioStream> to be used directly with generic functions
/// that require S: AudioStream.
impl AudioStream for Box<dyn AudioStream> {
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        (**self).read_buffer(buffer)
    }

    fn is_stereo(&self) -> bool {
        (**self).is_stereo()
    }

    fn rate(&self) -> u32 {
        (**self).rate()
    }

    fn end_of_data(&self) -> bool {
        (**self).end_of_data()
    }
}
