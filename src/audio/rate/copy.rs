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
use super::{mix_frame, RateConverter};
use crate::audio::stream::AudioStream;

/// Mixes a stream that is already at the output rate.
///
/// The scratch buffer belongs to this converter alone and is only touched from
/// `flow`, so it needs no locking; whoever owns the converter (the mixer
/// channel) is the single writer.
pub struct CopyRateConverter {
    /// Grow-only scratch buffer for samples read from the input.
    buffer: Vec<i16>,
    stereo: bool,
    reverse_stereo: bool,
}

impl CopyRateConverter {
    pub fn new(stereo: bool, reverse_stereo: bool) -> Self {
        Self {
            buffer: Vec::new(),
            stereo,
            reverse_stereo,
        }
    }

    /// Current scratch capacity in samples.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.len()
    }
}

impl RateConverter for CopyRateConverter {
    fn flow(
        &mut self,
        input: &mut dyn AudioStream,
        output: &mut [i16],
        vol_left: u16,
        vol_right: u16,
    ) -> usize {
        assert_eq!(
            input.is_stereo(),
            self.stereo,
            "stream channel layout does not match the rate converter"
        );

        let frames = output.len() / 2;
        let samples_per_frame = if self.stereo { 2 } else { 1 };
        let wanted = frames * samples_per_frame;

        if wanted > self.buffer.len() {
            self.buffer.resize(wanted * 2, 0);
        }

        let read = input.read_buffer(&mut self.buffer[..wanted]);

        let mut produced = 0;
        for (frame, slot) in self.buffer[..read]
            .chunks_exact(samples_per_frame)
            .zip(output.chunks_exact_mut(2))
        {
            let left = frame[0] as i32;
            let right = if self.stereo { frame[1] as i32 } else { left };
            mix_frame(
                slot,
                left,
                right,
                vol_left,
                vol_right,
                self.reverse_stereo,
            );
            produced += 1;
        }

        produced
    }

    fn drain(&mut self, _output: &mut [i16], _vol: u16) -> usize {
        0
    }
}
