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
use crate::audio::fixed::Frac;
use crate::audio::stream::AudioStream;

/// Samples read from the input per refill. Even, so stereo frames never split.
const INTERMEDIATE_BUFFER_SIZE: usize = 512;

/// Resamples by linear interpolation between the previous and the current
/// input frame. The output position is a 16.16 value in input frames that
/// advances by `in_rate / out_rate` for every output frame.
pub struct LinearRateConverter {
    stereo: bool,
    reverse_stereo: bool,
    /// Output position increment per output frame.
    step: Frac,
    /// Position of the next output frame relative to the previous input frame.
    position: Frac,
    input_buffer: Vec<i16>,
    input_position: usize,
    input_remaining: usize,
    last: [i16; 2],
    current: [i16; 2],
}

impl LinearRateConverter {
    /// Both rates must be non-zero and the 16.16 step plus one frame must fit
    /// in an `i32`.
    pub fn new(in_rate: u32, out_rate: u32, stereo: bool, reverse_stereo: bool) -> Self {
        let step = ((in_rate as i64) << Frac::BITS) / out_rate.max(1) as i64;

        Self {
            stereo,
            reverse_stereo,
            step: Frac::from_raw(step as i32),
            position: Frac::ONE,
            input_buffer: vec![0; INTERMEDIATE_BUFFER_SIZE],
            input_position: 0,
            input_remaining: 0,
            last: [0; 2],
            current: [0; 2],
        }
    }

    /// Pulls the next input frame, refilling from the stream when needed.
    /// Returns false once the stream has nothing left.
    fn advance(&mut self, input: &mut dyn AudioStream) -> bool {
        let samples_per_frame = if self.stereo { 2 } else { 1 };

        if self.input_remaining < samples_per_frame {
            self.input_position = 0;
            self.input_remaining = input.read_buffer(&mut self.input_buffer);
            if self.input_remaining < samples_per_frame {
                self.input_remaining = 0;
                return false;
            }
        }

        for channel in 0..samples_per_frame {
            self.last[channel] = self.current[channel];
            self.current[channel] = self.input_buffer[self.input_position];
            self.input_position += 1;
        }
        self.input_remaining -= samples_per_frame;

        true
    }
}

/// Interpolates `position` (0..1) of the way from `last` to `current`, rounding
/// to nearest. The result stays within the sample range.
#[inline]
fn interpolate(last: i16, current: i16, position: Frac) -> i32 {
    let delta = (current as i64 - last as i64) * position.raw() as i64;
    let value = last as i64 + ((delta + Frac::HALF.raw() as i64) >> Frac::BITS);
    value.clamp(i16::MIN as i64, i16::MAX as i64) as i32
}

impl RateConverter for LinearRateConverter {
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
        let mut produced = 0;

        while produced < frames {
            while self.position >= Frac::ONE {
                if !self.advance(input) {
                    return produced;
                }
                self.position -= Frac::ONE;
            }

            while self.position < Frac::ONE && produced < frames {
                let left = interpolate(self.last[0], self.current[0], self.position);
                let right = if self.stereo {
                    interpolate(self.last[1], self.current[1], self.position)
                } else {
                    left
                };

                mix_frame(
                    &mut output[produced * 2..produced * 2 + 2],
                    left,
                    right,
                    vol_left,
                    vol_right,
                    self.reverse_stereo,
                );
                produced += 1;
                self.position += self.step;
            }
        }

        produced
    }

    fn drain(&mut self, _output: &mut [i16], _vol: u16) -> usize {
        0
    }
}
