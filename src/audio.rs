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
pub mod cpal;
pub mod fixed;
pub mod format;
pub mod mixer;
pub mod pcspk;
pub mod rate;
pub mod stream;

pub use format::{AudioFormat, FormatError};
pub use mixer::{Mixer, SoundHandle, SoundType};
pub use rate::{make_rate_converter, RateConverter, RateError};
pub use stream::AudioStream;

/// Full scale of the left/right volumes handed to a rate converter.
pub const MAX_MIXER_VOLUME: u16 = 256;

/// Full scale of a single mixer channel's volume.
pub const MAX_CHANNEL_VOLUME: u8 = 255;

/// Adds `value` into `sample`, clamping at the signed 16-bit range instead of
/// wrapping. Every mixing path accumulates through this.
#[inline]
pub fn clamped_add(sample: &mut i16, value: i32) {
    let sum = *sample as i32 + value;
    *sample = sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
}

#[cfg(test)]
mod tests {
    use super::clamped_add;

    #[test]
    fn test_clamped_add() {
        let mut sample = 100;
        clamped_add(&mut sample, -300);
        assert_eq!(sample, -200);

        let mut sample = 32000;
        clamped_add(&mut sample, 1000);
        assert_eq!(sample, i16::MAX);

        let mut sample = -32000;
        clamped_add(&mut sample, -1000);
        assert_eq!(sample, i16::MIN);

        let mut sample = i16::MIN;
        clamped_add(&mut sample, i16::MAX as i32 * 2);
        assert_eq!(sample, i16::MAX);
    }
}
