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

//! Rate conversion: pulls samples from an [`AudioStream`], converts them to the
//! output rate and adds them into an interleaved stereo output buffer.
//!
//! Converters only ever add into the output buffer. Callers must zero it before
//! a mixing pass.

pub mod copy;
pub mod linear;


use tracing::debug;

use super::fixed::Frac;
use super::stream::AudioStream;
use super::{clamped_add, MAX_MIXER_VOLUME};

pub use copy::CopyRateConverter;
pub use linear::LinearRateConverter;

/// Highest rate a 16.16 step can describe.
const MAX_CONVERSION_RATE: u32 = 65535;

/// Error types for rate converter construction
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateError {
    #[error("Unsupported rate conversion: {0}Hz -> {1}Hz")]
    UnsupportedRate(u32, u32),
}

pub trait RateConverter: Send {
    /// Mixes samples from `input` into `output` (interleaved stereo), scaling the
    /// left and right channels by `vol_left` and `vol_right` out of
    /// [`MAX_MIXER_VOLUME`]. Returns the number of output frames produced.
    ///
    /// Panics if the stream's channel layout does not match the converter's.
    fn flow(
        &mut self,
        input: &mut dyn AudioStream,
        output: &mut [i16],
        vol_left: u16,
        vol_right: u16,
    ) -> usize;

    /// Flushes anything still buffered once the input has ended. Returns the
    /// number of output frames produced.
    fn drain(&mut self, output: &mut [i16], vol: u16) -> usize;
}

/// Creates the converter for a stream at `in_rate` feeding an output at `out_rate`.
pub fn make_rate_converter(
    in_rate: u32,
    out_rate: u32,
    stereo: bool,
    reverse_stereo: bool,
) -> Result<Box<dyn RateConverter>, RateError> {
    if in_rate == 0 || out_rate == 0 {
        return Err(RateError::UnsupportedRate(in_rate, out_rate));
    }

    if in_rate == out_rate {
        debug!(rate = in_rate, stereo, reverse_stereo, "Creating copy rate converter.");
        return Ok(Box::new(CopyRateConverter::new(stereo, reverse_stereo)));
    }

    // The position runs up to one frame past the step, which must stay in i32.
    let step = ((in_rate as i64) << Frac::BITS) / out_rate as i64;
    if in_rate > MAX_CONVERSION_RATE
        || out_rate > MAX_CONVERSION_RATE
        || step + Frac::ONE.raw() as i64 > i32::MAX as i64
    {
        return Err(RateError::UnsupportedRate(in_rate, out_rate));
    }

    debug!(
        in_rate,
        out_rate, stereo, reverse_stereo, "Creating linear rate converter."
    );
    Ok(Box::new(LinearRateConverter::new(
        in_rate,
        out_rate,
        stereo,
        reverse_stereo,
    )))
}

/// Adds one weighted frame into a two-sample output slot. The division
/// truncates toward zero.
#[inline]
pub(crate) fn mix_frame(
    slot: &mut [i16],
    left: i32,
    right: i32,
    vol_left: u16,
    vol_right: u16,
    reverse_stereo: bool,
) {
    let (left_index, right_index) = if reverse_stereo { (1, 0) } else { (0, 1) };
    clamped_add(
        &mut slot[left_index],
        left * vol_left as i32 / MAX_MIXER_VOLUME as i32,
    );
    clamped_add(
        &mut slot[right_index],
        right * vol_right as i32 / MAX_MIXER_VOLUME as i32,
    );
}
