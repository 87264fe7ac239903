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

//! 16.16 fixed-point positions for sub-sample interpolation.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A signed 16.16 fixed-point value: 16 integer bits, 16 fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Frac(i32);

impl Frac {
    /// Number of fractional bits.
    pub const BITS: u32 = 16;
    /// Mask selecting the fractional bits of the raw value.
    pub const LO_MASK: i32 = (1 << Self::BITS) - 1;
    /// One whole unit.
    pub const ONE: Frac = Frac(1 << Self::BITS);
    /// One half, used to round interpolation midpoints.
    pub const HALF: Frac = Frac(1 << (Self::BITS - 1));
    pub const ZERO: Frac = Frac(0);

    /// Wraps a raw 16.16 value.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Frac(raw)
    }

    /// Returns the raw 16.16 value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts a double, truncating anything finer than 1/65536.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        Frac((value * Self::ONE.0 as f64) as i32)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::ONE.0 as f64
    }

    /// Converts a whole sample value. Exact for every `i16`.
    #[inline]
    pub const fn from_int(value: i16) -> Self {
        Frac((value as i32) << Self::BITS)
    }

    /// Drops the fractional part with an arithmetic shift, so negative values
    /// round toward negative infinity.
    #[inline]
    pub const fn to_int(self) -> i16 {
        (self.0 >> Self::BITS) as i16
    }

    /// Returns only the fractional bits, always in `0..ONE`.
    #[inline]
    pub const fn fract(self) -> Frac {
        Frac(self.0 & Self::LO_MASK)
    }
}

impl Add for Frac {
    type Output = Frac;

    fn add(self, rhs: Frac) -> Frac {
        Frac(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Frac {
    fn add_assign(&mut self, rhs: Frac) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Frac {
    type Output = Frac;

    fn sub(self, rhs: Frac) -> Frac {
        Frac(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Frac {
    fn sub_assign(&mut self, rhs: Frac) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl fmt::Display for Frac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}", self.to_f64())
    }
}
