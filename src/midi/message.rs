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

//! Packed message words. A channel message travels as a single `u32`:
//! `data2 << 16 | data1 << 8 | status`, where the low nibble of the status byte
//! is the channel.

use midly::{live::LiveEvent, num::u4, MidiMessage};

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const POLY_AFTERTOUCH: u8 = 0xA0;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const CHANNEL_AFTERTOUCH: u8 = 0xD0;
pub const PITCH_BEND: u8 = 0xE0;
pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

pub const CC_MODULATION: u8 = 0x01;
pub const CC_DATA_ENTRY_MSB: u8 = 0x06;
pub const CC_VOLUME: u8 = 0x07;
pub const CC_PAN: u8 = 0x0A;
pub const CC_DETUNE: u8 = 0x11;
pub const CC_DATA_ENTRY_LSB: u8 = 0x26;
pub const CC_SUSTAIN: u8 = 0x40;
pub const CC_EFFECT_LEVEL: u8 = 0x5B;
pub const CC_CHORUS_LEVEL: u8 = 0x5D;
pub const CC_RPN_LSB: u8 = 0x64;
pub const CC_RPN_MSB: u8 = 0x65;
pub const CC_ALL_NOTES_OFF: u8 = 0x7B;

/// Center of the unsigned 14-bit pitch bend range.
pub const PITCH_BEND_CENTER: i32 = 0x2000;

#[inline]
pub fn pack(status: u8, data1: u8, data2: u8) -> u32 {
    (data2 as u32) << 16 | (data1 as u32) << 8 | status as u32
}

#[inline]
pub fn status(word: u32) -> u8 {
    (word & 0xFF) as u8
}

#[inline]
pub fn channel(word: u32) -> u8 {
    (word & 0x0F) as u8
}

/// Replaces the channel nibble of `word`.
#[inline]
pub fn with_channel(word: u32, channel: u8) -> u32 {
    (word & 0xFFFF_FFF0) | (channel & 0x0F) as u32
}

/// Splits a signed bend in `-0x2000..=0x1FFF` into its (data1, data2) pair.
/// Values outside the range are clamped.
pub fn pitch_bend_data(bend: i16) -> (u8, u8) {
    let value = (bend as i32 + PITCH_BEND_CENTER).clamp(0, 0x3FFF);
    ((value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8)
}

/// Returns the wire bytes of a packed word and how many of them are used.
pub fn unpack(word: u32) -> ([u8; 3], usize) {
    let bytes = [
        status(word),
        ((word >> 8) & 0xFF) as u8,
        ((word >> 16) & 0xFF) as u8,
    ];

    let len = match bytes[0] & 0xF0 {
        PROGRAM_CHANGE | CHANNEL_AFTERTOUCH => 2,
        0xF0 => match bytes[0] {
            0xF1 | 0xF3 => 2,
            0xF2 => 3,
            _ => 1,
        },
        _ => 3,
    };

    (bytes, len)
}

/// Wraps a system exclusive payload in its start and end bytes.
pub fn frame_sys_ex(data: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(data.len() + 2);
    framed.push(SYSEX_START);
    framed.extend_from_slice(data);
    framed.push(SYSEX_END);
    framed
}

/// Decodes a packed channel message.
pub fn decode(word: u32) -> Option<(u4, MidiMessage)> {
    let (bytes, len) = unpack(word);
    match LiveEvent::parse(&bytes[..len]) {
        Ok(LiveEvent::Midi { channel, message }) => Some((channel, message)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack() {
        assert_eq!(pack(NOTE_ON | 3, 60, 127), 0x007F3C93);
        assert_eq!(pack(PROGRAM_CHANGE, 5, 0), 0x000005C0);
    }

    #[test]
    fn test_with_channel() {
        assert_eq!(with_channel(0x007F3C90, 5), 0x007F3C95);
        assert_eq!(with_channel(0x007F3C9F, 0), 0x007F3C90);
        assert_eq!(with_channel(0x00000080, 0x1C), 0x0000008C);
    }

    #[test]
    fn test_pitch_bend_data() {
        assert_eq!(pitch_bend_data(0), (0x00, 0x40));
        assert_eq!(pitch_bend_data(-0x2000), (0x00, 0x00));
        assert_eq!(pitch_bend_data(0x1FFF), (0x7F, 0x7F));
        assert_eq!(pitch_bend_data(1), (0x01, 0x40));
        assert_eq!(pitch_bend_data(i16::MAX), (0x7F, 0x7F));
        assert_eq!(pitch_bend_data(i16::MIN), (0x00, 0x00));
    }

    #[test]
    fn test_frame_sys_ex() {
        assert_eq!(
            frame_sys_ex(&[0x7E, 0x7F, 0x09, 0x01]),
            vec![0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7]
        );
        assert_eq!(frame_sys_ex(&[]), vec![0xF0, 0xF7]);
    }

    #[test]
    fn test_unpack_lengths() {
        assert_eq!(unpack(0x00403C90), ([0x90, 0x3C, 0x40], 3));
        assert_eq!(unpack(0x000005C2).1, 2);
        assert_eq!(unpack(0x000040D0).1, 2);
        assert_eq!(unpack(0x000000F8).1, 1);
        assert_eq!(unpack(0x000010F3).1, 2);
    }

    #[test]
    fn test_decode() {
        let (channel, message) = decode(pack(NOTE_ON | 4, 64, 90)).unwrap();
        assert_eq!(channel.as_int(), 4);
        assert_eq!(
            message,
            MidiMessage::NoteOn {
                key: 64.into(),
                vel: 90.into()
            }
        );

        let (data1, data2) = pitch_bend_data(-100);
        let (_, message) = decode(pack(PITCH_BEND, data1, data2)).unwrap();
        match message {
            MidiMessage::PitchBend { bend } => assert_eq!(bend.as_int(), -100),
            other => panic!("unexpected message {:?}", other),
        }

        assert!(decode(0x000000F8).is_none());
    }
}
