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
use super::message;

/// One of a driver's 16 logical channels.
///
/// Allocation only tracks which voices are in use. Every message can be sent
/// whether or not the channel is allocated.
pub trait MidiChannel: Send + Sync {
    /// Zero-based channel number.
    fn number(&self) -> u8;

    /// Marks the channel as in use. Returns false, changing nothing, if it
    /// already was.
    fn allocate(&self) -> bool;

    fn release(&self);

    fn is_allocated(&self) -> bool;

    /// Sends a pre-built word, readdressed to this channel.
    fn send(&self, word: u32);

    fn note_off(&self, note: u8);

    fn note_on(&self, note: u8, velocity: u8);

    fn program_change(&self, program: u8);

    /// Bends by `bend` in `-0x2000..=0x1FFF`, zero being centered.
    fn pitch_bend(&self, bend: i16);

    fn control_change(&self, control: u8, value: u8);

    /// Sets the pitch bend range in semitones.
    fn pitch_bend_factor(&self, value: u8);

    fn sys_ex_custom_instrument(&self, kind: u32, instrument: &[u8]);

    fn modulation(&self, value: u8) {
        self.control_change(message::CC_MODULATION, value);
    }

    fn volume(&self, value: u8) {
        self.control_change(message::CC_VOLUME, value);
    }

    fn pan_position(&self, value: u8) {
        self.control_change(message::CC_PAN, value);
    }

    fn detune(&self, value: u8) {
        self.control_change(message::CC_DETUNE, value);
    }

    fn sustain(&self, on: bool) {
        self.control_change(message::CC_SUSTAIN, u8::from(on));
    }

    fn effect_level(&self, value: u8) {
        self.control_change(message::CC_EFFECT_LEVEL, value);
    }

    fn chorus_level(&self, value: u8) {
        self.control_change(message::CC_CHORUS_LEVEL, value);
    }

    fn all_notes_off(&self) {
        self.control_change(message::CC_ALL_NOTES_OFF, 0);
    }
}
