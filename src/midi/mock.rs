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
use parking_lot::Mutex;

use super::MidiPort;

/// A mock port. Doesn't actually play anything, just records what it was sent.
#[derive(Default)]
pub struct RecordingPort {
    words: Mutex<Vec<u32>>,
    sys_ex: Mutex<Vec<Vec<u8>>>,
    custom_instruments: Mutex<Vec<(u8, u32, Vec<u8>)>>,
}

impl RecordingPort {
    /// Gets every packed word sent so far.
    pub fn words(&self) -> Vec<u32> {
        self.words.lock().clone()
    }

    pub fn sys_ex_messages(&self) -> Vec<Vec<u8>> {
        self.sys_ex.lock().clone()
    }

    pub fn custom_instruments(&self) -> Vec<(u8, u32, Vec<u8>)> {
        self.custom_instruments.lock().clone()
    }
}

impl MidiPort for RecordingPort {
    fn send(&self, word: u32) {
        self.words.lock().push(word);
    }

    fn sys_ex(&self, data: &[u8]) {
        self.sys_ex.lock().push(data.to_vec());
    }

    fn sys_ex_custom_instrument(&self, channel: u8, kind: u32, instrument: &[u8]) {
        self.custom_instruments
            .lock()
            .push((channel, kind, instrument.to_vec()));
    }
}
