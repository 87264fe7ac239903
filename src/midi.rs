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
use std::{fmt, sync::Arc};

use crate::audio::RateError;

pub mod channel;
pub mod message;
pub mod midir;
pub mod mpu401;
pub mod null;
pub mod pcspk;

#[cfg(test)]
pub(crate) mod mock;

pub use channel::MidiChannel;
pub use mpu401::{ChannelPool, Mpu401Channel};

/// Number of logical channels a driver exposes.
pub const MIDI_CHANNEL_COUNT: u8 = 16;

/// General MIDI reserves channel 10 (9 zero-based) for percussion.
pub const PERCUSSION_CHANNEL: u8 = 9;

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("MIDI driver is already open")]
    AlreadyOpen,

    #[error("no MIDI output port found with name {0}")]
    PortNotFound(String),

    #[error("MIDI initialization failed: {0}")]
    Init(#[from] ::midir::InitError),

    #[error("unable to query MIDI port: {0}")]
    PortInfo(#[from] ::midir::PortInfoError),

    #[error("unable to connect to MIDI port: {0}")]
    Connection(String),

    #[error("unable to register synthesizer output: {0}")]
    Output(#[from] RateError),
}

/// The low level output of a driver. Channels hold a port rather than the
/// driver itself and address every message through it.
pub trait MidiPort: Send + Sync {
    /// Sends a packed message word (see [`message::pack`]).
    fn send(&self, word: u32);

    /// Sends a system exclusive message. `data` excludes the 0xF0/0xF7 framing.
    fn sys_ex(&self, data: &[u8]);

    fn send_message(&self, status: u8, data1: u8, data2: u8) {
        self.send(message::pack(status, data1, data2));
    }

    /// Sends instrument data for a custom instrument of the given type tag. Ports
    /// that have no notion of custom instruments ignore it.
    fn sys_ex_custom_instrument(&self, _channel: u8, _kind: u32, _instrument: &[u8]) {}

    /// Sets the pitch bend range of `channel` in semitones through RPN 0.
    fn set_pitch_bend_range(&self, channel: u8, range: u8) {
        let status = message::CONTROL_CHANGE | (channel & 0x0F);
        self.send_message(status, message::CC_RPN_MSB, 0);
        self.send_message(status, message::CC_RPN_LSB, 0);
        self.send_message(status, message::CC_DATA_ENTRY_MSB, range);
        self.send_message(status, message::CC_DATA_ENTRY_LSB, 0);
        self.send_message(status, message::CC_RPN_LSB, 0x7F);
        self.send_message(status, message::CC_RPN_MSB, 0x7F);
    }
}

/// A music driver: a port with a pool of channels that can be opened and closed.
pub trait MidiDriver: MidiPort + fmt::Display {
    fn open(&self) -> Result<(), MidiError>;

    /// Closes the driver. Sounding notes are silenced first.
    fn close(&self);

    fn is_open(&self) -> bool;

    /// Hands out a free melodic channel, or None when all are in use.
    fn allocate_channel(&self) -> Option<Arc<dyn MidiChannel>>;

    /// The percussion channel, when the driver has one.
    fn percussion_channel(&self) -> Option<Arc<dyn MidiChannel>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::mock::RecordingPort;

    #[test]
    fn test_send_message_packs() {
        let port = RecordingPort::default();
        port.send_message(0x93, 60, 100);
        assert_eq!(port.words(), vec![0x00643C93]);
    }

    #[test]
    fn test_sys_ex_passes_payload() {
        let recording = Arc::new(RecordingPort::default());
        let port: Arc<dyn MidiPort> = recording.clone();
        port.sys_ex(&[0x41, 0x10, 0x42, 0x12]);
        port.sys_ex(&[]);

        assert_eq!(
            recording.sys_ex_messages(),
            vec![vec![0x41, 0x10, 0x42, 0x12], vec![]]
        );
        assert!(recording.words().is_empty());
    }

    #[test]
    fn test_set_pitch_bend_range() {
        let port = RecordingPort::default();
        port.set_pitch_bend_range(2, 12);
        assert_eq!(
            port.words(),
            vec![0x000065B2, 0x000064B2, 0x000C06B2, 0x000026B2, 0x007F64B2, 0x007F65B2]
        );
    }
}
