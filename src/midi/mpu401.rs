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
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::trace;

use super::{
    message::{self, CONTROL_CHANGE, NOTE_OFF, NOTE_ON, PITCH_BEND, PROGRAM_CHANGE},
    MidiChannel, MidiPort, MIDI_CHANNEL_COUNT, PERCUSSION_CHANNEL,
};

/// A channel that encodes events as packed words and sends them through its port.
pub struct Mpu401Channel {
    port: Arc<dyn MidiPort>,
    number: u8,
    allocated: AtomicBool,
}

impl Mpu401Channel {
    pub fn new(port: Arc<dyn MidiPort>, number: u8) -> Self {
        Self {
            port,
            number: number & 0x0F,
            allocated: AtomicBool::new(false),
        }
    }

    fn send_event(&self, status: u8, data1: u8, data2: u8) {
        self.port
            .send(message::pack(status | self.number, data1, data2));
    }
}

impl MidiChannel for Mpu401Channel {
    fn number(&self) -> u8 {
        self.number
    }

    fn allocate(&self) -> bool {
        self.allocated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.allocated.store(false, Ordering::Release);
    }

    fn is_allocated(&self) -> bool {
        self.allocated.load(Ordering::Acquire)
    }

    fn send(&self, word: u32) {
        self.port.send(message::with_channel(word, self.number));
    }

    fn note_off(&self, note: u8) {
        self.send_event(NOTE_OFF, note, 0);
    }

    fn note_on(&self, note: u8, velocity: u8) {
        self.send_event(NOTE_ON, note, velocity);
    }

    fn program_change(&self, program: u8) {
        self.send_event(PROGRAM_CHANGE, program, 0);
    }

    fn pitch_bend(&self, bend: i16) {
        let (data1, data2) = message::pitch_bend_data(bend);
        self.send_event(PITCH_BEND, data1, data2);
    }

    fn control_change(&self, control: u8, value: u8) {
        self.send_event(CONTROL_CHANGE, control, value);
    }

    fn pitch_bend_factor(&self, value: u8) {
        self.port.set_pitch_bend_range(self.number, value);
    }

    fn sys_ex_custom_instrument(&self, kind: u32, instrument: &[u8]) {
        self.port
            .sys_ex_custom_instrument(self.number, kind, instrument);
    }
}

/// The 16 channels of a driver, all sending through the same port.
pub struct ChannelPool {
    channels: Vec<Arc<Mpu401Channel>>,
}

impl ChannelPool {
    pub fn new(port: Arc<dyn MidiPort>) -> Self {
        Self {
            channels: (0..MIDI_CHANNEL_COUNT)
                .map(|number| Arc::new(Mpu401Channel::new(port.clone(), number)))
                .collect(),
        }
    }

    /// Allocates the lowest numbered free melodic channel. The percussion
    /// channel is never handed out here.
    pub fn allocate(&self) -> Option<Arc<dyn MidiChannel>> {
        let channel = self
            .channels
            .iter()
            .filter(|channel| channel.number() != PERCUSSION_CHANNEL)
            .find(|channel| channel.allocate())?;

        trace!(channel = channel.number(), "Allocated channel.");
        let channel: Arc<dyn MidiChannel> = channel.clone();
        Some(channel)
    }

    pub fn percussion(&self) -> Arc<dyn MidiChannel> {
        self.channels[PERCUSSION_CHANNEL as usize].clone()
    }

    pub fn channel(&self, number: u8) -> Option<Arc<Mpu401Channel>> {
        self.channels.get(number as usize).cloned()
    }

    pub fn release_all(&self) {
        self.channels.iter().for_each(|channel| channel.release());
    }

    pub fn all_notes_off(&self) {
        self.channels
            .iter()
            .for_each(|channel| channel.all_notes_off());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::mock::RecordingPort;

    fn channel(number: u8) -> (Arc<RecordingPort>, Mpu401Channel) {
        let port = Arc::new(RecordingPort::default());
        let channel = Mpu401Channel::new(port.clone(), number);
        (port, channel)
    }

    #[test]
    fn test_allocation() {
        let (_, channel) = channel(0);
        assert!(!channel.is_allocated());
        assert!(channel.allocate());
        assert!(!channel.allocate());
        assert!(channel.is_allocated());

        channel.release();
        assert!(!channel.is_allocated());
        channel.release();
        assert!(channel.allocate());
    }

    #[test]
    fn test_messages() {
        let (port, channel) = channel(3);
        channel.note_on(60, 100);
        channel.note_off(60);
        channel.program_change(19);
        channel.control_change(7, 90);

        assert_eq!(
            port.words(),
            vec![0x00643C93, 0x00003C83, 0x000013C3, 0x005A07B3]
        );
    }

    #[test]
    fn test_messages_sent_while_unallocated() {
        let (port, channel) = channel(0);
        assert!(!channel.is_allocated());
        channel.note_on(1, 1);
        assert_eq!(port.words().len(), 1);
    }

    #[test]
    fn test_pitch_bend() {
        let (port, channel) = channel(1);
        channel.pitch_bend(0);
        channel.pitch_bend(-0x2000);
        channel.pitch_bend(0x1FFF);

        assert_eq!(port.words(), vec![0x004000E1, 0x000000E1, 0x007F7FE1]);
    }

    #[test]
    fn test_send_restamps_channel() {
        let (port, channel) = channel(6);
        channel.send(0x00403C9F);
        channel.send(0x00403C90);
        assert_eq!(port.words(), vec![0x00403C96, 0x00403C96]);
    }

    #[test]
    fn test_convenience_controllers() {
        let (port, channel) = channel(0);
        channel.modulation(1);
        channel.volume(2);
        channel.pan_position(3);
        channel.detune(4);
        channel.sustain(true);
        channel.sustain(false);
        channel.effect_level(5);
        channel.chorus_level(6);
        channel.all_notes_off();

        let controls: Vec<(u8, u8)> = port
            .words()
            .into_iter()
            .map(|word| {
                assert_eq!(message::status(word), CONTROL_CHANGE);
                ((word >> 8) as u8, (word >> 16) as u8)
            })
            .collect();
        assert_eq!(
            controls,
            vec![
                (1, 1),
                (7, 2),
                (10, 3),
                (17, 4),
                (64, 1),
                (64, 0),
                (91, 5),
                (93, 6),
                (0x7B, 0)
            ]
        );
    }

    #[test]
    fn test_pitch_bend_factor_and_custom_instrument() {
        let (port, channel) = channel(4);
        channel.pitch_bend_factor(2);
        assert_eq!(port.words()[2], 0x000206B4);

        channel.sys_ex_custom_instrument(0x41, &[1, 2, 3]);
        assert_eq!(port.custom_instruments(), vec![(4, 0x41, vec![1, 2, 3])]);
    }

    #[test]
    fn test_pool_skips_percussion() {
        let pool = ChannelPool::new(Arc::new(RecordingPort::default()));

        let numbers: Vec<u8> = std::iter::from_fn(|| pool.allocate())
            .map(|channel| channel.number())
            .collect();
        assert_eq!(numbers, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12, 13, 14, 15]);
        assert!(pool.allocate().is_none());

        assert_eq!(pool.percussion().number(), PERCUSSION_CHANNEL);
        assert!(!pool.percussion().is_allocated());

        pool.channel(4).unwrap().release();
        assert_eq!(pool.allocate().map(|channel| channel.number()), Some(4));

        pool.release_all();
        assert_eq!(pool.allocate().map(|channel| channel.number()), Some(0));
    }

    #[test]
    fn test_pool_all_notes_off() {
        let port = Arc::new(RecordingPort::default());
        let pool = ChannelPool::new(port.clone());
        pool.all_notes_off();

        let words = port.words();
        assert_eq!(words.len(), MIDI_CHANNEL_COUNT as usize);
        for (number, word) in words.into_iter().enumerate() {
            assert_eq!(word, message::pack(CONTROL_CHANGE | number as u8, 0x7B, 0));
        }
    }
}
