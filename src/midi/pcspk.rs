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

use midly::MidiMessage;
use parking_lot::Mutex;
use tracing::{info, span, trace, Level};

use super::{
    message, ChannelPool, MidiChannel, MidiDriver, MidiError, MidiPort, MIDI_CHANNEL_COUNT,
};
use crate::audio::{
    pcspk::{PcSpeaker, Waveform},
    Mixer, SoundHandle, SoundType, MAX_CHANNEL_VOLUME,
};
use crate::music::{DeviceHandle, MusicDevice, MusicError, MusicPlugin, MusicType};

const PCSPK_ID: &str = "pcspk";
const PCSPK_NAME: &str = "PC Speaker Emulator";

/// Equal tempered frequency of a note, A4 (69) being 440Hz.
pub fn note_frequency(note: u8) -> u32 {
    (440.0 * 2f64.powf((note as f64 - 69.0) / 12.0)).round() as u32
}

struct SynthState {
    /// The (channel, note) currently sounding.
    active: Option<(u8, u8)>,
    volumes: [u8; MIDI_CHANNEL_COUNT as usize],
}

/// Plays the most recent note on the speaker. The speaker has one voice, so a
/// new note cuts off the previous one.
struct PcSpeakerSynth {
    speaker: PcSpeaker,
    state: Mutex<SynthState>,
}

impl PcSpeakerSynth {
    fn new(speaker: PcSpeaker) -> Self {
        Self {
            speaker,
            state: Mutex::new(SynthState {
                active: None,
                volumes: [127; MIDI_CHANNEL_COUNT as usize],
            }),
        }
    }

    fn stop_if(&self, state: &mut SynthState, matches: impl Fn((u8, u8)) -> bool) {
        if state.active.is_some_and(matches) {
            self.speaker.stop();
            state.active = None;
        }
    }
}

impl MidiPort for PcSpeakerSynth {
    fn send(&self, word: u32) {
        let Some((channel, event)) = message::decode(word) else {
            trace!(word = format!("{:#08x}", word), "Ignoring message.");
            return;
        };
        let channel = channel.as_int();
        let mut state = self.state.lock();

        match event {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                let volume = state.volumes[channel as usize] as u32
                    * vel.as_int() as u32
                    * MAX_CHANNEL_VOLUME as u32
                    / (127 * 127);
                self.speaker.set_volume(volume.min(MAX_CHANNEL_VOLUME as u32) as u8);
                self.speaker
                    .play(Waveform::Square, note_frequency(key.as_int()), None);
                state.active = Some((channel, key.as_int()));
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                self.stop_if(&mut state, |active| active == (channel, key.as_int()));
            }
            MidiMessage::Controller { controller, value } => match controller.as_int() {
                message::CC_VOLUME => state.volumes[channel as usize] = value.as_int(),
                message::CC_ALL_NOTES_OFF => {
                    self.stop_if(&mut state, |(active, _)| active == channel);
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn sys_ex(&self, _data: &[u8]) {}
}

/// A driver that renders notes as square waves on an emulated PC speaker.
pub struct PcSpeakerDriver {
    mixer: Mixer,
    synth: Arc<PcSpeakerSynth>,
    pool: ChannelPool,
    handle: Mutex<Option<SoundHandle>>,
}

impl PcSpeakerDriver {
    pub fn new(mixer: &Mixer) -> Self {
        let synth = Arc::new(PcSpeakerSynth::new(PcSpeaker::new(mixer.output_rate())));
        Self {
            mixer: mixer.clone(),
            pool: ChannelPool::new(synth.clone()),
            synth,
            handle: Mutex::new(None),
        }
    }
}

impl fmt::Display for PcSpeakerDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", PCSPK_NAME)
    }
}

impl MidiPort for PcSpeakerDriver {
    fn send(&self, word: u32) {
        self.synth.send(word);
    }

    fn sys_ex(&self, data: &[u8]) {
        self.synth.sys_ex(data);
    }
}

impl MidiDriver for PcSpeakerDriver {
    fn open(&self) -> Result<(), MidiError> {
        let span = span!(Level::INFO, "open (pcspk)");
        let _enter = span.enter();

        let mut handle = self.handle.lock();
        if handle.is_some() {
            return Err(MidiError::AlreadyOpen);
        }

        *handle = Some(self.mixer.play_stream(
            SoundType::Music,
            Box::new(self.synth.speaker.clone()),
            MAX_CHANNEL_VOLUME,
            0,
            false,
        )?);
        info!(rate = self.mixer.output_rate(), "Opened PC speaker.");
        Ok(())
    }

    fn close(&self) {
        if let Some(handle) = self.handle.lock().take() {
            self.pool.all_notes_off();
            self.synth.speaker.stop();
            self.mixer.stop_handle(handle);
            self.pool.release_all();
            info!("Closed PC speaker.");
        }
    }

    fn is_open(&self) -> bool {
        self.handle.lock().is_some()
    }

    fn allocate_channel(&self) -> Option<Arc<dyn MidiChannel>> {
        self.pool.allocate()
    }

    fn percussion_channel(&self) -> Option<Arc<dyn MidiChannel>> {
        None
    }
}

pub struct PcSpeakerPlugin;

impl MusicPlugin for PcSpeakerPlugin {
    fn id(&self) -> &'static str {
        PCSPK_ID
    }

    fn name(&self) -> &'static str {
        PCSPK_NAME
    }

    fn devices(&self) -> Vec<MusicDevice> {
        vec![MusicDevice::new(
            PCSPK_ID,
            PCSPK_NAME,
            "",
            MusicType::PcSpeaker,
        )]
    }

    fn create_instance(
        &self,
        mixer: &Mixer,
        handle: DeviceHandle,
    ) -> Result<Box<dyn MidiDriver>, MusicError> {
        if !self.devices().iter().any(|device| device.handle() == handle) {
            return Err(MusicError::UnknownDevice(handle));
        }
        Ok(Box::new(PcSpeakerDriver::new(mixer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_silent(mixer: &Mixer) -> bool {
        let mut buffer = vec![0i16; 64];
        mixer.mix_callback(&mut buffer);
        buffer.iter().all(|&s| s == 0)
    }

    #[test]
    fn test_note_frequency() {
        assert_eq!(note_frequency(69), 440);
        assert_eq!(note_frequency(81), 880);
        assert_eq!(note_frequency(57), 220);
        assert_eq!(note_frequency(60), 262);
    }

    #[test]
    fn test_open_close() {
        let mixer = Mixer::new(8000);
        let driver = PcSpeakerDriver::new(&mixer);
        assert!(!driver.is_open());

        driver.open().unwrap();
        assert!(driver.is_open());
        assert_eq!(mixer.active_channels(), 1);
        assert!(matches!(driver.open(), Err(MidiError::AlreadyOpen)));

        driver.close();
        assert!(!driver.is_open());
        assert_eq!(mixer.active_channels(), 0);
        assert!(driver.percussion_channel().is_none());
    }

    #[test]
    fn test_notes_play_through_mixer() {
        let mixer = Mixer::new(8000);
        let driver = PcSpeakerDriver::new(&mixer);
        driver.open().unwrap();
        assert!(is_silent(&mixer));

        let channel = driver.allocate_channel().unwrap();
        channel.note_on(69, 127);
        assert!(!is_silent(&mixer));

        // Releasing a different note keeps the current one sounding.
        channel.note_off(70);
        assert!(!is_silent(&mixer));

        channel.note_off(69);
        assert!(is_silent(&mixer));

        channel.note_on(60, 127);
        channel.note_on(60, 0);
        assert!(is_silent(&mixer));

        channel.note_on(60, 127);
        channel.all_notes_off();
        assert!(is_silent(&mixer));
    }

    #[test]
    fn test_velocity_and_volume() {
        let mixer = Mixer::new(8000);
        let driver = PcSpeakerDriver::new(&mixer);
        let channel = driver.allocate_channel().unwrap();

        channel.note_on(69, 127);
        assert_eq!(driver.synth.speaker.volume(), 255);

        channel.volume(0);
        channel.note_on(69, 127);
        assert_eq!(driver.synth.speaker.volume(), 0);
    }

    #[test]
    fn test_plugin() {
        let plugin = PcSpeakerPlugin;
        let devices = plugin.devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].complete_id(), "pcspk");
        assert_eq!(devices[0].complete_name(), "PC Speaker Emulator");
        assert_eq!(devices[0].music_type(), MusicType::PcSpeaker);

        let mixer = Mixer::new(22050);
        let driver = plugin
            .create_instance(&mixer, devices[0].handle())
            .unwrap();
        assert_eq!(driver.to_string(), "PC Speaker Emulator");
    }
}
