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
// Core audio mixing logic shared by the cpal output and offline rendering.
use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::rate::{make_rate_converter, RateConverter, RateError};
use super::stream::AudioStream;
use super::{MAX_CHANNEL_VOLUME, MAX_MIXER_VOLUME};

/// Global atomic counter for generating unique sound handles
static SOUND_HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Category of a sound. Each category has its own volume and mute switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundType {
    Plain,
    Music,
    Sfx,
    Speech,
}

impl SoundType {
    fn index(self) -> usize {
        match self {
            SoundType::Plain => 0,
            SoundType::Music => 1,
            SoundType::Sfx => 2,
            SoundType::Speech => 3,
        }
    }
}

/// Identifies a stream playing in the mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(u64);

impl fmt::Display for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct TypeSettings {
    volume: u16,
    muted: bool,
}

impl TypeSettings {
    fn effective_volume(&self) -> u16 {
        if self.muted {
            0
        } else {
            self.volume
        }
    }
}

/// A stream playing in the mixer along with its converter and volumes.
struct Channel {
    handle: SoundHandle,
    sound_type: SoundType,
    stream: Box<dyn AudioStream>,
    converter: Box<dyn RateConverter>,
    volume: u8,
    balance: i8,
    paused: bool,
    /// Converter volumes derived from the channel and sound type settings.
    vol_left: u16,
    vol_right: u16,
}

impl Channel {
    fn update_volumes(&mut self, type_volume: u16) {
        let vol = type_volume as i32 * self.volume as i32;
        let max = MAX_CHANNEL_VOLUME as i32;
        let balance = self.balance as i32;

        let (left, right) = match balance.cmp(&0) {
            CmpOrdering::Equal => (vol / max, vol / max),
            CmpOrdering::Less => (vol / max, (127 + balance) * vol / (max * 127)),
            CmpOrdering::Greater => ((127 - balance) * vol / (max * 127), vol / max),
        };

        self.vol_left = left as u16;
        self.vol_right = right as u16;
    }
}

struct MixerState {
    channels: Vec<Channel>,
    types: [TypeSettings; 4],
    paused: bool,
    /// Swaps the output sides of streams started while set.
    reverse_stereo: bool,
}

impl MixerState {
    fn channel_mut(&mut self, handle: SoundHandle) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.handle == handle)
    }

    fn refresh_volumes(&mut self, sound_type: SoundType) {
        let type_volume = self.types[sound_type.index()].effective_volume();
        self.channels
            .iter_mut()
            .filter(|c| c.sound_type == sound_type)
            .for_each(|c| c.update_volumes(type_volume));
    }
}

/// Mixes any number of PCM streams into interleaved stereo at a fixed output rate.
///
/// Clones share the same state. Control calls and the audio callback are
/// serialized by one lock, so a driver whose output is a stream in this mixer
/// never has its state changed halfway through producing a buffer.
#[derive(Clone)]
pub struct Mixer {
    output_rate: u32,
    state: Arc<Mutex<MixerState>>,
}

impl Mixer {
    /// Creates a new mixer
    pub fn new(output_rate: u32) -> Self {
        let defaults = TypeSettings {
            volume: MAX_MIXER_VOLUME,
            muted: false,
        };

        Self {
            output_rate,
            state: Arc::new(Mutex::new(MixerState {
                channels: Vec::new(),
                types: [defaults; 4],
                paused: false,
                reverse_stereo: false,
            })),
        }
    }

    /// Gets the output sample rate
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Starts mixing `stream`. The volume is 0..=255 and the balance runs from
    /// -127 (left only) to 127 (right only).
    pub fn play_stream(
        &self,
        sound_type: SoundType,
        stream: Box<dyn AudioStream>,
        volume: u8,
        balance: i8,
        reverse_stereo: bool,
    ) -> Result<SoundHandle, RateError> {
        let swap_output = self.state.lock().reverse_stereo;
        let converter = make_rate_converter(
            stream.rate(),
            self.output_rate,
            stream.is_stereo(),
            reverse_stereo != swap_output,
        )?;
        let handle = SoundHandle(SOUND_HANDLE_COUNTER.fetch_add(1, Ordering::Relaxed));

        let mut channel = Channel {
            handle,
            sound_type,
            stream,
            converter,
            volume,
            balance: balance.max(-127),
            paused: false,
            vol_left: 0,
            vol_right: 0,
        };

        let mut state = self.state.lock();
        channel.update_volumes(state.types[sound_type.index()].effective_volume());
        debug!(
            handle = %handle,
            sound_type = ?sound_type,
            rate = channel.stream.rate(),
            stereo = channel.stream.is_stereo(),
            "Playing stream."
        );
        state.channels.push(channel);

        Ok(handle)
    }

    /// Stops the stream with the given handle, if it is still playing.
    pub fn stop_handle(&self, handle: SoundHandle) {
        let mut state = self.state.lock();
        let before = state.channels.len();
        state.channels.retain(|c| c.handle != handle);
        if state.channels.len() != before {
            debug!(handle = %handle, "Stopped stream.");
        }
    }

    /// Swaps left and right output for every stream started afterwards.
    pub fn set_reverse_stereo(&self, reverse_stereo: bool) {
        self.state.lock().reverse_stereo = reverse_stereo;
    }

    pub fn reverse_stereo(&self) -> bool {
        self.state.lock().reverse_stereo
    }

    pub fn stop_all(&self) {
        self.state.lock().channels.clear();
    }

    pub fn stop_sound_type(&self, sound_type: SoundType) {
        self.state
            .lock()
            .channels
            .retain(|c| c.sound_type != sound_type);
    }

    pub fn is_sound_handle_active(&self, handle: SoundHandle) -> bool {
        self.state.lock().channels.iter().any(|c| c.handle == handle)
    }

    /// Gets the number of streams currently in the mixer
    pub fn active_channels(&self) -> usize {
        self.state.lock().channels.len()
    }

    pub fn pause_handle(&self, handle: SoundHandle, paused: bool) {
        if let Some(channel) = self.state.lock().channel_mut(handle) {
            channel.paused = paused;
        }
    }

    /// Pauses the whole mixer. Paused mixing produces silence and consumes nothing.
    pub fn pause_all(&self, paused: bool) {
        self.state.lock().paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn set_channel_volume(&self, handle: SoundHandle, volume: u8) {
        let mut state = self.state.lock();
        let type_volumes = state.types;
        if let Some(channel) = state.channel_mut(handle) {
            channel.volume = volume;
            channel.update_volumes(type_volumes[channel.sound_type.index()].effective_volume());
        }
    }

    pub fn channel_volume(&self, handle: SoundHandle) -> Option<u8> {
        self.state.lock().channel_mut(handle).map(|c| c.volume)
    }

    pub fn set_channel_balance(&self, handle: SoundHandle, balance: i8) {
        let mut state = self.state.lock();
        let type_volumes = state.types;
        if let Some(channel) = state.channel_mut(handle) {
            channel.balance = balance.max(-127);
            channel.update_volumes(type_volumes[channel.sound_type.index()].effective_volume());
        }
    }

    pub fn channel_balance(&self, handle: SoundHandle) -> Option<i8> {
        self.state.lock().channel_mut(handle).map(|c| c.balance)
    }

    /// Sets the volume (0..=256) applied to every stream of `sound_type`.
    pub fn set_volume_for_sound_type(&self, sound_type: SoundType, volume: u16) {
        let mut state = self.state.lock();
        state.types[sound_type.index()].volume = volume.min(MAX_MIXER_VOLUME);
        state.refresh_volumes(sound_type);
    }

    pub fn volume_for_sound_type(&self, sound_type: SoundType) -> u16 {
        self.state.lock().types[sound_type.index()].volume
    }

    pub fn mute_sound_type(&self, sound_type: SoundType, muted: bool) {
        let mut state = self.state.lock();
        state.types[sound_type.index()].muted = muted;
        state.refresh_volumes(sound_type);
    }

    pub fn is_sound_type_muted(&self, sound_type: SoundType) -> bool {
        self.state.lock().types[sound_type.index()].muted
    }

    /// Fills `buffer` (interleaved stereo) with the mix of every active stream
    /// and returns the number of frames. The buffer is zeroed first. Streams
    /// that run dry are drained and removed.
    pub fn mix_callback(&self, buffer: &mut [i16]) -> usize {
        buffer.fill(0);
        let frames = buffer.len() / 2;

        let mut state = self.state.lock();
        if state.paused {
            return frames;
        }

        state.channels.retain_mut(|channel| {
            if channel.paused {
                return true;
            }

            let produced = channel.converter.flow(
                channel.stream.as_mut(),
                buffer,
                channel.vol_left,
                channel.vol_right,
            );

            if produced < frames && channel.stream.end_of_data() {
                let vol = channel.vol_left.max(channel.vol_right);
                channel.converter.drain(&mut buffer[produced * 2..], vol);
                trace!(handle = %channel.handle, "Stream finished.");
                return false;
            }

            true
        });

        frames
    }
}
