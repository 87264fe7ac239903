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
use serde::Deserialize;

use super::ConfigError;
use crate::audio::{Mixer, SoundType, MAX_MIXER_VOLUME};
use crate::music::registry::AUTO_DEVICE;

const DEFAULT_OUTPUT_RATE: u32 = 44100;
const DEFAULT_BUFFER_FRAMES: usize = 1024;
const DEFAULT_VOLUME: u16 = 192;

/// Highest output rate streams can still be resampled to.
const MAX_OUTPUT_RATE: u32 = 65535;

/// A YAML representation of the audio configuration.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Audio {
    /// The output device. The system default when unset.
    device: Option<String>,

    /// Mixer output rate in Hz (default: 44100)
    output_rate: Option<u32>,

    /// Frames mixed per pass when rendering (default: 1024)
    buffer_frames: Option<usize>,

    /// Swap left and right on output.
    reverse_stereo: Option<bool>,

    /// The music device to use, by id or name (default: "auto")
    music_device: Option<String>,

    /// Volumes out of 256 (default: 192)
    music_volume: Option<u16>,
    sfx_volume: Option<u16>,
    speech_volume: Option<u16>,

    /// Mutes everything.
    mute: Option<bool>,
}

impl Audio {
    /// Returns the output device from the configuration.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate.unwrap_or(DEFAULT_OUTPUT_RATE)
    }

    pub fn buffer_frames(&self) -> usize {
        self.buffer_frames.unwrap_or(DEFAULT_BUFFER_FRAMES).max(1)
    }

    pub fn reverse_stereo(&self) -> bool {
        self.reverse_stereo.unwrap_or(false)
    }

    pub fn music_device(&self) -> &str {
        self.music_device.as_deref().unwrap_or(AUTO_DEVICE)
    }

    pub fn music_volume(&self) -> u16 {
        self.music_volume.unwrap_or(DEFAULT_VOLUME).min(MAX_MIXER_VOLUME)
    }

    pub fn sfx_volume(&self) -> u16 {
        self.sfx_volume.unwrap_or(DEFAULT_VOLUME).min(MAX_MIXER_VOLUME)
    }

    pub fn speech_volume(&self) -> u16 {
        self.speech_volume.unwrap_or(DEFAULT_VOLUME).min(MAX_MIXER_VOLUME)
    }

    pub fn mute(&self) -> bool {
        self.mute.unwrap_or(false)
    }

    /// Checks the settings that have no sensible clamped fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.output_rate();
        if rate == 0 || rate > MAX_OUTPUT_RATE {
            return Err(ConfigError::OutputRate {
                rate,
                max: MAX_OUTPUT_RATE,
            });
        }
        if self.buffer_frames == Some(0) {
            return Err(ConfigError::BufferFrames);
        }
        Ok(())
    }

    /// Creates a mixer at the configured rate with the configured volumes.
    pub fn mixer(&self) -> Mixer {
        let mixer = Mixer::new(self.output_rate());
        self.apply(&mixer);
        mixer
    }

    /// Pushes the stereo, volume and mute settings into a mixer.
    pub fn apply(&self, mixer: &Mixer) {
        mixer.set_reverse_stereo(self.reverse_stereo());
        mixer.set_volume_for_sound_type(SoundType::Music, self.music_volume());
        mixer.set_volume_for_sound_type(SoundType::Sfx, self.sfx_volume());
        mixer.set_volume_for_sound_type(SoundType::Speech, self.speech_volume());

        let mute = self.mute();
        for sound_type in [
            SoundType::Plain,
            SoundType::Music,
            SoundType::Sfx,
            SoundType::Speech,
        ] {
            mixer.mute_sound_type(sound_type, mute);
        }
    }
}
