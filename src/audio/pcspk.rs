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
use std::f64::consts::PI;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::stream::AudioStream;

/// Waveform generated by the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Sine,
    Saw,
    Triangle,
    Silence,
}

impl Waveform {
    /// Amplitude (-128..=127) at offset `x` into an oscillation of `length` samples.
    fn generate(self, x: u32, length: u32) -> i16 {
        if length == 0 {
            return 0;
        }
        let half = (length / 2).max(1);

        match self {
            Waveform::Square => {
                if x < length / 2 {
                    127
                } else {
                    -128
                }
            }
            Waveform::Sine => (128.0 * (2.0 * PI * x as f64 / length as f64).sin()) as i16,
            Waveform::Saw => ((((x as u64) << 16) / length as u64 >> 8) as i32 - 128) as i16,
            Waveform::Triangle => {
                let ramp = if x < half {
                    (x as i64 * 256 / half as i64) >> 1
                } else {
                    255 - (((x - half) as i64 * 256 / half as i64) >> 1)
                };
                (ramp.clamp(0, 255) - 128) as i16
            }
            Waveform::Silence => 0,
        }
    }
}

struct SpeakerState {
    rate: u32,
    wave: Waveform,
    osc_length: u32,
    osc_samples: u32,
    /// Samples left in the current tone. `None` plays until stopped.
    remaining: Option<u64>,
    volume: u8,
}

/// A mono square/sine/saw/triangle tone generator that runs as a never-ending
/// stream. Clones control the same speaker, so one clone can sit in the mixer
/// while another is driven by the music code.
#[derive(Clone)]
pub struct PcSpeaker {
    state: Arc<Mutex<SpeakerState>>,
}

impl PcSpeaker {
    pub fn new(rate: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(SpeakerState {
                rate,
                wave: Waveform::Square,
                osc_length: 0,
                osc_samples: 0,
                remaining: Some(0),
                volume: 255,
            })),
        }
    }

    /// Starts a tone at `frequency` Hz, replacing whatever is playing. A length
    /// of `None` plays until [`PcSpeaker::stop`].
    pub fn play(&self, wave: Waveform, frequency: u32, length_ms: Option<u32>) {
        let mut state = self.state.lock();
        state.wave = wave;
        state.osc_length = if frequency == 0 {
            0
        } else {
            state.rate / frequency
        };
        state.osc_samples = 0;
        state.remaining = length_ms.map(|ms| state.rate as u64 * ms as u64 / 1000);
        trace!(?wave, frequency, length_ms, "Speaker tone.");
    }

    pub fn stop(&self) {
        self.state.lock().remaining = Some(0);
    }

    pub fn set_volume(&self, volume: u8) {
        self.state.lock().volume = volume;
    }

    pub fn volume(&self) -> u8 {
        self.state.lock().volume
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().remaining != Some(0)
    }
}

impl AudioStream for PcSpeaker {
    fn read_buffer(&mut self, buffer: &mut [i16]) -> usize {
        let mut state = self.state.lock();
        let mut written = 0;

        while written < buffer.len() && state.remaining != Some(0) {
            let sample = state.wave.generate(state.osc_samples, state.osc_length);
            buffer[written] = sample * state.volume as i16;
            written += 1;

            state.osc_samples += 1;
            if state.osc_samples >= state.osc_length {
                state.osc_samples = 0;
            }
            if let Some(remaining) = state.remaining.as_mut() {
                *remaining -= 1;
            }
        }

        buffer[written..].fill(0);
        buffer.len()
    }

    fn is_stereo(&self) -> bool {
        false
    }

    fn rate(&self) -> u32 {
        self.state.lock().rate
    }

    fn end_of_data(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_wave() {
        let mut speaker = PcSpeaker::new(8000);
        speaker.set_volume(1);
        speaker.play(Waveform::Square, 2000, None);

        let mut buffer = [0i16; 8];
        assert_eq!(speaker.read_buffer(&mut buffer), 8);
        assert_eq!(buffer, [127, 127, -128, -128, 127, 127, -128, -128]);
        assert!(speaker.is_playing());
    }

    #[test]
    fn test_volume_scales_output() {
        let mut speaker = PcSpeaker::new(8000);
        assert_eq!(speaker.volume(), 255);
        speaker.play(Waveform::Square, 2000, None);

        let mut buffer = [0i16; 4];
        speaker.read_buffer(&mut buffer);
        assert_eq!(buffer, [127 * 255, 127 * 255, -128 * 255, -128 * 255]);
    }

    #[test]
    fn test_timed_tone_then_silence() {
        let mut speaker = PcSpeaker::new(8000);
        speaker.set_volume(1);
        // 1ms at 8000Hz is eight samples.
        speaker.play(Waveform::Square, 2000, Some(1));

        let mut buffer = [1i16; 12];
        assert_eq!(speaker.read_buffer(&mut buffer), 12);
        assert!(buffer[..8].iter().all(|&s| s != 0));
        assert!(buffer[8..].iter().all(|&s| s == 0));
        assert!(!speaker.is_playing());
        assert!(!speaker.end_of_data());
    }

    #[test]
    fn test_stop() {
        let mut speaker = PcSpeaker::new(8000);
        let control = speaker.clone();
        control.play(Waveform::Saw, 1000, None);
        assert!(speaker.is_playing());

        control.stop();
        let mut buffer = [5i16; 4];
        speaker.read_buffer(&mut buffer);
        assert_eq!(buffer, [0; 4]);
    }

    #[test]
    fn test_zero_frequency_is_silent() {
        let mut speaker = PcSpeaker::new(8000);
        speaker.play(Waveform::Square, 0, None);

        let mut buffer = [5i16; 4];
        speaker.read_buffer(&mut buffer);
        assert_eq!(buffer, [0; 4]);
    }

    #[test]
    fn test_waveform_shapes() {
        assert_eq!(Waveform::Sine.generate(0, 8), 0);
        assert_eq!(Waveform::Sine.generate(2, 8), 128);
        assert_eq!(Waveform::Saw.generate(0, 8), -128);
        assert_eq!(Waveform::Saw.generate(4, 8), 0);
        assert_eq!(Waveform::Triangle.generate(0, 8), -128);
        assert_eq!(Waveform::Triangle.generate(4, 8), 127);
        assert_eq!(Waveform::Silence.generate(3, 8), 0);
    }
}
