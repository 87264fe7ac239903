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
use std::{
    error::Error,
    io::{Seek, Write},
    path::Path,
    time::Duration,
};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{info, span, Level};

use crate::audio::Mixer;
use crate::midi::MidiChannel;

const NOTE_VELOCITY: u8 = 127;

/// Number of output frames covering `duration` at `rate`.
pub fn frames_for(duration: Duration, rate: u32) -> usize {
    (duration.as_micros() * rate as u128 / 1_000_000) as usize
}

/// Plays `notes` one after another on `channel` and writes the mixer's output
/// to a 16-bit stereo WAV file. Each note sounds for `note_length`. Returns the
/// number of frames written.
pub fn render_sequence(
    mixer: &Mixer,
    channel: &dyn MidiChannel,
    notes: &[u8],
    note_length: Duration,
    buffer_frames: usize,
    path: &Path,
) -> Result<usize, Box<dyn Error>> {
    let span = span!(Level::INFO, "render sequence");
    let _enter = span.enter();

    let spec = WavSpec {
        channels: 2,
        sample_rate: mixer.output_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    let mut buffer = vec![0i16; buffer_frames.max(1) * 2];
    let frames_per_note = frames_for(note_length, mixer.output_rate());

    let mut written = 0;
    for &note in notes {
        channel.note_on(note, NOTE_VELOCITY);
        written += mix_into(mixer, &mut writer, &mut buffer, frames_per_note)?;
        channel.note_off(note);
    }
    writer.finalize()?;

    info!(
        path = %path.display(),
        notes = notes.len(),
        frames = written,
        "Rendered sequence."
    );
    Ok(written)
}

/// Pulls `frames` frames through the mixer in buffer sized passes.
fn mix_into<W: Write + Seek>(
    mixer: &Mixer,
    writer: &mut WavWriter<W>,
    buffer: &mut [i16],
    frames: usize,
) -> Result<usize, hound::Error> {
    let mut remaining = frames;
    while remaining > 0 {
        let chunk = remaining.min(buffer.len() / 2);
        let samples = &mut buffer[..chunk * 2];
        mixer.mix_callback(samples);
        for &sample in samples.iter() {
            writer.write_sample(sample)?;
        }
        remaining -= chunk;
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::{null::NullDriver, pcspk::PcSpeakerDriver, MidiDriver};

    #[test]
    fn test_frames_for() {
        assert_eq!(frames_for(Duration::from_millis(10), 8000), 80);
        assert_eq!(frames_for(Duration::from_secs(1), 44100), 44100);
        assert_eq!(frames_for(Duration::ZERO, 44100), 0);
    }

    #[test]
    fn test_render_pc_speaker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scale.wav");

        let mixer = Mixer::new(8000);
        let driver = PcSpeakerDriver::new(&mixer);
        driver.open().unwrap();
        let channel = driver.allocate_channel().unwrap();

        let frames = render_sequence(
            &mixer,
            channel.as_ref(),
            &[69, 81],
            Duration::from_millis(10),
            32,
            &path,
        )
        .unwrap();
        assert_eq!(frames, 160);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 320);
        assert!(samples.iter().any(|&s| s != 0));
        // Left and right carry the same mono tone.
        assert!(samples.chunks_exact(2).all(|frame| frame[0] == frame[1]));
    }

    #[test]
    fn test_render_null_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");

        let mixer = Mixer::new(11025);
        let driver = NullDriver::new();
        let channel = driver.allocate_channel().unwrap();

        let frames = render_sequence(
            &mixer,
            channel.as_ref(),
            &[60, 62, 64],
            Duration::from_millis(20),
            1024,
            &path,
        )
        .unwrap();
        assert_eq!(frames, 3 * 220);

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert!(reader.samples::<i16>().all(|s| s.unwrap() == 0));
    }
}
