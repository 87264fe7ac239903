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
use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{crate_version, Args, Parser, Subcommand};
use duration_string::DurationString;
use retrosound::audio::{cpal::Device, Mixer};
use retrosound::config::{self, Audio};
use retrosound::midi::MidiDriver;
use retrosound::music::{MusicType, PluginRegistry};
use retrosound::render;
use tracing::info;

/// C major, middle C up one octave.
const SCALE: [u8; 8] = [60, 62, 64, 65, 67, 69, 71, 72];

const DEFAULT_NOTE_LENGTH: Duration = Duration::from_millis(250);

/// Music types the scale can be played on.
const PLAYABLE_TYPES: [MusicType; 4] = [
    MusicType::PcSpeaker,
    MusicType::Gm,
    MusicType::Gs,
    MusicType::Mt32,
];

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A retro game audio mixer and music driver toolkit."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct MusicArgs {
    /// The path to the audio config.
    #[arg[short, long]]
    config: Option<String>,
    /// The music device to use, by id or name. Overrides the config.
    #[arg[short, long]]
    music_device: Option<String>,
    /// How long each note sounds, e.g. 250ms.
    #[arg[short, long]]
    note_length: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available audio output devices.
    Devices {},
    /// Lists the available music devices.
    MusicDevices {},
    /// Renders a scale on the music device to a WAV file.
    Render {
        /// The WAV file to write.
        output: String,
        #[clap(flatten)]
        music: MusicArgs,
    },
    /// Plays a scale on the music device through the audio output.
    Play {
        #[clap(flatten)]
        music: MusicArgs,
    },
}

fn load_config(path: &Option<String>) -> Result<Audio, Box<dyn Error>> {
    match path {
        Some(path) => Ok(config::deserialize(&PathBuf::from(path))?),
        None => Ok(Audio::default()),
    }
}

fn note_length(note_length: &Option<String>) -> Result<Duration, Box<dyn Error>> {
    match note_length {
        Some(note_length) => Ok(DurationString::from_string(note_length.clone())?.into()),
        None => Ok(DEFAULT_NOTE_LENGTH),
    }
}

/// Detects, creates and opens the music driver.
fn open_music_driver(
    audio: &Audio,
    music_device: &Option<String>,
    mixer: &Mixer,
) -> Result<Box<dyn MidiDriver>, Box<dyn Error>> {
    let registry = PluginRegistry::with_default_plugins();
    let preferred = music_device.as_deref().unwrap_or(audio.music_device());
    let handle = registry.detect_device(preferred, &PLAYABLE_TYPES);
    if !handle.is_valid() {
        return Err("no music device available".into());
    }

    let driver = registry.create_driver(handle, mixer)?;
    driver.open()?;
    info!(driver = %driver, "Opened music driver.");
    Ok(driver)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices {} => {
            let devices = Device::list()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::MusicDevices {} => {
            let registry = PluginRegistry::with_default_plugins();

            println!("Music devices:");
            for device in registry.devices() {
                let available = if registry.check_device(device.handle()) {
                    ""
                } else {
                    " (unavailable)"
                };
                println!("- {}{}", device, available);
            }
        }
        Commands::Render { output, music } => {
            let audio = load_config(&music.config)?;
            let note_length = note_length(&music.note_length)?;
            let mixer = audio.mixer();

            let driver = open_music_driver(&audio, &music.music_device, &mixer)?;
            let channel = driver
                .allocate_channel()
                .ok_or("no free channel on the music device")?;

            let frames = render::render_sequence(
                &mixer,
                channel.as_ref(),
                &SCALE,
                note_length,
                audio.buffer_frames(),
                &PathBuf::from(&output),
            )?;
            driver.close();

            println!("Wrote {} frames to {}.", frames, output);
        }
        Commands::Play { music } => {
            let audio = load_config(&music.config)?;
            let note_length = note_length(&music.note_length)?;
            let mixer = audio.mixer();

            let device = Device::get(audio.device())?;
            let _stream = device.start(&mixer)?;

            let driver = open_music_driver(&audio, &music.music_device, &mixer)?;
            let channel = driver
                .allocate_channel()
                .ok_or("no free channel on the music device")?;

            for note in SCALE {
                channel.note_on(note, 127);
                thread::sleep(note_length);
                channel.note_off(note);
            }
            driver.close();
        }
    }

    Ok(())
}
