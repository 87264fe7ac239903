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
use std::path::Path;

use config::{Config, Environment, File};

mod audio;
pub mod error;

pub use self::audio::Audio;
pub use self::error::ConfigError;

/// Prefix of environment variables that override file settings, e.g.
/// `RETROSOUND_OUTPUT_RATE=22050`.
const ENV_PREFIX: &str = "RETROSOUND";

/// Parses the audio configuration from a file, with environment overrides.
pub fn deserialize(path: &Path) -> Result<Audio, ConfigError> {
    let audio = Config::builder()
        .add_source(File::from(path))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?
        .try_deserialize::<Audio>()?;
    audio.validate()?;
    Ok(audio)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_deserialize_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(file, "sfx_volume: 100\nreverse_stereo: true\nmusic_device: pcspk").unwrap();

        let audio = deserialize(file.path()).unwrap();
        assert_eq!(audio.sfx_volume(), 100);
        assert!(audio.reverse_stereo());
        assert_eq!(audio.music_device(), "pcspk");
    }

    #[test]
    fn test_deserialize_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = deserialize(&dir.path().join("missing.yaml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_deserialize_rejects_bad_rates() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(file, "output_rate: 96000").unwrap();

        let result = deserialize(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::OutputRate {
                rate: 96000,
                max: 65535
            })
        ));
    }
}
