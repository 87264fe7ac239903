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
use std::{error::Error, fmt};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info, span, Level};

use crate::audio::mixer::Mixer;

/// The mixer always produces interleaved stereo.
const OUTPUT_CHANNELS: u16 = 2;

/// A small wrapper around a cpal::Device.
pub struct Device {
    /// The name of the device.
    name: String,
    /// The maximum number of channels the device supports.
    max_channels: u16,
    /// The host ID of the device.
    host_id: cpal::HostId,
    /// The underlying cpal device.
    device: cpal::Device,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}) ({})",
            self.name,
            self.max_channels,
            self.host_id.name()
        )
    }
}

/// A running output stream. Output stops when this is dropped.
pub struct OutputStream {
    _stream: cpal::Stream,
}

impl Device {
    /// Lists cpal output devices.
    pub fn list() -> Result<Vec<Device>, Box<dyn Error>> {
        // Suppress noisy output here.
        let _shh_stdout = shh::stdout()?;
        let _shh_stderr = shh::stderr()?;

        let mut devices: Vec<Device> = Vec::new();
        for host_id in cpal::available_hosts() {
            let host_devices = match cpal::host_from_id(host_id)?.devices() {
                Ok(host_devices) => host_devices,
                Err(e) => {
                    error!(
                        err = e.to_string(),
                        host = host_id.name(),
                        "Unable to list devices for host"
                    );
                    continue;
                }
            };

            for device in host_devices {
                let output_configs = match device.supported_output_configs() {
                    Ok(output_configs) => output_configs,
                    Err(_) => continue,
                };

                let max_channels = output_configs
                    .map(|output_config| output_config.channels())
                    .max()
                    .unwrap_or(0);

                if max_channels >= OUTPUT_CHANNELS {
                    devices.push(Device {
                        name: device.name()?,
                        max_channels,
                        host_id,
                        device,
                    })
                }
            }
        }

        devices.sort_by_key(|device| device.name.to_string());
        Ok(devices)
    }

    /// Gets the named cpal device, or the default output device when no name is given.
    pub fn get(name: Option<&str>) -> Result<Device, Box<dyn Error>> {
        match name {
            Some(name) => Device::list()?
                .into_iter()
                .find(|device| device.name.trim() == name)
                .ok_or_else(|| format!("no device found with name {}", name).into()),
            None => {
                let host = cpal::default_host();
                let device = host
                    .default_output_device()
                    .ok_or("no default output device")?;
                Ok(Device {
                    name: device.name()?,
                    max_channels: OUTPUT_CHANNELS,
                    host_id: host.id(),
                    device,
                })
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opens a 16-bit stereo output stream at the mixer's rate and feeds it from
    /// the mixer's callback.
    pub fn start(&self, mixer: &Mixer) -> Result<OutputStream, Box<dyn Error>> {
        let span = span!(Level::INFO, "output stream (cpal)");
        let _enter = span.enter();

        let config = cpal::StreamConfig {
            channels: OUTPUT_CHANNELS,
            sample_rate: mixer.output_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let mixer = mixer.clone();
        let stream = self.device.build_output_stream(
            &config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                mixer.mix_callback(data);
            },
            |err| error!("CPAL output stream error: {}", err),
            None,
        )?;
        stream.play()?;

        info!(
            device = self.name,
            rate = config.sample_rate,
            "CPAL output stream started successfully"
        );

        Ok(OutputStream { _stream: stream })
    }
}
