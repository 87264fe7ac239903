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
use std::collections::HashMap;

use tracing::{debug, info, span, warn, Level};

use super::{
    DeviceHandle, MusicDevice, MusicError, MusicPlugin, MusicType, PluginFactory,
};
use crate::audio::Mixer;
use crate::midi::{
    midir::MidirPlugin, null::NullPlugin, pcspk::PcSpeakerPlugin, MidiDriver,
};

/// Identifier that asks for automatic device selection.
pub const AUTO_DEVICE: &str = "auto";

fn null_plugin() -> Box<dyn MusicPlugin> {
    Box::new(NullPlugin)
}

fn pcspk_plugin() -> Box<dyn MusicPlugin> {
    Box::new(PcSpeakerPlugin)
}

fn midir_plugin() -> Box<dyn MusicPlugin> {
    Box::new(MidirPlugin)
}

/// Which string describing a device to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceString {
    DriverName,
    DriverId,
    DeviceName,
    DeviceId,
}

/// The set of music plugins and a snapshot of the devices they offer.
pub struct PluginRegistry {
    plugins: Vec<Box<dyn MusicPlugin>>,
    /// Each device with the index of the plugin that offers it.
    devices: Vec<(usize, MusicDevice)>,
}

impl PluginRegistry {
    /// Instantiates the plugins in order and collects their devices.
    pub fn new(factories: &[PluginFactory]) -> Self {
        let plugins: Vec<Box<dyn MusicPlugin>> =
            factories.iter().map(|factory| factory()).collect();

        let mut seen: HashMap<DeviceHandle, String> = HashMap::new();
        let mut devices = Vec::new();
        for (index, plugin) in plugins.iter().enumerate() {
            for device in plugin.devices() {
                if !device.handle().is_valid() {
                    warn!(
                        plugin = plugin.id(),
                        device = device.complete_id(),
                        "Music device id hashes to the invalid handle, skipping it."
                    );
                    continue;
                }
                if let Some(existing) = seen.insert(device.handle(), device.complete_id()) {
                    warn!(
                        handle = %device.handle(),
                        existing = %existing,
                        device = device.complete_id(),
                        "Music device handle collision, the first device wins."
                    );
                    continue;
                }
                debug!(plugin = plugin.id(), device = %device, "Found music device.");
                devices.push((index, device));
            }
        }

        Self { plugins, devices }
    }

    /// Registers the null, PC speaker and system MIDI plugins.
    pub fn with_default_plugins() -> Self {
        Self::new(&[null_plugin, pcspk_plugin, midir_plugin])
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn MusicPlugin> {
        self.plugins.iter().map(|plugin| plugin.as_ref())
    }

    pub fn plugin(&self, id: &str) -> Option<&dyn MusicPlugin> {
        self.plugins().find(|plugin| plugin.id() == id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &MusicDevice> {
        self.devices.iter().map(|(_, device)| device)
    }

    pub fn device(&self, handle: DeviceHandle) -> Option<&MusicDevice> {
        self.entry(handle).map(|(_, device)| device)
    }

    fn entry(&self, handle: DeviceHandle) -> Option<(&dyn MusicPlugin, &MusicDevice)> {
        if !handle.is_valid() {
            return None;
        }
        self.devices
            .iter()
            .find(|(_, device)| device.handle() == handle)
            .map(|(index, device)| (self.plugins[*index].as_ref(), device))
    }

    /// Finds a device by complete id or complete name.
    pub fn device_handle(&self, identifier: &str) -> DeviceHandle {
        self.devices()
            .find(|device| device.complete_id() == identifier || device.complete_name() == identifier)
            .map_or(DeviceHandle::INVALID, |device| device.handle())
    }

    pub fn device_string(&self, handle: DeviceHandle, kind: DeviceString) -> Option<String> {
        let device = self.device(handle)?;
        Some(match kind {
            DeviceString::DriverName => device.music_driver_name().to_string(),
            DeviceString::DriverId => device.music_driver_id().to_string(),
            DeviceString::DeviceName => device.complete_name(),
            DeviceString::DeviceId => device.complete_id(),
        })
    }

    pub fn music_type(&self, handle: DeviceHandle) -> MusicType {
        self.device(handle)
            .map_or(MusicType::Invalid, |device| device.music_type())
    }

    pub fn check_device(&self, handle: DeviceHandle) -> bool {
        self.entry(handle)
            .is_some_and(|(plugin, _)| plugin.check_device(handle))
    }

    /// Creates an unopened driver for the device.
    pub fn create_driver(
        &self,
        handle: DeviceHandle,
        mixer: &Mixer,
    ) -> Result<Box<dyn MidiDriver>, MusicError> {
        let (plugin, device) = self
            .entry(handle)
            .ok_or(MusicError::UnknownDevice(handle))?;
        if !plugin.check_device(handle) {
            return Err(MusicError::Unavailable(device.complete_name()));
        }

        info!(device = %device, "Creating music driver.");
        plugin.create_instance(mixer, handle)
    }

    /// Picks a device. `preferred` is used when it names a known, available
    /// device of an accepted type. Otherwise (including "auto" and empty) the
    /// first available device of an accepted type is chosen, falling back to
    /// the null device.
    pub fn detect_device(&self, preferred: &str, accepted: &[MusicType]) -> DeviceHandle {
        let span = span!(Level::INFO, "detect music device");
        let _enter = span.enter();

        if !preferred.is_empty() && preferred != AUTO_DEVICE {
            let handle = self.device_handle(preferred);
            if !handle.is_valid() {
                warn!(device = preferred, "Unknown music device, detecting another.");
            } else if !accepted.contains(&self.music_type(handle)) {
                warn!(
                    device = preferred,
                    music_type = %self.music_type(handle),
                    "Music device type is not supported, detecting another."
                );
            } else if !self.check_device(handle) {
                warn!(device = preferred, "Music device is unavailable, detecting another.");
            } else {
                info!(device = preferred, "Using preferred music device.");
                return handle;
            }
        }

        let detected = self
            .devices()
            .filter(|device| device.music_type() != MusicType::Null)
            .filter(|device| accepted.contains(&device.music_type()))
            .find(|device| self.check_device(device.handle()))
            .or_else(|| {
                self.devices()
                    .find(|device| device.music_type() == MusicType::Null)
            });

        match detected {
            Some(device) => {
                info!(device = %device, "Detected music device.");
                device.handle()
            }
            None => {
                warn!("No music device found.");
                DeviceHandle::INVALID
            }
        }
    }
}
