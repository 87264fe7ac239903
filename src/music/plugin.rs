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
use crate::audio::Mixer;
use crate::midi::MidiDriver;

use super::{DeviceHandle, MusicDevice, MusicError};

/// A music backend. Offers devices and creates drivers for them.
pub trait MusicPlugin: Send + Sync {
    /// Short machine readable id, used as the prefix of device ids.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// The devices this plugin offers, in a stable order.
    fn devices(&self) -> Vec<MusicDevice>;

    /// Whether the device can be used right now.
    fn check_device(&self, _handle: DeviceHandle) -> bool {
        true
    }

    /// Creates an unopened driver for one of this plugin's devices. Synthesizer
    /// backends render through `mixer`.
    fn create_instance(
        &self,
        mixer: &Mixer,
        handle: DeviceHandle,
    ) -> Result<Box<dyn MidiDriver>, MusicError>;
}

pub type PluginFactory = fn() -> Box<dyn MusicPlugin>;
