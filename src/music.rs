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

//! Music device selection: devices offered by plugins and the registry that
//! maps a selection to a driver.

pub mod device;
pub mod plugin;
pub mod registry;

pub use device::{DeviceHandle, MusicDevice, MusicType};
pub use plugin::{MusicPlugin, PluginFactory};
pub use registry::{DeviceString, PluginRegistry};

use crate::midi::MidiError;

#[derive(Debug, thiserror::Error)]
pub enum MusicError {
    #[error("no music device with handle {0}")]
    UnknownDevice(DeviceHandle),

    #[error("music device {0} is not available")]
    Unavailable(String),

    #[error(transparent)]
    Midi(#[from] MidiError),
}
