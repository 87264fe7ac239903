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
use std::fmt;

/// Identifies a music device. Zero is reserved for "no device".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceHandle(u32);

impl DeviceHandle {
    pub const INVALID: DeviceHandle = DeviceHandle(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Derives a handle from a device's complete id. The hash is stable across
    /// runs so handles can be persisted.
    pub fn from_identifier(identifier: &str) -> Self {
        Self(
            identifier
                .bytes()
                .fold(0u32, |hash, byte| hash.wrapping_mul(31).wrapping_add(byte as u32)),
        )
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// The kind of music a device produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicType {
    Invalid,
    Auto,
    Null,
    PcSpeaker,
    PcJr,
    Adlib,
    Gm,
    Mt32,
    Gs,
}

impl fmt::Display for MusicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MusicType::Invalid => "invalid",
            MusicType::Auto => "auto",
            MusicType::Null => "null",
            MusicType::PcSpeaker => "pcspeaker",
            MusicType::PcJr => "pcjr",
            MusicType::Adlib => "adlib",
            MusicType::Gm => "gm",
            MusicType::Mt32 => "mt32",
            MusicType::Gs => "gs",
        };
        write!(f, "{}", name)
    }
}

/// A device offered by a music plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicDevice {
    name: String,
    driver_name: String,
    driver_id: String,
    music_type: MusicType,
    handle: DeviceHandle,
}

impl MusicDevice {
    /// An empty `name` denotes the plugin's default device.
    pub fn new(driver_id: &str, driver_name: &str, name: &str, music_type: MusicType) -> Self {
        let mut device = Self {
            name: name.to_string(),
            driver_name: driver_name.to_string(),
            driver_id: driver_id.to_string(),
            music_type,
            handle: DeviceHandle::INVALID,
        };
        device.handle = DeviceHandle::from_identifier(&device.complete_id());
        device
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn music_driver_name(&self) -> &str {
        &self.driver_name
    }

    pub fn music_driver_id(&self) -> &str {
        &self.driver_id
    }

    pub fn music_type(&self) -> MusicType {
        self.music_type
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// "Device [Driver]", or just the driver name for the default device.
    pub fn complete_name(&self) -> String {
        if self.name.is_empty() {
            self.driver_name.clone()
        } else {
            format!("{} [{}]", self.name, self.driver_name)
        }
    }

    /// "driver_Device", or just the driver id for the default device.
    pub fn complete_id(&self) -> String {
        if self.name.is_empty() {
            self.driver_id.clone()
        } else {
            format!("{}_{}", self.driver_id, self.name)
        }
    }
}

impl fmt::Display for MusicDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.complete_name(),
            self.complete_id(),
            self.music_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_handle_validity() {
        assert!(!DeviceHandle::INVALID.is_valid());
        assert!(!DeviceHandle::default().is_valid());
        assert!(DeviceHandle::new(1).is_valid());
        assert!(DeviceHandle::new(u32::MAX).is_valid());
        assert_eq!(DeviceHandle::new(42).value(), 42);
    }

    #[test]
    fn test_identifier_hash() {
        assert_eq!(DeviceHandle::from_identifier("").value(), 0);
        assert_eq!(DeviceHandle::from_identifier("a").value(), 97);
        assert_eq!(DeviceHandle::from_identifier("ab").value(), 97 * 31 + 98);
        assert_eq!(
            DeviceHandle::from_identifier("pcspk"),
            DeviceHandle::from_identifier("pcspk")
        );
        assert_ne!(
            DeviceHandle::from_identifier("pcspk"),
            DeviceHandle::from_identifier("pcjr")
        );
    }

    #[test]
    fn test_default_device_names() {
        let device = MusicDevice::new("pcspk", "PC Speaker Emulator", "", MusicType::PcSpeaker);
        assert_eq!(device.complete_id(), "pcspk");
        assert_eq!(device.complete_name(), "PC Speaker Emulator");
        assert_eq!(device.handle(), DeviceHandle::from_identifier("pcspk"));
        assert!(device.handle().is_valid());
    }

    #[test]
    fn test_named_device_names() {
        let device = MusicDevice::new("pcspk", "PC Speaker Emulator", "X", MusicType::PcSpeaker);
        assert_eq!(device.complete_id(), "pcspk_X");
        assert_eq!(device.complete_name(), "X [PC Speaker Emulator]");
        assert_eq!(device.handle(), DeviceHandle::from_identifier("pcspk_X"));
        assert_eq!(device.name(), "X");
        assert_eq!(device.music_driver_id(), "pcspk");
        assert_eq!(device.music_driver_name(), "PC Speaker Emulator");
        assert_eq!(device.music_type(), MusicType::PcSpeaker);
    }

    #[test]
    fn test_display() {
        let device = MusicDevice::new("null", "No music", "", MusicType::Null);
        assert_eq!(device.to_string(), "No music (null, null)");
        assert_eq!(DeviceHandle::new(0xBEEF).to_string(), "0x0000beef");
    }
}
