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
use std::{fmt, mem, sync::Arc};

use midir::{MidiOutput, MidiOutputConnection, MidiOutputPort};
use parking_lot::Mutex;
use tracing::{debug, error, info, span, warn, Level};

use super::{message, ChannelPool, MidiChannel, MidiDriver, MidiError, MidiPort};
use crate::audio::Mixer;
use crate::music::{DeviceHandle, MusicDevice, MusicError, MusicPlugin, MusicType};

const MIDIR_ID: &str = "midir";
const MIDIR_NAME: &str = "System MIDI";

/// Sends unpacked messages over a midir connection.
struct MidirPort {
    connection: Mutex<Option<MidiOutputConnection>>,
}

impl MidirPort {
    fn send_bytes(&self, bytes: &[u8]) {
        let mut connection = self.connection.lock();
        match connection.as_mut() {
            Some(connection) => {
                if let Err(e) = connection.send(bytes) {
                    error!(err = e.to_string(), "Error sending MIDI message.");
                }
            }
            None => debug!("MIDI output is closed, dropping message."),
        }
    }
}

impl MidiPort for MidirPort {
    fn send(&self, word: u32) {
        let (bytes, len) = message::unpack(word);
        self.send_bytes(&bytes[..len]);
    }

    fn sys_ex(&self, data: &[u8]) {
        self.send_bytes(&message::frame_sys_ex(data));
    }
}

/// A driver for a system MIDI output port.
pub struct MidirDriver {
    name: String,
    port: Arc<MidirPort>,
    pool: ChannelPool,
}

impl MidirDriver {
    /// Creates a driver for the output port with the given name. The port is
    /// looked up when the driver is opened.
    pub fn new(name: &str) -> Self {
        let port = Arc::new(MidirPort {
            connection: Mutex::new(None),
        });
        Self {
            name: name.to_string(),
            pool: ChannelPool::new(port.clone()),
            port,
        }
    }
}

impl fmt::Display for MidirDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Output)", self.name)
    }
}

impl MidiPort for MidirDriver {
    fn send(&self, word: u32) {
        self.port.send(word);
    }

    fn sys_ex(&self, data: &[u8]) {
        self.port.sys_ex(data);
    }
}

impl MidiDriver for MidirDriver {
    fn open(&self) -> Result<(), MidiError> {
        let span = span!(Level::INFO, "open (midir)");
        let _enter = span.enter();

        let mut connection = self.port.connection.lock();
        if connection.is_some() {
            return Err(MidiError::AlreadyOpen);
        }

        let output = MidiOutput::new("retrosound output")?;
        let output_port = find_port(&output, &self.name)?
            .ok_or_else(|| MidiError::PortNotFound(self.name.clone()))?;

        *connection = Some(
            output
                .connect(&output_port, "retrosound")
                .map_err(|e| MidiError::Connection(e.to_string()))?,
        );

        info!(device = self.name, "Opened MIDI output.");
        Ok(())
    }

    fn close(&self) {
        if !self.is_open() {
            return;
        }

        self.pool.all_notes_off();
        self.pool.release_all();

        // Explicitly close the connection.
        if let Some(connection) = self.port.connection.lock().take() {
            mem::drop(connection.close());
        }
        info!(device = self.name, "Closed MIDI output.");
    }

    fn is_open(&self) -> bool {
        self.port.connection.lock().is_some()
    }

    fn allocate_channel(&self) -> Option<Arc<dyn MidiChannel>> {
        self.pool.allocate()
    }

    fn percussion_channel(&self) -> Option<Arc<dyn MidiChannel>> {
        Some(self.pool.percussion())
    }
}

fn find_port(output: &MidiOutput, name: &str) -> Result<Option<MidiOutputPort>, MidiError> {
    for port in output.ports() {
        if output.port_name(&port)? == name {
            return Ok(Some(port));
        }
    }
    Ok(None)
}

/// Lists the names of the system's MIDI output ports.
pub fn list_output_ports() -> Result<Vec<String>, MidiError> {
    let output = MidiOutput::new("retrosound output listing")?;
    let mut names = output
        .ports()
        .iter()
        .map(|port| output.port_name(port))
        .collect::<Result<Vec<String>, _>>()?;
    names.sort();
    names.dedup();
    Ok(names)
}

/// Offers one General MIDI device per system output port.
pub struct MidirPlugin;

impl MidirPlugin {
    fn device_name(&self, handle: DeviceHandle) -> Option<String> {
        self.devices()
            .into_iter()
            .find(|device| device.handle() == handle)
            .map(|device| device.name().to_string())
    }
}

impl MusicPlugin for MidirPlugin {
    fn id(&self) -> &'static str {
        MIDIR_ID
    }

    fn name(&self) -> &'static str {
        MIDIR_NAME
    }

    fn devices(&self) -> Vec<MusicDevice> {
        match list_output_ports() {
            Ok(names) => names
                .iter()
                .map(|name| MusicDevice::new(MIDIR_ID, MIDIR_NAME, name, MusicType::Gm))
                .collect(),
            Err(e) => {
                warn!(err = e.to_string(), "Unable to list MIDI output ports.");
                Vec::new()
            }
        }
    }

    fn check_device(&self, handle: DeviceHandle) -> bool {
        self.device_name(handle).is_some()
    }

    fn create_instance(
        &self,
        _mixer: &Mixer,
        handle: DeviceHandle,
    ) -> Result<Box<dyn MidiDriver>, MusicError> {
        let name = self
            .device_name(handle)
            .ok_or(MusicError::UnknownDevice(handle))?;
        Ok(Box::new(MidirDriver::new(&name)))
    }
}
