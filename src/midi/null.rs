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
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tracing::debug;

use super::{ChannelPool, MidiChannel, MidiDriver, MidiError, MidiPort};
use crate::audio::Mixer;
use crate::music::{DeviceHandle, MusicDevice, MusicError, MusicPlugin, MusicType};

const NULL_ID: &str = "null";
const NULL_NAME: &str = "No music";

/// A port that discards everything.
struct NullPort;

impl MidiPort for NullPort {
    fn send(&self, _word: u32) {}

    fn sys_ex(&self, _data: &[u8]) {}
}

/// A driver that accepts every message and plays nothing.
pub struct NullDriver {
    pool: ChannelPool,
    open: AtomicBool,
}

impl NullDriver {
    pub fn new() -> Self {
        Self {
            pool: ChannelPool::new(Arc::new(NullPort)),
            open: AtomicBool::new(false),
        }
    }
}

impl Default for NullDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NullDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", NULL_NAME)
    }
}

impl MidiPort for NullDriver {
    fn send(&self, _word: u32) {}

    fn sys_ex(&self, _data: &[u8]) {}
}

impl MidiDriver for NullDriver {
    fn open(&self) -> Result<(), MidiError> {
        if self.open.swap(true, Ordering::AcqRel) {
            return Err(MidiError::AlreadyOpen);
        }
        debug!("Opened null music driver.");
        Ok(())
    }

    fn close(&self) {
        self.open.store(false, Ordering::Release);
        self.pool.release_all();
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn allocate_channel(&self) -> Option<Arc<dyn MidiChannel>> {
        self.pool.allocate()
    }

    fn percussion_channel(&self) -> Option<Arc<dyn MidiChannel>> {
        Some(self.pool.percussion())
    }
}

pub struct NullPlugin;

impl MusicPlugin for NullPlugin {
    fn id(&self) -> &'static str {
        NULL_ID
    }

    fn name(&self) -> &'static str {
        NULL_NAME
    }

    fn devices(&self) -> Vec<MusicDevice> {
        vec![MusicDevice::new(NULL_ID, NULL_NAME, "", MusicType::Null)]
    }

    fn create_instance(
        &self,
        _mixer: &Mixer,
        handle: DeviceHandle,
    ) -> Result<Box<dyn MidiDriver>, MusicError> {
        if !self.devices().iter().any(|device| device.handle() == handle) {
            return Err(MusicError::UnknownDevice(handle));
        }
        Ok(Box::new(NullDriver::new()))
    }
}
