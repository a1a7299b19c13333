//! Backends, device aims, and the compiled-in backend list.

use crate::Result;
use sio_sys::{SoundIoBackend, SoundIoDeviceAim};
use std::fmt;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    #[default]
    None = 0,
    Jack,
    PulseAudio,
    Alsa,
    CoreAudio,
    Wasapi,
    Dummy,
}

impl Backend {
    pub const ALL: [Backend; 6] = [
        Backend::Jack,
        Backend::PulseAudio,
        Backend::Alsa,
        Backend::CoreAudio,
        Backend::Wasapi,
        Backend::Dummy,
    ];

    pub fn from_raw(raw: SoundIoBackend) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.to_raw() == raw)
            .unwrap_or(Backend::None)
    }

    pub fn to_raw(self) -> SoundIoBackend {
        self as SoundIoBackend
    }

    pub fn name(self) -> &'static str {
        backend_name(self)
    }

    /// Case-insensitive lookup by [`backend_name`], for command lines.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(backend_name(*self))
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceAim {
    /// Capture / recording.
    Input = 0,
    /// Playback.
    Output = 1,
}

impl DeviceAim {
    pub fn from_raw(raw: SoundIoDeviceAim) -> Self {
        if raw == sio_sys::SOUNDIO_DEVICE_AIM_INPUT {
            DeviceAim::Input
        } else {
            DeviceAim::Output
        }
    }

    pub fn to_raw(self) -> SoundIoDeviceAim {
        self as SoundIoDeviceAim
    }
}

pub fn backend_name(backend: Backend) -> &'static str {
    match backend {
        Backend::None => "(none)",
        Backend::Jack => "JACK",
        Backend::PulseAudio => "PulseAudio",
        Backend::Alsa => "ALSA",
        Backend::CoreAudio => "CoreAudio",
        Backend::Wasapi => "WASAPI",
        Backend::Dummy => "Dummy",
    }
}

/// Number of backends compiled into the loaded library.
pub fn backend_count() -> Result<usize> {
    let api = sio_sys::load()?;
    // The count and list are static in the library; the context argument is unused.
    let count = unsafe { (api.backend_count)(std::ptr::null_mut()) };
    Ok(count.max(0) as usize)
}

/// Compiled-in backend at `index`, in the library's preference order.
pub fn backend(index: usize) -> Result<Option<Backend>> {
    if index >= backend_count()? {
        return Ok(None);
    }
    let api = sio_sys::load()?;
    let raw = unsafe { (api.get_backend)(std::ptr::null_mut(), index as i32) };
    Ok(Some(Backend::from_raw(raw)))
}

pub fn have_backend(backend: Backend) -> Result<bool> {
    let api = sio_sys::load()?;
    Ok(unsafe { (api.have_backend)(backend.to_raw()) })
}
