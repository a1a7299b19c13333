//! `#[repr(C)]` mirrors of the public libsoundio 2.x structs.
//!
//! Enumerations are kept as plain `c_int` so values written by the library
//! can never produce an invalid Rust enum; the safe crate converts them.

use std::os::raw::{c_char, c_double, c_float, c_int, c_void};

pub const SOUNDIO_MAX_CHANNELS: usize = 24;

pub type SoundIoError = c_int;
pub type SoundIoBackend = c_int;
pub type SoundIoDeviceAim = c_int;
pub type SoundIoFormat = c_int;
pub type SoundIoChannelId = c_int;

pub const SOUNDIO_ERROR_NONE: SoundIoError = 0;

pub const SOUNDIO_BACKEND_NONE: SoundIoBackend = 0;
pub const SOUNDIO_BACKEND_DUMMY: SoundIoBackend = 6;

pub const SOUNDIO_DEVICE_AIM_INPUT: SoundIoDeviceAim = 0;
pub const SOUNDIO_DEVICE_AIM_OUTPUT: SoundIoDeviceAim = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SoundIoChannelLayout {
    pub name: *const c_char,
    pub channel_count: c_int,
    pub channels: [SoundIoChannelId; SOUNDIO_MAX_CHANNELS],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundIoSampleRateRange {
    pub min: c_int,
    pub max: c_int,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SoundIoChannelArea {
    pub ptr: *mut c_char,
    /// Bytes between consecutive samples of this channel.
    pub step: c_int,
}

#[repr(C)]
pub struct SoundIo {
    pub userdata: *mut c_void,
    pub on_devices_change: Option<unsafe extern "C" fn(*mut SoundIo)>,
    pub on_backend_disconnect: Option<unsafe extern "C" fn(*mut SoundIo, c_int)>,
    pub on_events_signal: Option<unsafe extern "C" fn(*mut SoundIo)>,
    pub current_backend: SoundIoBackend,
    pub app_name: *const c_char,
    pub emit_rtprio_warning: Option<unsafe extern "C" fn()>,
    pub jack_info_callback: Option<unsafe extern "C" fn(*const c_char)>,
    pub jack_error_callback: Option<unsafe extern "C" fn(*const c_char)>,
}

#[repr(C)]
pub struct SoundIoDevice {
    pub soundio: *mut SoundIo,
    pub id: *mut c_char,
    pub name: *mut c_char,
    pub aim: SoundIoDeviceAim,
    pub layouts: *mut SoundIoChannelLayout,
    pub layout_count: c_int,
    pub current_layout: SoundIoChannelLayout,
    pub formats: *mut SoundIoFormat,
    pub format_count: c_int,
    pub current_format: SoundIoFormat,
    pub sample_rates: *mut SoundIoSampleRateRange,
    pub sample_rate_count: c_int,
    pub sample_rate_current: c_int,
    pub software_latency_min: c_double,
    pub software_latency_max: c_double,
    pub software_latency_current: c_double,
    pub is_raw: bool,
    pub ref_count: c_int,
    pub probe_error: c_int,
}

#[repr(C)]
pub struct SoundIoOutStream {
    pub device: *mut SoundIoDevice,
    pub format: SoundIoFormat,
    pub sample_rate: c_int,
    pub layout: SoundIoChannelLayout,
    pub software_latency: c_double,
    pub volume: c_float,
    pub userdata: *mut c_void,
    pub write_callback: Option<unsafe extern "C" fn(*mut SoundIoOutStream, c_int, c_int)>,
    pub underflow_callback: Option<unsafe extern "C" fn(*mut SoundIoOutStream)>,
    pub error_callback: Option<unsafe extern "C" fn(*mut SoundIoOutStream, c_int)>,
    pub name: *const c_char,
    pub non_terminal_hint: bool,
    pub bytes_per_frame: c_int,
    pub bytes_per_sample: c_int,
    pub layout_error: c_int,
}

#[repr(C)]
pub struct SoundIoInStream {
    pub device: *mut SoundIoDevice,
    pub format: SoundIoFormat,
    pub sample_rate: c_int,
    pub layout: SoundIoChannelLayout,
    pub software_latency: c_double,
    pub userdata: *mut c_void,
    pub read_callback: Option<unsafe extern "C" fn(*mut SoundIoInStream, c_int, c_int)>,
    pub overflow_callback: Option<unsafe extern "C" fn(*mut SoundIoInStream)>,
    pub error_callback: Option<unsafe extern "C" fn(*mut SoundIoInStream, c_int)>,
    pub name: *const c_char,
    pub non_terminal_hint: bool,
    pub bytes_per_frame: c_int,
    pub bytes_per_sample: c_int,
    pub layout_error: c_int,
}

/// Opaque; only ever handled by pointer.
#[repr(C)]
pub struct SoundIoRingBuffer {
    _private: [u8; 0],
}

impl SoundIoChannelLayout {
    pub const fn empty() -> Self {
        Self {
            name: std::ptr::null(),
            channel_count: 0,
            channels: [0; SOUNDIO_MAX_CHANNELS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn test_channel_layout_abi() {
        let ptr = size_of::<*const c_char>();
        let expected = ptr + size_of::<c_int>() * (1 + SOUNDIO_MAX_CHANNELS);
        // Pointer alignment pads the tail on 64-bit targets
        let expected = expected.div_ceil(align_of::<*const c_char>()) * align_of::<*const c_char>();
        assert_eq!(size_of::<SoundIoChannelLayout>(), expected);
    }

    #[test]
    fn test_small_structs_abi() {
        assert_eq!(size_of::<SoundIoSampleRateRange>(), 8);
        assert_eq!(
            size_of::<SoundIoChannelArea>(),
            2 * size_of::<*mut c_char>()
        );
    }

    #[test]
    fn test_empty_layout() {
        let layout = SoundIoChannelLayout::empty();
        assert!(layout.name.is_null());
        assert_eq!(layout.channel_count, 0);
        assert!(layout.channels.iter().all(|&c| c == 0));
    }
}
