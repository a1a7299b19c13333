//! Reference-counted audio devices.

use crate::{ChannelLayout, Context, DeviceAim, Error, Format, InStream, OutStream, Result};
use sio_sys::SoundIoDevice;
use std::ffi::CStr;
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::ptr::NonNull;
use std::slice;

/// Inclusive range of supported sample rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleRateRange {
    pub min: u32,
    pub max: u32,
}

impl SampleRateRange {
    pub fn contains(&self, sample_rate: u32) -> bool {
        (self.min..=self.max).contains(&sample_rate)
    }
}

/// A device enumerated by a [`Context`].
///
/// Holds one native reference: `clone` takes another and `drop` releases
/// it. Capability fields are a snapshot from the last
/// [`Context::flush_events`] that produced this device.
pub struct Device<'ctx> {
    raw: NonNull<SoundIoDevice>,
    context: &'ctx Context,
}

impl<'ctx> Device<'ctx> {
    /// Adopts one reference to `raw`. A null pointer gives
    /// [`Error::NoSuchDevice`]; a device that failed probing gives its probe
    /// error, and the reference is released.
    ///
    /// # Safety
    /// `raw` must be null or a device of `context` carrying a reference the
    /// caller hands over.
    pub unsafe fn from_raw(context: &'ctx Context, raw: *mut SoundIoDevice) -> Result<Self> {
        let raw = NonNull::new(raw).ok_or(Error::NoSuchDevice)?;
        let device = Self { raw, context };
        if let Err(err) = check_probe(device.native()) {
            tracing::warn!("device {:?} failed probing: {err}", device.name());
            return Err(err);
        }
        Ok(device)
    }

    pub fn as_raw(&self) -> *mut SoundIoDevice {
        self.raw.as_ptr()
    }

    pub fn context(&self) -> &'ctx Context {
        self.context
    }

    fn native(&self) -> &SoundIoDevice {
        unsafe { self.raw.as_ref() }
    }

    /// Stable across runs; an input and an output may share one id.
    pub fn id(&self) -> String {
        lossy(self.native().id)
    }

    pub fn name(&self) -> String {
        lossy(self.native().name)
    }

    pub fn aim(&self) -> DeviceAim {
        DeviceAim::from_raw(self.native().aim)
    }

    pub fn layouts(&self) -> Vec<ChannelLayout> {
        let native = self.native();
        unsafe { native_slice(native.layouts, native.layout_count) }
            .iter()
            .map(|raw| unsafe { ChannelLayout::from_raw(raw) })
            .collect()
    }

    pub fn layout_count(&self) -> usize {
        self.native().layout_count.max(0) as usize
    }

    pub fn current_layout(&self) -> ChannelLayout {
        unsafe { ChannelLayout::from_raw(&self.native().current_layout) }
    }

    pub fn formats(&self) -> Vec<Format> {
        let native = self.native();
        unsafe { native_slice(native.formats, native.format_count) }
            .iter()
            .map(|&raw| Format::from_raw(raw))
            .collect()
    }

    pub fn format_count(&self) -> usize {
        self.native().format_count.max(0) as usize
    }

    /// [`Format::Invalid`] when the backend does not report one.
    pub fn current_format(&self) -> Format {
        Format::from_raw(self.native().current_format)
    }

    pub fn sample_rates(&self) -> Vec<SampleRateRange> {
        let native = self.native();
        unsafe { native_slice(native.sample_rates, native.sample_rate_count) }
            .iter()
            .map(|range| SampleRateRange {
                min: range.min.max(0) as u32,
                max: range.max.max(0) as u32,
            })
            .collect()
    }

    pub fn sample_rate_count(&self) -> usize {
        self.native().sample_rate_count.max(0) as usize
    }

    /// `0` when unknown.
    pub fn sample_rate_current(&self) -> u32 {
        self.native().sample_rate_current.max(0) as u32
    }

    /// Seconds.
    pub fn software_latency_min(&self) -> f64 {
        self.native().software_latency_min
    }

    pub fn software_latency_max(&self) -> f64 {
        self.native().software_latency_max
    }

    /// `0.0` when unknown.
    pub fn software_latency_current(&self) -> f64 {
        self.native().software_latency_current
    }

    /// Raw devices bypass the sound server and are opened exclusively.
    pub fn is_raw(&self) -> bool {
        self.native().is_raw
    }

    pub fn ref_count(&self) -> usize {
        self.native().ref_count.max(0) as usize
    }

    pub fn probe_error(&self) -> Option<Error> {
        Error::from_code(self.native().probe_error)
    }

    /// Orders the native layout list by descending channel count. Shared by
    /// every clone of this device.
    pub fn sort_channel_layouts(&mut self) {
        unsafe { (self.context.api().device_sort_channel_layouts)(self.as_raw()) }
    }

    pub fn supports_format(&self, format: Format) -> bool {
        unsafe { (self.context.api().device_supports_format)(self.as_raw(), format.to_raw()) }
    }

    pub fn supports_layout(&self, layout: &ChannelLayout) -> bool {
        let raw = layout.to_raw();
        unsafe { (self.context.api().device_supports_layout)(self.as_raw(), &raw) }
    }

    pub fn supports_sample_rate(&self, sample_rate: u32) -> bool {
        let Ok(rate) = c_int::try_from(sample_rate) else {
            return false;
        };
        unsafe { (self.context.api().device_supports_sample_rate)(self.as_raw(), rate) }
    }

    /// The supported rate closest to `sample_rate`, preferring higher ones.
    pub fn nearest_sample_rate(&self, sample_rate: u32) -> u32 {
        let rate = c_int::try_from(sample_rate).unwrap_or(c_int::MAX);
        let nearest =
            unsafe { (self.context.api().device_nearest_sample_rate)(self.as_raw(), rate) };
        nearest.max(0) as u32
    }

    pub fn create_outstream(&self) -> Result<OutStream<'_>> {
        OutStream::new(self)
    }

    pub fn create_instream(&self) -> Result<InStream<'_>> {
        InStream::new(self)
    }
}

impl Clone for Device<'_> {
    fn clone(&self) -> Self {
        unsafe { (self.context.api().device_ref)(self.as_raw()) };
        Self {
            raw: self.raw,
            context: self.context,
        }
    }
}

impl Drop for Device<'_> {
    fn drop(&mut self) {
        unsafe { (self.context.api().device_unref)(self.as_raw()) };
    }
}

/// Same id, aim and raw flag.
impl PartialEq for Device<'_> {
    fn eq(&self, other: &Self) -> bool {
        unsafe { (self.context.api().device_equal)(self.as_raw(), other.as_raw()) }
    }
}

impl fmt::Debug for Device<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("aim", &self.aim())
            .field("is_raw", &self.is_raw())
            .finish_non_exhaustive()
    }
}

/// Rejects devices that failed probing.
fn check_probe(native: &SoundIoDevice) -> Result<()> {
    Error::check(native.probe_error)
}

fn lossy(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

unsafe fn native_slice<'a, T>(ptr: *const T, count: c_int) -> &'a [T] {
    if ptr.is_null() || count <= 0 {
        return &[];
    }
    slice::from_raw_parts(ptr, count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Backend, ChannelId};

    fn dummy_context() -> Option<Context> {
        let mut ctx = Context::new().ok()?;
        ctx.connect_backend(Backend::Dummy).ok()?;
        ctx.flush_events();
        Some(ctx)
    }

    #[test]
    fn test_sample_rate_range_contains() {
        let range = SampleRateRange {
            min: 8000,
            max: 48000,
        };
        assert!(range.contains(8000));
        assert!(range.contains(44100));
        assert!(range.contains(48000));
        assert!(!range.contains(96000));
    }

    fn device_with_error(probe_error: c_int) -> SoundIoDevice {
        SoundIoDevice {
            soundio: std::ptr::null_mut(),
            id: std::ptr::null_mut(),
            name: std::ptr::null_mut(),
            aim: DeviceAim::Output.to_raw(),
            layouts: std::ptr::null_mut(),
            layout_count: 0,
            current_layout: sio_sys::SoundIoChannelLayout::empty(),
            formats: std::ptr::null_mut(),
            format_count: 0,
            current_format: Format::Invalid.to_raw(),
            sample_rates: std::ptr::null_mut(),
            sample_rate_count: 0,
            sample_rate_current: 0,
            software_latency_min: 0.0,
            software_latency_max: 0.0,
            software_latency_current: 0.0,
            is_raw: false,
            ref_count: 1,
            probe_error,
        }
    }

    #[test]
    fn test_device_with_scan_error_is_rejected() {
        assert!(check_probe(&device_with_error(0)).is_ok());
        assert!(matches!(
            check_probe(&device_with_error(4)),
            Err(Error::OpeningDevice)
        ));
        assert!(matches!(
            check_probe(&device_with_error(1)),
            Err(Error::NoMem)
        ));
    }

    #[test]
    fn test_native_slice_handles_empty() {
        let empty: &[i32] = unsafe { native_slice(std::ptr::null(), 4) };
        assert!(empty.is_empty());
        let values = [1, 2, 3];
        let some = unsafe { native_slice(values.as_ptr(), 2) };
        assert_eq!(some, &[1, 2]);
        assert!(unsafe { native_slice(values.as_ptr(), -1) }.is_empty());
        assert_eq!(lossy(std::ptr::null()), "");
    }

    #[test]
    fn test_dummy_output_capabilities() {
        let Some(ctx) = dummy_context() else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        let index = ctx.default_output_device_index().unwrap();
        let device = ctx.output_device(index).unwrap();

        assert_eq!(device.aim(), DeviceAim::Output);
        assert!(!device.id().is_empty());
        assert!(!device.name().is_empty());
        assert_eq!(device.layouts().len(), device.layout_count());
        assert_eq!(device.formats().len(), device.format_count());
        assert_eq!(device.sample_rates().len(), device.sample_rate_count());
        assert!(device.probe_error().is_none());

        for format in device.formats() {
            assert!(device.supports_format(format));
        }
        for layout in device.layouts() {
            assert!(device.supports_layout(&layout));
        }
        let range = device.sample_rates()[0];
        assert!(device.supports_sample_rate(range.min));
        assert!(range.contains(device.nearest_sample_rate(range.min)));
        assert!(device.software_latency_min() <= device.software_latency_max());
    }

    #[test]
    fn test_clone_tracks_ref_count() {
        let Some(ctx) = dummy_context() else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        let device = ctx.output_device(0).unwrap();
        let before = device.ref_count();
        let copy = device.clone();
        assert_eq!(device.ref_count(), before + 1);
        assert!(copy == device);
        drop(copy);
        assert_eq!(device.ref_count(), before);
    }

    #[test]
    fn test_sort_channel_layouts() {
        let Some(ctx) = dummy_context() else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        let mut device = ctx.output_device(0).unwrap();
        device.sort_channel_layouts();
        let counts: Vec<_> = device.layouts().iter().map(|l| l.channel_count()).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));

        let odd = ChannelLayout::new("odd", &[ChannelId::Aux15]).unwrap();
        assert!(!device.supports_layout(&odd));
    }
}
