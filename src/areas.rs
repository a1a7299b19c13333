//! Channel areas handed out by `begin_write` / `begin_read`.

use sio_sys::SoundIoChannelArea;
use std::marker::PhantomData;
use std::mem::size_of;

mod sealed {
    pub trait Sealed {}
}

/// Plain sample types that can be stored in a channel area.
///
/// The caller picks the type matching the stream's [`crate::Format`]; only the
/// width is checked.
pub trait Sample: sealed::Sealed + Copy + Send + 'static {}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}
            impl Sample for $t {}
        )*
    };
}

impl_sample!(i8, u8, i16, u16, i32, u32, f32, f64);

/// One channel's region: the first sample and the byte distance to the next.
#[derive(Debug, Clone, Copy)]
pub struct ChannelArea {
    pub ptr: *mut u8,
    pub step: usize,
}

/// The areas of one `begin_write`/`begin_read` region, valid until the
/// matching end call.
///
/// An input region the backend could not fill (a *hole*) has no areas;
/// reading it yields `None` and the frames should be treated as silence.
pub struct ChannelAreas<'a> {
    areas: *mut SoundIoChannelArea,
    channel_count: usize,
    frame_count: usize,
    bytes_per_sample: usize,
    _region: PhantomData<&'a mut [u8]>,
}

impl<'a> ChannelAreas<'a> {
    /// # Safety
    /// `areas` must be null or point to `channel_count` areas, each covering
    /// `frame_count` samples of `bytes_per_sample` bytes, valid for `'a`.
    pub(crate) unsafe fn new(
        areas: *mut SoundIoChannelArea,
        channel_count: usize,
        frame_count: usize,
        bytes_per_sample: usize,
    ) -> Self {
        Self {
            areas,
            channel_count,
            frame_count,
            bytes_per_sample,
            _region: PhantomData,
        }
    }

    /// Frames granted, which may be fewer than requested.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bytes_per_sample
    }

    pub fn is_hole(&self) -> bool {
        self.areas.is_null()
    }

    pub fn area(&self, channel: usize) -> Option<ChannelArea> {
        if self.is_hole() || channel >= self.channel_count {
            return None;
        }
        let raw = unsafe { *self.areas.add(channel) };
        Some(ChannelArea {
            ptr: raw.ptr as *mut u8,
            step: raw.step.max(0) as usize,
        })
    }

    /// Address of one sample, or null for a hole.
    ///
    /// # Panics
    /// If `channel` or `frame` is out of range.
    pub fn sample_ptr(&self, channel: usize, frame: usize) -> *mut u8 {
        assert!(
            channel < self.channel_count,
            "channel {channel} out of range ({} channels)",
            self.channel_count
        );
        assert!(
            frame < self.frame_count,
            "frame {frame} out of range ({} frames)",
            self.frame_count
        );
        match self.area(channel) {
            Some(area) => unsafe { area.ptr.add(area.step * frame) },
            None => std::ptr::null_mut(),
        }
    }

    /// # Panics
    /// If out of range, if `T` is not the stream's sample width, or if the
    /// region is a hole.
    pub fn write_sample<T: Sample>(&mut self, channel: usize, frame: usize, value: T) {
        self.check_width::<T>();
        let ptr = self.sample_ptr(channel, frame);
        assert!(!ptr.is_null(), "cannot write into a hole");
        unsafe { std::ptr::write_unaligned(ptr as *mut T, value) };
    }

    /// `None` for a hole.
    ///
    /// # Panics
    /// If out of range or if `T` is not the stream's sample width.
    pub fn read_sample<T: Sample>(&self, channel: usize, frame: usize) -> Option<T> {
        self.check_width::<T>();
        let ptr = self.sample_ptr(channel, frame);
        if ptr.is_null() {
            return None;
        }
        Some(unsafe { std::ptr::read_unaligned(ptr as *const T) })
    }

    fn check_width<T: Sample>(&self) {
        assert_eq!(
            size_of::<T>(),
            self.bytes_per_sample,
            "sample type width does not match the stream format"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Interleaved areas over `buf`, as a backend would hand out.
    fn interleaved(buf: &mut [u8], channels: usize, bytes: usize) -> Vec<SoundIoChannelArea> {
        let step = (channels * bytes) as i32;
        (0..channels)
            .map(|ch| SoundIoChannelArea {
                ptr: unsafe { buf.as_mut_ptr().add(ch * bytes) } as *mut _,
                step,
            })
            .collect()
    }

    #[test]
    fn test_write_then_read_interleaved() {
        let mut buf = vec![0u8; 2 * 4 * 8];
        let mut raw = interleaved(&mut buf, 2, 4);
        let mut areas = unsafe { ChannelAreas::new(raw.as_mut_ptr(), 2, 8, 4) };

        for frame in 0..8 {
            areas.write_sample(0, frame, frame as f32);
            areas.write_sample(1, frame, -(frame as f32));
        }
        assert_eq!(areas.read_sample::<f32>(0, 3), Some(3.0));
        assert_eq!(areas.read_sample::<f32>(1, 7), Some(-7.0));
        drop(areas);

        let first: [u8; 4] = buf[8..12].try_into().unwrap();
        assert_eq!(f32::from_ne_bytes(first), 1.0);
    }

    #[test]
    fn test_area_accessor() {
        let mut buf = vec![0u8; 16];
        let mut raw = interleaved(&mut buf, 2, 2);
        let areas = unsafe { ChannelAreas::new(raw.as_mut_ptr(), 2, 4, 2) };
        let right = areas.area(1).unwrap();
        assert_eq!(right.step, 4);
        assert_eq!(right.ptr as usize - buf.as_ptr() as usize, 2);
        assert!(areas.area(2).is_none());
    }

    #[test]
    fn test_hole_reads_none() {
        let areas = unsafe { ChannelAreas::new(std::ptr::null_mut(), 2, 16, 2) };
        assert!(areas.is_hole());
        assert_eq!(areas.read_sample::<i16>(1, 15), None);
        assert!(areas.sample_ptr(0, 0).is_null());
    }

    #[test]
    #[should_panic(expected = "frame 8 out of range")]
    fn test_frame_out_of_range_panics() {
        let mut buf = vec![0u8; 64];
        let mut raw = interleaved(&mut buf, 2, 4);
        let mut areas = unsafe { ChannelAreas::new(raw.as_mut_ptr(), 2, 8, 4) };
        areas.write_sample(0, 8, 0.0f32);
    }

    #[test]
    #[should_panic(expected = "sample type width")]
    fn test_width_mismatch_panics() {
        let mut buf = vec![0u8; 64];
        let mut raw = interleaved(&mut buf, 2, 4);
        let mut areas = unsafe { ChannelAreas::new(raw.as_mut_ptr(), 2, 8, 4) };
        areas.write_sample(0, 0, 0i16);
    }
}
