//! Playback streams.

use crate::areas::ChannelAreas;
use crate::{Device, Error, Result};
use sio_sys::{SoundIoApi, SoundIoChannelArea, SoundIoOutStream};
use std::ffi::CString;
use std::marker::PhantomData;
use std::os::raw::{c_double, c_int};
use std::ptr::{self, NonNull};

pub type WriteCallback = Box<dyn FnMut(&mut OutStreamWriter<'_>, usize, usize) + Send + 'static>;
pub type UnderflowCallback = Box<dyn FnMut(&mut OutStreamWriter<'_>) + Send + 'static>;
pub type OutStreamErrorCallback = Box<dyn FnMut(&mut OutStreamWriter<'_>, Error) + Send + 'static>;

/// An output stream on one [`Device`].
///
/// Configure it, register a write callback, then [`open`](Self::open) and
/// [`start`](Self::start). Callbacks run on the library's audio thread and
/// must not block; a callback that is being replaced at that moment is
/// skipped for one period.
///
/// # Example
///
/// ```ignore
/// let mut stream = device.create_outstream()?;
/// stream.set_format(sio::Format::FLOAT32NE);
/// stream.set_write_callback(|writer, _min, max| {
///     let mut left = max;
///     while left > 0 {
///         let Ok(mut areas) = writer.begin_write(left) else { return };
///         let frames = areas.frame_count();
///         if frames == 0 {
///             break;
///         }
///         for frame in 0..frames {
///             for ch in 0..areas.channel_count() {
///                 areas.write_sample(ch, frame, 0.0f32);
///             }
///         }
///         drop(areas);
///         if writer.end_write().is_err() {
///             return;
///         }
///         left -= frames;
///     }
/// });
/// stream.open()?;
/// stream.start()?;
/// ```
pub struct OutStream<'a> {
    raw: NonNull<SoundIoOutStream>,
    device: &'a Device<'a>,
    name: Option<CString>,
    layout_name: Option<CString>,
    default_notify: Option<NativeNotifyFn>,
    default_error: Option<NativeErrorFn>,
    callbacks: Box<StreamCallbacks>,
}

stream_config!(OutStream, SoundIoOutStream);

stream_common! {
    stream: OutStream,
    raw: SoundIoOutStream,
    view: OutStreamWriter,
    kind: "output",
    api: {
        create: outstream_create,
        destroy: outstream_destroy,
        open: outstream_open,
        start: outstream_start,
        pause: outstream_pause,
        latency: outstream_get_latency,
    },
    frames: {
        slot: write,
        native: write_callback,
        ty: WriteCallback,
        set: set_write_callback,
        take: take_write_callback,
        doc: "Called whenever the device wants between `min` and `max` frames.",
    },
    notify: {
        slot: underflow,
        native: underflow_callback,
        ty: UnderflowCallback,
        set: set_underflow_callback,
        take: take_underflow_callback,
        doc: "Called when the device ran out of frames to play.",
    },
    error: OutStreamErrorCallback,
}

impl OutStream<'_> {
    /// Drops frames queued but not yet played.
    pub fn clear_buffer(&mut self) -> Result<()> {
        Error::check(unsafe { (self.api().outstream_clear_buffer)(self.as_raw()) })
    }

    pub fn volume(&self) -> f64 {
        self.native().volume as f64
    }

    /// `0.0..=1.0`. Libraries without runtime volume control only take the
    /// value into account on [`Self::open`].
    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        match self.api().outstream_set_volume {
            Some(set_volume) => Error::check(unsafe { set_volume(self.as_raw(), volume) }),
            None => {
                self.native_mut().volume = volume as f32;
                Ok(())
            }
        }
    }
}

/// The stream as seen from inside its callbacks.
pub struct OutStreamWriter<'a> {
    raw: NonNull<SoundIoOutStream>,
    api: &'static SoundIoApi,
    _stream: PhantomData<&'a mut SoundIoOutStream>,
}

stream_view!(OutStreamWriter, SoundIoOutStream);

impl OutStreamWriter<'_> {
    /// Requests up to `frame_count` frames of buffer; the granted count may
    /// be smaller and is [`ChannelAreas::frame_count`]. Must be followed by
    /// [`Self::end_write`] once the areas are filled.
    pub fn begin_write(&mut self, frame_count: usize) -> Result<ChannelAreas<'_>> {
        let mut areas: *mut SoundIoChannelArea = ptr::null_mut();
        let mut frames = c_int::try_from(frame_count).unwrap_or(c_int::MAX);
        Error::check(unsafe { (self.api.outstream_begin_write)(self.as_raw(), &mut areas, &mut frames) })?;
        Ok(unsafe {
            ChannelAreas::new(
                areas,
                self.channel_count(),
                frames.max(0) as usize,
                self.bytes_per_sample(),
            )
        })
    }

    /// Commits the region from the last [`Self::begin_write`]. May report
    /// [`Error::Underflow`], which is informational.
    pub fn end_write(&mut self) -> Result<()> {
        Error::check(unsafe { (self.api.outstream_end_write)(self.as_raw()) })
    }

    pub fn clear_buffer(&mut self) -> Result<()> {
        Error::check(unsafe { (self.api.outstream_clear_buffer)(self.as_raw()) })
    }

    pub fn latency(&mut self) -> Result<f64> {
        let mut latency: c_double = 0.0;
        Error::check(unsafe { (self.api.outstream_get_latency)(self.as_raw(), &mut latency) })?;
        Ok(latency)
    }
}
