//! Capture streams.

use crate::areas::ChannelAreas;
use crate::{Device, Error, Result};
use sio_sys::{SoundIoApi, SoundIoChannelArea, SoundIoInStream};
use std::ffi::CString;
use std::marker::PhantomData;
use std::os::raw::{c_double, c_int};
use std::ptr::{self, NonNull};

pub type ReadCallback = Box<dyn FnMut(&mut InStreamReader<'_>, usize, usize) + Send + 'static>;
pub type OverflowCallback = Box<dyn FnMut(&mut InStreamReader<'_>) + Send + 'static>;
pub type InStreamErrorCallback = Box<dyn FnMut(&mut InStreamReader<'_>, Error) + Send + 'static>;

/// An input stream on one [`Device`]. Mirrors [`crate::OutStream`], with a
/// read callback in place of the write callback.
pub struct InStream<'a> {
    raw: NonNull<SoundIoInStream>,
    device: &'a Device<'a>,
    name: Option<CString>,
    layout_name: Option<CString>,
    default_notify: Option<NativeNotifyFn>,
    default_error: Option<NativeErrorFn>,
    callbacks: Box<StreamCallbacks>,
}

stream_config!(InStream, SoundIoInStream);

stream_common! {
    stream: InStream,
    raw: SoundIoInStream,
    view: InStreamReader,
    kind: "input",
    api: {
        create: instream_create,
        destroy: instream_destroy,
        open: instream_open,
        start: instream_start,
        pause: instream_pause,
        latency: instream_get_latency,
    },
    frames: {
        slot: read,
        native: read_callback,
        ty: ReadCallback,
        set: set_read_callback,
        take: take_read_callback,
        doc: "Called whenever between `min` and `max` frames are ready.",
    },
    notify: {
        slot: overflow,
        native: overflow_callback,
        ty: OverflowCallback,
        set: set_overflow_callback,
        take: take_overflow_callback,
        doc: "Called when captured frames were dropped because nobody read them.",
    },
    error: InStreamErrorCallback,
}

/// The stream as seen from inside its callbacks.
pub struct InStreamReader<'a> {
    raw: NonNull<SoundIoInStream>,
    api: &'static SoundIoApi,
    _stream: PhantomData<&'a mut SoundIoInStream>,
}

stream_view!(InStreamReader, SoundIoInStream);

impl InStreamReader<'_> {
    /// Requests up to `frame_count` captured frames. The region may be a
    /// hole (see [`ChannelAreas::is_hole`]) which still has to be ended.
    pub fn begin_read(&mut self, frame_count: usize) -> Result<ChannelAreas<'_>> {
        let mut areas: *mut SoundIoChannelArea = ptr::null_mut();
        let mut frames = c_int::try_from(frame_count).unwrap_or(c_int::MAX);
        Error::check(unsafe { (self.api.instream_begin_read)(self.as_raw(), &mut areas, &mut frames) })?;
        Ok(unsafe {
            ChannelAreas::new(
                areas,
                self.channel_count(),
                frames.max(0) as usize,
                self.bytes_per_sample(),
            )
        })
    }

    /// Releases the region from the last [`Self::begin_read`]. Skip it when
    /// `begin_read` granted zero frames.
    pub fn end_read(&mut self) -> Result<()> {
        Error::check(unsafe { (self.api.instream_end_read)(self.as_raw()) })
    }

    pub fn latency(&mut self) -> Result<f64> {
        let mut latency: c_double = 0.0;
        Error::check(unsafe { (self.api.instream_get_latency)(self.as_raw(), &mut latency) })?;
        Ok(latency)
    }
}
