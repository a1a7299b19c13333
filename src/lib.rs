//! # sio - safe wrappers over libsoundio
//!
//! Owning, RAII-managed types around the handles of the libsoundio C
//! library, with `Result` errors and closures in place of function pointers
//! and user data.
//!
//! ## Architecture
//!
//! - **sio-sys** - `#[repr(C)]` ABI of libsoundio 2.x and the runtime loader
//! - **sio** - the wrappers:
//!   - [`Context`] - backend connection, event loop, device enumeration
//!   - [`Device`] - reference-counted device and its capabilities
//!   - [`OutStream`] / [`InStream`] - playback and capture streams
//!   - [`ChannelLayout`] - speaker layouts
//!   - [`RingBuffer`] - SPSC byte buffer for moving audio between threads
//!
//! The shared library is opened at runtime on first use, honoring the
//! `SIO_LIBSOUNDIO_PATH` environment variable. Nothing links against it at
//! build time.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sio::{Context, Format};
//!
//! let ctx = Context::builder().app_name("tone").build()?;
//! let index = ctx.default_output_device_index().ok_or(sio::Error::NoSuchDevice)?;
//! let device = ctx.output_device(index)?;
//!
//! let mut stream = device.create_outstream()?;
//! stream.set_format(Format::FLOAT32NE);
//! stream.set_write_callback(|writer, _min, max| {
//!     // fill writer.begin_write(max)? areas, then writer.end_write()
//! });
//! stream.open()?;
//! stream.start()?;
//!
//! loop {
//!     ctx.wait_events();
//! }
//! ```

#[macro_use]
mod macros;

mod areas;
mod backend;
mod builder;
mod channel;
mod channel_layout;
mod context;
mod device;
mod error;
mod format;
mod instream;
mod outstream;
mod ring_buffer;

/// Re-export of the raw bindings.
pub use sio_sys as sys;

pub use areas::{ChannelArea, ChannelAreas, Sample};
pub use backend::{backend, backend_count, backend_name, have_backend, Backend, DeviceAim};
pub use builder::ContextBuilder;
pub use channel::{channel_name, parse_channel_id, ChannelId};
pub use channel_layout::{ChannelLayout, MAX_CHANNELS};
pub use context::{
    BackendDisconnectCallback, Context, DevicesChangeCallback, EventsSignalCallback,
    JackMessageFn, RtPrioWarningFn, Waker,
};
pub use device::{Device, SampleRateRange};
pub use error::{error_name, Error, Result};
pub use format::{bytes_per_frame, bytes_per_sample, bytes_per_second, format_name, Format};
pub use instream::{InStream, InStreamErrorCallback, InStreamReader, OverflowCallback, ReadCallback};
pub use outstream::{
    OutStream, OutStreamErrorCallback, OutStreamWriter, UnderflowCallback, WriteCallback,
};
pub use ring_buffer::{RingBuffer, RingConsumer, RingProducer};

/// `(major, minor, patch, version string)` of the loaded library.
pub fn version() -> Result<(i32, i32, i32, &'static str)> {
    let api = sio_sys::load()?;
    let (major, minor, patch) = api.version();
    Ok((major, minor, patch, api.version_str()))
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Backend, ChannelAreas, ChannelId, ChannelLayout, Context, Device, DeviceAim, Error,
        Format, InStream, InStreamReader, OutStream, OutStreamWriter, Result, RingBuffer,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_loaded_library() {
        let Ok((major, minor, patch, text)) = version() else {
            eprintln!("libsoundio not available, skipping");
            return;
        };
        assert_eq!(major, sys::REQUIRED_MAJOR);
        assert_eq!(text, format!("{major}.{minor}.{patch}"));
    }
}
