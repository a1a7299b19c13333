//! Function table resolved from the libsoundio shared library at runtime.

use crate::error::{LoadError, Result};
use crate::types::*;
use libloading::Library;
use parking_lot::Mutex;
use std::ffi::{CStr, OsStr};
use std::os::raw::{c_char, c_double, c_int};
use std::sync::OnceLock;

/// Environment variable overriding the shared library path.
pub const LIBRARY_PATH_ENV: &str = "SIO_LIBSOUNDIO_PATH";

/// Only the 2.x ABI is mirrored in [`crate::types`].
pub const REQUIRED_MAJOR: c_int = 2;

#[cfg(target_os = "macos")]
pub const LIBRARY_CANDIDATES: &[&str] = &["libsoundio.2.dylib", "libsoundio.dylib"];

#[cfg(windows)]
pub const LIBRARY_CANDIDATES: &[&str] = &["soundio.dll", "libsoundio.dll"];

#[cfg(all(unix, not(target_os = "macos")))]
pub const LIBRARY_CANDIDATES: &[&str] = &["libsoundio.so.2", "libsoundio.so"];

macro_rules! soundio_api {
    ($( fn $name:ident ( $($arg:ty),* ) $(-> $ret:ty)?; )*) => {
        /// Resolved `soundio_*` entry points. Field names drop the prefix.
        ///
        /// The owning [`Library`] is kept alongside, so every pointer stays
        /// valid for as long as the table lives (which, once published through
        /// [`load`], is the rest of the process).
        pub struct SoundIoApi {
            $( pub $name: unsafe extern "C" fn($($arg),*) $(-> $ret)?, )*
            /// Absent from some 2.0 builds.
            pub outstream_set_volume:
                Option<unsafe extern "C" fn(*mut SoundIoOutStream, c_double) -> c_int>,
            _library: Library,
        }

        impl SoundIoApi {
            unsafe fn resolve(library: Library) -> Result<Self> {
                $(
                    let $name = *library
                        .get::<unsafe extern "C" fn($($arg),*) $(-> $ret)?>(
                            concat!("soundio_", stringify!($name), "\0").as_bytes(),
                        )
                        .map_err(|source| LoadError::MissingSymbol {
                            symbol: concat!("soundio_", stringify!($name)),
                            source,
                        })?;
                )*
                let outstream_set_volume = library
                    .get::<unsafe extern "C" fn(*mut SoundIoOutStream, c_double) -> c_int>(
                        b"soundio_outstream_set_volume\0",
                    )
                    .ok()
                    .map(|symbol| *symbol);

                Ok(Self {
                    $( $name, )*
                    outstream_set_volume,
                    _library: library,
                })
            }
        }
    };
}

soundio_api! {
    fn version_string() -> *const c_char;
    fn version_major() -> c_int;
    fn version_minor() -> c_int;
    fn version_patch() -> c_int;

    fn create() -> *mut SoundIo;
    fn destroy(*mut SoundIo);
    fn connect(*mut SoundIo) -> c_int;
    fn connect_backend(*mut SoundIo, SoundIoBackend) -> c_int;
    fn disconnect(*mut SoundIo);
    fn strerror(c_int) -> *const c_char;
    fn backend_name(SoundIoBackend) -> *const c_char;
    fn backend_count(*mut SoundIo) -> c_int;
    fn get_backend(*mut SoundIo, c_int) -> SoundIoBackend;
    fn have_backend(SoundIoBackend) -> bool;
    fn flush_events(*mut SoundIo);
    fn wait_events(*mut SoundIo);
    fn wakeup(*mut SoundIo);
    fn force_device_scan(*mut SoundIo);

    fn channel_layout_equal(*const SoundIoChannelLayout, *const SoundIoChannelLayout) -> bool;
    fn get_channel_name(SoundIoChannelId) -> *const c_char;
    fn parse_channel_id(*const c_char, c_int) -> SoundIoChannelId;
    fn channel_layout_builtin_count() -> c_int;
    fn channel_layout_get_builtin(c_int) -> *const SoundIoChannelLayout;
    fn channel_layout_get_default(c_int) -> *const SoundIoChannelLayout;
    fn channel_layout_find_channel(*const SoundIoChannelLayout, SoundIoChannelId) -> c_int;
    fn channel_layout_detect_builtin(*mut SoundIoChannelLayout) -> bool;
    fn best_matching_channel_layout(
        *const SoundIoChannelLayout,
        c_int,
        *const SoundIoChannelLayout,
        c_int
    ) -> *const SoundIoChannelLayout;
    fn sort_channel_layouts(*mut SoundIoChannelLayout, c_int);
    fn get_bytes_per_sample(SoundIoFormat) -> c_int;
    fn format_string(SoundIoFormat) -> *const c_char;

    fn input_device_count(*mut SoundIo) -> c_int;
    fn output_device_count(*mut SoundIo) -> c_int;
    fn get_input_device(*mut SoundIo, c_int) -> *mut SoundIoDevice;
    fn get_output_device(*mut SoundIo, c_int) -> *mut SoundIoDevice;
    fn default_input_device_index(*mut SoundIo) -> c_int;
    fn default_output_device_index(*mut SoundIo) -> c_int;
    fn device_ref(*mut SoundIoDevice);
    fn device_unref(*mut SoundIoDevice);
    fn device_equal(*const SoundIoDevice, *const SoundIoDevice) -> bool;
    fn device_sort_channel_layouts(*mut SoundIoDevice);
    fn device_supports_format(*mut SoundIoDevice, SoundIoFormat) -> bool;
    fn device_supports_layout(*mut SoundIoDevice, *const SoundIoChannelLayout) -> bool;
    fn device_supports_sample_rate(*mut SoundIoDevice, c_int) -> bool;
    fn device_nearest_sample_rate(*mut SoundIoDevice, c_int) -> c_int;

    fn outstream_create(*mut SoundIoDevice) -> *mut SoundIoOutStream;
    fn outstream_destroy(*mut SoundIoOutStream);
    fn outstream_open(*mut SoundIoOutStream) -> c_int;
    fn outstream_start(*mut SoundIoOutStream) -> c_int;
    fn outstream_begin_write(*mut SoundIoOutStream, *mut *mut SoundIoChannelArea, *mut c_int) -> c_int;
    fn outstream_end_write(*mut SoundIoOutStream) -> c_int;
    fn outstream_clear_buffer(*mut SoundIoOutStream) -> c_int;
    fn outstream_pause(*mut SoundIoOutStream, bool) -> c_int;
    fn outstream_get_latency(*mut SoundIoOutStream, *mut c_double) -> c_int;

    fn instream_create(*mut SoundIoDevice) -> *mut SoundIoInStream;
    fn instream_destroy(*mut SoundIoInStream);
    fn instream_open(*mut SoundIoInStream) -> c_int;
    fn instream_start(*mut SoundIoInStream) -> c_int;
    fn instream_begin_read(*mut SoundIoInStream, *mut *mut SoundIoChannelArea, *mut c_int) -> c_int;
    fn instream_end_read(*mut SoundIoInStream) -> c_int;
    fn instream_pause(*mut SoundIoInStream, bool) -> c_int;
    fn instream_get_latency(*mut SoundIoInStream, *mut c_double) -> c_int;

    fn ring_buffer_create(*mut SoundIo, c_int) -> *mut SoundIoRingBuffer;
    fn ring_buffer_destroy(*mut SoundIoRingBuffer);
    fn ring_buffer_capacity(*mut SoundIoRingBuffer) -> c_int;
    fn ring_buffer_write_ptr(*mut SoundIoRingBuffer) -> *mut c_char;
    fn ring_buffer_advance_write_ptr(*mut SoundIoRingBuffer, c_int);
    fn ring_buffer_read_ptr(*mut SoundIoRingBuffer) -> *mut c_char;
    fn ring_buffer_advance_read_ptr(*mut SoundIoRingBuffer, c_int);
    fn ring_buffer_fill_count(*mut SoundIoRingBuffer) -> c_int;
    fn ring_buffer_free_count(*mut SoundIoRingBuffer) -> c_int;
    fn ring_buffer_clear(*mut SoundIoRingBuffer);
}

impl SoundIoApi {
    /// `(major, minor, patch)` reported by the loaded library.
    pub fn version(&self) -> (i32, i32, i32) {
        unsafe {
            (
                (self.version_major)(),
                (self.version_minor)(),
                (self.version_patch)(),
            )
        }
    }

    pub fn version_str(&self) -> &str {
        // Static string inside the library, valid while `_library` is held.
        let ptr = unsafe { (self.version_string)() };
        if ptr.is_null() {
            return "";
        }
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("")
    }
}

impl std::fmt::Debug for SoundIoApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundIoApi")
            .field("version", &self.version_str())
            .finish_non_exhaustive()
    }
}

static API: OnceLock<SoundIoApi> = OnceLock::new();
static LOAD_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Returns the process-wide table, loading the library on first use.
///
/// Honors [`LIBRARY_PATH_ENV`], then tries [`LIBRARY_CANDIDATES`] in order.
/// A failed load is not cached, so a later call may succeed.
pub fn load() -> Result<&'static SoundIoApi> {
    if let Some(api) = API.get() {
        return Ok(api);
    }
    let _guard = LOAD_LOCK.lock();
    if let Some(api) = API.get() {
        return Ok(api);
    }

    let api = match std::env::var_os(LIBRARY_PATH_ENV) {
        Some(path) => open_path(&path)?,
        None => open_candidates()?,
    };
    Ok(API.get_or_init(|| api))
}

/// Loads from an explicit path. Has no effect if a table is already loaded.
pub fn load_from(path: impl AsRef<OsStr>) -> Result<&'static SoundIoApi> {
    if let Some(api) = API.get() {
        return Ok(api);
    }
    let _guard = LOAD_LOCK.lock();
    if let Some(api) = API.get() {
        return Ok(api);
    }

    let api = open_path(path.as_ref())?;
    Ok(API.get_or_init(|| api))
}

/// The table if it has already been loaded.
pub fn get() -> Option<&'static SoundIoApi> {
    API.get()
}

fn open_candidates() -> Result<SoundIoApi> {
    for name in LIBRARY_CANDIDATES {
        match open_path(OsStr::new(name)) {
            Ok(api) => return Ok(api),
            Err(LoadError::Open { path, source }) => {
                tracing::trace!("{path}: {source}");
            }
            Err(e) => return Err(e),
        }
    }
    Err(LoadError::NotFound {
        tried: LIBRARY_CANDIDATES.iter().map(|s| s.to_string()).collect(),
    })
}

fn open_path(path: &OsStr) -> Result<SoundIoApi> {
    let shown = path.to_string_lossy().into_owned();
    let library = unsafe { Library::new(path) }.map_err(|source| LoadError::Open {
        path: shown.clone(),
        source,
    })?;
    let api = unsafe { SoundIoApi::resolve(library)? };

    let (major, _, _) = api.version();
    if major != REQUIRED_MAJOR {
        return Err(LoadError::UnsupportedVersion {
            found: major,
            required: REQUIRED_MAJOR,
        });
    }

    tracing::debug!("loaded libsoundio {} from {}", api.version_str(), shown);
    Ok(api)
}
