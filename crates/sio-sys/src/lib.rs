//! Raw libsoundio 2.x bindings for `sio`.
//!
//! The library is opened at runtime with `libloading` rather than linked, so
//! crates depending on `sio` build on machines without libsoundio installed
//! and report a [`LoadError`] when it is missing.
//!
//! - [`types`]: `#[repr(C)]` struct layouts and enum constants
//! - [`load`] / [`load_from`]: resolve the process-wide [`SoundIoApi`]
//!
//! Nothing here is safe to use directly; see the `sio` crate.

pub mod error;
pub use error::{LoadError, Result};

pub mod types;
pub use types::*;

mod api;
pub use api::{
    get, load, load_from, SoundIoApi, LIBRARY_CANDIDATES, LIBRARY_PATH_ENV, REQUIRED_MAJOR,
};
