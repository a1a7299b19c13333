//! Accessors shared by the input and output stream wrappers.
//!
//! The native `SoundIoOutStream` and `SoundIoInStream` structs share their
//! configuration fields and callback shape, so both wrappers are generated
//! from the same pieces:
//! - `stream_config!` - getters and setters on the owning stream
//! - `stream_view!` - read-only getters on the callback-side view
//! - `stream_common!` - callback slots, trampolines and lifecycle

/// Requires `raw: NonNull<..>`, `device: &'a Device<'a>`, `name: Option<CString>`
/// and `layout_name: Option<CString>` fields.
macro_rules! stream_config {
    ($stream:ident, $raw:ty) => {
        impl<'a> $stream<'a> {
            pub fn as_raw(&self) -> *mut $raw {
                self.raw.as_ptr()
            }

            pub fn device(&self) -> &'a $crate::Device<'a> {
                self.device
            }

            fn native(&self) -> &$raw {
                unsafe { self.raw.as_ref() }
            }

            fn native_mut(&mut self) -> &mut $raw {
                unsafe { self.raw.as_mut() }
            }

            pub fn format(&self) -> $crate::Format {
                $crate::Format::from_raw(self.native().format)
            }

            /// Takes effect on [`Self::open`].
            pub fn set_format(&mut self, format: $crate::Format) {
                self.native_mut().format = format.to_raw();
            }

            pub fn sample_rate(&self) -> u32 {
                self.native().sample_rate.max(0) as u32
            }

            /// Rates above `c_int::MAX` are clamped to it.
            pub fn set_sample_rate(&mut self, sample_rate: u32) {
                self.native_mut().sample_rate = std::os::raw::c_int::try_from(sample_rate)
                    .unwrap_or(std::os::raw::c_int::MAX);
            }

            pub fn layout(&self) -> $crate::ChannelLayout {
                // The name is either null, ours, or static library memory.
                unsafe { $crate::ChannelLayout::from_raw(&self.native().layout) }
            }

            pub fn set_layout(&mut self, layout: &$crate::ChannelLayout) -> $crate::Result<()> {
                let name = layout
                    .name()
                    .map(|n| {
                        std::ffi::CString::new(n)
                            .map_err(|_| $crate::Error::InvalidName(n.to_string()))
                    })
                    .transpose()?;
                let mut raw = layout.to_raw();
                raw.name = name.as_ref().map_or(std::ptr::null(), |n| n.as_ptr());
                self.native_mut().layout = raw;
                self.layout_name = name;
                Ok(())
            }

            /// Seconds; `0.0` lets the backend choose.
            pub fn software_latency(&self) -> f64 {
                self.native().software_latency
            }

            pub fn set_software_latency(&mut self, seconds: f64) {
                self.native_mut().software_latency = seconds;
            }

            pub fn name(&self) -> Option<String> {
                let ptr = self.native().name;
                if ptr.is_null() {
                    return None;
                }
                Some(
                    unsafe { std::ffi::CStr::from_ptr(ptr) }
                        .to_string_lossy()
                        .into_owned(),
                )
            }

            /// Shown by the backend where it names streams (PulseAudio, JACK).
            pub fn set_name(&mut self, name: &str) -> $crate::Result<()> {
                let name = std::ffi::CString::new(name)
                    .map_err(|_| $crate::Error::InvalidName(name.to_string()))?;
                self.native_mut().name = name.as_ptr();
                self.name = Some(name);
                Ok(())
            }

            pub fn non_terminal_hint(&self) -> bool {
                self.native().non_terminal_hint
            }

            pub fn set_non_terminal_hint(&mut self, hint: bool) {
                self.native_mut().non_terminal_hint = hint;
            }

            /// Valid after [`Self::open`].
            pub fn bytes_per_frame(&self) -> usize {
                self.native().bytes_per_frame.max(0) as usize
            }

            /// Valid after [`Self::open`].
            pub fn bytes_per_sample(&self) -> usize {
                self.native().bytes_per_sample.max(0) as usize
            }

            /// Set by [`Self::open`] when the requested layout could not be applied.
            pub fn layout_error(&self) -> Option<$crate::Error> {
                $crate::Error::from_code(self.native().layout_error)
            }
        }
    };
}

/// Requires a `raw: NonNull<..>` field.
macro_rules! stream_view {
    ($view:ident, $raw:ty) => {
        impl<'a> $view<'a> {
            pub fn as_raw(&self) -> *mut $raw {
                self.raw.as_ptr()
            }

            fn native(&self) -> &$raw {
                unsafe { self.raw.as_ref() }
            }

            pub fn format(&self) -> $crate::Format {
                $crate::Format::from_raw(self.native().format)
            }

            pub fn sample_rate(&self) -> u32 {
                self.native().sample_rate.max(0) as u32
            }

            pub fn layout(&self) -> $crate::ChannelLayout {
                unsafe { $crate::ChannelLayout::from_raw(&self.native().layout) }
            }

            pub fn channel_count(&self) -> usize {
                self.native().layout.channel_count.max(0) as usize
            }

            pub fn software_latency(&self) -> f64 {
                self.native().software_latency
            }

            pub fn bytes_per_frame(&self) -> usize {
                self.native().bytes_per_frame.max(0) as usize
            }

            pub fn bytes_per_sample(&self) -> usize {
                self.native().bytes_per_sample.max(0) as usize
            }
        }
    };
}

/// Callback slots, trampolines and the open/start/pause/latency lifecycle.
///
/// Each stream has a frames callback (write or read), a notification
/// callback (underflow or overflow) and an error callback. Requires the
/// stream to have the `stream_config!` fields plus `default_notify`,
/// `default_error` and `callbacks`, and the view to have `raw`, `api` and
/// `_stream`.
macro_rules! stream_common {
    (
        stream: $stream:ident,
        raw: $raw:ty,
        view: $view:ident,
        kind: $kind:literal,
        api: {
            create: $create:ident,
            destroy: $destroy:ident,
            open: $open:ident,
            start: $start:ident,
            pause: $pause:ident,
            latency: $latency:ident $(,)?
        },
        frames: {
            slot: $frames:ident,
            native: $frames_native:ident,
            ty: $frames_ty:ty,
            set: $set_frames:ident,
            take: $take_frames:ident,
            doc: $frames_doc:literal $(,)?
        },
        notify: {
            slot: $notify:ident,
            native: $notify_native:ident,
            ty: $notify_ty:ty,
            set: $set_notify:ident,
            take: $take_notify:ident,
            doc: $notify_doc:literal $(,)?
        },
        error: $error_ty:ty $(,)?
    ) => {
        type NativeNotifyFn = unsafe extern "C" fn(*mut $raw);
        type NativeErrorFn = unsafe extern "C" fn(*mut $raw, std::os::raw::c_int);

        /// Closure slots reached through the native `userdata` pointer.
        struct StreamCallbacks {
            api: &'static sio_sys::SoundIoApi,
            $frames: parking_lot::Mutex<Option<$frames_ty>>,
            $notify: parking_lot::Mutex<Option<$notify_ty>>,
            error: parking_lot::Mutex<Option<$error_ty>>,
        }

        impl StreamCallbacks {
            fn new(api: &'static sio_sys::SoundIoApi) -> Self {
                Self {
                    api,
                    $frames: parking_lot::Mutex::new(None),
                    $notify: parking_lot::Mutex::new(None),
                    error: parking_lot::Mutex::new(None),
                }
            }
        }

        impl<'a> $stream<'a> {
            pub(crate) fn new(device: &'a $crate::Device<'a>) -> $crate::Result<Self> {
                let api = device.context().api();
                let raw = unsafe { (api.$create)(device.as_raw()) };
                let raw = std::ptr::NonNull::new(raw).ok_or($crate::Error::NoMem)?;
                let callbacks = Box::new(StreamCallbacks::new(api));
                let native = unsafe { &mut *raw.as_ptr() };
                native.userdata =
                    &*callbacks as *const StreamCallbacks as *mut std::os::raw::c_void;
                Ok(Self {
                    raw,
                    device,
                    name: None,
                    layout_name: None,
                    default_notify: native.$notify_native,
                    default_error: native.error_callback,
                    callbacks,
                })
            }

            fn api(&self) -> &'static sio_sys::SoundIoApi {
                self.callbacks.api
            }

            #[doc = $frames_doc]
            pub fn $set_frames<F>(&mut self, callback: F)
            where
                F: FnMut(&mut $view<'_>, usize, usize) + Send + 'static,
            {
                *self.callbacks.$frames.lock() = Some(Box::new(callback));
                self.native_mut().$frames_native = Some(frames_trampoline);
            }

            /// The stream keeps running; periods arriving without a callback
            /// are skipped.
            pub fn $take_frames(&mut self) -> Option<$frames_ty> {
                self.callbacks.$frames.lock().take()
            }

            #[doc = $notify_doc]
            pub fn $set_notify<F>(&mut self, callback: F)
            where
                F: FnMut(&mut $view<'_>) + Send + 'static,
            {
                *self.callbacks.$notify.lock() = Some(Box::new(callback));
                self.native_mut().$notify_native = Some(notify_trampoline);
            }

            /// Restores the library's default handler.
            pub fn $take_notify(&mut self) -> Option<$notify_ty> {
                self.native_mut().$notify_native = self.default_notify;
                self.callbacks.$notify.lock().take()
            }

            /// Called on an unrecoverable stream error. Without one, the
            /// library aborts the process.
            pub fn set_error_callback<F>(&mut self, callback: F)
            where
                F: FnMut(&mut $view<'_>, $crate::Error) + Send + 'static,
            {
                *self.callbacks.error.lock() = Some(Box::new(callback));
                self.native_mut().error_callback = Some(error_trampoline);
            }

            pub fn take_error_callback(&mut self) -> Option<$error_ty> {
                self.native_mut().error_callback = self.default_error;
                self.callbacks.error.lock().take()
            }

            /// Opens the device with the configured parameters. Unset fields
            /// are filled in by the library.
            ///
            #[doc = concat!(
                "Fails with [`Error::Invalid`](crate::Error::Invalid) when no ",
                stringify!($frames),
                " callback is registered, and with the layout error when the \
                 requested layout was not applied."
            )]
            pub fn open(&mut self) -> $crate::Result<()> {
                if self.callbacks.$frames.lock().is_none() {
                    return Err($crate::Error::Invalid);
                }
                $crate::Error::check(unsafe { (self.api().$open)(self.as_raw()) })?;
                if let Err(err) = check_layout(self.native()) {
                    tracing::warn!(stream = $kind, "layout rejected: {err}");
                    return Err(err);
                }
                tracing::debug!(
                    stream = $kind,
                    "open: {} {} Hz [{}]",
                    self.format(),
                    self.sample_rate(),
                    self.layout()
                );
                Ok(())
            }

            pub fn start(&mut self) -> $crate::Result<()> {
                $crate::Error::check(unsafe { (self.api().$start)(self.as_raw()) })
            }

            /// Not every backend can pause; those report
            /// [`Error::IncompatibleBackend`](crate::Error::IncompatibleBackend).
            pub fn pause(&mut self, pause: bool) -> $crate::Result<()> {
                $crate::Error::check(unsafe { (self.api().$pause)(self.as_raw(), pause) })
            }

            /// Seconds between a frame passing through the callback and the
            /// device.
            pub fn latency(&mut self) -> $crate::Result<f64> {
                let mut latency: std::os::raw::c_double = 0.0;
                $crate::Error::check(unsafe {
                    (self.api().$latency)(self.as_raw(), &mut latency)
                })?;
                Ok(latency)
            }
        }

        impl Drop for $stream<'_> {
            fn drop(&mut self) {
                unsafe { (self.api().$destroy)(self.as_raw()) };
            }
        }

        impl std::fmt::Debug for $stream<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($stream))
                    .field("name", &self.name)
                    .field("format", &self.format())
                    .field("sample_rate", &self.sample_rate())
                    .field("layout", &self.layout())
                    .field("layout_name", &self.layout_name)
                    .field("software_latency", &self.software_latency())
                    .finish_non_exhaustive()
            }
        }

        /// Rejects an opened stream whose requested layout was not applied.
        fn check_layout(native: &$raw) -> $crate::Result<()> {
            $crate::Error::check(native.layout_error)
        }

        unsafe fn callbacks_of<'a>(stream: *mut $raw) -> Option<&'a StreamCallbacks> {
            if stream.is_null() {
                return None;
            }
            ((*stream).userdata as *const StreamCallbacks).as_ref()
        }

        unsafe fn view<'a>(stream: *mut $raw, api: &'static sio_sys::SoundIoApi) -> $view<'a> {
            $view {
                raw: std::ptr::NonNull::new_unchecked(stream),
                api,
                _stream: std::marker::PhantomData,
            }
        }

        unsafe extern "C" fn frames_trampoline(
            stream: *mut $raw,
            min: std::os::raw::c_int,
            max: std::os::raw::c_int,
        ) {
            let Some(callbacks) = callbacks_of(stream) else {
                return;
            };
            let Some(mut slot) = callbacks.$frames.try_lock() else {
                return;
            };
            if let Some(callback) = slot.as_mut() {
                let mut view = view(stream, callbacks.api);
                callback(&mut view, min.max(0) as usize, max.max(0) as usize);
            }
        }

        unsafe extern "C" fn notify_trampoline(stream: *mut $raw) {
            let Some(callbacks) = callbacks_of(stream) else {
                return;
            };
            let Some(mut slot) = callbacks.$notify.try_lock() else {
                return;
            };
            if let Some(callback) = slot.as_mut() {
                callback(&mut view(stream, callbacks.api));
            }
        }

        unsafe extern "C" fn error_trampoline(stream: *mut $raw, err: std::os::raw::c_int) {
            let Some(callbacks) = callbacks_of(stream) else {
                return;
            };
            let Some(mut slot) = callbacks.error.try_lock() else {
                return;
            };
            if let Some(callback) = slot.as_mut() {
                let err = $crate::Error::from_code(err).unwrap_or($crate::Error::Streaming);
                callback(&mut view(stream, callbacks.api), err);
            }
        }
    };
}
