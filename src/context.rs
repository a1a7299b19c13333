//! The top-level libsoundio handle.

use crate::{Backend, Device, Error, Result, RingBuffer};
use parking_lot::Mutex;
use sio_sys::{SoundIo, SoundIoApi};
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, Ordering};

/// Receives the context being flushed, so it can re-enumerate devices.
pub type DevicesChangeCallback = Box<dyn FnMut(&Context) + 'static>;
pub type BackendDisconnectCallback = Box<dyn FnMut(&Context, Error) + 'static>;
pub type EventsSignalCallback = Box<dyn FnMut() + Send + 'static>;

/// Plain function the library calls when it fails to get real-time priority.
pub type RtPrioWarningFn = unsafe extern "C" fn();

/// Plain function receiving a message from the JACK backend.
pub type JackMessageFn = unsafe extern "C" fn(*const c_char);

type NativeEventFn = unsafe extern "C" fn(*mut SoundIo);
type NativeDisconnectFn = unsafe extern "C" fn(*mut SoundIo, c_int);

/// Closure slots reached through the native `userdata` pointer. Boxed so the
/// address survives moves of the owning [`Context`].
///
/// `bound` points at the owning context only while it is borrowed by
/// [`Context::flush_events`] or [`Context::wait_events`], the only calls that
/// run the devices-change and backend-disconnect handlers.
struct ContextCallbacks {
    bound: AtomicPtr<Context>,
    devices_change: Mutex<Option<DevicesChangeCallback>>,
    backend_disconnect: Mutex<Option<BackendDisconnectCallback>>,
    events_signal: Mutex<Option<EventsSignalCallback>>,
}

/// Native callbacks installed by `soundio_create`, restored by the `take_*`
/// methods.
#[derive(Clone, Copy)]
struct NativeDefaults {
    on_devices_change: Option<NativeEventFn>,
    on_backend_disconnect: Option<NativeDisconnectFn>,
    on_events_signal: Option<NativeEventFn>,
}

/// Owns a `SoundIo` handle.
///
/// Devices borrow the context, so it cannot be dropped, disconnected or
/// reconnected while any [`Device`] is alive.
///
/// # Example
///
/// ```ignore
/// let mut ctx = sio::Context::new()?;
/// ctx.connect()?;
/// ctx.flush_events();
///
/// let index = ctx.default_output_device_index().ok_or(sio::Error::NoSuchDevice)?;
/// let device = ctx.output_device(index)?;
/// println!("{}", device.name());
/// ```
pub struct Context {
    raw: NonNull<SoundIo>,
    api: &'static SoundIoApi,
    app_name: Option<CString>,
    defaults: NativeDefaults,
    callbacks: Box<ContextCallbacks>,
}

impl Context {
    /// Loads the library on first use and creates an unconnected context.
    pub fn new() -> Result<Self> {
        let api = sio_sys::load()?;
        let raw = unsafe { (api.create)() };
        let raw = NonNull::new(raw).ok_or(Error::NoMem)?;
        Ok(unsafe { Self::adopt(api, raw) })
    }

    pub fn builder() -> crate::ContextBuilder {
        crate::ContextBuilder::default()
    }

    /// Takes ownership of a handle from `soundio_create`. Its `userdata`
    /// slot is claimed by the wrapper.
    ///
    /// # Safety
    /// `raw` must come from `soundio_create` of the loaded library and must
    /// not be destroyed or owned elsewhere.
    pub unsafe fn from_raw(raw: *mut SoundIo) -> Result<Self> {
        let api = sio_sys::load()?;
        let raw = NonNull::new(raw).ok_or(Error::Invalid)?;
        Ok(Self::adopt(api, raw))
    }

    unsafe fn adopt(api: &'static SoundIoApi, raw: NonNull<SoundIo>) -> Self {
        let callbacks = Box::new(ContextCallbacks {
            bound: AtomicPtr::new(ptr::null_mut()),
            devices_change: Mutex::new(None),
            backend_disconnect: Mutex::new(None),
            events_signal: Mutex::new(None),
        });
        let native = &mut *raw.as_ptr();
        native.userdata = &*callbacks as *const ContextCallbacks as *mut c_void;
        let defaults = NativeDefaults {
            on_devices_change: native.on_devices_change,
            on_backend_disconnect: native.on_backend_disconnect,
            on_events_signal: native.on_events_signal,
        };
        Self {
            raw,
            api,
            app_name: None,
            defaults,
            callbacks,
        }
    }

    pub fn as_raw(&self) -> *mut SoundIo {
        self.raw.as_ptr()
    }

    pub(crate) fn api(&self) -> &'static SoundIoApi {
        self.api
    }

    fn native(&self) -> &SoundIo {
        unsafe { self.raw.as_ref() }
    }

    fn native_mut(&mut self) -> &mut SoundIo {
        unsafe { self.raw.as_mut() }
    }

    /// Tries every compiled-in backend in order until one connects.
    pub fn connect(&mut self) -> Result<()> {
        Error::check(unsafe { (self.api.connect)(self.as_raw()) })?;
        tracing::debug!("connected to {} backend", self.current_backend());
        Ok(())
    }

    pub fn connect_backend(&mut self, backend: Backend) -> Result<()> {
        Error::check(unsafe { (self.api.connect_backend)(self.as_raw(), backend.to_raw()) })
            .inspect_err(|e| tracing::debug!("{backend} backend unavailable: {e}"))?;
        tracing::debug!("connected to {backend} backend");
        Ok(())
    }

    pub fn disconnect(&mut self) {
        let backend = self.current_backend();
        unsafe { (self.api.disconnect)(self.as_raw()) };
        if backend != Backend::None {
            tracing::debug!("disconnected from {backend} backend");
        }
    }

    /// [`Backend::None`] until connected.
    pub fn current_backend(&self) -> Backend {
        Backend::from_raw(self.native().current_backend)
    }

    pub fn app_name(&self) -> Option<String> {
        let ptr = self.native().app_name;
        if ptr.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }

    /// Used by PulseAudio and JACK to name the client. Set before connecting.
    pub fn set_app_name(&mut self, name: &str) -> Result<()> {
        let name = CString::new(name).map_err(|_| Error::InvalidName(name.to_string()))?;
        self.native_mut().app_name = name.as_ptr();
        self.app_name = Some(name);
        Ok(())
    }

    /// Backends compiled into the library.
    pub fn backend_count(&self) -> usize {
        unsafe { (self.api.backend_count)(self.as_raw()) }.max(0) as usize
    }

    pub fn backend(&self, index: usize) -> Option<Backend> {
        if index >= self.backend_count() {
            return None;
        }
        let raw = unsafe { (self.api.get_backend)(self.as_raw(), index as c_int) };
        Some(Backend::from_raw(raw))
    }

    /// Refreshes device information and runs pending event callbacks on
    /// the calling thread. Device lists are stale until this is called.
    pub fn flush_events(&self) {
        let _bound = self.bind();
        unsafe { (self.api.flush_events)(self.as_raw()) }
    }

    /// Blocks until an event arrives, then behaves like [`Self::flush_events`].
    pub fn wait_events(&self) {
        let _bound = self.bind();
        unsafe { (self.api.wait_events)(self.as_raw()) }
    }

    /// Publishes `self` to the event trampolines until the guard drops.
    fn bind(&self) -> BoundContext<'_> {
        let this = self as *const Context as *mut Context;
        let previous = self.callbacks.bound.swap(this, Ordering::AcqRel);
        BoundContext {
            callbacks: &self.callbacks,
            previous,
        }
    }

    /// Makes a blocked [`Self::wait_events`] return.
    pub fn wakeup(&self) {
        unsafe { (self.api.wakeup)(self.as_raw()) }
    }

    /// A handle other threads can use to call [`Self::wakeup`].
    pub fn waker(&self) -> Waker<'_> {
        Waker {
            raw: self.raw,
            api: self.api,
            _context: PhantomData,
        }
    }

    /// Asks the backend to rescan devices; results arrive on a later flush.
    pub fn force_device_scan(&self) {
        unsafe { (self.api.force_device_scan)(self.as_raw()) }
    }

    pub fn input_device_count(&self) -> usize {
        unsafe { (self.api.input_device_count)(self.as_raw()) }.max(0) as usize
    }

    pub fn output_device_count(&self) -> usize {
        unsafe { (self.api.output_device_count)(self.as_raw()) }.max(0) as usize
    }

    /// `None` when there are no input devices.
    pub fn default_input_device_index(&self) -> Option<usize> {
        let index = unsafe { (self.api.default_input_device_index)(self.as_raw()) };
        usize::try_from(index).ok()
    }

    pub fn default_output_device_index(&self) -> Option<usize> {
        let index = unsafe { (self.api.default_output_device_index)(self.as_raw()) };
        usize::try_from(index).ok()
    }

    pub fn input_device(&self, index: usize) -> Result<Device<'_>> {
        if index >= self.input_device_count() {
            return Err(Error::NoSuchDevice);
        }
        let raw = unsafe { (self.api.get_input_device)(self.as_raw(), index as c_int) };
        unsafe { Device::from_raw(self, raw) }
    }

    pub fn output_device(&self, index: usize) -> Result<Device<'_>> {
        if index >= self.output_device_count() {
            return Err(Error::NoSuchDevice);
        }
        let raw = unsafe { (self.api.get_output_device)(self.as_raw(), index as c_int) };
        unsafe { Device::from_raw(self, raw) }
    }

    /// Every input device, in library order. Devices that failed probing
    /// are yielded as their probe error.
    pub fn input_devices(&self) -> impl Iterator<Item = Result<Device<'_>>> + '_ {
        (0..self.input_device_count()).map(move |index| self.input_device(index))
    }

    pub fn output_devices(&self) -> impl Iterator<Item = Result<Device<'_>>> + '_ {
        (0..self.output_device_count()).map(move |index| self.output_device(index))
    }

    /// Capacity is rounded up by the library to a whole number of pages.
    pub fn create_ring_buffer(&self, capacity: usize) -> Result<RingBuffer> {
        unsafe { RingBuffer::create(self.api, self.as_raw(), capacity) }
    }

    /// Called from [`Self::flush_events`] / [`Self::wait_events`] when the
    /// device list changed. The handler may query and open devices through
    /// the context it receives; nested flushes skip it.
    pub fn set_on_devices_change<F>(&mut self, callback: F)
    where
        F: FnMut(&Context) + 'static,
    {
        *self.callbacks.devices_change.lock() = Some(Box::new(callback));
        self.native_mut().on_devices_change = Some(devices_change_trampoline);
    }

    /// Restores the library's default handler.
    pub fn take_on_devices_change(&mut self) -> Option<DevicesChangeCallback> {
        self.native_mut().on_devices_change = self.defaults.on_devices_change;
        self.callbacks.devices_change.lock().take()
    }

    /// Called from [`Self::flush_events`] / [`Self::wait_events`] when the
    /// backend goes away. Without one, the library aborts the process.
    pub fn set_on_backend_disconnect<F>(&mut self, callback: F)
    where
        F: FnMut(&Context, Error) + 'static,
    {
        *self.callbacks.backend_disconnect.lock() = Some(Box::new(callback));
        self.native_mut().on_backend_disconnect = Some(backend_disconnect_trampoline);
    }

    pub fn take_on_backend_disconnect(&mut self) -> Option<BackendDisconnectCallback> {
        self.native_mut().on_backend_disconnect = self.defaults.on_backend_disconnect;
        self.callbacks.backend_disconnect.lock().take()
    }

    /// Called from a library thread whenever events become available.
    pub fn set_on_events_signal<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        *self.callbacks.events_signal.lock() = Some(Box::new(callback));
        self.native_mut().on_events_signal = Some(events_signal_trampoline);
    }

    pub fn take_on_events_signal(&mut self) -> Option<EventsSignalCallback> {
        self.native_mut().on_events_signal = self.defaults.on_events_signal;
        self.callbacks.events_signal.lock().take()
    }

    pub fn emit_rtprio_warning(&self) -> Option<RtPrioWarningFn> {
        self.native().emit_rtprio_warning
    }

    /// Called at most once per context. `None` silences the warning.
    pub fn set_emit_rtprio_warning(&mut self, hook: Option<RtPrioWarningFn>) {
        self.native_mut().emit_rtprio_warning = hook;
    }

    pub fn jack_info_callback(&self) -> Option<JackMessageFn> {
        self.native().jack_info_callback
    }

    /// May be called from any thread.
    pub fn set_jack_info_callback(&mut self, hook: Option<JackMessageFn>) {
        self.native_mut().jack_info_callback = hook;
    }

    pub fn jack_error_callback(&self) -> Option<JackMessageFn> {
        self.native().jack_error_callback
    }

    pub fn set_jack_error_callback(&mut self, hook: Option<JackMessageFn>) {
        self.native_mut().jack_error_callback = hook;
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe { (self.api.destroy)(self.as_raw()) };
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("backend", &self.current_backend())
            .field("app_name", &self.app_name)
            .finish_non_exhaustive()
    }
}

struct BoundContext<'a> {
    callbacks: &'a ContextCallbacks,
    previous: *mut Context,
}

impl Drop for BoundContext<'_> {
    fn drop(&mut self) {
        self.callbacks.bound.store(self.previous, Ordering::Release);
    }
}

/// Wakes a context blocked in [`Context::wait_events`] from another thread.
#[derive(Clone, Copy)]
pub struct Waker<'ctx> {
    raw: NonNull<SoundIo>,
    api: &'static SoundIoApi,
    _context: PhantomData<&'ctx Context>,
}

// `soundio_wakeup` is documented as callable from any thread.
unsafe impl Send for Waker<'_> {}
unsafe impl Sync for Waker<'_> {}

impl Waker<'_> {
    pub fn wakeup(&self) {
        unsafe { (self.api.wakeup)(self.raw.as_ptr()) }
    }
}

unsafe fn callbacks_of<'a>(soundio: *mut SoundIo) -> Option<&'a ContextCallbacks> {
    if soundio.is_null() {
        return None;
    }
    ((*soundio).userdata as *const ContextCallbacks).as_ref()
}

/// The context currently inside a flush, if any.
unsafe fn bound_context<'a>(callbacks: &ContextCallbacks) -> Option<&'a Context> {
    callbacks.bound.load(Ordering::Acquire).cast_const().as_ref()
}

unsafe extern "C" fn devices_change_trampoline(soundio: *mut SoundIo) {
    let Some(callbacks) = callbacks_of(soundio) else {
        return;
    };
    let Some(context) = bound_context(callbacks) else {
        return;
    };
    if let Some(mut slot) = callbacks.devices_change.try_lock() {
        if let Some(callback) = slot.as_mut() {
            callback(context);
        }
    }
}

unsafe extern "C" fn backend_disconnect_trampoline(soundio: *mut SoundIo, err: c_int) {
    let Some(callbacks) = callbacks_of(soundio) else {
        return;
    };
    let Some(context) = bound_context(callbacks) else {
        return;
    };
    if let Some(mut slot) = callbacks.backend_disconnect.try_lock() {
        if let Some(callback) = slot.as_mut() {
            callback(context, Error::from_code(err).unwrap_or(Error::BackendDisconnected));
        }
    }
}

unsafe extern "C" fn events_signal_trampoline(soundio: *mut SoundIo) {
    let Some(callbacks) = callbacks_of(soundio) else {
        return;
    };
    if let Some(mut slot) = callbacks.events_signal.try_lock() {
        if let Some(callback) = slot.as_mut() {
            callback();
        }
    }
}
