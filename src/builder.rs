//! Builder for configuring and connecting a `Context`.

use crate::context::{JackMessageFn, RtPrioWarningFn};
use crate::{Backend, Context, Result};
use std::path::PathBuf;

/// Hooks left unset keep the library's defaults. Without an explicit
/// backend every compiled-in backend is tried in order.
///
/// # Example
///
/// ```ignore
/// use sio::{Backend, Context};
///
/// let ctx = Context::builder()
///     .app_name("my-player")
///     .backend(Backend::PulseAudio)
///     .build()?;
///
/// for device in ctx.output_devices() {
///     println!("{}", device?.name());
/// }
/// ```
pub struct ContextBuilder {
    app_name: Option<String>,
    backend: Option<Backend>,
    library_path: Option<PathBuf>,
    emit_rtprio_warning: Option<Option<RtPrioWarningFn>>,
    jack_info_callback: Option<Option<JackMessageFn>>,
    jack_error_callback: Option<Option<JackMessageFn>>,
    flush_events: bool,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            app_name: None,
            backend: None,
            library_path: None,
            emit_rtprio_warning: None,
            jack_info_callback: None,
            jack_error_callback: None,
            flush_events: true,
        }
    }
}

impl ContextBuilder {
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Ignored once the library has been loaded by an earlier call.
    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// `None` silences the warning.
    pub fn emit_rtprio_warning(mut self, hook: Option<RtPrioWarningFn>) -> Self {
        self.emit_rtprio_warning = Some(hook);
        self
    }

    pub fn jack_info_callback(mut self, hook: Option<JackMessageFn>) -> Self {
        self.jack_info_callback = Some(hook);
        self
    }

    pub fn jack_error_callback(mut self, hook: Option<JackMessageFn>) -> Self {
        self.jack_error_callback = Some(hook);
        self
    }

    /// Default: true, so devices can be queried right after [`Self::build`].
    pub fn flush_events(mut self, flush: bool) -> Self {
        self.flush_events = flush;
        self
    }

    /// Creates, configures and connects the context.
    pub fn build(self) -> Result<Context> {
        if let Some(path) = &self.library_path {
            sio_sys::load_from(path)?;
        }

        let mut ctx = Context::new()?;
        if let Some(name) = &self.app_name {
            ctx.set_app_name(name)?;
        }
        if let Some(hook) = self.emit_rtprio_warning {
            ctx.set_emit_rtprio_warning(hook);
        }
        if let Some(hook) = self.jack_info_callback {
            ctx.set_jack_info_callback(hook);
        }
        if let Some(hook) = self.jack_error_callback {
            ctx.set_jack_error_callback(hook);
        }

        match self.backend {
            Some(backend) => ctx.connect_backend(backend)?,
            None => ctx.connect()?,
        }
        if self.flush_events {
            ctx.flush_events();
        }
        Ok(ctx)
    }
}
