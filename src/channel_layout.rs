//! Channel layouts: a named, ordered set of up to [`MAX_CHANNELS`] channel ids.
//!
//! Comparison, lookup, sorting and best-match selection are computed here
//! with the library's semantics so they work on plain values. The builtin
//! table lives in the library and is read through it.

use crate::channel::ChannelId;
use crate::{Error, Result};
use sio_sys::SoundIoChannelLayout;
use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_int;

pub const MAX_CHANNELS: usize = sio_sys::SOUNDIO_MAX_CHANNELS;

#[derive(Debug, Clone, Default)]
pub struct ChannelLayout {
    name: Option<String>,
    channel_count: usize,
    channels: [ChannelId; MAX_CHANNELS],
}

impl ChannelLayout {
    pub fn new(name: impl Into<String>, channels: &[ChannelId]) -> Result<Self> {
        let mut layout = Self {
            name: Some(name.into()),
            ..Self::default()
        };
        layout.set_channels(channels)?;
        Ok(layout)
    }

    /// Copies a native layout. A null name becomes `None`; the channel count
    /// is clamped to `0..=MAX_CHANNELS`.
    ///
    /// # Safety
    /// `raw.name` must be null or point to a valid nul-terminated string.
    pub unsafe fn from_raw(raw: &SoundIoChannelLayout) -> Self {
        let name = if raw.name.is_null() {
            None
        } else {
            Some(CStr::from_ptr(raw.name).to_string_lossy().into_owned())
        };
        let channel_count = raw.channel_count.clamp(0, MAX_CHANNELS as i32) as usize;
        let mut channels = [ChannelId::Invalid; MAX_CHANNELS];
        for (dst, &src) in channels.iter_mut().zip(raw.channels.iter()) {
            *dst = ChannelId::from_raw(src);
        }
        Self {
            name,
            channel_count,
            channels,
        }
    }

    /// Native form with a null name; callers that hand the layout to the
    /// library for longer than one call attach a name they keep alive.
    pub fn to_raw(&self) -> SoundIoChannelLayout {
        let mut raw = SoundIoChannelLayout::empty();
        raw.channel_count = self.channel_count as i32;
        for (dst, src) in raw.channels.iter_mut().zip(self.channels.iter()) {
            *dst = src.to_raw();
        }
        raw
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn clear_name(&mut self) {
        self.name = None;
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Clamped to [`MAX_CHANNELS`]. Slots beyond the previously set channels
    /// read as whatever they last held (initially [`ChannelId::Invalid`]).
    pub fn set_channel_count(&mut self, channel_count: usize) {
        self.channel_count = channel_count.min(MAX_CHANNELS);
    }

    pub fn channels(&self) -> &[ChannelId] {
        &self.channels[..self.channel_count]
    }

    pub fn set_channels(&mut self, channels: &[ChannelId]) -> Result<()> {
        if channels.len() > MAX_CHANNELS {
            return Err(Error::TooManyChannels(channels.len()));
        }
        self.channels[..channels.len()].copy_from_slice(channels);
        self.channel_count = channels.len();
        Ok(())
    }

    /// Index of `channel` among the active channels.
    pub fn find_channel(&self, channel: ChannelId) -> Option<usize> {
        self.channels().iter().position(|&c| c == channel)
    }

    pub fn builtin_count() -> Result<usize> {
        let api = sio_sys::load()?;
        Ok(unsafe { (api.channel_layout_builtin_count)() }.max(0) as usize)
    }

    pub fn builtin(index: usize) -> Result<Option<ChannelLayout>> {
        if index >= Self::builtin_count()? {
            return Ok(None);
        }
        let api = sio_sys::load()?;
        let raw = unsafe { (api.channel_layout_get_builtin)(index as i32) };
        Ok(unsafe { raw.as_ref() }.map(|raw| unsafe { Self::from_raw(raw) }))
    }

    pub fn builtins() -> Result<Vec<ChannelLayout>> {
        let count = Self::builtin_count()?;
        let mut layouts = Vec::with_capacity(count);
        for index in 0..count {
            if let Some(layout) = Self::builtin(index)? {
                layouts.push(layout);
            }
        }
        Ok(layouts)
    }

    /// The library's default layout for `channel_count` channels, if it has one.
    pub fn default_for(channel_count: usize) -> Result<Option<ChannelLayout>> {
        let api = sio_sys::load()?;
        let Ok(channel_count) = c_int::try_from(channel_count) else {
            return Ok(None);
        };
        let raw = unsafe { (api.channel_layout_get_default)(channel_count) };
        Ok(unsafe { raw.as_ref() }.map(|raw| unsafe { Self::from_raw(raw) }))
    }

    /// Names this layout after the builtin it matches. When none matches the
    /// name is cleared and `false` is returned.
    pub fn detect_builtin(&mut self) -> Result<bool> {
        let api = sio_sys::load()?;
        let mut raw = self.to_raw();
        let found = unsafe { (api.channel_layout_detect_builtin)(&mut raw) };
        self.name = if found && !raw.name.is_null() {
            // Points into the library's static builtin table.
            Some(unsafe { CStr::from_ptr(raw.name) }.to_string_lossy().into_owned())
        } else {
            None
        };
        Ok(found)
    }

    /// The first layout of `preferred` that also appears in `available`.
    /// The `preferred` entry is returned, name included.
    pub fn best_matching(
        preferred: &[ChannelLayout],
        available: &[ChannelLayout],
    ) -> Option<ChannelLayout> {
        preferred
            .iter()
            .find(|want| available.contains(want))
            .cloned()
    }

    /// Most channels first.
    pub fn sort(layouts: &mut [ChannelLayout]) {
        layouts.sort_by(|a, b| b.channel_count.cmp(&a.channel_count));
    }
}

/// Same channel count and ids; the name is ignored.
impl PartialEq for ChannelLayout {
    fn eq(&self, other: &Self) -> bool {
        self.channels() == other.channels()
    }
}

impl Eq for ChannelLayout {}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            return f.write_str(name);
        }
        for (i, channel) in self.channels().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(channel.name())?;
        }
        Ok(())
    }
}
