//! Sample formats and byte-size arithmetic.

use sio_sys::SoundIoFormat;
use std::fmt;

/// Sample format, numbered as the native `SoundIoFormat`.
///
/// 24-bit formats are stored in 32 bits per sample.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Format {
    #[default]
    Invalid = 0,
    S8,
    U8,
    S16LE,
    S16BE,
    U16LE,
    U16BE,
    S24LE,
    S24BE,
    U24LE,
    U24BE,
    S32LE,
    S32BE,
    U32LE,
    U32BE,
    Float32LE,
    Float32BE,
    Float64LE,
    Float64BE,
}

#[cfg(target_endian = "little")]
impl Format {
    pub const S16NE: Format = Format::S16LE;
    pub const U16NE: Format = Format::U16LE;
    pub const S24NE: Format = Format::S24LE;
    pub const U24NE: Format = Format::U24LE;
    pub const S32NE: Format = Format::S32LE;
    pub const U32NE: Format = Format::U32LE;
    pub const FLOAT32NE: Format = Format::Float32LE;
    pub const FLOAT64NE: Format = Format::Float64LE;

    pub const S16FE: Format = Format::S16BE;
    pub const U16FE: Format = Format::U16BE;
    pub const S24FE: Format = Format::S24BE;
    pub const U24FE: Format = Format::U24BE;
    pub const S32FE: Format = Format::S32BE;
    pub const U32FE: Format = Format::U32BE;
    pub const FLOAT32FE: Format = Format::Float32BE;
    pub const FLOAT64FE: Format = Format::Float64BE;
}

#[cfg(target_endian = "big")]
impl Format {
    pub const S16NE: Format = Format::S16BE;
    pub const U16NE: Format = Format::U16BE;
    pub const S24NE: Format = Format::S24BE;
    pub const U24NE: Format = Format::U24BE;
    pub const S32NE: Format = Format::S32BE;
    pub const U32NE: Format = Format::U32BE;
    pub const FLOAT32NE: Format = Format::Float32BE;
    pub const FLOAT64NE: Format = Format::Float64BE;

    pub const S16FE: Format = Format::S16LE;
    pub const U16FE: Format = Format::U16LE;
    pub const S24FE: Format = Format::S24LE;
    pub const U24FE: Format = Format::U24LE;
    pub const S32FE: Format = Format::S32LE;
    pub const U32FE: Format = Format::U32LE;
    pub const FLOAT32FE: Format = Format::Float32LE;
    pub const FLOAT64FE: Format = Format::Float64LE;
}

impl Format {
    pub const ALL: [Format; 18] = [
        Format::S8,
        Format::U8,
        Format::S16LE,
        Format::S16BE,
        Format::U16LE,
        Format::U16BE,
        Format::S24LE,
        Format::S24BE,
        Format::U24LE,
        Format::U24BE,
        Format::S32LE,
        Format::S32BE,
        Format::U32LE,
        Format::U32BE,
        Format::Float32LE,
        Format::Float32BE,
        Format::Float64LE,
        Format::Float64BE,
    ];

    /// Unknown values collapse to [`Format::Invalid`].
    pub fn from_raw(raw: SoundIoFormat) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.to_raw() == raw)
            .unwrap_or(Format::Invalid)
    }

    pub fn to_raw(self) -> SoundIoFormat {
        self as SoundIoFormat
    }

    pub fn name(self) -> &'static str {
        format_name(self)
    }

    pub fn bytes_per_sample(self) -> Option<usize> {
        bytes_per_sample(self)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_name(*self))
    }
}

/// `None` for [`Format::Invalid`].
pub fn bytes_per_sample(format: Format) -> Option<usize> {
    let bytes = match format {
        Format::Invalid => return None,
        Format::S8 | Format::U8 => 1,
        Format::S16LE | Format::S16BE | Format::U16LE | Format::U16BE => 2,
        Format::S24LE | Format::S24BE | Format::U24LE | Format::U24BE => 4,
        Format::S32LE | Format::S32BE | Format::U32LE | Format::U32BE => 4,
        Format::Float32LE | Format::Float32BE => 4,
        Format::Float64LE | Format::Float64BE => 8,
    };
    Some(bytes)
}

/// `None` for [`Format::Invalid`] or when the size overflows `usize`.
pub fn bytes_per_frame(format: Format, channel_count: usize) -> Option<usize> {
    bytes_per_sample(format)?.checked_mul(channel_count)
}

/// `None` for [`Format::Invalid`] or when the size overflows `usize`.
pub fn bytes_per_second(format: Format, channel_count: usize, sample_rate: usize) -> Option<usize> {
    bytes_per_frame(format, channel_count)?.checked_mul(sample_rate)
}

pub fn format_name(format: Format) -> &'static str {
    match format {
        Format::Invalid => "(invalid sample format)",
        Format::S8 => "signed 8-bit",
        Format::U8 => "unsigned 8-bit",
        Format::S16LE => "signed 16-bit LE",
        Format::S16BE => "signed 16-bit BE",
        Format::U16LE => "unsigned 16-bit LE",
        Format::U16BE => "unsigned 16-bit BE",
        Format::S24LE => "signed 24-bit LE",
        Format::S24BE => "signed 24-bit BE",
        Format::U24LE => "unsigned 24-bit LE",
        Format::U24BE => "unsigned 24-bit BE",
        Format::S32LE => "signed 32-bit LE",
        Format::S32BE => "signed 32-bit BE",
        Format::U32LE => "unsigned 32-bit LE",
        Format::U32BE => "unsigned 32-bit BE",
        Format::Float32LE => "float 32-bit LE",
        Format::Float32BE => "float 32-bit BE",
        Format::Float64LE => "float 64-bit LE",
        Format::Float64BE => "float 64-bit BE",
    }
}
