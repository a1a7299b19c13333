//! Speaker channel identifiers.

use sio_sys::SoundIoChannelId;
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::str::FromStr;

macro_rules! channel_ids {
    ($( $variant:ident = $value:literal => $name:literal $(| $alias:literal)*, )*) => {
        /// Channel identifier, numbered as the native `SoundIoChannelId`.
        #[repr(i32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub enum ChannelId {
            #[default]
            Invalid = 0,
            $( $variant = $value, )*
        }

        impl ChannelId {
            /// Every valid id, in native order.
            pub const ALL: &'static [ChannelId] = &[ $( ChannelId::$variant, )* ];

            /// Unknown values collapse to [`ChannelId::Invalid`].
            pub fn from_raw(raw: SoundIoChannelId) -> Self {
                match raw {
                    $( $value => ChannelId::$variant, )*
                    _ => ChannelId::Invalid,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    ChannelId::Invalid => "(Invalid Channel)",
                    $( ChannelId::$variant => $name, )*
                }
            }

            /// Short and PulseAudio-style spellings, such as `"FL"` and
            /// `"front-left"`.
            pub fn aliases(self) -> &'static [&'static str] {
                match self {
                    ChannelId::Invalid => &[],
                    $( ChannelId::$variant => &[ $( $alias, )* ], )*
                }
            }
        }
    };
}

channel_ids! {
    FrontLeft = 1 => "Front Left" | "FL" | "front-left",
    FrontRight = 2 => "Front Right" | "FR" | "front-right",
    FrontCenter = 3 => "Front Center" | "FC" | "front-center",
    Lfe = 4 => "LFE",
    BackLeft = 5 => "Back Left" | "rear-left",
    BackRight = 6 => "Back Right" | "rear-right",
    FrontLeftCenter = 7 => "Front Left Center" | "front-left-of-center",
    FrontRightCenter = 8 => "Front Right Center" | "front-right-of-center",
    BackCenter = 9 => "Back Center" | "rear-center",
    SideLeft = 10 => "Side Left" | "side-left",
    SideRight = 11 => "Side Right" | "side-right",
    TopCenter = 12 => "Top Center" | "top-center",
    TopFrontLeft = 13 => "Top Front Left" | "top-front-left",
    TopFrontCenter = 14 => "Top Front Center" | "top-front-center",
    TopFrontRight = 15 => "Top Front Right" | "top-front-right",
    TopBackLeft = 16 => "Top Back Left" | "top-rear-left",
    TopBackCenter = 17 => "Top Back Center" | "top-rear-center",
    TopBackRight = 18 => "Top Back Right" | "top-rear-right",

    BackLeftCenter = 19 => "Back Left Center",
    BackRightCenter = 20 => "Back Right Center",
    FrontLeftWide = 21 => "Front Left Wide",
    FrontRightWide = 22 => "Front Right Wide",
    FrontLeftHigh = 23 => "Front Left High",
    FrontCenterHigh = 24 => "Front Center High",
    FrontRightHigh = 25 => "Front Right High",
    TopFrontLeftCenter = 26 => "Top Front Left Center",
    TopFrontRightCenter = 27 => "Top Front Right Center",
    TopSideLeft = 28 => "Top Side Left",
    TopSideRight = 29 => "Top Side Right",
    LeftLfe = 30 => "Left LFE",
    RightLfe = 31 => "Right LFE",
    Lfe2 = 32 => "LFE 2",
    BottomCenter = 33 => "Bottom Center",
    BottomLeftCenter = 34 => "Bottom Left Center",
    BottomRightCenter = 35 => "Bottom Right Center",

    MsMid = 36 => "Mid/Side Mid",
    MsSide = 37 => "Mid/Side Side",

    AmbisonicW = 38 => "Ambisonic W",
    AmbisonicX = 39 => "Ambisonic X",
    AmbisonicY = 40 => "Ambisonic Y",
    AmbisonicZ = 41 => "Ambisonic Z",

    XyX = 42 => "X-Y X",
    XyY = 43 => "X-Y Y",

    HeadphonesLeft = 44 => "Headphones Left",
    HeadphonesRight = 45 => "Headphones Right",
    ClickTrack = 46 => "Click Track",
    ForeignLanguage = 47 => "Foreign Language",
    HearingImpaired = 48 => "Hearing Impaired",
    Narration = 49 => "Narration",
    Haptic = 50 => "Haptic",
    DialogCentricMix = 51 => "Dialog Centric Mix",

    Aux = 52 => "Aux",
    Aux0 = 53 => "Aux 0",
    Aux1 = 54 => "Aux 1",
    Aux2 = 55 => "Aux 2",
    Aux3 = 56 => "Aux 3",
    Aux4 = 57 => "Aux 4",
    Aux5 = 58 => "Aux 5",
    Aux6 = 59 => "Aux 6",
    Aux7 = 60 => "Aux 7",
    Aux8 = 61 => "Aux 8",
    Aux9 = 62 => "Aux 9",
    Aux10 = 63 => "Aux 10",
    Aux11 = 64 => "Aux 11",
    Aux12 = 65 => "Aux 12",
    Aux13 = 66 => "Aux 13",
    Aux14 = 67 => "Aux 14",
    Aux15 = 68 => "Aux 15",
}

impl ChannelId {
    pub fn to_raw(self) -> SoundIoChannelId {
        self as SoundIoChannelId
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a channel name; see [`parse_channel_id`].
impl FromStr for ChannelId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_channel_id(s).ok_or(crate::Error::Invalid)
    }
}

pub fn channel_name(channel: ChannelId) -> &'static str {
    channel.name()
}

/// Accepts display names (case-insensitive, `"Front Left"`) and the
/// library's aliases (`"FL"`, `"front-left"`). Other names are handed to
/// `soundio_parse_channel_id` when the library is available. `None` when
/// nothing matches.
pub fn parse_channel_id(name: &str) -> Option<ChannelId> {
    let name = name.trim();
    ChannelId::ALL
        .iter()
        .copied()
        .find(|c| c.name().eq_ignore_ascii_case(name) || c.aliases().contains(&name))
        .or_else(|| parse_with_library(name))
}

fn parse_with_library(name: &str) -> Option<ChannelId> {
    let api = sio_sys::load().ok()?;
    let len = c_int::try_from(name.len()).ok()?;
    let raw = unsafe { (api.parse_channel_id)(name.as_ptr().cast::<c_char>(), len) };
    match ChannelId::from_raw(raw) {
        ChannelId::Invalid => None,
        id => Some(id),
    }
}
