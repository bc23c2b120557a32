//! Global constants shared across the panel: geometry, palette, fonts,
//! JSON-RPC label batches, and loop cadence.

use std::time::Duration;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{RgbColor, WebColors};
use profont::{PROFONT_10_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT};

/// The total width of the panel in pixels.
pub const FRAME_WIDTH: u32 = 320;
/// The total height of the panel in pixels.
pub const FRAME_HEIGHT: u32 = 240;

/// Target height for resized cover art on the default layouts.
pub const THUMB_HEIGHT: u32 = 140;

/// Right-hand margin reserved when truncating text to the panel width.
pub const TRUNCATE_MARGIN: u32 = 20;

/// Appended exactly once to any string the truncation pass shortened.
pub const ELLIPSIS: char = '\u{2026}';

// Track info fonts
pub static FONT_MAIN: &MonoFont<'static> = &PROFONT_18_POINT;
pub static FONT_SM: &MonoFont<'static> = &PROFONT_14_POINT;
pub static FONT_TINY: &MonoFont<'static> = &PROFONT_10_POINT;
/// Large face for elapsed time and the status clock.
pub static FONT_TIME: &MonoFont<'static> = &PROFONT_24_POINT;

// Colors
/// Elapsed time and clock digits.
pub const COLOR_TIME: Rgb888 = Rgb888::CSS_SPRING_GREEN;
/// Progress bar track.
pub const COLOR_PROG_BG: Rgb888 = Rgb888::CSS_DIM_GRAY;
/// Progress bar fill, same accent as the time digits.
pub const COLOR_PROG_FG: Rgb888 = Rgb888::CSS_SPRING_GREEN;
/// Artist line accent.
pub const COLOR_ARTIST: Rgb888 = Rgb888::CSS_YELLOW;
pub const COLOR_TEXT: Rgb888 = Rgb888::WHITE;

/// Info labels requested while music is playing.
pub const AUDIO_LABELS: &[&str] = &[
    "MusicPlayer.Title",
    "MusicPlayer.Album",
    "MusicPlayer.Artist",
    "MusicPlayer.Time",
    "MusicPlayer.Duration",
    "MusicPlayer.TrackNumber",
    "MusicPlayer.Property(Role.Composer)",
    "MusicPlayer.Codec",
    "MusicPlayer.Year",
    "MusicPlayer.Genre",
    "MusicPlayer.Cover",
];

/// Info labels requested while video is playing.
pub const VIDEO_LABELS: &[&str] = &[
    "VideoPlayer.Title",
    "VideoPlayer.TagLine",
    "VideoPlayer.Time",
    "VideoPlayer.Duration",
    "VideoPlayer.Genre",
    "VideoPlayer.Year",
    "VideoPlayer.Rating",
    "VideoPlayer.VideoCodec",
    "VideoPlayer.ChannelName",
    "VideoPlayer.Cover",
];

/// System labels for the idle status screens.
pub const STATUS_LABELS: &[&str] = &[
    "System.Uptime",
    "System.CPUTemperature",
    "System.Date",
    "System.Time",
    "System.ScreenSaverActive",
];

/// Synthetic label carrying the one-line player summary on status screens.
pub const LABEL_SUMMARY: &str = "Panel.Summary";
/// Synthetic label carrying the separately fetched playback percentage.
pub const LABEL_PERCENT: &str = "Player.Percentage";

/// Audio codec short-name lookup for the codec field.
pub const CODEC_NAMES: &[(&str, &str)] = &[
    ("ac3", "DD"),
    ("eac3", "DD"),
    ("dtshd_ma", "DTS-MA"),
    ("dca", "DTS"),
    ("truehd", "DD-HD"),
    ("wmapro", "WMA"),
    ("mp3float", "MP3"),
    ("flac", "FLAC"),
    ("alac", "ALAC"),
    ("vorbis", "OggV"),
    ("aac", "AAC"),
    ("pcm_s16be", "PCM"),
    ("mp2", "MP2"),
    ("pcm_u8", "PCM"),
    ("BXA", "AirPlay"),
    ("dsd_lsbf_planar", "DSD"),
];

/// Update cadence; enough for a smooth progress bar and elapsed time.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(910);
/// How often to re-ping an unreachable Kodi.
pub const RECONNECT_POLL: Duration = Duration::from_secs(5);
/// Default status screen waketime after a press, in seconds.
pub const SCREEN_WAKE_SECS: u64 = 15;
