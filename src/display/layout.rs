/*
 *  display/layout.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Declarative per-screen-mode layout definitions and the registry the
 *  renderer interprets each refresh tick
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::HashMap;

use embedded_graphics::prelude::Point;
use thiserror::Error;

use crate::constants::{
    CODEC_NAMES, COLOR_ARTIST, COLOR_TEXT, COLOR_TIME, FONT_MAIN, FONT_SM, FONT_TIME, FONT_TINY,
    FRAME_HEIGHT, FRAME_WIDTH, LABEL_SUMMARY, THUMB_HEIGHT,
};
use crate::display::field::{Condition, FieldKind, FieldSpec, Predicate};
use crate::display::mode_controller::{AudioMode, ScreenMode, StatusMode, VideoMode};
use crate::display::registry::CallbackRegistry;

/// Where the cover art lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtPlacement {
    At(Point),
    /// Both axes centered from the decoded thumb dimensions
    Centered,
}

#[derive(Debug, Clone, Copy)]
pub struct ArtworkSpec {
    pub placement: ArtPlacement,
    /// Target height; also the square crop bound
    pub size: u32,
}

/// Horizontal bars come in two lengths so a 3-component elapsed string
/// does not collide with the bar footprint.
#[derive(Debug, Clone, Copy)]
pub enum BarLength {
    Fixed(u32),
    Adaptive { short: u32, long: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct ProgressSpec {
    pub pos: Point,
    pub length: BarLength,
    pub height: u32,
    pub vertical: bool,
}

/// Everything one screen mode draws: artwork slot, progress bar, fields.
/// Field order only matters for label/value pairing and paint order.
#[derive(Debug, Clone)]
pub struct Layout {
    pub name: &'static str,
    pub artwork: Option<ArtworkSpec>,
    pub progress: Option<ProgressSpec>,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout {layout}: unknown string transform '{key}'")]
    UnknownTransform { layout: &'static str, key: String },

    #[error("layout {layout}: unknown custom element '{key}'")]
    UnknownElement { layout: &'static str, key: String },

    #[error("layout {layout}: element field '{field}' has no registry key")]
    MissingElementKey { layout: &'static str, field: String },

    #[error("layout {layout}: field '{field}' has a predicate with an empty label")]
    EmptyConditionLabel { layout: &'static str, field: String },
}

/// Static per-screen-mode layout table.
pub struct LayoutRegistry {
    layouts: HashMap<ScreenMode, Layout>,
}

impl LayoutRegistry {
    /// The stock screen set.
    pub fn defaults() -> Self {
        let mut layouts = HashMap::new();
        layouts.insert(ScreenMode::Audio(AudioMode::Default), audio_default());
        layouts.insert(ScreenMode::Audio(AudioMode::Fullscreen), fullscreen("audio_fullscreen"));
        layouts.insert(ScreenMode::Audio(AudioMode::FullProg), fullscreen_prog("audio_fullprog"));
        layouts.insert(ScreenMode::Video(VideoMode::Default), video_default());
        layouts.insert(ScreenMode::Video(VideoMode::Fullscreen), fullscreen("video_fullscreen"));
        layouts.insert(ScreenMode::Video(VideoMode::FullProg), fullscreen_prog("video_fullprog"));
        layouts.insert(ScreenMode::Status(StatusMode::Summary), status_summary());
        layouts.insert(ScreenMode::Status(StatusMode::Screensaver), status_screensaver());
        Self { layouts }
    }

    pub fn get(&self, mode: ScreenMode) -> Option<&Layout> {
        self.layouts.get(&mode)
    }

    /// Replace or add a screen definition before the loop starts.
    pub fn insert(&mut self, mode: ScreenMode, layout: Layout) {
        self.layouts.insert(mode, layout);
    }

    /// Load-time validation: every referenced callback key must resolve and
    /// every condition must name real labels. Rendering never re-checks.
    pub fn validate(&self, registry: &CallbackRegistry) -> Result<(), LayoutError> {
        for layout in self.layouts.values() {
            for field in &layout.fields {
                if field.kind == FieldKind::Element {
                    match field.element.as_deref() {
                        None => {
                            return Err(LayoutError::MissingElementKey {
                                layout: layout.name,
                                field: field.name.clone(),
                            });
                        }
                        Some(key) if !registry.has_element(key) => {
                            return Err(LayoutError::UnknownElement {
                                layout: layout.name,
                                key: key.to_string(),
                            });
                        }
                        Some(_) => {}
                    }
                }
                if let Some(key) = field.transform.as_deref() {
                    if !registry.has_transform(key) {
                        return Err(LayoutError::UnknownTransform {
                            layout: layout.name,
                            key: key.to_string(),
                        });
                    }
                }
                if let Some(cond) = &field.condition {
                    if cond.predicates().iter().any(|p| p.label().is_empty()) {
                        return Err(LayoutError::EmptyConditionLabel {
                            layout: layout.name,
                            field: field.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stock screens
// ---------------------------------------------------------------------------

/// Small art, elapsed time, track info.
fn audio_default() -> Layout {
    Layout {
        name: "audio_default",
        artwork: Some(ArtworkSpec {
            placement: ArtPlacement::At(Point::new(5, 5)),
            size: THUMB_HEIGHT,
        }),
        progress: Some(ProgressSpec {
            pos: Point::new(150, 7),
            length: BarLength::Adaptive { short: 104, long: 164 },
            height: 8,
            vertical: false,
        }),
        fields: vec![
            FieldSpec::text("MusicPlayer.Time", Point::new(148, 20), FONT_TIME, COLOR_TIME),
            FieldSpec::text("MusicPlayer.TrackNumber", Point::new(148, 73), FONT_TIME, COLOR_TIME)
                .label("Track", Point::new(148, 60), FONT_TINY, COLOR_TEXT),
            FieldSpec::text("MusicPlayer.Duration", Point::new(230, 60), FONT_TINY, COLOR_TEXT),
            FieldSpec::text("MusicPlayer.Codec", Point::new(230, 74), FONT_TINY, COLOR_TEXT)
                .lookup(CODEC_NAMES),
            FieldSpec::text("MusicPlayer.Genre", Point::new(230, 88), FONT_TINY, COLOR_TEXT)
                .truncated(),
            FieldSpec::text("MusicPlayer.Year", Point::new(230, 102), FONT_TINY, COLOR_TEXT),
            FieldSpec::text("MusicPlayer.Title", Point::new(5, 152), FONT_MAIN, COLOR_TEXT)
                .truncated(),
            FieldSpec::text("MusicPlayer.Album", Point::new(5, 180), FONT_SM, COLOR_TEXT)
                .truncated(),
            FieldSpec::text("MusicPlayer.Artist", Point::new(5, 205), FONT_SM, COLOR_ARTIST)
                .via("artist_or_composer")
                .truncated(),
        ],
    }
}

/// Fullscreen cover art, nothing else.
fn fullscreen(name: &'static str) -> Layout {
    Layout {
        name,
        artwork: Some(ArtworkSpec {
            placement: ArtPlacement::Centered,
            size: FRAME_HEIGHT - 5,
        }),
        progress: None,
        fields: Vec::new(),
    }
}

/// Fullscreen art plus a vertical progress sliver on the right edge.
fn fullscreen_prog(name: &'static str) -> Layout {
    Layout {
        name,
        artwork: Some(ArtworkSpec {
            placement: ArtPlacement::Centered,
            size: FRAME_HEIGHT - 5,
        }),
        progress: Some(ProgressSpec {
            pos: Point::new(FRAME_WIDTH as i32 - 12, 1),
            length: BarLength::Fixed(10),
            height: FRAME_HEIGHT - 4,
            vertical: true,
        }),
        fields: Vec::new(),
    }
}

/// Small art, elapsed time, video info. Live TV swaps the genre slot for
/// the channel name.
fn video_default() -> Layout {
    Layout {
        name: "video_default",
        artwork: Some(ArtworkSpec {
            placement: ArtPlacement::At(Point::new(5, 5)),
            size: THUMB_HEIGHT,
        }),
        progress: Some(ProgressSpec {
            pos: Point::new(150, 7),
            length: BarLength::Adaptive { short: 104, long: 164 },
            height: 8,
            vertical: false,
        }),
        fields: vec![
            FieldSpec::text("VideoPlayer.Time", Point::new(148, 20), FONT_TIME, COLOR_TIME),
            FieldSpec::text("VideoPlayer.Rating", Point::new(148, 73), FONT_SM, COLOR_TIME)
                .label("Rating", Point::new(148, 60), FONT_TINY, COLOR_TEXT),
            FieldSpec::text("VideoPlayer.Duration", Point::new(230, 60), FONT_TINY, COLOR_TEXT),
            FieldSpec::text("VideoPlayer.VideoCodec", Point::new(230, 74), FONT_TINY, COLOR_TEXT),
            FieldSpec::text("VideoPlayer.Genre", Point::new(230, 88), FONT_TINY, COLOR_TEXT)
                .truncated()
                .when(Condition::All(vec![Predicate::Missing(
                    "VideoPlayer.ChannelName".into(),
                )])),
            FieldSpec::text("VideoPlayer.ChannelName", Point::new(230, 88), FONT_TINY, COLOR_TEXT)
                .truncated()
                .when(Condition::All(vec![Predicate::Present(
                    "VideoPlayer.ChannelName".into(),
                )])),
            FieldSpec::text("VideoPlayer.Year", Point::new(230, 102), FONT_TINY, COLOR_TEXT),
            FieldSpec::text("VideoPlayer.Title", Point::new(5, 152), FONT_MAIN, COLOR_TEXT)
                .truncated(),
            FieldSpec::text("VideoPlayer.TagLine", Point::new(5, 180), FONT_SM, COLOR_TEXT)
                .truncated(),
        ],
    }
}

/// Idle status screen shown on a press.
fn status_summary() -> Layout {
    Layout {
        name: "status_summary",
        artwork: None,
        progress: None,
        fields: vec![
            FieldSpec::element("Panel.Logo", "app_logo", Point::new(5, 5)),
            FieldSpec::text("Panel.Title", Point::new(145, 8), FONT_MAIN, COLOR_ARTIST)
                .via("panel_title"),
            FieldSpec::text(LABEL_SUMMARY, Point::new(145, 35), FONT_SM, COLOR_TEXT),
            FieldSpec::element("System.Time", "status_clock", Point::new(145, 73))
                .styled(FONT_TIME, COLOR_TIME),
            FieldSpec::text("System.Date", Point::new(5, 150), FONT_SM, COLOR_TEXT),
            FieldSpec::text("System.Uptime", Point::new(50, 175), FONT_SM, COLOR_TEXT)
                .label("Up:", Point::new(5, 175), FONT_SM, COLOR_TEXT),
            FieldSpec::text("System.CPUTemperature", Point::new(60, 200), FONT_SM, COLOR_TEXT)
                .label("CPU:", Point::new(5, 200), FONT_SM, COLOR_TEXT),
        ],
    }
}

/// Minimal clock screen when the screensaver is up.
fn status_screensaver() -> Layout {
    Layout {
        name: "status_screensaver",
        artwork: None,
        progress: None,
        fields: vec![
            FieldSpec::element("Panel.Clock", "panel_clock", Point::new(115, 90))
                .styled(FONT_TIME, COLOR_TIME),
            FieldSpec::text("System.Date", Point::new(95, 140), FONT_SM, COLOR_TEXT),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_screen_mode_has_a_layout() {
        let reg = LayoutRegistry::defaults();
        for a in AudioMode::ALL {
            assert!(reg.get(ScreenMode::Audio(a)).is_some());
        }
        for v in VideoMode::ALL {
            assert!(reg.get(ScreenMode::Video(v)).is_some());
        }
        for s in StatusMode::ALL {
            assert!(reg.get(ScreenMode::Status(s)).is_some());
        }
    }

    #[test]
    fn layout_names_match_the_mode_names() {
        let reg = LayoutRegistry::defaults();
        for mode in [
            ScreenMode::Audio(AudioMode::Default),
            ScreenMode::Video(VideoMode::FullProg),
            ScreenMode::Status(StatusMode::Screensaver),
        ] {
            assert_eq!(reg.get(mode).unwrap().name, mode.layout_name());
        }
    }

    #[test]
    fn defaults_validate_against_the_default_registry() {
        let layouts = LayoutRegistry::defaults();
        let callbacks = CallbackRegistry::with_defaults();
        layouts.validate(&callbacks).unwrap();
    }

    #[test]
    fn unknown_transform_key_fails_validation() {
        let mut layouts = LayoutRegistry::defaults();
        let mut broken = audio_default();
        broken.fields.push(
            FieldSpec::text("X", Point::zero(), FONT_SM, COLOR_TEXT).via("never_registered"),
        );
        layouts.insert(ScreenMode::Audio(AudioMode::Default), broken);

        let callbacks = CallbackRegistry::with_defaults();
        assert!(matches!(
            layouts.validate(&callbacks),
            Err(LayoutError::UnknownTransform { .. })
        ));
    }

    #[test]
    fn element_without_key_fails_validation() {
        let mut layouts = LayoutRegistry::defaults();
        let mut broken = status_screensaver();
        let mut bad = FieldSpec::element("Panel.Broken", "panel_clock", Point::zero());
        bad.element = None;
        broken.fields.push(bad);
        layouts.insert(ScreenMode::Status(StatusMode::Screensaver), broken);

        let callbacks = CallbackRegistry::with_defaults();
        assert!(matches!(
            layouts.validate(&callbacks),
            Err(LayoutError::MissingElementKey { .. })
        ));
    }
}
