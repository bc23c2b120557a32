/*
 *  display/mode_controller.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen mode state machine - domain selection follows the reported
 *  player type; presses cycle the sub-mode within the active domain
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

use log::debug;

use crate::display::registry::StatusSelect;
use crate::kodinfo::{InfoSnapshot, PlayerKind};

/// Idle/status sub-layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusMode {
    Summary,
    Screensaver,
}

impl StatusMode {
    pub const ALL: [StatusMode; 2] = [StatusMode::Summary, StatusMode::Screensaver];

    /// Cyclic successor; wraps after the last variant.
    pub fn next(self) -> Self {
        match self {
            StatusMode::Summary => StatusMode::Screensaver,
            StatusMode::Screensaver => StatusMode::Summary,
        }
    }
}

/// Audio info sub-layouts. The list is intended to grow as other layout
/// ideas come along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioMode {
    /// small art, elapsed time, track info
    Default,
    /// fullscreen cover art
    Fullscreen,
    /// fullscreen art with vertical progress bar
    FullProg,
}

impl AudioMode {
    pub const ALL: [AudioMode; 3] = [AudioMode::Default, AudioMode::Fullscreen, AudioMode::FullProg];

    pub fn next(self) -> Self {
        match self {
            AudioMode::Default => AudioMode::Fullscreen,
            AudioMode::Fullscreen => AudioMode::FullProg,
            AudioMode::FullProg => AudioMode::Default,
        }
    }
}

/// Video info sub-layouts, same shape as the audio set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoMode {
    Default,
    Fullscreen,
    FullProg,
}

impl VideoMode {
    pub const ALL: [VideoMode; 3] = [VideoMode::Default, VideoMode::Fullscreen, VideoMode::FullProg];

    pub fn next(self) -> Self {
        match self {
            VideoMode::Default => VideoMode::Fullscreen,
            VideoMode::Fullscreen => VideoMode::FullProg,
            VideoMode::FullProg => VideoMode::Default,
        }
    }
}

/// The currently active top-level display variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenMode {
    Status(StatusMode),
    Audio(AudioMode),
    Video(VideoMode),
}

impl ScreenMode {
    /// Stable name handed to layout lookups and callbacks.
    pub fn layout_name(self) -> &'static str {
        match self {
            ScreenMode::Status(StatusMode::Summary) => "status_summary",
            ScreenMode::Status(StatusMode::Screensaver) => "status_screensaver",
            ScreenMode::Audio(AudioMode::Default) => "audio_default",
            ScreenMode::Audio(AudioMode::Fullscreen) => "audio_fullscreen",
            ScreenMode::Audio(AudioMode::FullProg) => "audio_fullprog",
            ScreenMode::Video(VideoMode::Default) => "video_default",
            ScreenMode::Video(VideoMode::Fullscreen) => "video_fullscreen",
            ScreenMode::Video(VideoMode::FullProg) => "video_fullprog",
        }
    }
}

/// Tracks the per-domain sub-modes and answers "what is on screen now".
///
/// Domain selection is driven by the reported player type only; presses
/// never cross domains, they cycle within the active one.
pub struct ModeController {
    status: StatusMode,
    audio: AudioMode,
    video: VideoMode,
    status_select: Option<StatusSelect>,
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            status: StatusMode::Summary,
            audio: AudioMode::Default,
            video: VideoMode::Default,
            status_select: None,
        }
    }

    /// Install the pluggable idle-layout chooser.
    pub fn set_status_select(&mut self, select: StatusSelect) {
        self.status_select = Some(select);
    }

    /// Mode for this cycle given the reported player type.
    pub fn active(&self, player: Option<PlayerKind>, info: &InfoSnapshot) -> ScreenMode {
        match player {
            Some(PlayerKind::Audio) => ScreenMode::Audio(self.audio),
            Some(PlayerKind::Video) => ScreenMode::Video(self.video),
            _ => {
                let status = match &self.status_select {
                    Some(select) => select(info),
                    None => self.status,
                };
                ScreenMode::Status(status)
            }
        }
    }

    /// Advance the active domain's sub-mode (touch press). Returns the new
    /// mode; the caller invalidates the artwork cache on every switch.
    pub fn advance(&mut self, player: Option<PlayerKind>) -> ScreenMode {
        let mode = match player {
            Some(PlayerKind::Audio) => {
                self.audio = self.audio.next();
                ScreenMode::Audio(self.audio)
            }
            Some(PlayerKind::Video) => {
                self.video = self.video.next();
                ScreenMode::Video(self.video)
            }
            _ => {
                self.status = self.status.next();
                ScreenMode::Status(self.status)
            }
        };
        debug!("display mode advanced to {:?}", mode);
        mode
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn next_is_cyclic_over_every_domain() {
        for start in AudioMode::ALL {
            let mut mode = start;
            for _ in 0..AudioMode::ALL.len() {
                mode = mode.next();
            }
            assert_eq!(mode, start);
        }
        for start in VideoMode::ALL {
            let mut mode = start;
            for _ in 0..VideoMode::ALL.len() {
                mode = mode.next();
            }
            assert_eq!(mode, start);
        }
        for start in StatusMode::ALL {
            let mut mode = start;
            for _ in 0..StatusMode::ALL.len() {
                mode = mode.next();
            }
            assert_eq!(mode, start);
        }
    }

    #[test]
    fn domain_follows_the_reported_player_type() {
        let ctl = ModeController::new();
        let info = InfoSnapshot::new();

        assert_eq!(
            ctl.active(Some(PlayerKind::Audio), &info),
            ScreenMode::Audio(AudioMode::Default)
        );
        assert_eq!(
            ctl.active(Some(PlayerKind::Video), &info),
            ScreenMode::Video(VideoMode::Default)
        );
        assert_eq!(ctl.active(None, &info), ScreenMode::Status(StatusMode::Summary));
        assert_eq!(
            ctl.active(Some(PlayerKind::Picture), &info),
            ScreenMode::Status(StatusMode::Summary)
        );
    }

    #[test]
    fn presses_only_cycle_the_active_domain() {
        let mut ctl = ModeController::new();
        let info = InfoSnapshot::new();

        ctl.advance(Some(PlayerKind::Audio));
        assert_eq!(
            ctl.active(Some(PlayerKind::Audio), &info),
            ScreenMode::Audio(AudioMode::Fullscreen)
        );
        // video untouched by the audio-domain press
        assert_eq!(
            ctl.active(Some(PlayerKind::Video), &info),
            ScreenMode::Video(VideoMode::Default)
        );
    }

    #[test]
    fn status_auto_select_overrides_the_stored_sub_mode() {
        let mut ctl = ModeController::new();
        ctl.set_status_select(Arc::new(|info: &InfoSnapshot| {
            if info.get("System.ScreenSaverActive") == "true" {
                StatusMode::Screensaver
            } else {
                StatusMode::Summary
            }
        }));

        let mut info = InfoSnapshot::new();
        assert_eq!(ctl.active(None, &info), ScreenMode::Status(StatusMode::Summary));

        info.set("System.ScreenSaverActive", "true");
        assert_eq!(ctl.active(None, &info), ScreenMode::Status(StatusMode::Screensaver));
    }

    #[test]
    fn every_mode_has_a_distinct_layout_name() {
        use std::collections::HashSet;
        let mut names = HashSet::new();
        for a in AudioMode::ALL {
            names.insert(ScreenMode::Audio(a).layout_name());
        }
        for v in VideoMode::ALL {
            names.insert(ScreenMode::Video(v).layout_name());
        }
        for s in StatusMode::ALL {
            names.insert(ScreenMode::Status(s).layout_name());
        }
        assert_eq!(names.len(), AudioMode::ALL.len() + VideoMode::ALL.len() + StatusMode::ALL.len());
    }
}
