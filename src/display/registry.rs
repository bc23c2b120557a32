/*
 *  display/registry.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Pluggable callback registries - the panel's extensibility surface.
 *  All hooks are installed before the render loop starts and resolved
 *  by name on every pass.
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
use std::sync::Arc;

use chrono::Local;
use embedded_graphics::prelude::Point;
use embedded_text::alignment::HorizontalAlignment;

use crate::constants::{COLOR_TEXT, FONT_SM};
use crate::display::field::FieldSpec;
use crate::display::mode_controller::{ScreenMode, StatusMode};
use crate::draw;
use crate::frame::PanelFrame;
use crate::kodinfo::InfoSnapshot;

/// Computes a field's display string; an empty return skips the field.
pub type StringTransform =
    Arc<dyn Fn(&InfoSnapshot, ScreenMode, &str) -> String + Send + Sync>;

/// Draws a non-text element; owns all side effects on the frame.
pub type ElementRender =
    Arc<dyn Fn(&mut PanelFrame, &InfoSnapshot, &FieldSpec, ScreenMode, &str) + Send + Sync>;

/// Wholesale replacement for the progress calculator:
/// (elapsed, total, layout_name) → fraction or hide.
pub type ProgressCalc = Arc<dyn Fn(&str, &str, &str) -> Option<f64> + Send + Sync>;

/// Chooses which idle/status sub-layout to show for this snapshot.
pub type StatusSelect = Arc<dyn Fn(&InfoSnapshot) -> StatusMode + Send + Sync>;

/// Name-keyed callback registries, O(1) lookup per render pass.
pub struct CallbackRegistry {
    transforms: HashMap<String, StringTransform>,
    elements: HashMap<String, ElementRender>,
    progress: Option<ProgressCalc>,
    status_select: Option<StatusSelect>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            transforms: HashMap::new(),
            elements: HashMap::new(),
            progress: None,
            status_select: None,
        }
    }

    /// Registry pre-loaded with the hooks the stock layouts reference.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();

        // Artist line with composer fallback; classical rips routinely tag
        // the composer but leave the artist blank.
        reg.set_transform("artist_or_composer", Arc::new(|info: &InfoSnapshot, _mode: ScreenMode, _layout: &str| {
            let artist = info.get("MusicPlayer.Artist");
            if !artist.is_empty() {
                return artist.to_string();
            }
            let composer = info.get("MusicPlayer.Property(Role.Composer)");
            if composer.is_empty() {
                String::new()
            } else {
                format!("({})", composer)
            }
        }));

        reg.set_transform("panel_title", Arc::new(|_info: &InfoSnapshot, _mode: ScreenMode, _layout: &str| {
            format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        }));

        // System.Time arrives as e.g. "7:30 PM"; the digits get the big
        // face and the meridiem suffix a small one alongside.
        reg.set_element("status_clock", Arc::new(|frame: &mut PanelFrame, info: &InfoSnapshot, spec: &FieldSpec, _mode: ScreenMode, _layout: &str| {
            let raw = info.get("System.Time");
            if raw.is_empty() {
                return;
            }
            let mut parts = raw.splitn(2, ' ');
            let digits = parts.next().unwrap_or("");
            let suffix = parts.next().unwrap_or("");

            let _ = draw::draw_text(frame, digits, spec.pos, spec.font, spec.fill);
            if !suffix.is_empty() {
                let cell = spec.font.character_size.width + spec.font.character_spacing;
                let x = spec.pos.x + (digits.chars().count() as u32 * cell) as i32 + 6;
                let _ = draw::draw_text(frame, suffix, Point::new(x, spec.pos.y), FONT_SM, spec.fill);
            }
        }));

        // Local wall clock for the screensaver layout.
        reg.set_element("panel_clock", Arc::new(|frame: &mut PanelFrame, _info: &InfoSnapshot, spec: &FieldSpec, _mode: ScreenMode, _layout: &str| {
            let now = Local::now().format("%H:%M").to_string();
            let _ = draw::draw_text(frame, &now, spec.pos, spec.font, spec.fill);
        }));

        // Drawn stand-in for the product mark; asset files stay optional.
        reg.set_element("app_logo", Arc::new(|frame: &mut PanelFrame, _info: &InfoSnapshot, spec: &FieldSpec, _mode: ScreenMode, _layout: &str| {
            const LOGO_W: u32 = 135;
            const LOGO_H: u32 = 135;
            let _ = draw::draw_rectangle(
                frame,
                spec.pos,
                LOGO_W,
                LOGO_H,
                embedded_graphics::pixelcolor::Rgb888::new(16, 46, 84),
                Some(2),
                Some(COLOR_TEXT),
            );
            let _ = draw::draw_text_align(
                frame,
                "Kodi",
                Point::new(spec.pos.x, spec.pos.y + (LOGO_H as i32 / 2) - 8),
                LOGO_W,
                HorizontalAlignment::Center,
                spec.font,
                COLOR_TEXT,
            );
        }));

        // Idle layout follows the screensaver state unless overridden.
        reg.set_status_select(Arc::new(|info: &InfoSnapshot| {
            if info.get("System.ScreenSaverActive") == "true" {
                StatusMode::Screensaver
            } else {
                StatusMode::Summary
            }
        }));

        reg
    }

    pub fn set_transform(&mut self, key: impl Into<String>, transform: StringTransform) {
        self.transforms.insert(key.into(), transform);
    }

    pub fn transform(&self, key: &str) -> Option<&StringTransform> {
        self.transforms.get(key)
    }

    pub fn has_transform(&self, key: &str) -> bool {
        self.transforms.contains_key(key)
    }

    pub fn set_element(&mut self, key: impl Into<String>, element: ElementRender) {
        self.elements.insert(key.into(), element);
    }

    pub fn element(&self, key: &str) -> Option<&ElementRender> {
        self.elements.get(key)
    }

    pub fn has_element(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }

    /// Replace the progress calculator wholesale.
    pub fn set_progress_calc(&mut self, calc: ProgressCalc) {
        self.progress = Some(calc);
    }

    pub fn progress_calc(&self) -> Option<&ProgressCalc> {
        self.progress.as_ref()
    }

    pub fn set_status_select(&mut self, select: StatusSelect) {
        self.status_select = Some(select);
    }

    pub fn status_select(&self) -> Option<&StatusSelect> {
        self.status_select.as_ref()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::mode_controller::AudioMode;

    fn mode() -> ScreenMode {
        ScreenMode::Audio(AudioMode::Default)
    }

    #[test]
    fn artist_or_composer_prefers_the_artist() {
        let reg = CallbackRegistry::with_defaults();
        let transform = reg.transform("artist_or_composer").unwrap();

        let mut info = InfoSnapshot::new();
        info.set("MusicPlayer.Artist", "Kraftwerk");
        info.set("MusicPlayer.Property(Role.Composer)", "Bach");
        assert_eq!(transform(&info, mode(), "audio_default"), "Kraftwerk");
    }

    #[test]
    fn artist_or_composer_falls_back_parenthesized() {
        let reg = CallbackRegistry::with_defaults();
        let transform = reg.transform("artist_or_composer").unwrap();

        let mut info = InfoSnapshot::new();
        info.set("MusicPlayer.Title", "Song");
        info.set("MusicPlayer.Artist", "");
        info.set("MusicPlayer.Property(Role.Composer)", "Bach");
        assert_eq!(transform(&info, mode(), "audio_default"), "(Bach)");

        let empty = InfoSnapshot::new();
        assert_eq!(transform(&empty, mode(), "audio_default"), "");
    }

    #[test]
    fn unknown_keys_resolve_to_none() {
        let reg = CallbackRegistry::with_defaults();
        assert!(reg.transform("no_such_hook").is_none());
        assert!(!reg.has_element("no_such_element"));
    }

    #[test]
    fn progress_override_is_consulted() {
        let mut reg = CallbackRegistry::new();
        assert!(reg.progress_calc().is_none());

        reg.set_progress_calc(Arc::new(|_e: &str, _t: &str, _l: &str| Some(0.42)));
        let calc = reg.progress_calc().unwrap();
        assert_eq!(calc("xx", "yy", "anything"), Some(0.42));
    }
}
