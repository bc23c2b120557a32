/*
 *  display/renderer.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Field renderer - interprets one FieldSpec against the current info
 *  snapshot, plus the truncation and progress bar primitives
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

use core::convert::Infallible;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;

use crate::constants::{COLOR_PROG_BG, COLOR_PROG_FG, ELLIPSIS, TRUNCATE_MARGIN};
use crate::display::field::{FieldKind, FieldSpec};
use crate::display::layout::{BarLength, Layout, ProgressSpec};
use crate::display::mode_controller::ScreenMode;
use crate::display::registry::CallbackRegistry;
use crate::draw;
use crate::frame::PanelFrame;
use crate::kodinfo::InfoSnapshot;

/// Advance of one character cell in a monospace face.
#[inline]
fn char_cell(font: &MonoFont) -> u32 {
    font.character_size.width + font.character_spacing
}

/// Rendered width of a string in the given face.
pub fn text_width(text: &str, font: &MonoFont) -> u32 {
    text.chars().count() as u32 * char_cell(font)
}

/// Shorten `text` until it fits `max_width`, appending a single ellipsis
/// once anything was dropped. Characters come off one at a time from the
/// end, so the result is deterministic and stable under repeated calls;
/// the returned string always measures within the bound.
pub fn truncate_text(text: &str, font: &MonoFont, max_width: u32) -> String {
    if text_width(text, font) <= max_width {
        return text.to_string();
    }

    let cell = char_cell(font);
    let mut kept: Vec<char> = text.chars().collect();
    while !kept.is_empty() && (kept.len() as u32 + 1) * cell > max_width {
        kept.pop();
    }
    let mut out: String = kept.into_iter().collect();
    out.push(ELLIPSIS);
    out
}

/// Render one field onto the frame.
///
/// 1. a registered custom element owns all drawing;
/// 2. an unmet display condition skips the field silently;
/// 3. the display string comes from the transform callback (explicit key,
///    or one registered under the field's name) or the raw snapshot value
///    (through the lookup table when configured) - empty skips;
/// 4. the caption, if any, is drawn once the value is known non-empty;
/// 5. the value itself, truncated when flagged.
pub fn render_field(
    frame: &mut PanelFrame,
    spec: &FieldSpec,
    info: &InfoSnapshot,
    mode: ScreenMode,
    layout_name: &str,
    callbacks: &CallbackRegistry,
) -> Result<(), Infallible> {
    if spec.kind == FieldKind::Element {
        if let Some(key) = spec.element.as_deref() {
            if let Some(element) = callbacks.element(key) {
                element(frame, info, spec, mode, layout_name);
            }
        }
        return Ok(());
    }

    if let Some(condition) = &spec.condition {
        if !condition.eval(info) {
            return Ok(());
        }
    }

    // explicit transform key first, then any hook registered under the
    // field's own name, else the raw snapshot value
    let hook = spec
        .transform
        .as_deref()
        .and_then(|key| callbacks.transform(key))
        .or_else(|| callbacks.transform(&spec.name));
    let value: String = match hook {
        Some(transform) => transform(info, mode, layout_name),
        None => {
            let raw = info.get(&spec.name);
            if raw.is_empty() {
                String::new()
            } else {
                spec.lookup_value(raw).unwrap_or("").to_string()
            }
        }
    };
    if value.is_empty() {
        return Ok(());
    }

    if let Some(label) = &spec.label {
        draw::draw_text(frame, &label.text, label.pos, label.font, label.fill)?;
    }

    if spec.truncate {
        let max_width = frame.width() as u32 - TRUNCATE_MARGIN;
        let shown = truncate_text(&value, spec.font, max_width);
        draw::draw_text(frame, &shown, spec.pos, spec.font, spec.fill)?;
    } else {
        draw::draw_text(frame, &value, spec.pos, spec.font, spec.fill)?;
    }
    Ok(())
}

/// Render a layout's field sequence in declaration order.
pub fn render_fields(
    frame: &mut PanelFrame,
    layout: &Layout,
    info: &InfoSnapshot,
    mode: ScreenMode,
    callbacks: &CallbackRegistry,
) -> Result<(), Infallible> {
    for field in &layout.fields {
        render_field(frame, field, info, mode, layout.name, callbacks)?;
    }
    Ok(())
}

/// Draw a progress bar: background track first, then the fill. The
/// fraction is clamped to (0.01, 1] so an empty track still shows a
/// sliver instead of looking broken. Horizontal bars fill left to right,
/// vertical bars bottom to top.
pub fn draw_progress_bar(
    frame: &mut PanelFrame,
    bg: Rgb888,
    fg: Rgb888,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    fraction: f64,
    vertical: bool,
) -> Result<(), Infallible> {
    draw::draw_rectangle(frame, Point::new(x, y), width, height, bg, None, None)?;

    let mut fraction = fraction;
    if fraction <= 0.0 {
        fraction = 0.01;
    }
    if fraction > 1.0 {
        fraction = 1.0;
    }

    if vertical {
        let dh = ((height as f64 * fraction).round() as u32).clamp(1, height);
        draw::draw_rectangle(
            frame,
            Point::new(x, y + height as i32 - dh as i32),
            width,
            dh,
            fg,
            None,
            None,
        )?;
    } else {
        let dw = ((width as f64 * fraction).round() as u32).clamp(1, width);
        draw::draw_rectangle(frame, Point::new(x, y), dw, height, fg, None, None)?;
    }
    Ok(())
}

/// Pick the bar footprint: a 3-component elapsed string needs the longer
/// variant to stay clear of the time digits.
pub fn bar_width_for(length: BarLength, elapsed: &str) -> u32 {
    match length {
        BarLength::Fixed(w) => w,
        BarLength::Adaptive { short, long } => {
            if elapsed.matches(':').count() == 2 {
                long
            } else {
                short
            }
        }
    }
}

/// Draw a layout's progress spec for the given fraction.
pub fn render_progress(
    frame: &mut PanelFrame,
    spec: &ProgressSpec,
    elapsed: &str,
    fraction: f64,
) -> Result<(), Infallible> {
    let width = bar_width_for(spec.length, elapsed);
    draw_progress_bar(
        frame,
        COLOR_PROG_BG,
        COLOR_PROG_FG,
        spec.pos.x,
        spec.pos.y,
        width,
        spec.height,
        fraction,
        spec.vertical,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{COLOR_TEXT, FONT_SM, FONT_TINY, FRAME_HEIGHT, FRAME_WIDTH};
    use crate::display::field::{Condition, Predicate};
    use crate::display::mode_controller::AudioMode;
    use embedded_graphics::prelude::RgbColor;

    fn frame() -> PanelFrame {
        PanelFrame::new(FRAME_WIDTH, FRAME_HEIGHT)
    }

    fn lit_pixels(frame: &PanelFrame) -> usize {
        frame.as_slice().iter().filter(|p| **p != Rgb888::BLACK).count()
    }

    fn mode() -> ScreenMode {
        ScreenMode::Audio(AudioMode::Default)
    }

    #[test]
    fn truncate_leaves_fitting_text_alone() {
        let max = FRAME_WIDTH - TRUNCATE_MARGIN;
        for text in ["", "short", "A string that fits"] {
            assert_eq!(truncate_text(text, FONT_TINY, max), text);
        }
    }

    #[test]
    fn truncate_appends_exactly_one_ellipsis_within_bounds() {
        let long: String = "x".repeat(200);
        let max = FRAME_WIDTH - TRUNCATE_MARGIN;

        let out = truncate_text(&long, FONT_SM, max);
        assert!(out.ends_with(ELLIPSIS));
        assert_eq!(out.chars().filter(|c| *c == ELLIPSIS).count(), 1);
        assert!(text_width(&out, FONT_SM) <= max);
    }

    #[test]
    fn truncate_is_stable_under_repeated_input() {
        let long: String = "repeatable input ".repeat(10);
        let max = 120;
        let first = truncate_text(&long, FONT_SM, max);
        let second = truncate_text(&long, FONT_SM, max);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_fraction_still_draws_a_sliver() {
        let mut f = frame();
        draw_progress_bar(&mut f, COLOR_PROG_BG, COLOR_PROG_FG, 10, 10, 100, 8, 0.0, false)
            .unwrap();

        let fg = f
            .as_slice()
            .iter()
            .filter(|p| **p == COLOR_PROG_FG)
            .count();
        assert!(fg > 0, "foreground rect must never be zero-area");
    }

    #[test]
    fn overfull_fraction_clamps_to_one() {
        let mut over = frame();
        let mut full = frame();
        draw_progress_bar(&mut over, COLOR_PROG_BG, COLOR_PROG_FG, 10, 10, 100, 8, 1.5, false)
            .unwrap();
        draw_progress_bar(&mut full, COLOR_PROG_BG, COLOR_PROG_FG, 10, 10, 100, 8, 1.0, false)
            .unwrap();
        assert_eq!(over.as_slice(), full.as_slice());
    }

    #[test]
    fn vertical_bar_fills_from_the_bottom() {
        let mut f = frame();
        draw_progress_bar(&mut f, COLOR_PROG_BG, COLOR_PROG_FG, 20, 20, 10, 100, 0.5, true)
            .unwrap();

        // top half of the track is background, bottom half fill
        assert_eq!(f.pixel(25, 30), Some(COLOR_PROG_BG));
        assert_eq!(f.pixel(25, 110), Some(COLOR_PROG_FG));
    }

    #[test]
    fn adaptive_bar_length_follows_the_elapsed_shape() {
        let length = BarLength::Adaptive { short: 104, long: 164 };
        assert_eq!(bar_width_for(length, "03:12"), 104);
        assert_eq!(bar_width_for(length, "1:03:12"), 164);
        assert_eq!(bar_width_for(BarLength::Fixed(10), "1:03:12"), 10);
    }

    #[test]
    fn unmet_condition_draws_nothing() {
        let mut f = frame();
        let callbacks = CallbackRegistry::with_defaults();
        let field = FieldSpec::text("MusicPlayer.Title", Point::new(5, 5), FONT_SM, COLOR_TEXT)
            .when(Condition::All(vec![Predicate::Equals(
                "Player.Paused".into(),
                "true".into(),
            )]));

        let mut info = InfoSnapshot::new();
        info.set("MusicPlayer.Title", "Hidden");

        render_field(&mut f, &field, &info, mode(), "audio_default", &callbacks).unwrap();
        assert_eq!(lit_pixels(&f), 0);
    }

    #[test]
    fn missing_value_draws_neither_value_nor_label() {
        let mut f = frame();
        let callbacks = CallbackRegistry::with_defaults();
        let field = FieldSpec::text("MusicPlayer.TrackNumber", Point::new(50, 50), FONT_SM, COLOR_TEXT)
            .label("Track", Point::new(50, 38), FONT_TINY, COLOR_TEXT);

        render_field(&mut f, &field, &InfoSnapshot::new(), mode(), "audio_default", &callbacks)
            .unwrap();
        assert_eq!(lit_pixels(&f), 0);
    }

    #[test]
    fn label_is_drawn_once_the_value_resolves() {
        let mut f = frame();
        let callbacks = CallbackRegistry::with_defaults();
        let field = FieldSpec::text("MusicPlayer.TrackNumber", Point::new(50, 50), FONT_SM, COLOR_TEXT)
            .label("Track", Point::new(50, 38), FONT_TINY, COLOR_ARTIST_MARK);

        let mut info = InfoSnapshot::new();
        info.set("MusicPlayer.TrackNumber", "7");

        render_field(&mut f, &field, &info, mode(), "audio_default", &callbacks).unwrap();
        let label_pixels = f
            .as_slice()
            .iter()
            .filter(|p| **p == COLOR_ARTIST_MARK)
            .count();
        assert!(label_pixels > 0);
    }

    const COLOR_ARTIST_MARK: Rgb888 = Rgb888::new(200, 10, 10);

    #[test]
    fn lookup_miss_skips_the_field() {
        let mut f = frame();
        let callbacks = CallbackRegistry::with_defaults();
        let field = FieldSpec::text("MusicPlayer.Codec", Point::new(5, 5), FONT_SM, COLOR_TEXT)
            .lookup(crate::constants::CODEC_NAMES);

        let mut info = InfoSnapshot::new();
        info.set("MusicPlayer.Codec", "not_a_codec");
        render_field(&mut f, &field, &info, mode(), "audio_default", &callbacks).unwrap();
        assert_eq!(lit_pixels(&f), 0);

        info.set("MusicPlayer.Codec", "flac");
        render_field(&mut f, &field, &info, mode(), "audio_default", &callbacks).unwrap();
        assert!(lit_pixels(&f) > 0);
    }

    #[test]
    fn artist_falls_back_to_composer_end_to_end() {
        let mut f = frame();
        let callbacks = CallbackRegistry::with_defaults();
        let field = FieldSpec::text("MusicPlayer.Artist", Point::new(5, 205), FONT_SM, COLOR_TEXT)
            .via("artist_or_composer")
            .truncated();

        let mut info = InfoSnapshot::new();
        info.set("MusicPlayer.Title", "Song");
        info.set("MusicPlayer.Artist", "");
        info.set("MusicPlayer.Property(Role.Composer)", "Bach");

        // the transform resolves "(Bach)" and the field renders it
        let transform = callbacks.transform("artist_or_composer").unwrap();
        assert_eq!(transform(&info, mode(), "audio_default"), "(Bach)");

        render_field(&mut f, &field, &info, mode(), "audio_default", &callbacks).unwrap();
        assert!(lit_pixels(&f) > 0);
    }

    #[test]
    fn transform_registered_under_the_field_name_is_consulted() {
        let mut f = frame();
        let mut callbacks = CallbackRegistry::new();
        // the hook suppresses the value; if the raw path ran instead, the
        // non-empty snapshot value would light pixels
        callbacks.set_transform(
            "MusicPlayer.Channels",
            std::sync::Arc::new(|_info: &InfoSnapshot, _mode: ScreenMode, _layout: &str| {
                String::new()
            }),
        );
        // no explicit transform key on the field
        let field = FieldSpec::text("MusicPlayer.Channels", Point::new(5, 5), FONT_SM, COLOR_TEXT);

        let mut info = InfoSnapshot::new();
        info.set("MusicPlayer.Channels", "6");
        render_field(&mut f, &field, &info, mode(), "audio_default", &callbacks).unwrap();
        assert_eq!(lit_pixels(&f), 0);
    }

    #[test]
    fn custom_element_bypasses_the_text_path() {
        let mut f = frame();
        let mut callbacks = CallbackRegistry::new();
        callbacks.set_element(
            "solid_block",
            std::sync::Arc::new(|frame: &mut PanelFrame, _info: &InfoSnapshot, spec: &FieldSpec, _mode: ScreenMode, _layout: &str| {
                let _ = draw::draw_rectangle(frame, spec.pos, 4, 4, Rgb888::WHITE, None, None);
            }),
        );
        // snapshot has nothing for this field; the element draws anyway
        let field = FieldSpec::element("Panel.Block", "solid_block", Point::new(0, 0));
        render_field(&mut f, &field, &InfoSnapshot::new(), mode(), "audio_default", &callbacks)
            .unwrap();
        assert_eq!(lit_pixels(&f), 16);
    }
}
