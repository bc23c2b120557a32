/*
 *  display/field.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Field-based layout system for declarative UI positioning
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

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::Point;

use crate::constants::{COLOR_TEXT, FONT_TINY};
use crate::kodinfo::InfoSnapshot;

/// Field kind determines the rendering path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text field - resolves a display string from the snapshot
    Text,
    /// Custom field - a registered element callback owns all drawing
    Element,
}

/// One predicate over a snapshot label.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Label present with a non-empty value
    Present(String),
    /// Label absent or empty
    Missing(String),
    Equals(String, String),
    NotEquals(String, String),
    HasPrefix(String, String),
}

impl Predicate {
    pub fn eval(&self, info: &InfoSnapshot) -> bool {
        match self {
            Predicate::Present(label) => info.is_filled(label),
            Predicate::Missing(label) => !info.is_filled(label),
            Predicate::Equals(label, expected) => info.get(label) == expected,
            Predicate::NotEquals(label, expected) => info.get(label) != expected,
            Predicate::HasPrefix(label, prefix) => info.get(label).starts_with(prefix.as_str()),
        }
    }

    /// The snapshot label this predicate reads.
    pub fn label(&self) -> &str {
        match self {
            Predicate::Present(l)
            | Predicate::Missing(l)
            | Predicate::Equals(l, _)
            | Predicate::NotEquals(l, _)
            | Predicate::HasPrefix(l, _) => l,
        }
    }
}

/// Display condition gating whether a field renders this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// All predicates must hold
    All(Vec<Predicate>),
    /// At least one predicate must hold
    Any(Vec<Predicate>),
}

impl Condition {
    pub fn eval(&self, info: &InfoSnapshot) -> bool {
        match self {
            Condition::All(preds) => preds.iter().all(|p| p.eval(info)),
            Condition::Any(preds) => preds.iter().any(|p| p.eval(info)),
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        match self {
            Condition::All(preds) | Condition::Any(preds) => preds,
        }
    }
}

/// Caption drawn next to a field once its value resolves non-empty.
#[derive(Debug, Clone)]
pub struct FieldLabel {
    pub text: String,
    pub pos: Point,
    pub font: &'static MonoFont<'static>,
    pub fill: Rgb888,
}

/// Declarative description of one renderable element within a layout.
///
/// A field with an `element` key bypasses the text path entirely; the
/// registered callback is responsible for its own side effects on the frame.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Snapshot label or synthetic key this field reads
    pub name: String,

    pub kind: FieldKind,

    /// Top-left position of the value text
    pub pos: Point,

    pub font: &'static MonoFont<'static>,

    pub fill: Rgb888,

    pub label: Option<FieldLabel>,

    /// Shorten the value to the panel width, ellipsis appended
    pub truncate: bool,

    /// Optional gate over snapshot values
    pub condition: Option<Condition>,

    /// Static value→display table (e.g. codec short names); a raw value
    /// missing from the table skips the field
    pub lookup: Option<&'static [(&'static str, &'static str)]>,

    /// Key into the string-transform registry
    pub transform: Option<String>,

    /// Key into the custom-element registry
    pub element: Option<String>,
}

impl FieldSpec {
    /// Create a new text field
    pub fn text(
        name: impl Into<String>,
        pos: Point,
        font: &'static MonoFont<'static>,
        fill: Rgb888,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            pos,
            font,
            fill,
            label: None,
            truncate: false,
            condition: None,
            lookup: None,
            transform: None,
            element: None,
        }
    }

    /// Create a new custom-element field (callback-rendered)
    pub fn element(name: impl Into<String>, key: impl Into<String>, pos: Point) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Element,
            pos,
            font: FONT_TINY,
            fill: COLOR_TEXT,
            label: None,
            truncate: false,
            condition: None,
            lookup: None,
            transform: None,
            element: Some(key.into()),
        }
    }

    /// Builder: caption drawn before the value
    pub fn label(
        mut self,
        text: impl Into<String>,
        pos: Point,
        font: &'static MonoFont<'static>,
        fill: Rgb888,
    ) -> Self {
        self.label = Some(FieldLabel { text: text.into(), pos, font, fill });
        self
    }

    /// Builder: truncate to the panel width
    pub fn truncated(mut self) -> Self {
        self.truncate = true;
        self
    }

    /// Builder: display condition
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Builder: static value→display table
    pub fn lookup(mut self, table: &'static [(&'static str, &'static str)]) -> Self {
        self.lookup = Some(table);
        self
    }

    /// Builder: string-transform registry key
    pub fn via(mut self, transform_key: impl Into<String>) -> Self {
        self.transform = Some(transform_key.into());
        self
    }

    /// Builder: font and fill for element fields
    pub fn styled(mut self, font: &'static MonoFont<'static>, fill: Rgb888) -> Self {
        self.font = font;
        self.fill = fill;
        self
    }

    /// Apply the lookup table, if configured. `None` means the raw value has
    /// no display form and the field is skipped.
    pub fn lookup_value<'a>(&self, raw: &'a str) -> Option<&'a str> {
        match self.lookup {
            Some(table) => table.iter().find(|(k, _)| *k == raw).map(|(_, v)| *v),
            None => Some(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CODEC_NAMES, FONT_SM};

    fn snapshot(pairs: &[(&str, &str)]) -> InfoSnapshot {
        let mut snap = InfoSnapshot::new();
        for (k, v) in pairs {
            snap.set(*k, *v);
        }
        snap
    }

    #[test]
    fn predicates_read_the_snapshot() {
        let snap = snapshot(&[("MusicPlayer.Cover", "special://temp/x.png"), ("Empty", "")]);

        assert!(Predicate::Present("MusicPlayer.Cover".into()).eval(&snap));
        assert!(Predicate::Missing("Empty".into()).eval(&snap));
        assert!(Predicate::Missing("Unknown".into()).eval(&snap));
        assert!(Predicate::HasPrefix("MusicPlayer.Cover".into(), "special://temp/".into()).eval(&snap));
        assert!(Predicate::NotEquals("MusicPlayer.Cover".into(), "other".into()).eval(&snap));
    }

    #[test]
    fn all_and_any_combine_predicates() {
        let snap = snapshot(&[("A", "1")]);

        let both = Condition::All(vec![
            Predicate::Present("A".into()),
            Predicate::Present("B".into()),
        ]);
        let either = Condition::Any(vec![
            Predicate::Present("A".into()),
            Predicate::Present("B".into()),
        ]);

        assert!(!both.eval(&snap));
        assert!(either.eval(&snap));
    }

    #[test]
    fn lookup_table_misses_skip_the_field() {
        let field = FieldSpec::text("MusicPlayer.Codec", Point::zero(), FONT_SM, COLOR_TEXT)
            .lookup(CODEC_NAMES);

        assert_eq!(field.lookup_value("flac"), Some("FLAC"));
        assert_eq!(field.lookup_value("unheard_of"), None);

        let plain = FieldSpec::text("MusicPlayer.Title", Point::zero(), FONT_SM, COLOR_TEXT);
        assert_eq!(plain.lookup_value("anything"), Some("anything"));
    }

    #[test]
    fn element_builder_sets_the_registry_key() {
        let field = FieldSpec::element("Panel.Clock", "panel_clock", Point::new(10, 10));
        assert_eq!(field.kind, FieldKind::Element);
        assert_eq!(field.element.as_deref(), Some("panel_clock"));
    }
}
