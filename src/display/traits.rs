/*
 *  display/traits.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for the output device boundary
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

use crate::display::error::DisplayError;
use crate::frame::PanelFrame;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Whether the sink can switch its backlight/power
    pub supports_backlight: bool,
}

/// Minimal hardware abstraction - every output sink implements this trait.
///
/// The renderer composes a full `PanelFrame` per cycle; a sink only has to
/// accept that fixed-size RGB raster in one blocking blit and toggle its
/// backlight. Everything panel-specific (wire format, controller setup)
/// stays behind this seam.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Prepare the sink for rendering
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push a complete frame to the panel. Blocking; one call per cycle.
    fn blit(&mut self, frame: &PanelFrame) -> Result<(), DisplayError>;

    /// Backlight/power toggle. Sinks without one treat this as a no-op.
    fn set_power(&mut self, on: bool) -> Result<(), DisplayError>;
}
