/*
 *  display/drivers/fbdev.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Linux framebuffer sink - memory-mapped /dev/fbN with an optional
 *  sysfs backlight node
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

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use log::{debug, info};
use memmap2::{MmapMut, MmapOptions};

use crate::config::DisplayConfig;
use crate::constants::{FRAME_HEIGHT, FRAME_WIDTH};
use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::frame::PanelFrame;

// sysfs bl_power values
const BL_UNBLANK: &str = "0";
const BL_POWERDOWN: &str = "4";

/// Framebuffer sink. The whole panel is pushed in one memcpy per cycle,
/// packed to the configured depth (16 bpp RGB565 or 32 bpp XRGB8888).
pub struct FbdevDriver {
    capabilities: DisplayCapabilities,
    map: MmapMut,
    bpp: u32,
    backlight: Option<PathBuf>,
    device: String,
}

impl FbdevDriver {
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let device = config.fbdev.clone().unwrap_or_else(|| "/dev/fb0".to_string());
        let width = config.width.unwrap_or(FRAME_WIDTH);
        let height = config.height.unwrap_or(FRAME_HEIGHT);
        let bpp = config.bpp.unwrap_or(32);
        if bpp != 16 && bpp != 32 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "fbdev bpp must be 16 or 32, got {}",
                bpp
            )));
        }

        let len = (width * height * bpp / 8) as usize;
        let file = OpenOptions::new().read(true).write(true).open(&device)?;
        let map = unsafe { MmapOptions::new().len(len).map_mut(&file)? };

        let backlight = config.backlight.clone();
        Ok(Self {
            capabilities: DisplayCapabilities {
                width,
                height,
                supports_backlight: backlight.is_some(),
            },
            map,
            bpp,
            backlight,
            device,
        })
    }
}

impl DisplayDriver for FbdevDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!(
            "framebuffer {} mapped: {}x{} @ {} bpp",
            self.device, self.capabilities.width, self.capabilities.height, self.bpp
        );
        Ok(())
    }

    fn blit(&mut self, frame: &PanelFrame) -> Result<(), DisplayError> {
        let bytes = match self.bpp {
            16 => frame.to_rgb565_le(),
            _ => frame.to_xrgb8888(),
        };
        if bytes.len() != self.map.len() {
            return Err(DisplayError::BufferSizeMismatch {
                expected: self.map.len(),
                actual: bytes.len(),
            });
        }
        self.map.copy_from_slice(&bytes);
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        // no backlight node configured: leave the panel as-is
        let Some(node) = &self.backlight else {
            return Ok(());
        };
        let value = if on { BL_UNBLANK } else { BL_POWERDOWN };
        debug!("backlight {} <- {}", node.display(), value);
        fs::write(node, value)?;
        Ok(())
    }
}
