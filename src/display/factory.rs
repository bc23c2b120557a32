/*
 *  display/factory.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Configuration-driven sink construction
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

use log::info;

use crate::config::{DisplayConfig, DriverKind};
use crate::constants::{FRAME_HEIGHT, FRAME_WIDTH};
use crate::display::drivers::{FbdevDriver, MockDriver};
use crate::display::error::DisplayError;
use crate::display::traits::DisplayDriver;

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Factory for creating display sinks from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a sink from configuration; the framebuffer is the default.
    pub fn create_from_config(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
        match config.driver.unwrap_or(DriverKind::Fbdev) {
            DriverKind::Fbdev => {
                info!("using Linux framebuffer sink");
                Ok(Box::new(FbdevDriver::new(config)?))
            }
            DriverKind::Mock => {
                info!("using mock sink (no hardware output)");
                Ok(Box::new(MockDriver::new(
                    config.width.unwrap_or(FRAME_WIDTH),
                    config.height.unwrap_or(FRAME_HEIGHT),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_driver_honours_configured_geometry() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Mock),
            width: Some(64),
            height: Some(48),
            ..Default::default()
        };
        let driver = DisplayDriverFactory::create_from_config(&config).unwrap();
        assert_eq!(driver.dimensions(), (64, 48));
    }

    #[test]
    fn missing_framebuffer_device_fails_cleanly() {
        let config = DisplayConfig {
            driver: Some(DriverKind::Fbdev),
            fbdev: Some("/definitely/not/a/fb".to_string()),
            ..Default::default()
        };
        assert!(DisplayDriverFactory::create_from_config(&config).is_err());
    }
}
