/*
 *  display/drivers/mock.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display sink for testing without hardware
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

use std::sync::{Arc, Mutex};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::frame::PanelFrame;

/// Mock sink that records every operation for inspection in tests.
#[derive(Debug, Clone)]
pub struct MockDriver {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockDriverState>>,
}

/// Shared state so tests keep a handle after the driver is boxed.
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times blit() was called
    pub blit_count: usize,

    /// Copy of the most recent frame pushed through blit()
    pub last_frame: Vec<Rgb888>,

    /// Most recent backlight state
    pub power: Option<bool>,

    /// Number of set_power() calls
    pub power_changes: usize,

    /// Simulate failures (for error testing)
    pub simulate_blit_failure: bool,
}

impl MockDriver {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            capabilities: DisplayCapabilities {
                width,
                height,
                supports_backlight: true,
            },
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Handle for inspecting recorded operations in tests.
    #[allow(dead_code)]
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Count of non-black pixels in the last blitted frame.
    #[allow(dead_code)]
    pub fn lit_pixels(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .last_frame
            .iter()
            .filter(|p| **p != Rgb888::BLACK)
            .count()
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.init_count += 1;
        Ok(())
    }

    fn blit(&mut self, frame: &PanelFrame) -> Result<(), DisplayError> {
        let expected = (self.capabilities.width * self.capabilities.height) as usize;
        if frame.as_slice().len() != expected {
            return Err(DisplayError::BufferSizeMismatch {
                expected,
                actual: frame.as_slice().len(),
            });
        }

        let mut state = self.state.lock().unwrap();
        if state.simulate_blit_failure {
            return Err(DisplayError::Other("Simulated blit failure".to_string()));
        }
        state.blit_count += 1;
        state.last_frame = frame.as_slice().to_vec();
        Ok(())
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.power = Some(on);
        state.power_changes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn blit_records_the_frame() {
        let mut driver = MockDriver::new(32, 16);
        let mut frame = PanelFrame::new(32, 16);
        Rectangle::new(Point::new(0, 0), Size::new(2, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut frame)
            .unwrap();

        driver.blit(&frame).unwrap();

        assert_eq!(driver.state().lock().unwrap().blit_count, 1);
        assert_eq!(driver.lit_pixels(), 4);
    }

    #[test]
    fn mismatched_frame_size_is_rejected() {
        let mut driver = MockDriver::new(32, 16);
        let frame = PanelFrame::new(16, 16);
        assert!(matches!(
            driver.blit(&frame),
            Err(DisplayError::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn power_toggles_are_recorded() {
        let mut driver = MockDriver::new(8, 8);
        driver.set_power(true).unwrap();
        driver.set_power(false).unwrap();

        let state = driver.state();
        let state = state.lock().unwrap();
        assert_eq!(state.power, Some(false));
        assert_eq!(state.power_changes, 2);
    }

    #[test]
    fn simulated_blit_failure_surfaces() {
        let mut driver = MockDriver::new(8, 8);
        driver.state().lock().unwrap().simulate_blit_failure = true;
        assert!(driver.blit(&PanelFrame::new(8, 8)).is_err());

        driver.state().lock().unwrap().simulate_blit_failure = false;
        assert!(driver.blit(&PanelFrame::new(8, 8)).is_ok());
    }
}
