/*
 *  display/mod.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - layout-driven rendering over a pluggable sink
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

// Core trait definitions
pub mod error;
pub mod traits;

// Output sinks
pub mod drivers;
pub mod factory;

// Layout-driven rendering engine
pub mod artwork;
pub mod field;
pub mod layout;
pub mod progress;
pub mod registry;
pub mod renderer;

// Screen mode state machine
pub mod mode_controller;

// Display cycle driver
pub mod manager;

// Re-exports for convenience
pub use error::DisplayError;
pub use factory::{BoxedDriver, DisplayDriverFactory};
pub use field::{Condition, FieldKind, FieldSpec, Predicate};
pub use layout::{Layout, LayoutRegistry};
pub use manager::{PanelError, PanelManager};
pub use mode_controller::{AudioMode, ModeController, ScreenMode, StatusMode, VideoMode};
pub use registry::CallbackRegistry;
pub use traits::{DisplayCapabilities, DisplayDriver};
