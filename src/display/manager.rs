/*
 *  display/manager.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *  (c) 2020-26 Stuart Hunter
 *
 *  The display cycle driver: one fetch -> mode -> render -> blit pass
 *  per tick, serialized by the caller's lock
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
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use embedded_graphics::prelude::Point;
use log::{debug, info, warn};
use thiserror::Error;

use crate::constants::{
    AUDIO_LABELS, COLOR_TEXT, FONT_MAIN, LABEL_PERCENT, LABEL_SUMMARY, STATUS_LABELS, VIDEO_LABELS,
};
use crate::display::artwork::{ArtPlan, ArtworkCache, ArtworkResolver};
use crate::display::factory::BoxedDriver;
use crate::display::layout::{ArtPlacement, LayoutError, LayoutRegistry};
use crate::display::mode_controller::{ModeController, ScreenMode};
use crate::display::progress;
use crate::display::registry::CallbackRegistry;
use crate::display::renderer;
use crate::display::error::DisplayError;
use crate::draw;
use crate::frame::PanelFrame;
use crate::kodinfo::{ActivePlayer, InfoSnapshot, KodiServer, PlayerKind};
use crate::kodirpc::KodiClientError;

/// Errors out of one display cycle.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("JSON-RPC: {0}")]
    Rpc(#[from] KodiClientError),

    #[error("display: {0}")]
    Display(#[from] DisplayError),

    #[error("layout: {0}")]
    Layout(#[from] LayoutError),
}

impl PanelError {
    /// True when the polling session is over and the caller should drop
    /// back to the reconnect-wait loop.
    pub fn is_connection(&self) -> bool {
        matches!(self, PanelError::Rpc(e) if e.is_connection())
    }
}

impl From<core::convert::Infallible> for PanelError {
    fn from(err: core::convert::Infallible) -> Self {
        match err {}
    }
}

/// All mutable render-pass state in one owned place: frame, sink, layouts,
/// registries, mode machine, artwork slot and the press latch. The caller
/// serializes whole cycles with a single lock around this struct.
pub struct PanelManager {
    driver: BoxedDriver,
    frame: PanelFrame,
    layouts: LayoutRegistry,
    callbacks: CallbackRegistry,
    modes: ModeController,
    artwork: ArtworkCache,
    resolver: ArtworkResolver,
    progress_offsets: HashMap<String, i64>,
    pressed: Arc<AtomicBool>,
    screen_on: bool,
    screen_off_at: Instant,
    screen_wake: Duration,
}

impl PanelManager {
    pub fn new(
        driver: BoxedDriver,
        layouts: LayoutRegistry,
        callbacks: CallbackRegistry,
        resolver: ArtworkResolver,
        progress_offsets: HashMap<String, i64>,
        screen_wake: Duration,
    ) -> Result<Self, PanelError> {
        // every registry key a layout names must resolve before the loop starts
        layouts.validate(&callbacks)?;

        let (width, height) = driver.dimensions();
        let mut modes = ModeController::new();
        if let Some(select) = callbacks.status_select() {
            modes.set_status_select(Arc::clone(select));
        }

        Ok(Self {
            driver,
            frame: PanelFrame::new(width, height),
            layouts,
            callbacks,
            modes,
            artwork: ArtworkCache::new(),
            resolver,
            progress_offsets,
            pressed: Arc::new(AtomicBool::new(false)),
            screen_on: false,
            screen_off_at: Instant::now(),
            screen_wake,
        })
    }

    /// The latch the touch interrupt sets; drained once per cycle.
    pub fn press_latch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pressed)
    }

    pub fn init(&mut self) -> Result<(), PanelError> {
        self.driver.init()?;
        Ok(())
    }

    /// Placeholder screen while Kodi is unreachable.
    pub fn show_waiting(&mut self) -> Result<(), PanelError> {
        self.frame.clear_black();
        draw::draw_text(
            &mut self.frame,
            "Waiting to connect with Kodi...",
            Point::new(5, 5),
            FONT_MAIN,
            COLOR_TEXT,
        )?;
        self.driver.set_power(true)?;
        self.driver.blit(&self.frame)?;
        Ok(())
    }

    /// Blank the panel and drop the backlight on the way out.
    pub fn shutdown(&mut self) -> Result<(), PanelError> {
        self.frame.clear_black();
        self.driver.blit(&self.frame)?;
        self.driver.set_power(false)?;
        Ok(())
    }

    /// One full refresh: take the press latch, poll the active player,
    /// pick the screen mode, render everything, blit. RPC errors bubble;
    /// the caller decides whether they end the polling session.
    pub async fn update_display(&mut self, kodi: &mut KodiServer) -> Result<(), PanelError> {
        let pressed = self.pressed.swap(false, Ordering::SeqCst);

        self.frame.clear_black();

        if self.screen_on && Instant::now() >= self.screen_off_at {
            self.screen_on = false;
            self.driver.set_power(false)?;
        }

        let player = kodi.active_player().await?;
        match player {
            Some(p) if matches!(p.kind, PlayerKind::Audio | PlayerKind::Video) => {
                self.playing_cycle(kodi, p, pressed).await?;
            }
            other => {
                self.status_cycle(kodi, other, pressed).await?;
            }
        }

        self.driver.blit(&self.frame)?;
        Ok(())
    }

    /// Nothing (or pictures) playing: wake on press, show a status screen
    /// while the wake window lasts, otherwise keep the panel dark.
    async fn status_cycle(
        &mut self,
        kodi: &mut KodiServer,
        player: Option<ActivePlayer>,
        pressed: bool,
    ) -> Result<(), PanelError> {
        // no artwork survives outside playback
        self.artwork.reset();

        if pressed {
            if self.screen_on {
                // already lit: the press cycles the idle sub-layout
                self.modes.advance(None);
            }
            self.driver.set_power(true)?;
            self.screen_on = true;
            self.screen_off_at = Instant::now() + self.screen_wake;
        }

        if !self.screen_on {
            self.driver.set_power(false)?;
            return Ok(());
        }

        let mut info = kodi.info_labels(STATUS_LABELS).await?;
        let summary = match player {
            None => "Idle",
            Some(p) if p.kind == PlayerKind::Picture => "Photo viewing",
            Some(_) => "Busy",
        };
        info.set(LABEL_SUMMARY, summary);

        let mode = self.modes.active(None, &info);
        self.render_layout(mode, &info)
    }

    /// Audio or video playing: press cycles the domain's layout (and forces
    /// an artwork re-fetch), then one label batch + the separate percentage
    /// fetch feed the renderer.
    async fn playing_cycle(
        &mut self,
        kodi: &mut KodiServer,
        player: ActivePlayer,
        pressed: bool,
    ) -> Result<(), PanelError> {
        self.driver.set_power(true)?;
        self.screen_on = true;
        self.screen_off_at = Instant::now() + self.screen_wake;

        if pressed {
            let mode = self.modes.advance(Some(player.kind));
            info!("screen pressed -- display mode now {:?}", mode);
            // layouts differ in artwork size and position
            self.artwork.reset();
        }

        let labels = match player.kind {
            PlayerKind::Audio => AUDIO_LABELS,
            _ => VIDEO_LABELS,
        };
        let mut info = kodi.info_labels(labels).await?;

        if let Some(percent) = kodi.playback_percent(player.player_id).await? {
            info.set(LABEL_PERCENT, format!("{:.1}", percent * 100.0));
        }

        let mode = self.modes.active(Some(player.kind), &info);

        let cover_label = match player.kind {
            PlayerKind::Audio => "MusicPlayer.Cover",
            _ => "VideoPlayer.Cover",
        };
        let cover = info.get(cover_label).to_string();
        self.refresh_artwork(kodi, &cover, mode).await?;

        self.render_layout(mode, &info)
    }

    /// Interpret the mode's layout against the snapshot: artwork slot,
    /// progress bar, then the field sequence.
    fn render_layout(&mut self, mode: ScreenMode, info: &InfoSnapshot) -> Result<(), PanelError> {
        let Some(layout) = self.layouts.get(mode) else {
            warn!("no layout registered for {:?}", mode);
            return Ok(());
        };

        if layout.artwork.is_some() {
            if let Some(thumb) = self.artwork.thumb() {
                let placement = layout.artwork.as_ref().map(|a| a.placement);
                let pos = match placement {
                    Some(ArtPlacement::At(p)) => p,
                    _ => Point::new(
                        (self.frame.width() as i32 - thumb.width() as i32) / 2,
                        (self.frame.height() as i32 - thumb.height() as i32) / 2,
                    ),
                };
                self.frame.paste(thumb, pos);
            }
        }

        if let Some(spec) = layout.progress {
            let time_labels = match mode {
                ScreenMode::Audio(_) => Some(("MusicPlayer.Time", "MusicPlayer.Duration")),
                ScreenMode::Video(_) => Some(("VideoPlayer.Time", "VideoPlayer.Duration")),
                ScreenMode::Status(_) => None,
            };
            if let Some((elapsed_label, total_label)) = time_labels {
                let elapsed = info.get(elapsed_label);
                let total = info.get(total_label);
                let fraction = match self.callbacks.progress_calc() {
                    Some(calc) => calc(elapsed, total, layout.name),
                    None => {
                        let offset = self.progress_offsets.get(layout.name).copied().unwrap_or(0);
                        progress::calc_progress(elapsed, total, offset)
                    }
                };
                if let Some(fraction) = fraction {
                    renderer::render_progress(&mut self.frame, &spec, elapsed, fraction)?;
                } else {
                    debug!("progress hidden for {}", layout.name);
                }
            }
        }

        renderer::render_fields(&mut self.frame, layout, info, mode, &self.callbacks)?;
        Ok(())
    }

    /// Execute the artwork plan for the reported cover path. The cache is
    /// committed even on decode failure so one bad source is not re-fetched
    /// for the rest of the track.
    async fn refresh_artwork(
        &mut self,
        kodi: &mut KodiServer,
        cover: &str,
        mode: ScreenMode,
    ) -> Result<(), PanelError> {
        let target = match self.layouts.get(mode).and_then(|l| l.artwork) {
            Some(spec) => spec.size,
            None => return Ok(()),
        };

        match self.resolver.plan(&self.artwork, cover) {
            ArtPlan::UseCached => {}
            ArtPlan::LocalFile(path) => {
                let thumb = self.resolver.load_local(&path, target);
                self.artwork.commit(path.to_string_lossy().into_owned(), thumb);
            }
            ArtPlan::Remote(path) => {
                let url = if path.starts_with("http://") || path.starts_with("https://") {
                    Some(path.clone())
                } else {
                    kodi.prepare_download(&path).await?
                };
                let thumb = match url {
                    Some(url) => {
                        let bytes = kodi.fetch_bytes(&url).await?;
                        self.resolver.decode_remote(&bytes, target)
                    }
                    None => {
                        warn!("no download path for artwork {}", path);
                        self.resolver.fallback(target)
                    }
                };
                self.artwork.commit(path, thumb);
            }
        }
        Ok(())
    }
}
