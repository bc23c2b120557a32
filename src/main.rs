/*
 *  main.rs
 *
 *  KodiMonS - keeping an eye on Kodi
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::sync::Arc;

use env_logger::Env;
use log::{debug, error, info, warn};
use tokio::sync::Mutex as TokMutex;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

mod config;
mod constants;
mod display;
mod draw;
mod frame;
mod kodinfo;
mod kodirpc;
mod touch;

use display::{CallbackRegistry, DisplayDriverFactory, LayoutRegistry, PanelManager};
use display::artwork::ArtworkResolver;
use kodinfo::KodiServer;
use touch::PressSignal;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM, or SIGHUP so the panel can blank on the way
/// out instead of freezing on the last frame.
async fn signal_handler() -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Outer reconnect loop plus the inner ~1s update loop. Never returns; the
/// caller races it against the signal handler.
async fn run_loop(
    manager: Arc<TokMutex<PanelManager>>,
    kodi: &mut KodiServer,
    press: PressSignal,
) {
    loop {
        if let Err(e) = manager.lock().await.show_waiting() {
            error!("placeholder screen failed: {}", e);
        }

        // ensure Kodi is up and accessible before entering the update loop
        loop {
            match kodi.ping().await {
                Ok(true) => break,
                Ok(false) => info!("Kodi answered, but not with pong. Waiting..."),
                Err(e) => debug!("Kodi not reachable yet: {}", e),
            }
            tokio::time::sleep(constants::RECONNECT_POLL).await;
        }

        info!("Connected with Kodi. Entering update loop.");

        // loop until Kodi goes away
        loop {
            let result = { manager.lock().await.update_display(kodi).await };
            match result {
                Ok(()) => {}
                Err(e) if e.is_connection() => {
                    warn!("Communication disrupted: {}", e);
                    break;
                }
                // field-level and sink trouble is logged, never fatal
                Err(e) => error!("update cycle failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(constants::REFRESH_INTERVAL) => {}
                // a press short-circuits the wait for a prompt redraw
                _ = press.wake.notified() => {}
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;

    env_logger::Builder::from_env(
        Env::default().default_filter_or(cfg.log_level.as_deref().unwrap_or("info")),
    )
    .format_timestamp_secs()
    .init();

    info!("{} keeping an eye on Kodi", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let display_cfg = cfg.display.clone().unwrap_or_default();
    let driver = DisplayDriverFactory::create_from_config(&display_cfg)?;

    // The registries are the extension surface: populate them (and any
    // layout overrides) here, before the render loop starts.
    let callbacks = CallbackRegistry::with_defaults();
    let layouts = LayoutRegistry::defaults();
    let resolver = ArtworkResolver::new(cfg.images_dir(), cfg.kodi_temp_dir());

    let mut manager = PanelManager::new(
        driver,
        layouts,
        callbacks,
        resolver,
        cfg.progress_offsets.clone().unwrap_or_default(),
        cfg.screen_wake(),
    )?;
    manager.init()?;

    let press = PressSignal::new(manager.press_latch());
    let manager = Arc::new(TokMutex::new(manager));

    #[cfg(feature = "touch-gpio")]
    let _touch_irq = match display_cfg.touch_pin {
        Some(pin) => match touch::gpio::TouchIrq::install(pin, press.clone()) {
            Ok(irq) => Some(irq),
            Err(e) => {
                warn!("touch interrupt unavailable: {}", e);
                None
            }
        },
        None => None,
    };

    let mut kodi = KodiServer::new(&cfg.server_url())?;
    info!("polling {}", kodi.base_url());

    tokio::select! {
        _ = signal_handler() => {}
        _ = run_loop(Arc::clone(&manager), &mut kodi, press.clone()) => {
            info!("Closed application loop.");
        }
    }

    info!("Main application exiting. Blanking the panel.");
    if let Err(e) = manager.lock().await.shutdown() {
        warn!("panel blank on exit failed: {}", e);
    }

    Ok(())
}
