// src/touch.rs
//
// Touchscreen press plumbing. The interrupt side only latches a flag and
// nudges the render loop awake; the loop drains the latch at the top of the
// next cycle, so a press is never lost and bursts coalesce into one redraw.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Shared between the interrupt thread and the render loop.
#[derive(Clone)]
pub struct PressSignal {
    latch: Arc<AtomicBool>,
    pub wake: Arc<Notify>,
}

impl PressSignal {
    /// `latch` is the manager's press flag.
    pub fn new(latch: Arc<AtomicBool>) -> Self {
        Self {
            latch,
            wake: Arc::new(Notify::new()),
        }
    }

    /// Record a press and wake the render loop early. Safe from any thread.
    pub fn press(&self) {
        self.latch.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }
}

#[cfg(feature = "touch-gpio")]
pub mod gpio {
    //! T_IRQ wiring via rppal. The touchscreen controller has its own
    //! pull-up, so the pin is read as a plain input.

    use log::info;
    use rppal::gpio::{Gpio, InputPin, Trigger};

    use super::PressSignal;

    /// Keeps the interrupt-armed pin alive for the process lifetime.
    pub struct TouchIrq {
        _pin: InputPin,
    }

    impl TouchIrq {
        pub fn install(bcm_pin: u8, signal: PressSignal) -> Result<Self, rppal::gpio::Error> {
            let gpio = Gpio::new()?;
            let mut pin = gpio.get(bcm_pin)?.into_input();
            pin.set_async_interrupt(Trigger::FallingEdge, move |_level| {
                signal.press();
            })?;
            info!("touch interrupt armed on GPIO{}", bcm_pin);
            Ok(Self { _pin: pin })
        }
    }
}
