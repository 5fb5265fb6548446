//! Watchdog timer
//!
//! **Note**: the watchdog is running after reset and will restart the device after roughly 32 ms
//! at the 1 MHz default clock. Call [`Wdt::constrain()`] first thing in `main` to stop it.

use crate::hw_traits::wdt::{WatchdogTimer, WDTHOLD};

/// Counter clear bit, self-resetting
const WDTCNTCL: u8 = 0x08;

/// Watchdog timer
pub struct Wdt<W> {
    periph: W,
}

impl<W: WatchdogTimer> Wdt<W> {
    /// Take the watchdog peripheral and stop the watchdog
    pub fn constrain(periph: W) -> Self {
        periph.wdtctl_wr(WDTHOLD as u8);
        Wdt { periph }
    }

    /// Whether the watchdog is stopped
    pub fn is_held(&self) -> bool {
        self.periph.wdtctl_rd() & WDTHOLD != 0
    }

    /// Restart the watchdog with its reset interval (32768 SMCLK cycles)
    pub fn resume(&mut self) {
        self.periph.wdtctl_wr(WDTCNTCL);
    }

    /// Clear the watchdog counter, keeping the current configuration
    pub fn pet(&mut self) {
        let low = self.periph.wdtctl_rd() as u8;
        self.periph.wdtctl_wr(low | WDTCNTCL);
    }

    /// Release the peripheral
    pub fn free(self) -> W {
        self.periph
    }
}
