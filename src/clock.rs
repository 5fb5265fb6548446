//! Basic clock system
//!
//! The DCO powers up at roughly 1 MHz. For 16 MHz operation the factory calibration constants
//! stored in information memory segment A are loaded into BCSCTL1 and DCOCTL. A mass erase wipes
//! those constants (they read back as 0xFF), in which case the DCO is left at its reset setting
//! and a warning is logged.
//!
//! MCLK and SMCLK are both sourced from the DCO, undivided.

use crate::hw_traits::bcs::{BasicClock, CAL_ERASED};

/// Nominal DCO frequency after reset
pub const DCO_RESET_HZ: u32 = 1_000_000;

/// Calibrated DCO frequency
pub const DCO_16MHZ: u32 = 16_000_000;

/// Trait for configured clock signals
pub trait Clock {
    /// Clock frequency in hertz
    fn freq(&self) -> u32;
}

/// Master clock, drives the CPU
pub struct Mclk(u32);

/// Sub-system master clock, available to peripherals
pub struct Smclk(u32);

impl Clock for Mclk {
    #[inline]
    fn freq(&self) -> u32 {
        self.0
    }
}

impl Clock for Smclk {
    #[inline]
    fn freq(&self) -> u32 {
        self.0
    }
}

/// Frozen clock configuration
pub struct Clocks {
    /// Master clock
    pub mclk: Mclk,
    /// Sub-system master clock
    pub smclk: Smclk,
    calibrated: bool,
}

impl Clocks {
    /// Whether the DCO was loaded from factory calibration data. When `false` the stated
    /// frequencies are nominal only.
    pub fn calibrated(&self) -> bool {
        self.calibrated
    }
}

/// Basic clock system configuration object
pub struct Bcs<B> {
    periph: B,
}

/// Extension trait for turning the clock peripheral into a [`Bcs`]
pub trait BcsExt: Sized {
    /// Take ownership of the clock peripheral
    fn constrain(self) -> Bcs<Self>;
}

impl<B: BasicClock> BcsExt for B {
    #[inline]
    fn constrain(self) -> Bcs<Self> {
        Bcs { periph: self }
    }
}

impl<B: BasicClock> Bcs<B> {
    /// Run from the DCO at its reset frequency
    pub fn dco_default(self) -> Clocks {
        Clocks {
            mclk: Mclk(DCO_RESET_HZ),
            smclk: Smclk(DCO_RESET_HZ),
            calibrated: false,
        }
    }

    /// Load the 16 MHz factory calibration into the DCO. If the calibration bytes were erased
    /// the DCO keeps its reset setting, but the returned clocks still state 16 MHz, so check
    /// [`Clocks::calibrated`] when exact timing matters.
    pub fn dco_calibrated_16mhz(self) -> Clocks {
        let bc1 = self.periph.calbc1_16mhz_rd();
        let calibrated = bc1 != CAL_ERASED;
        if calibrated {
            self.periph.bcsctl1_wr(bc1);
            self.periph.dcoctl_wr(self.periph.caldco_16mhz_rd());
        } else {
            log_warn!("clock: 16 MHz DCO calibration erased, running uncalibrated");
        }
        Clocks {
            mclk: Mclk(DCO_16MHZ),
            smclk: Smclk(DCO_16MHZ),
            calibrated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct FakeBcs {
        cal_bc1: u8,
        cal_dco: u8,
        bcsctl1: Cell<Option<u8>>,
        dcoctl: Cell<Option<u8>>,
    }

    impl FakeBcs {
        fn new(cal_bc1: u8, cal_dco: u8) -> Self {
            FakeBcs {
                cal_bc1,
                cal_dco,
                bcsctl1: Cell::new(None),
                dcoctl: Cell::new(None),
            }
        }
    }

    impl BasicClock for &FakeBcs {
        fn calbc1_16mhz_rd(&self) -> u8 {
            self.cal_bc1
        }

        fn caldco_16mhz_rd(&self) -> u8 {
            self.cal_dco
        }

        fn bcsctl1_wr(&self, bits: u8) {
            self.bcsctl1.set(Some(bits));
        }

        fn dcoctl_wr(&self, bits: u8) {
            self.dcoctl.set(Some(bits));
        }
    }

    #[test]
    fn loads_calibration() {
        let bcs = FakeBcs::new(0x8F, 0x95);
        let clocks = (&bcs).constrain().dco_calibrated_16mhz();
        assert!(clocks.calibrated());
        assert_eq!(clocks.smclk.freq(), 16_000_000);
        assert_eq!(bcs.bcsctl1.get(), Some(0x8F));
        assert_eq!(bcs.dcoctl.get(), Some(0x95));
    }

    #[test]
    fn erased_calibration_left_alone() {
        let bcs = FakeBcs::new(0xFF, 0xFF);
        let clocks = (&bcs).constrain().dco_calibrated_16mhz();
        assert!(!clocks.calibrated());
        assert_eq!(bcs.bcsctl1.get(), None);
        assert_eq!(bcs.dcoctl.get(), None);
    }

    #[test]
    fn default_dco() {
        let bcs = FakeBcs::new(0x8F, 0x95);
        let clocks = (&bcs).constrain().dco_default();
        assert_eq!(clocks.mclk.freq(), 1_000_000);
        assert_eq!(bcs.bcsctl1.get(), None);
    }
}
