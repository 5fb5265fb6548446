#[cfg(feature = "msp430g2553")]
use crate::pac;

/// Value of an erased calibration byte in information memory segment A
pub const CAL_ERASED: u8 = 0xFF;

pub trait BasicClock {
    fn calbc1_16mhz_rd(&self) -> u8;
    fn caldco_16mhz_rd(&self) -> u8;

    fn bcsctl1_wr(&self, bits: u8);
    fn dcoctl_wr(&self, bits: u8);
}

#[cfg(feature = "msp430g2553")]
impl BasicClock for pac::SYSTEM_CLOCK {
    #[inline(always)]
    fn calbc1_16mhz_rd(&self) -> u8 {
        let cal = unsafe { &*pac::CALIBRATION_DATA::ptr() };
        cal.calbc1_16mhz.read().bits()
    }

    #[inline(always)]
    fn caldco_16mhz_rd(&self) -> u8 {
        let cal = unsafe { &*pac::CALIBRATION_DATA::ptr() };
        cal.caldco_16mhz.read().bits()
    }

    #[inline(always)]
    fn bcsctl1_wr(&self, bits: u8) {
        self.bcsctl1.write(|w| unsafe { w.bits(bits) });
    }

    #[inline(always)]
    fn dcoctl_wr(&self, bits: u8) {
        self.dcoctl.write(|w| unsafe { w.bits(bits) });
    }
}
