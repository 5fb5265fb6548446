#[cfg(feature = "msp430g2553")]
use crate::pac;

pub const WDTPW: u16 = 0x5A00;
pub const WDTHOLD: u16 = 0x0080;

pub trait WatchdogTimer {
    fn wdtctl_rd(&self) -> u16;
    /// Writes the low byte of WDTCTL. The password is added by the implementation.
    fn wdtctl_wr(&self, bits: u8);
}

#[cfg(feature = "msp430g2553")]
impl WatchdogTimer for pac::WATCHDOG_TIMER {
    #[inline(always)]
    fn wdtctl_rd(&self) -> u16 {
        self.wdtctl.read().bits()
    }

    #[inline(always)]
    fn wdtctl_wr(&self, bits: u8) {
        self.wdtctl.write(|w| unsafe { w.bits(WDTPW | bits as u16) });
    }
}
