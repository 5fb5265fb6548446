#[cfg(feature = "msp430g2553")]
use crate::pac;
use bitflags::bitflags;

bitflags! {
    /// UCAxCTL1 bits
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Ucactl1: u8 {
        const UCSWRST = 1 << 0;
        const UCSSEL0 = 1 << 6;
        const UCSSEL1 = 1 << 7;
    }
}

bitflags! {
    /// UCAxSTAT error bits
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Ucastat: u8 {
        const UCPE = 1 << 4;
        const UCOE = 1 << 5;
        const UCFE = 1 << 6;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ucssel {
    Uclk = 0,
    Aclk = 1,
    Smclk = 2,
}

pub trait UsciUart {
    /// Hold the state machine in reset and select the BRCLK source
    fn reset_with_clock(&self, ucssel: Ucssel);
    /// Release the state machine from reset. Only call after baud settings are written.
    fn release(&self);

    // only call while in reset state
    fn br_wr(&self, ucbr: u16);
    // only call while in reset state
    fn mctl_wr(&self, ucbrs: u8, ucbrf: u8, ucos16: bool);

    fn stat_rd(&self) -> Ucastat;

    fn rx_rd(&self) -> u8;
    fn tx_wr(&self, val: u8);

    fn txifg_rd(&self) -> bool;
    fn rxifg_rd(&self) -> bool;
}

#[cfg(feature = "msp430g2553")]
const UCA0RXIFG: u8 = 1 << 0;
#[cfg(feature = "msp430g2553")]
const UCA0TXIFG: u8 = 1 << 1;

#[cfg(feature = "msp430g2553")]
#[inline(always)]
fn ifg2() -> u8 {
    let sfr = unsafe { &*pac::SPECIAL_FUNCTION::ptr() };
    sfr.ifg2.read().bits()
}

#[cfg(feature = "msp430g2553")]
impl UsciUart for pac::USCI_A0_UART_MODE {
    #[inline(always)]
    fn reset_with_clock(&self, ucssel: Ucssel) {
        let bits = Ucactl1::UCSWRST.bits() | ((ucssel as u8) << 6);
        self.uca0ctl1.write(|w| unsafe { w.bits(bits) });
    }

    #[inline(always)]
    fn release(&self) {
        self.uca0ctl1
            .modify(|r, w| unsafe { w.bits(r.bits() & !Ucactl1::UCSWRST.bits()) });
    }

    #[inline(always)]
    fn br_wr(&self, ucbr: u16) {
        let [lo, hi] = ucbr.to_le_bytes();
        self.uca0br0.write(|w| unsafe { w.bits(lo) });
        self.uca0br1.write(|w| unsafe { w.bits(hi) });
    }

    #[inline(always)]
    fn mctl_wr(&self, ucbrs: u8, ucbrf: u8, ucos16: bool) {
        let bits = ((ucbrf & 0x0F) << 4) | ((ucbrs & 0x07) << 1) | ucos16 as u8;
        self.uca0mctl.write(|w| unsafe { w.bits(bits) });
    }

    #[inline(always)]
    fn stat_rd(&self) -> Ucastat {
        Ucastat::from_bits_truncate(self.uca0stat.read().bits())
    }

    #[inline(always)]
    fn rx_rd(&self) -> u8 {
        self.uca0rxbuf.read().bits()
    }

    #[inline(always)]
    fn tx_wr(&self, val: u8) {
        self.uca0txbuf.write(|w| unsafe { w.bits(val) });
    }

    #[inline(always)]
    fn txifg_rd(&self) -> bool {
        ifg2() & UCA0TXIFG != 0
    }

    #[inline(always)]
    fn rxifg_rd(&self) -> bool {
        ifg2() & UCA0RXIFG != 0
    }
}
