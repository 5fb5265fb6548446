#[cfg(feature = "msp430g2553")]
use crate::pac;
use bitflags::bitflags;

bitflags! {
    /// TAxCTL bits
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Tactl: u16 {
        const TAIFG = 1 << 0;
        const TAIE = 1 << 1;
        const TACLR = 1 << 2;
        const MC0 = 1 << 4;
        const MC1 = 1 << 5;
        const ID0 = 1 << 6;
        const ID1 = 1 << 7;
        const TASSEL0 = 1 << 8;
        const TASSEL1 = 1 << 9;
    }
}

bitflags! {
    /// TAxCCTLn bits
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Tacctl: u16 {
        const CCIFG = 1 << 0;
        const COV = 1 << 1;
        const OUT = 1 << 2;
        const CCI = 1 << 3;
        const CCIE = 1 << 4;
        const CAP = 1 << 8;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tassel {
    Taclk = 0,
    Aclk = 1,
    Smclk = 2,
    Inclk = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mc {
    Stop = 0,
    Up = 1,
    Continuous = 2,
    UpDown = 3,
}

/// Timer clock divider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerDiv {
    /// No division
    _1 = 0,
    /// Divide by 2
    _2 = 1,
    /// Divide by 4
    _4 = 2,
    /// Divide by 8
    _8 = 3,
}

impl TimerDiv {
    #[inline(always)]
    pub fn divisor(self) -> u32 {
        1 << (self as u32)
    }
}

#[inline(always)]
pub fn tactl_bits(tassel: Tassel, div: TimerDiv, mc: Mc) -> u16 {
    ((tassel as u16) << 8) | ((div as u16) << 6) | ((mc as u16) << 4)
}

pub trait TimerA {
    /// Write clock select, divider and mode control. Clears TAR, TAIE and TAIFG.
    fn config(&self, tassel: Tassel, div: TimerDiv, mc: Mc);

    fn mc_rd(&self) -> Mc;

    fn tar_rd(&self) -> u16;

    fn taifg_rd(&self) -> bool;
    fn taifg_clr(&self);

    fn taie_set(&self);
    fn taie_clr(&self);
}

pub struct CCR0;
pub struct CCR1;
pub struct CCR2;

pub trait CapCmp<C> {
    fn set_ccrn(&self, count: u16);
    fn get_ccrn(&self) -> u16;

    fn ccifg_rd(&self) -> bool;
    fn ccifg_clr(&self);

    fn ccie_set(&self);
    fn ccie_clr(&self);
}

#[cfg(feature = "msp430g2553")]
macro_rules! capcmp_impl {
    ($TAx:ident, $CCRn:ident, $taxcctln:ident, $taxccrn:ident) => {
        impl CapCmp<$CCRn> for pac::$TAx {
            #[inline(always)]
            fn set_ccrn(&self, count: u16) {
                self.$taxccrn.write(|w| unsafe { w.bits(count) });
            }

            #[inline(always)]
            fn get_ccrn(&self) -> u16 {
                self.$taxccrn.read().bits()
            }

            #[inline(always)]
            fn ccifg_rd(&self) -> bool {
                Tacctl::from_bits_retain(self.$taxcctln.read().bits()).contains(Tacctl::CCIFG)
            }

            #[inline(always)]
            fn ccifg_clr(&self) {
                self.$taxcctln
                    .modify(|r, w| unsafe { w.bits(r.bits() & !Tacctl::CCIFG.bits()) });
            }

            #[inline(always)]
            fn ccie_set(&self) {
                self.$taxcctln
                    .modify(|r, w| unsafe { w.bits(r.bits() | Tacctl::CCIE.bits()) });
            }

            #[inline(always)]
            fn ccie_clr(&self) {
                self.$taxcctln
                    .modify(|r, w| unsafe { w.bits(r.bits() & !Tacctl::CCIE.bits()) });
            }
        }
    };
}

#[cfg(feature = "msp430g2553")]
macro_rules! timera_impl {
    ($TAx:ident, $([$CCRn:ident, $taxcctln:ident, $taxccrn:ident]),*) => {
        impl TimerA for pac::$TAx {
            #[inline(always)]
            fn config(&self, tassel: Tassel, div: TimerDiv, mc: Mc) {
                let bits = tactl_bits(tassel, div, mc) | Tactl::TACLR.bits();
                self.tactl.write(|w| unsafe { w.bits(bits) });
            }

            #[inline(always)]
            fn mc_rd(&self) -> Mc {
                match (self.tactl.read().bits() >> 4) & 0b11 {
                    0 => Mc::Stop,
                    1 => Mc::Up,
                    2 => Mc::Continuous,
                    _ => Mc::UpDown,
                }
            }

            #[inline(always)]
            fn tar_rd(&self) -> u16 {
                self.tar.read().bits()
            }

            #[inline(always)]
            fn taifg_rd(&self) -> bool {
                Tactl::from_bits_retain(self.tactl.read().bits()).contains(Tactl::TAIFG)
            }

            #[inline(always)]
            fn taifg_clr(&self) {
                self.tactl
                    .modify(|r, w| unsafe { w.bits(r.bits() & !Tactl::TAIFG.bits()) });
            }

            #[inline(always)]
            fn taie_set(&self) {
                self.tactl
                    .modify(|r, w| unsafe { w.bits(r.bits() | Tactl::TAIE.bits()) });
            }

            #[inline(always)]
            fn taie_clr(&self) {
                self.tactl
                    .modify(|r, w| unsafe { w.bits(r.bits() & !Tactl::TAIE.bits()) });
            }
        }

        $(capcmp_impl!($TAx, $CCRn, $taxcctln, $taxccrn);)*
    };
}

// Both timers share the `timer0_a3` register block layout
#[cfg(feature = "msp430g2553")]
timera_impl!(
    TIMER0_A3,
    [CCR0, tacctl0, taccr0],
    [CCR1, tacctl1, taccr1],
    [CCR2, tacctl2, taccr2]
);

#[cfg(feature = "msp430g2553")]
timera_impl!(
    TIMER1_A3,
    [CCR0, tacctl0, taccr0],
    [CCR1, tacctl1, taccr1],
    [CCR2, tacctl2, taccr2]
);
