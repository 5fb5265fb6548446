#[cfg(feature = "msp430g2553")]
use crate::pac;
use bitflags::bitflags;

bitflags! {
    /// ADC10CTL0 bits
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Adc10ctl0: u16 {
        const ADC10SC = 1 << 0;
        const ENC = 1 << 1;
        const ADC10IFG = 1 << 2;
        const ADC10IE = 1 << 3;
        const ADC10ON = 1 << 4;
        const REFON = 1 << 5;
        const REF2_5V = 1 << 6;
        const ADC10SHT0 = 1 << 11;
        const ADC10SHT1 = 1 << 12;
        const SREF0 = 1 << 13;
        const SREF1 = 1 << 14;
        const SREF2 = 1 << 15;
    }
}

bitflags! {
    /// ADC10CTL1 bits. The input channel occupies the top nibble (INCHx).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Adc10ctl1: u16 {
        const ADC10BUSY = 1 << 0;
    }
}

pub const INCH_SHIFT: u16 = 12;

pub trait Adc10 {
    fn ctl0_rd(&self) -> u16;
    fn ctl0_wr(&self, bits: u16);

    fn ctl1_rd(&self) -> u16;
    fn ctl1_wr(&self, bits: u16);

    fn ae0_set(&self, bits: u8);

    fn mem_rd(&self) -> u16;

    /// Spin for the reference and input mux settling time (64 MCLK cycles)
    fn settle(&self);
}

#[cfg(feature = "msp430g2553")]
impl Adc10 for pac::ADC10 {
    #[inline(always)]
    fn ctl0_rd(&self) -> u16 {
        self.adc10ctl0.read().bits()
    }

    #[inline(always)]
    fn ctl0_wr(&self, bits: u16) {
        self.adc10ctl0.write(|w| unsafe { w.bits(bits) });
    }

    #[inline(always)]
    fn ctl1_rd(&self) -> u16 {
        self.adc10ctl1.read().bits()
    }

    #[inline(always)]
    fn ctl1_wr(&self, bits: u16) {
        self.adc10ctl1.write(|w| unsafe { w.bits(bits) });
    }

    #[inline(always)]
    fn ae0_set(&self, bits: u8) {
        self.adc10ae0
            .modify(|r, w| unsafe { w.bits(r.bits() | bits) });
    }

    #[inline(always)]
    fn mem_rd(&self) -> u16 {
        self.adc10mem.read().bits()
    }

    #[inline(always)]
    fn settle(&self) {
        for _ in 0..64 {
            msp430::asm::nop();
        }
    }
}
