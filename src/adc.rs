//! ADC10
//!
//! Single-shot 10-bit conversions on any of the analog inputs A0 to A7 (P1.0 to P1.7), plus the
//! internal channels. Configure with [`AdcConfig`], then use [`Adc::read`] to block on a result or
//! [`Adc::start`] and [`Adc::result`] to poll.
//!
//! Every conversion reprograms the control registers and waits for the reference and input mux to
//! settle, so channels can be interleaved freely.

use crate::hw_traits::adc10::{Adc10, Adc10ctl0, Adc10ctl1, INCH_SHIFT};
use core::convert::Infallible;

/// Supply voltage of the board in millivolts, the full-scale value with [`Reference::Vcc`]
pub const VCC_MV: u32 = 3290;

/// Largest conversion result
pub const FULL_SCALE: u16 = 1023;

/// Convert a raw count to millivolts against a reference of `vref_mv`
#[inline]
pub fn count_to_mv(count: u16, vref_mv: u32) -> u32 {
    count as u32 * vref_mv / FULL_SCALE as u32
}

/// Positive reference of the converter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reference {
    /// Supply rail, nominally [`VCC_MV`]
    Vcc,
    /// Internal 1.5 V bandgap
    Internal1V5,
    /// Internal 2.5 V bandgap
    Internal2V5,
}

impl Reference {
    /// Full-scale voltage in millivolts
    pub fn millivolts(self) -> u32 {
        match self {
            Reference::Vcc => VCC_MV,
            Reference::Internal1V5 => 1500,
            Reference::Internal2V5 => 2500,
        }
    }

    #[inline]
    fn ctl0(self) -> Adc10ctl0 {
        match self {
            Reference::Vcc => Adc10ctl0::empty(),
            Reference::Internal1V5 => Adc10ctl0::SREF0,
            Reference::Internal2V5 => Adc10ctl0::SREF0 | Adc10ctl0::REF2_5V,
        }
    }
}

/// Sample-and-hold time in ADC10CLK cycles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleTime {
    /// 4 cycles
    _4 = 0,
    /// 8 cycles
    _8 = 1,
    /// 16 cycles
    _16 = 2,
    /// 64 cycles
    _64 = 3,
}

impl SampleTime {
    #[inline]
    fn ctl0(self) -> Adc10ctl0 {
        Adc10ctl0::from_bits_retain((self as u16) << 11)
    }
}

/// ADC configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdcConfig {
    /// Positive reference
    pub reference: Reference,
    /// Sample-and-hold time
    pub sample_time: SampleTime,
}

impl Default for AdcConfig {
    fn default() -> Self {
        AdcConfig {
            reference: Reference::Vcc,
            sample_time: SampleTime::_64,
        }
    }
}

impl AdcConfig {
    /// Supply reference, longest sample time
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the positive reference
    pub fn reference(self, reference: Reference) -> Self {
        AdcConfig { reference, ..self }
    }

    /// Select the sample-and-hold time
    pub fn sample_time(self, sample_time: SampleTime) -> Self {
        AdcConfig {
            sample_time,
            ..self
        }
    }

    /// Apply the configuration to the converter
    pub fn configure<A: Adc10>(self, adc: A) -> Adc<A> {
        Adc { adc, config: self }
    }

    fn ctl0(&self) -> Adc10ctl0 {
        // The reference generator is left on for every setting so switching is settle-free
        self.reference.ctl0()
            | self.sample_time.ctl0()
            | Adc10ctl0::REFON
            | Adc10ctl0::ADC10ON
    }
}

/// A pin or internal source wired to an ADC input channel
pub trait AdcChannel {
    /// INCHx value
    const CHANNEL: u8;
}

/// ADC10 converter
pub struct Adc<A> {
    adc: A,
    config: AdcConfig,
}

impl<A: Adc10> Adc<A> {
    /// Start a conversion on `channel` (0 to 15). Inputs 0 to 7 are switched to analog mode.
    pub fn start(&mut self, channel: u8) {
        let channel = channel & 0x0F;
        self.adc.ctl0_wr(self.adc.ctl0_rd() & !Adc10ctl0::ENC.bits());
        self.adc.ctl0_wr(self.config.ctl0().bits());
        if channel < 8 {
            self.adc.ae0_set(1 << channel);
        }
        self.adc.ctl1_wr((channel as u16) << INCH_SHIFT);
        self.adc.settle();
        self.adc
            .ctl0_wr((self.config.ctl0() | Adc10ctl0::ENC | Adc10ctl0::ADC10SC).bits());
    }

    /// Result of the last started conversion, once it is done
    pub fn result(&mut self) -> nb::Result<u16, Infallible> {
        if Adc10ctl1::from_bits_retain(self.adc.ctl1_rd()).contains(Adc10ctl1::ADC10BUSY) {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(self.adc.mem_rd())
        }
    }

    /// Convert `channel` and wait for the result
    pub fn read(&mut self, channel: u8) -> u16 {
        self.start(channel);
        match nb::block!(self.result()) {
            Ok(count) => count,
            Err(never) => match never {},
        }
    }

    /// Convert the channel a pin is wired to
    pub fn read_pin<P: AdcChannel>(&mut self, _pin: &P) -> u16 {
        self.read(P::CHANNEL)
    }

    /// Convert `channel` and scale the result to millivolts of the configured reference
    pub fn read_mv(&mut self, channel: u8) -> u32 {
        count_to_mv(self.read(channel), self.vref_mv())
    }

    /// Full-scale voltage of the configured reference in millivolts
    pub fn vref_mv(&self) -> u32 {
        self.config.reference.millivolts()
    }

    /// Current configuration
    pub fn config(&self) -> AdcConfig {
        self.config
    }

    /// Release the peripheral
    pub fn free(self) -> A {
        self.adc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use std::vec::Vec;

    #[derive(Default)]
    struct FakeAdc {
        ctl0: Cell<u16>,
        ctl1: Cell<u16>,
        ae0: Cell<u8>,
        mem: Cell<u16>,
        busy_polls: Cell<u8>,
        settled: Cell<bool>,
        ctl0_writes: std::cell::RefCell<Vec<u16>>,
    }

    impl Adc10 for &FakeAdc {
        fn ctl0_rd(&self) -> u16 {
            self.ctl0.get()
        }

        fn ctl0_wr(&self, bits: u16) {
            self.ctl0.set(bits);
            self.ctl0_writes.borrow_mut().push(bits);
            if bits & Adc10ctl0::ADC10SC.bits() != 0 {
                assert!(self.settled.get(), "conversion started before settling");
                self.busy_polls.set(3);
            }
        }

        fn ctl1_rd(&self) -> u16 {
            let left = self.busy_polls.get();
            if left > 0 {
                self.busy_polls.set(left - 1);
                self.ctl1.get() | Adc10ctl1::ADC10BUSY.bits()
            } else {
                self.ctl1.get()
            }
        }

        fn ctl1_wr(&self, bits: u16) {
            self.ctl1.set(bits);
        }

        fn ae0_set(&self, bits: u8) {
            self.ae0.set(self.ae0.get() | bits);
        }

        fn mem_rd(&self) -> u16 {
            self.mem.get()
        }

        fn settle(&self) {
            self.settled.set(true);
        }
    }

    #[test]
    fn read_programs_channel_and_waits() {
        let fake = FakeAdc::default();
        fake.mem.set(0x1FF);
        let mut adc = AdcConfig::new().configure(&fake);
        assert_eq!(adc.read(3), 0x1FF);
        assert_eq!(fake.ae0.get(), 1 << 3);
        assert_eq!(fake.ctl1.get() >> INCH_SHIFT, 3);
        assert_eq!(fake.busy_polls.get(), 0);

        let writes = fake.ctl0_writes.borrow();
        // SREF_0 + ADC10SHT_3 + REFON + ADC10ON, then ENC + ADC10SC on top
        assert_eq!(writes[1], 0x1830);
        assert_eq!(writes[2], 0x1833);
    }

    #[test]
    fn internal_reference_bits() {
        let fake = FakeAdc::default();
        let mut adc = AdcConfig::new()
            .reference(Reference::Internal2V5)
            .sample_time(SampleTime::_16)
            .configure(&fake);
        adc.read(0);
        assert_eq!(fake.ctl0.get() & 0xE000, Adc10ctl0::SREF0.bits());
        assert_ne!(fake.ctl0.get() & Adc10ctl0::REF2_5V.bits(), 0);
        assert_eq!((fake.ctl0.get() >> 11) & 0b11, 2);
        assert_eq!(adc.vref_mv(), 2500);
    }

    #[test]
    fn internal_channels_leave_ae0() {
        let fake = FakeAdc::default();
        let mut adc = AdcConfig::new().configure(&fake);
        adc.read(10);
        assert_eq!(fake.ae0.get(), 0);
        assert_eq!(fake.ctl1.get() >> INCH_SHIFT, 10);
    }

    #[test]
    fn result_polls() {
        let fake = FakeAdc::default();
        fake.mem.set(42);
        let mut adc = AdcConfig::new().configure(&fake);
        adc.start(0);
        assert_eq!(adc.result(), Err(nb::Error::WouldBlock));
        assert_eq!(adc.result(), Err(nb::Error::WouldBlock));
        assert_eq!(adc.result(), Err(nb::Error::WouldBlock));
        assert_eq!(adc.result(), Ok(42));
    }

    #[test]
    fn millivolt_scaling() {
        assert_eq!(count_to_mv(1023, VCC_MV), 3290);
        assert_eq!(count_to_mv(0, VCC_MV), 0);
        assert_eq!(count_to_mv(512, VCC_MV), 1646);
        assert_eq!(count_to_mv(1023, Reference::Internal1V5.millivolts()), 1500);
    }
}
