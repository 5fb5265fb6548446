//! One-hot output chaser
//!
//! Lights one of `N` outputs at a time, advancing on every step and wrapping after the last one.

use embedded_hal::digital::{Error, OutputPin};

/// One-hot cycler over `N` outputs (at most 8)
#[derive(Clone, Copy, Debug, Default)]
pub struct Chase<const N: usize> {
    next: usize,
}

impl<const N: usize> Chase<N> {
    /// Start with output 0
    pub const fn new() -> Self {
        const { assert!(N > 0 && N <= 8, "a chase covers 1 to 8 outputs") };
        Chase { next: 0 }
    }

    /// Index of the output lit by the next step
    pub fn position(&self) -> usize {
        self.next
    }

    /// Mask of all outputs in the chase
    pub const fn all() -> u8 {
        (((1u16) << N) - 1) as u8
    }

    /// Mask with only the next output set, then advance
    pub fn next_mask(&mut self) -> u8 {
        let mask = 1 << self.next;
        self.next = (self.next + 1) % N;
        mask
    }

    /// Turn every pin off, then the next one in sequence on. Pins beyond `N` are left alone.
    pub fn drive<E: Error>(
        &mut self,
        pins: &mut [&mut dyn OutputPin<Error = E>],
    ) -> Result<(), E> {
        let mask = self.next_mask();
        for (i, pin) in pins.iter_mut().take(N).enumerate() {
            if mask & (1 << i) == 0 {
                pin.set_low()?;
            }
        }
        if let Some(pin) = pins.get_mut(mask.trailing_zeros() as usize) {
            pin.set_high()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct Led(bool);

    impl ErrorType for Led {
        type Error = Infallible;
    }

    impl OutputPin for Led {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0 = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0 = true;
            Ok(())
        }
    }

    #[test]
    fn masks_cycle_through_five() {
        let mut chase = Chase::<5>::new();
        let masks: std::vec::Vec<u8> = (0..7).map(|_| chase.next_mask()).collect();
        assert_eq!(masks, [0x01, 0x02, 0x04, 0x08, 0x10, 0x01, 0x02]);
        assert_eq!(chase.position(), 2);
        assert_eq!(Chase::<5>::all(), 0x1F);
        assert_eq!(Chase::<8>::all(), 0xFF);
    }

    #[test]
    fn exactly_one_pin_lit() {
        let mut leds = [Led(true), Led(true), Led(false), Led(true)];
        let mut chase = Chase::<4>::new();
        for step in 0..9 {
            {
                let [a, b, c, d] = &mut leds;
                let pins: &mut [&mut dyn OutputPin<Error = Infallible>] = &mut [a, b, c, d];
                chase.drive(pins).unwrap();
            }
            let lit: std::vec::Vec<usize> = leds
                .iter()
                .enumerate()
                .filter(|(_, led)| led.0)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(lit, [step % 4]);
        }
    }

    #[derive(Debug, PartialEq)]
    struct Broken;

    impl Error for Broken {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct FlakyLed {
        fail: bool,
        lit: bool,
    }

    impl ErrorType for FlakyLed {
        type Error = Broken;
    }

    impl OutputPin for FlakyLed {
        fn set_low(&mut self) -> Result<(), Broken> {
            if self.fail {
                return Err(Broken);
            }
            self.lit = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Broken> {
            if self.fail {
                return Err(Broken);
            }
            self.lit = true;
            Ok(())
        }
    }

    #[test]
    fn pin_errors_propagate() {
        let mut good = FlakyLed {
            fail: false,
            lit: false,
        };
        let mut bad = FlakyLed {
            fail: true,
            lit: false,
        };
        let mut chase = Chase::<2>::new();
        {
            let pins: &mut [&mut dyn OutputPin<Error = Broken>] = &mut [&mut good, &mut bad];
            assert_eq!(chase.drive(pins), Err(Broken));
        }
        assert!(!good.lit);
        assert_eq!(chase.position(), 1);
    }
}
