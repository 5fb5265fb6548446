//! GPIO
//!
//! Ports P1 and P2 are split into individual [`Pin`]s whose direction and function are tracked
//! in the type. Pins come out of reset as floating inputs, except P2.6 and P2.7 which default to
//! the crystal function.
//!
//! Output pins implement [`OutputPin`] and [`StatefulOutputPin`], input pins implement
//! [`InputPin`]. None of the operations can fail. Whole-port output patterns (several pins
//! changing together) go through the [`PortOut`] handle instead.

use crate::adc::AdcChannel;
use crate::hw_traits::gpio::GpioPort;
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

/// Port 1 token
pub struct P1;
/// Port 2 token
pub struct P2;

/// Ports whose pins double as ADC10 inputs
pub trait AnalogPort {}
impl AnalogPort for P1 {}

/// Pin number within a port
pub trait PinNum {
    /// Bit position in the port registers
    const NUM: u8;
}

macro_rules! pin_nums {
    ($($Pin:ident => $n:literal),*) => {
        $(
            #[doc = concat!("Pin number ", $n)]
            pub struct $Pin;
            impl PinNum for $Pin {
                const NUM: u8 = $n;
            }
        )*
    };
}

pin_nums!(Pin0 => 0, Pin1 => 1, Pin2 => 2, Pin3 => 3, Pin4 => 4, Pin5 => 5, Pin6 => 6, Pin7 => 7);

/// Direction typestate for input pins
pub struct Input<PULL>(PhantomData<PULL>);
/// Input pull typestate: pulled up
pub struct Pullup;
/// Input pull typestate: pulled down
pub struct Pulldown;
/// Input pull typestate: no pull resistor
pub struct Floating;

/// Direction typestate for output pins
pub struct Output;

/// Peripheral function typestate (PxSEL set)
pub struct Alternate<F>(PhantomData<F>);
/// Primary peripheral function (PxSEL2 clear), e.g. Timer_A outputs
pub struct Primary;
/// Secondary peripheral function (PxSEL2 set), e.g. USCI_A0 RXD/TXD
pub struct Secondary;

/// Analog input typestate, for the ADC10
pub struct Analog;

/// A single GPIO pin
pub struct Pin<PORT, PIN, DIR> {
    _port: PhantomData<PORT>,
    _pin: PhantomData<PIN>,
    _dir: PhantomData<DIR>,
}

impl<PORT, PIN, DIR> Pin<PORT, PIN, DIR> {
    #[inline(always)]
    pub(crate) const fn new() -> Self {
        Pin {
            _port: PhantomData,
            _pin: PhantomData,
            _dir: PhantomData,
        }
    }
}

impl<PORT: GpioPort, PIN: PinNum, DIR> Pin<PORT, PIN, DIR> {
    const MASK: u8 = 1 << PIN::NUM;

    #[inline(always)]
    fn gpio_function() {
        PORT::pxsel_clear(Self::MASK);
        PORT::pxsel2_clear(Self::MASK);
    }

    /// Configure as a push-pull output, initially low
    #[inline]
    pub fn into_output(self) -> Pin<PORT, PIN, Output> {
        Self::gpio_function();
        PORT::pxout_clear(Self::MASK);
        PORT::pxdir_set(Self::MASK);
        Pin::new()
    }

    /// Configure as an input with the pull-up resistor enabled
    #[inline]
    pub fn into_pullup_input(self) -> Pin<PORT, PIN, Input<Pullup>> {
        Self::gpio_function();
        PORT::pxdir_clear(Self::MASK);
        PORT::pxout_set(Self::MASK);
        PORT::pxren_set(Self::MASK);
        Pin::new()
    }

    /// Configure as an input with the pull-down resistor enabled
    #[inline]
    pub fn into_pulldown_input(self) -> Pin<PORT, PIN, Input<Pulldown>> {
        Self::gpio_function();
        PORT::pxdir_clear(Self::MASK);
        PORT::pxout_clear(Self::MASK);
        PORT::pxren_set(Self::MASK);
        Pin::new()
    }

    /// Configure as an input without pull resistor
    #[inline]
    pub fn into_floating_input(self) -> Pin<PORT, PIN, Input<Floating>> {
        Self::gpio_function();
        PORT::pxdir_clear(Self::MASK);
        PORT::pxren_clear(Self::MASK);
        Pin::new()
    }

    /// Hand the pin to its primary peripheral function
    #[inline]
    pub fn into_alternate_primary(self) -> Pin<PORT, PIN, Alternate<Primary>> {
        PORT::pxren_clear(Self::MASK);
        PORT::pxsel2_clear(Self::MASK);
        PORT::pxsel_set(Self::MASK);
        Pin::new()
    }

    /// Hand the pin to its secondary peripheral function
    #[inline]
    pub fn into_alternate_secondary(self) -> Pin<PORT, PIN, Alternate<Secondary>> {
        PORT::pxren_clear(Self::MASK);
        PORT::pxsel_set(Self::MASK);
        PORT::pxsel2_set(Self::MASK);
        Pin::new()
    }
}

impl<PORT: GpioPort + AnalogPort, PIN: PinNum, DIR> Pin<PORT, PIN, DIR> {
    /// Release the pin to the ADC10. The analog switch itself is enabled per conversion.
    #[inline]
    pub fn into_analog(self) -> Pin<PORT, PIN, Analog> {
        Self::gpio_function();
        PORT::pxdir_clear(Self::MASK);
        PORT::pxren_clear(Self::MASK);
        Pin::new()
    }
}

impl<PORT: AnalogPort, PIN: PinNum> AdcChannel for Pin<PORT, PIN, Analog> {
    const CHANNEL: u8 = PIN::NUM;
}

impl<PORT, PIN, PULL> ErrorType for Pin<PORT, PIN, Input<PULL>> {
    type Error = Infallible;
}

impl<PORT: GpioPort, PIN: PinNum, PULL> InputPin for Pin<PORT, PIN, Input<PULL>> {
    #[inline]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(PORT::pxin_rd() & (1 << PIN::NUM) != 0)
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|b| !b)
    }
}

impl<PORT, PIN> ErrorType for Pin<PORT, PIN, Output> {
    type Error = Infallible;
}

impl<PORT: GpioPort, PIN: PinNum> OutputPin for Pin<PORT, PIN, Output> {
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        PORT::pxout_clear(1 << PIN::NUM);
        Ok(())
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        PORT::pxout_set(1 << PIN::NUM);
        Ok(())
    }
}

impl<PORT: GpioPort, PIN: PinNum> StatefulOutputPin for Pin<PORT, PIN, Output> {
    #[inline]
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(PORT::pxout_rd() & (1 << PIN::NUM) != 0)
    }

    #[inline]
    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|b| !b)
    }

    #[inline]
    fn toggle(&mut self) -> Result<(), Self::Error> {
        PORT::pxout_toggle(1 << PIN::NUM);
        Ok(())
    }
}

/// Port-wide output register handle, for changing several output pins at once
pub struct PortOut<PORT>(PhantomData<PORT>);

impl<PORT: GpioPort> PortOut<PORT> {
    /// Drive the pins in `mask` to the matching bits of `value`. Pins outside `mask` are left
    /// alone. Only meaningful for pins configured as outputs.
    #[inline]
    pub fn write_masked(&mut self, mask: u8, value: u8) {
        PORT::pxout_clear(mask & !value);
        PORT::pxout_set(mask & value);
    }

    /// Current output latch of the whole port
    #[inline]
    pub fn read(&self) -> u8 {
        PORT::pxout_rd()
    }
}

macro_rules! port_parts {
    ($Parts:ident, $PORT:ident, $port_doc:literal, $Dir6:ty, $Dir7:ty) => {
        #[doc = concat!("The pins of ", $port_doc, " in their reset state")]
        pub struct $Parts {
            /// Pin 0
            pub pin0: Pin<$PORT, Pin0, Input<Floating>>,
            /// Pin 1
            pub pin1: Pin<$PORT, Pin1, Input<Floating>>,
            /// Pin 2
            pub pin2: Pin<$PORT, Pin2, Input<Floating>>,
            /// Pin 3
            pub pin3: Pin<$PORT, Pin3, Input<Floating>>,
            /// Pin 4
            pub pin4: Pin<$PORT, Pin4, Input<Floating>>,
            /// Pin 5
            pub pin5: Pin<$PORT, Pin5, Input<Floating>>,
            /// Pin 6
            pub pin6: Pin<$PORT, Pin6, $Dir6>,
            /// Pin 7
            pub pin7: Pin<$PORT, Pin7, $Dir7>,
            /// Whole-port output access
            pub out: PortOut<$PORT>,
        }

        impl $Parts {
            #[allow(dead_code)]
            fn new() -> Self {
                $Parts {
                    pin0: Pin::new(),
                    pin1: Pin::new(),
                    pin2: Pin::new(),
                    pin3: Pin::new(),
                    pin4: Pin::new(),
                    pin5: Pin::new(),
                    pin6: Pin::new(),
                    pin7: Pin::new(),
                    out: PortOut(PhantomData),
                }
            }
        }
    };
}

port_parts!(P1Parts, P1, "port 1", Input<Floating>, Input<Floating>);
port_parts!(P2Parts, P2, "port 2", Alternate<Primary>, Alternate<Primary>);

/// Both GPIO ports
pub struct Parts {
    /// Port 1
    pub p1: P1Parts,
    /// Port 2
    pub p2: P2Parts,
}

/// Extension trait to split the port register block into pins
pub trait GpioExt {
    /// Split into individual pins
    fn split(self) -> Parts;
}

#[cfg(feature = "msp430g2553")]
impl GpioExt for crate::pac::PORT_1_2 {
    #[inline]
    fn split(self) -> Parts {
        Parts {
            p1: P1Parts::new(),
            p2: P2Parts::new(),
        }
    }
}
