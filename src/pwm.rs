//! Software servo PWM
//!
//! [`ServoPwm`] generates two hobby-servo signals from a periodic tick, typically the CCR0 alarm
//! of [`crate::timer::PeriodicCompare`] firing at [`ISR_RATE_HZ`]. Each frame is
//! [`FRAME_TICKS`] ticks long (20 ms at 100 kHz). Both outputs go high at the start of a frame and
//! each drops low once the tick count reaches its duty threshold, so a duty of 150 ticks is a
//! 1.5 ms pulse.
//!
//! The thresholds are plain fields; share the controller with the interrupt handler through a
//! critical-section mutex and change the duty from the main loop.

use crate::timer::TickHandler;
use core::convert::Infallible;
use embedded_hal::digital::OutputPin;

/// Tick rate the controller is designed for
pub const ISR_RATE_HZ: u32 = 100_000;

/// Ticks per PWM frame
pub const FRAME_TICKS: u16 = 2000;

/// Power-on duty of both channels, the servo centre position
pub const DEFAULT_DUTY: u16 = 150;

/// Shortest pulse produced by [`Sweep`]
pub const SWEEP_MIN: u16 = 100;

/// Longest pulse produced by [`Sweep`]
pub const SWEEP_MAX: u16 = 200;

/// PWM output channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// First output
    A,
    /// Second output
    B,
}

/// Two-channel servo PWM generator
pub struct ServoPwm<A, B> {
    pin_a: A,
    pin_b: B,
    duty_a: u16,
    duty_b: u16,
    count: u16,
}

impl<A, B> ServoPwm<A, B>
where
    A: OutputPin,
    B: OutputPin<Error = A::Error>,
{
    /// Create a controller with both channels at [`DEFAULT_DUTY`]. The pins are first driven high
    /// when the first frame completes.
    pub fn new(pin_a: A, pin_b: B) -> Self {
        ServoPwm {
            pin_a,
            pin_b,
            duty_a: DEFAULT_DUTY,
            duty_b: DEFAULT_DUTY,
            count: 0,
        }
    }

    /// Set the pulse width of a channel in ticks. A value of 0 or above [`FRAME_TICKS`] keeps the
    /// output high for the whole frame.
    pub fn set_duty(&mut self, channel: Channel, ticks: u16) {
        match channel {
            Channel::A => self.duty_a = ticks,
            Channel::B => self.duty_b = ticks,
        }
    }

    /// Pulse width of a channel in ticks
    pub fn duty(&self, channel: Channel) -> u16 {
        match channel {
            Channel::A => self.duty_a,
            Channel::B => self.duty_b,
        }
    }

    /// Ticks elapsed in the current frame
    pub fn position(&self) -> u16 {
        self.count
    }

    /// Advance one tick, updating the outputs
    pub fn tick(&mut self) -> Result<(), A::Error> {
        self.count += 1;
        if self.count == self.duty_a {
            self.pin_a.set_low()?;
        }
        if self.count == self.duty_b {
            self.pin_b.set_low()?;
        }
        if self.count >= FRAME_TICKS {
            self.count = 0;
            self.pin_a.set_high()?;
            self.pin_b.set_high()?;
        }
        Ok(())
    }

    /// Release the pins
    pub fn free(self) -> (A, B) {
        (self.pin_a, self.pin_b)
    }
}

impl<A, B> TickHandler for ServoPwm<A, B>
where
    A: OutputPin<Error = Infallible>,
    B: OutputPin<Error = Infallible>,
{
    #[inline]
    fn on_tick(&mut self) {
        match self.tick() {
            Ok(()) => (),
            Err(never) => match never {},
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Rising,
    Falling,
}

/// Endless ramp between [`SWEEP_MIN`] and [`SWEEP_MAX`] that jumps back to its starting end
/// when it reaches the other one
#[derive(Clone, Copy, Debug)]
pub struct Sweep {
    value: u16,
    direction: Direction,
}

impl Sweep {
    /// Count up from `start`, wrapping from [`SWEEP_MAX`] to [`SWEEP_MIN`]
    pub fn rising(start: u16) -> Self {
        Sweep {
            value: start,
            direction: Direction::Rising,
        }
    }

    /// Count down from `start`, wrapping from [`SWEEP_MIN`] to [`SWEEP_MAX`]
    pub fn falling(start: u16) -> Self {
        Sweep {
            value: start,
            direction: Direction::Falling,
        }
    }

    /// Current value
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl Iterator for Sweep {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        self.value = match self.direction {
            Direction::Rising if self.value < SWEEP_MAX => self.value + 1,
            Direction::Rising => SWEEP_MIN,
            Direction::Falling if self.value > SWEEP_MIN => self.value - 1,
            Direction::Falling => SWEEP_MAX,
        };
        Some(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::ErrorType;
    use std::vec::Vec;

    /// Records every level written, starting from low
    #[derive(Default)]
    struct Trace {
        high: bool,
        edges: Vec<(u32, bool)>,
        now: u32,
    }

    impl ErrorType for Trace {
        type Error = Infallible;
    }

    impl OutputPin for Trace {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.edges.push((self.now, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.edges.push((self.now, true));
            Ok(())
        }
    }

    fn run(pwm: &mut ServoPwm<Trace, Trace>, ticks: u32) {
        for _ in 0..ticks {
            pwm.pin_a.now += 1;
            pwm.pin_b.now += 1;
            pwm.on_tick();
        }
    }

    #[test]
    fn frame_and_pulse_widths() {
        let mut pwm = ServoPwm::new(Trace::default(), Trace::default());
        pwm.set_duty(Channel::B, 120);
        run(&mut pwm, 3 * FRAME_TICKS as u32);

        let (a, b) = pwm.free();
        // Frame starts on tick 2000; pulses end DEFAULT_DUTY and 120 ticks later
        assert_eq!(
            a.edges,
            [(150, false), (2000, true), (2150, false), (4000, true), (4150, false), (6000, true)]
        );
        assert_eq!(
            b.edges,
            [(120, false), (2000, true), (2120, false), (4000, true), (4120, false), (6000, true)]
        );
    }

    #[test]
    fn duty_change_takes_effect_next_crossing() {
        let mut pwm = ServoPwm::new(Trace::default(), Trace::default());
        run(&mut pwm, FRAME_TICKS as u32);
        pwm.set_duty(Channel::A, 180);
        assert_eq!(pwm.duty(Channel::A), 180);
        assert_eq!(pwm.duty(Channel::B), DEFAULT_DUTY);
        run(&mut pwm, 200);
        assert_eq!(pwm.position(), 200);
        assert_eq!(pwm.pin_a.edges.last(), Some(&(2180, false)));
        assert!(pwm.pin_a.edges.iter().all(|&e| e != (2150, false)));
    }

    #[test]
    fn full_duty_never_drops() {
        let mut pwm = ServoPwm::new(Trace::default(), Trace::default());
        pwm.set_duty(Channel::A, FRAME_TICKS + 1);
        run(&mut pwm, 2 * FRAME_TICKS as u32);
        assert!(pwm.pin_a.edges.iter().all(|&(_, high)| high));
    }

    #[test]
    fn sweep_rising_wraps_to_min() {
        let values: Vec<u16> = Sweep::rising(198).take(4).collect();
        assert_eq!(values, [199, 200, 100, 101]);
    }

    #[test]
    fn sweep_falling_wraps_to_max() {
        let mut sweep = Sweep::falling(101);
        assert_eq!(sweep.next(), Some(100));
        assert_eq!(sweep.next(), Some(200));
        assert_eq!(sweep.value(), 200);
    }

    #[test]
    fn sweep_full_cycle_length() {
        // 101 distinct pulse widths per cycle
        let mut sweep = Sweep::rising(DEFAULT_DUTY);
        let first = sweep.next();
        let period = sweep.position(|v| Some(v) == first).map(|i| i + 1);
        assert_eq!(period, Some(101));
    }
}
