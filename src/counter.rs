//! Free-running counter abstraction
//!
//! A free-running counter is a 16-bit register incrementing at a fixed tick rate, wrapping from
//! `0xFFFF` to `0x0000` and raising a sticky overflow flag on every wrap. The flag stays set until
//! the reader clears it. [`crate::timer::FreeRunning`] implements this for Timer_A in continuous
//! mode; anything else that behaves the same way (a simulation, another timer) can drive
//! [`crate::period::PeriodMeter`] and [`crate::delay::CounterDelay`].

/// Number of ticks between two overflows of a 16-bit counter
pub const COUNTER_SPAN: u32 = 0x1_0000;

/// A 16-bit free-running counter with a sticky overflow flag
pub trait FreeRunningCounter {
    /// Current counter value
    fn count(&mut self) -> u16;

    /// Whether the counter has wrapped since the flag was last cleared
    fn overflowed(&mut self) -> bool;

    /// Clear the overflow flag. Does not touch the count.
    fn clear_overflow(&mut self);

    /// Counter increments per second
    fn tick_rate(&self) -> u32;

    /// If the overflow flag is set, clear it and return `true`
    #[inline]
    fn take_overflow(&mut self) -> bool {
        if self.overflowed() {
            self.clear_overflow();
            true
        } else {
            false
        }
    }
}

impl<C: FreeRunningCounter + ?Sized> FreeRunningCounter for &mut C {
    #[inline]
    fn count(&mut self) -> u16 {
        (**self).count()
    }

    #[inline]
    fn overflowed(&mut self) -> bool {
        (**self).overflowed()
    }

    #[inline]
    fn clear_overflow(&mut self) {
        (**self).clear_overflow()
    }

    #[inline]
    fn tick_rate(&self) -> u32 {
        (**self).tick_rate()
    }
}
