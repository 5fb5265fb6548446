//! Busy-wait delays on a free-running counter
//!
//! Delays are measured by summing wrapping differences between successive counter reads, so the
//! counter must be polled at least once per wrap (4 ms at 16 MHz). The overflow flag is left
//! alone.

use crate::counter::FreeRunningCounter;
use embedded_hal::delay::DelayNs;

/// Delay provider driven by a [`FreeRunningCounter`]
pub struct CounterDelay<C> {
    counter: C,
}

impl<C: FreeRunningCounter> CounterDelay<C> {
    /// Create a delay provider. The counter keeps running between delays.
    pub fn new(counter: C) -> Self {
        CounterDelay { counter }
    }

    /// Counter ticks in one millisecond
    #[inline]
    pub fn ticks_per_ms(&self) -> u32 {
        self.counter.tick_rate() / 1000
    }

    /// Spin until at least `ticks` counter ticks have passed
    pub fn wait_ticks(&mut self, ticks: u32) {
        let mut last = self.counter.count();
        let mut elapsed = 0u32;
        while elapsed < ticks {
            let now = self.counter.count();
            elapsed = elapsed.saturating_add(now.wrapping_sub(last) as u32);
            last = now;
        }
    }

    /// Release the counter
    pub fn free(self) -> C {
        self.counter
    }

    fn ticks_for(&self, amount: u32, per_second: u64) -> u32 {
        let ticks = (amount as u64 * self.counter.tick_rate() as u64).div_ceil(per_second);
        ticks.min(u32::MAX as u64) as u32
    }
}

impl<C: FreeRunningCounter> DelayNs for CounterDelay<C> {
    fn delay_ns(&mut self, ns: u32) {
        let ticks = self.ticks_for(ns, 1_000_000_000);
        self.wait_ticks(ticks);
    }

    fn delay_us(&mut self, us: u32) {
        let ticks = self.ticks_for(us, 1_000_000);
        self.wait_ticks(ticks);
    }

    // One millisecond at a time so long delays never overflow the tick arithmetic
    fn delay_ms(&mut self, ms: u32) {
        let per_ms = self.ticks_per_ms();
        for _ in 0..ms {
            self.wait_ticks(per_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Advances a fixed number of ticks on every read
    struct Stepper {
        now: u64,
        step: u64,
        rate: u32,
        overflow_clears: u32,
    }

    impl Stepper {
        fn new(step: u64) -> Self {
            Stepper {
                now: 0,
                step,
                rate: 16_000_000,
                overflow_clears: 0,
            }
        }
    }

    impl FreeRunningCounter for Stepper {
        fn count(&mut self) -> u16 {
            self.now += self.step;
            self.now as u16
        }

        fn overflowed(&mut self) -> bool {
            true
        }

        fn clear_overflow(&mut self) {
            self.overflow_clears += 1;
        }

        fn tick_rate(&self) -> u32 {
            self.rate
        }
    }

    #[test]
    fn delay_ms_spans_wraps() {
        let mut delay = CounterDelay::new(Stepper::new(7));
        delay.delay_ms(10);
        let counter = delay.free();
        // 10 ms at 16 MHz is 160000 ticks, several counter wraps
        assert!(counter.now >= 160_000);
        assert!(counter.now < 160_000 + 10 * 2 * 7);
        assert_eq!(counter.overflow_clears, 0);
    }

    #[test]
    fn delay_zero_is_immediate() {
        let mut delay = CounterDelay::new(Stepper::new(1));
        delay.delay_ms(0);
        delay.delay_us(0);
        assert!(delay.free().now <= 2);
    }

    #[test]
    fn delay_us_rounds_up() {
        let mut delay = CounterDelay::new(Stepper::new(1));
        delay.delay_ns(1);
        // A single tick is 62.5 ns, so even 1 ns waits one tick
        assert!(delay.free().now >= 2);

        let mut delay = CounterDelay::new(Stepper::new(1));
        delay.delay_us(100);
        assert_eq!(delay.free().now, 1 + 1600);
    }

    #[test]
    fn ticks_per_ms_follows_rate() {
        let mut counter = Stepper::new(1);
        counter.rate = 1_000_000;
        assert_eq!(CounterDelay::new(counter).ticks_per_ms(), 1000);
    }
}
