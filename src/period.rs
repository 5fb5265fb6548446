//! Period measurement on a free-running counter
//!
//! [`PeriodMeter`] times `n` full cycles of a digital signal by busy-polling an input pin and
//! reading a [`FreeRunningCounter`]. Elapsed time longer than one counter wrap is accounted for by
//! counting overflow flags while waiting for edges.
//!
//! A measurement runs in three phases:
//!
//! 1. Synchronize: wait for the pin to read low, then high. This lands on a rising transition.
//!    Each wait gives up after more than [`SYNC_OVERFLOW_LIMIT`] overflows, which catches a pin
//!    stuck at either level.
//! 2. Snapshot the counter and wait for low-then-high `n` times, giving up after more than
//!    [`MEASURE_OVERFLOW_LIMIT`] overflows across the whole span.
//! 3. Snapshot the counter again and combine both snapshots with the overflow count.
//!
//! Both snapshots are taken coherently with the overflow flag: the flag is checked right after
//! the counter is read and, if it was raised, the wrap is accounted for and the counter re-read.
//! This makes the overflow count exact at both ends, so the final correction (one wrap fewer when
//! the end snapshot is numerically below the start snapshot) holds for every phase of the wrap.
//!
//! With a 16 MHz tick rate the routine resolves signals between roughly 30 Hz and 300 kHz. Slower
//! signals trip the overflow limits and faster ones are missed between polls. Both are accepted
//! limitations of a polling design and both end in [`Error::NoSignal`] rather than a hang.

use crate::counter::{FreeRunningCounter, COUNTER_SPAN};
use core::num::NonZeroU16;
use embedded_hal::digital::InputPin;

/// Overflows tolerated while synchronizing to the signal before it is declared absent
pub const SYNC_OVERFLOW_LIMIT: u16 = 5;

/// Overflows tolerated across the measured periods before the signal is declared stalled
pub const MEASURE_OVERFLOW_LIMIT: u16 = 1024;

/// Abort bounds for the edge waits. Counts strictly above a limit abort the measurement, and so
/// does a count that no longer fits in `u16`, so even `u16::MAX` keeps the waits finite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OverflowLimits {
    /// Bound for each synchronization wait
    pub sync: u16,
    /// Bound for the whole measured span
    pub measure: u16,
}

impl Default for OverflowLimits {
    fn default() -> Self {
        OverflowLimits {
            sync: SYNC_OVERFLOW_LIMIT,
            measure: MEASURE_OVERFLOW_LIMIT,
        }
    }
}

/// The wait that was in progress when a measurement gave up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Synchronization, waiting for the pin to go low
    SyncLow,
    /// Synchronization, waiting for the pin to go high
    SyncHigh,
    /// Measured span, waiting for the pin to go low
    MeasureLow,
    /// Measured span, waiting for the pin to go high
    MeasureHigh,
}

/// Period measurement errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The signal is absent, stuck at one level, or outside the measurable band
    NoSignal(Stage),
    /// Reading the input pin failed
    Pin(E),
}

/// Result of a successful measurement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    ticks: u32,
    periods: NonZeroU16,
    tick_rate: u32,
}

impl Measurement {
    /// A measurement of `ticks` counter ticks spanning `periods` signal periods
    pub const fn new(ticks: u32, periods: NonZeroU16, tick_rate: u32) -> Self {
        Measurement {
            ticks,
            periods,
            tick_rate,
        }
    }

    /// Counter ticks elapsed across all measured periods
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Number of full signal periods the measurement spans
    #[inline]
    pub fn periods(&self) -> NonZeroU16 {
        self.periods
    }

    /// Tick rate of the counter the measurement was taken with
    #[inline]
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Average length of one period, in ticks
    #[inline]
    pub fn period_ticks(&self) -> u32 {
        self.ticks / self.periods.get() as u32
    }

    /// Signal frequency in whole hertz, `tick_rate * periods / ticks`
    pub fn frequency_hz(&self) -> u32 {
        let num = self.tick_rate as u64 * self.periods.get() as u64;
        num.checked_div(self.ticks as u64).unwrap_or(0) as u32
    }

    /// Signal frequency in millihertz
    pub fn frequency_millihz(&self) -> u64 {
        let num = self.tick_rate as u64 * self.periods.get() as u64 * 1000;
        num.checked_div(self.ticks as u64).unwrap_or(0)
    }
}

/// Ticks between two counter snapshots, given the number of wraps observed in between.
///
/// When `end < start` the modular difference `end - start` already absorbs one wrap, so one
/// overflow is dropped from the total.
#[inline]
pub fn elapsed_ticks(start: u16, end: u16, overflows: u16) -> u32 {
    let overflows = if end < start {
        overflows.saturating_sub(1)
    } else {
        overflows
    };
    overflows as u32 * COUNTER_SPAN + end.wrapping_sub(start) as u32
}

/// Measures signal periods on a digital input against a free-running counter
pub struct PeriodMeter<C, P> {
    counter: C,
    pin: P,
    limits: OverflowLimits,
}

impl<C: FreeRunningCounter, P: InputPin> PeriodMeter<C, P> {
    /// Create a period meter with the default overflow limits. The counter must already be
    /// running and the pin configured as an input.
    pub fn new(counter: C, pin: P) -> Self {
        Self::with_limits(counter, pin, OverflowLimits::default())
    }

    /// Create a period meter with custom overflow limits
    pub fn with_limits(counter: C, pin: P, limits: OverflowLimits) -> Self {
        PeriodMeter {
            counter,
            pin,
            limits,
        }
    }

    /// Overflow limits in use
    pub fn limits(&self) -> OverflowLimits {
        self.limits
    }

    /// Measure `periods` full cycles of the input signal, returning the elapsed tick count or
    /// 0 if no valid reading could be established.
    pub fn measure(&mut self, periods: NonZeroU16) -> u32 {
        self.try_measure(periods).map(|m| m.ticks()).unwrap_or(0)
    }

    /// Measure `periods` full cycles of the input signal.
    ///
    /// Blocks while polling. Returns within a bounded number of counter wraps whether or not the
    /// signal is present.
    pub fn try_measure(&mut self, periods: NonZeroU16) -> Result<Measurement, Error<P::Error>> {
        let sync = self.limits.sync;

        let mut overflows = 0;
        self.counter.clear_overflow();
        self.wait_level(false, &mut overflows, sync, Stage::SyncLow)?;

        let mut overflows = 0;
        self.counter.clear_overflow();
        self.wait_level(true, &mut overflows, sync, Stage::SyncHigh)?;

        let mut overflows = 0;
        self.counter.clear_overflow();
        let start = self.start_snapshot();

        let limit = self.limits.measure;
        for _ in 0..periods.get() {
            self.wait_level(false, &mut overflows, limit, Stage::MeasureLow)?;
            self.wait_level(true, &mut overflows, limit, Stage::MeasureHigh)?;
        }

        let end = self.end_snapshot(&mut overflows)?;
        let ticks = elapsed_ticks(start, end, overflows);
        log_trace!(
            "period: start={} end={} overflows={} ticks={}",
            start,
            end,
            overflows,
            ticks
        );

        Ok(Measurement {
            ticks,
            periods,
            tick_rate: self.counter.tick_rate(),
        })
    }

    /// Release the counter and pin
    pub fn free(self) -> (C, P) {
        (self.counter, self.pin)
    }

    // Busy-wait until the pin reads `high`, counting overflows into `overflows`.
    fn wait_level(
        &mut self,
        high: bool,
        overflows: &mut u16,
        limit: u16,
        stage: Stage,
    ) -> Result<(), Error<P::Error>> {
        while self.pin.is_high().map_err(Error::Pin)? != high {
            if self.counter.take_overflow() {
                // A count past u16::MAX is over any limit
                match overflows.checked_add(1) {
                    Some(n) if n <= limit => *overflows = n,
                    _ => {
                        log_debug!(
                            "period: no signal, {:?} exceeded {} overflows",
                            stage,
                            limit
                        );
                        return Err(Error::NoSignal(stage));
                    }
                }
            }
        }
        Ok(())
    }

    // Counter value consistent with a freshly cleared overflow flag.
    fn start_snapshot(&mut self) -> u16 {
        let count = self.counter.count();
        if self.counter.take_overflow() {
            // Wrapped around the read. The re-read is after the wrap and the flag is clear again.
            self.counter.count()
        } else {
            count
        }
    }

    // Counter value with every wrap before it included in `overflows`.
    fn end_snapshot(&mut self, overflows: &mut u16) -> Result<u16, Error<P::Error>> {
        let count = self.counter.count();
        if !self.counter.take_overflow() {
            return Ok(count);
        }
        *overflows = overflows
            .checked_add(1)
            .ok_or(Error::NoSignal(Stage::MeasureHigh))?;
        Ok(self.counter.count())
    }
}
