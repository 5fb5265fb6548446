//! Timer_A abstraction
//!
//! A Timer_A peripheral is put in continuous mode and split into [`TimerParts`]:
//!
//! - [`FreeRunning`], the 16-bit counter and its overflow flag, which implements
//!   [`FreeRunningCounter`] for period measurement and delays.
//! - [`PeriodicCompare`], capture-compare register 0 used as a fixed-rate alarm. Every service
//!   re-arms CCR0 one interval further before handing control to a [`TickHandler`], so the
//!   handler always runs with the next event already scheduled.
//!
//! Both parts read the same counter register. Neither resets it, so they can be used together.

use crate::clock::{Clock, Smclk};
use crate::counter::FreeRunningCounter;
use crate::hw_traits::timera::{CapCmp, Mc, Tassel, TimerA};
use crate::hw_traits::Steal;
use core::convert::Infallible;

pub use crate::hw_traits::timera::{TimerDiv, CCR0, CCR1, CCR2};

/// Configures the clock of a Timer_A peripheral
#[derive(Clone, Copy)]
pub struct TimerConfig {
    sel: Tassel,
    div: TimerDiv,
    freq: u32,
}

impl TimerConfig {
    /// Configure timer clock source to SMCLK
    pub fn smclk(smclk: &Smclk) -> Self {
        TimerConfig {
            sel: Tassel::Smclk,
            div: TimerDiv::_1,
            freq: smclk.freq(),
        }
    }

    /// Configure timer clock source to ACLK running at `freq` hertz
    pub fn aclk(freq: u32) -> Self {
        TimerConfig {
            sel: Tassel::Aclk,
            div: TimerDiv::_1,
            freq,
        }
    }

    /// Configure timer clock source to the external TACLK pin running at `freq` hertz
    pub fn taclk(freq: u32) -> Self {
        TimerConfig {
            sel: Tassel::Taclk,
            div: TimerDiv::_1,
            freq,
        }
    }

    /// Configure timer clock source to INCLK running at `freq` hertz
    pub fn inclk(freq: u32) -> Self {
        TimerConfig {
            sel: Tassel::Inclk,
            div: TimerDiv::_1,
            freq,
        }
    }

    /// Configure the clock divider
    pub fn clk_div(self, div: TimerDiv) -> Self {
        TimerConfig { div, ..self }
    }

    /// Counter increments per second under this configuration
    pub fn tick_rate(&self) -> u32 {
        self.freq / self.div.divisor()
    }

    fn write_regs<T: TimerA>(&self, timer: &T, mc: Mc) {
        log_trace!(
            "timer: tassel={} div={} tick_rate={}",
            self.sel as u8,
            self.div.divisor(),
            self.tick_rate()
        );
        timer.config(self.sel, self.div, mc);
    }
}

/// Handler invoked on every periodic compare event
pub trait TickHandler {
    /// Called once per event, after the next event has been scheduled
    fn on_tick(&mut self);
}

impl<H: TickHandler + ?Sized> TickHandler for &mut H {
    #[inline]
    fn on_tick(&mut self) {
        (**self).on_tick()
    }
}

/// Free-running counter of a timer in continuous mode
pub struct FreeRunning<T> {
    timer: T,
    tick_rate: u32,
}

impl<T: TimerA> FreeRunningCounter for FreeRunning<T> {
    // The counter is clocked synchronously to MCLK when sourced from SMCLK, so a single read of
    // TAR is consistent.
    #[inline]
    fn count(&mut self) -> u16 {
        self.timer.tar_rd()
    }

    #[inline]
    fn overflowed(&mut self) -> bool {
        self.timer.taifg_rd()
    }

    #[inline]
    fn clear_overflow(&mut self) {
        self.timer.taifg_clr()
    }

    #[inline]
    fn tick_rate(&self) -> u32 {
        self.tick_rate
    }
}

/// CCR0 used as a fixed-rate compare alarm on top of the free-running counter
pub struct PeriodicCompare<T> {
    timer: T,
    tick_rate: u32,
    interval: u16,
}

impl<T: TimerA + CapCmp<CCR0>> PeriodicCompare<T> {
    /// Schedule the first event `interval` ticks from now and enable the CCR0 interrupt
    pub fn start(&mut self, interval: u16) {
        self.interval = interval;
        let now = self.timer.tar_rd();
        CapCmp::<CCR0>::set_ccrn(&self.timer, now.wrapping_add(interval));
        CapCmp::<CCR0>::ccifg_clr(&self.timer);
        CapCmp::<CCR0>::ccie_set(&self.timer);
    }

    /// Start with the interval that yields `rate_hz` events per second. Rates too slow to fit a
    /// 16-bit interval are clamped to the longest interval.
    pub fn start_rate(&mut self, rate_hz: u32) {
        let interval = (self.tick_rate / rate_hz.max(1)).clamp(1, u16::MAX as u32) as u16;
        self.start(interval);
    }

    /// Disable the CCR0 interrupt. The counter keeps running.
    pub fn stop(&mut self) {
        CapCmp::<CCR0>::ccie_clr(&self.timer);
    }

    /// Ticks between events
    pub fn interval(&self) -> u16 {
        self.interval
    }

    /// Move the compare point one interval forward. Adding to the previous compare value rather
    /// than to the current count keeps the event rate exact regardless of service latency.
    #[inline]
    pub fn rearm(&mut self) {
        let next = CapCmp::<CCR0>::get_ccrn(&self.timer).wrapping_add(self.interval);
        CapCmp::<CCR0>::set_ccrn(&self.timer, next);
    }

    /// Service one compare event: re-arm, then run the handler. Call from the CCR0 interrupt,
    /// which clears its own flag on entry.
    #[inline]
    pub fn service<H: TickHandler>(&mut self, handler: &mut H) {
        self.rearm();
        handler.on_tick();
    }

    /// Polling alternative to the interrupt: if an event is pending, clear it and re-arm.
    pub fn wait(&mut self) -> nb::Result<(), Infallible> {
        if CapCmp::<CCR0>::ccifg_rd(&self.timer) {
            CapCmp::<CCR0>::ccifg_clr(&self.timer);
            self.rearm();
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

/// A timer split into its free-running counter and its CCR0 alarm
pub struct TimerParts<T> {
    /// Free-running counter
    pub counter: FreeRunning<T>,
    /// Periodic compare alarm on CCR0
    pub ccr0: PeriodicCompare<T>,
}

/// Extension trait for creating free-running timers
pub trait TimerExt: Sized {
    /// Configure the timer in continuous mode and split it into its parts
    fn to_free_running(self, config: TimerConfig) -> TimerParts<Self>;
}

impl<T: TimerA + CapCmp<CCR0> + Steal> TimerExt for T {
    fn to_free_running(self, config: TimerConfig) -> TimerParts<Self> {
        config.write_regs(&self, Mc::Continuous);
        let tick_rate = config.tick_rate();
        TimerParts {
            counter: FreeRunning {
                timer: self,
                tick_rate,
            },
            ccr0: PeriodicCompare {
                // Only touches CCR0 and reads TAR, disjoint from the counter's TAIFG handling
                timer: unsafe { T::steal() },
                tick_rate,
                interval: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::BcsExt;
    use crate::hw_traits::bcs::BasicClock;
    use std::cell::{Cell, RefCell};
    use std::vec::Vec;

    #[derive(Default)]
    struct Regs {
        ctl: Cell<Option<(Tassel, TimerDiv, Mc)>>,
        tar: Cell<u16>,
        taifg: Cell<bool>,
        ccr0: Cell<u16>,
        ccifg: Cell<bool>,
        ccie: Cell<bool>,
        log: RefCell<Vec<&'static str>>,
    }

    thread_local! {
        static REGS: Regs = Regs::default();
    }

    fn reset() {
        REGS.with(|r| {
            r.ctl.set(None);
            r.tar.set(0);
            r.taifg.set(false);
            r.ccr0.set(0);
            r.ccifg.set(false);
            r.ccie.set(false);
            r.log.borrow_mut().clear();
        });
    }

    struct FakeTimer;

    impl Steal for FakeTimer {
        unsafe fn steal() -> Self {
            FakeTimer
        }
    }

    impl TimerA for FakeTimer {
        fn config(&self, tassel: Tassel, div: TimerDiv, mc: Mc) {
            REGS.with(|r| r.ctl.set(Some((tassel, div, mc))));
        }

        fn mc_rd(&self) -> Mc {
            REGS.with(|r| r.ctl.get().map(|c| c.2).unwrap_or(Mc::Stop))
        }

        fn tar_rd(&self) -> u16 {
            REGS.with(|r| r.tar.get())
        }

        fn taifg_rd(&self) -> bool {
            REGS.with(|r| r.taifg.get())
        }

        fn taifg_clr(&self) {
            REGS.with(|r| r.taifg.set(false));
        }

        fn taie_set(&self) {}
        fn taie_clr(&self) {}
    }

    impl CapCmp<CCR0> for FakeTimer {
        fn set_ccrn(&self, count: u16) {
            REGS.with(|r| {
                r.ccr0.set(count);
                r.log.borrow_mut().push("set_ccr0");
            });
        }

        fn get_ccrn(&self) -> u16 {
            REGS.with(|r| r.ccr0.get())
        }

        fn ccifg_rd(&self) -> bool {
            REGS.with(|r| r.ccifg.get())
        }

        fn ccifg_clr(&self) {
            REGS.with(|r| r.ccifg.set(false));
        }

        fn ccie_set(&self) {
            REGS.with(|r| r.ccie.set(true));
        }

        fn ccie_clr(&self) {
            REGS.with(|r| r.ccie.set(false));
        }
    }

    struct Cal16;

    impl BasicClock for Cal16 {
        fn calbc1_16mhz_rd(&self) -> u8 {
            0x8F
        }
        fn caldco_16mhz_rd(&self) -> u8 {
            0x95
        }
        fn bcsctl1_wr(&self, _bits: u8) {}
        fn dcoctl_wr(&self, _bits: u8) {}
    }

    fn smclk() -> Smclk {
        reset();
        Cal16.constrain().dco_calibrated_16mhz().smclk
    }

    struct Recorder;

    impl TickHandler for Recorder {
        fn on_tick(&mut self) {
            REGS.with(|r| r.log.borrow_mut().push("tick"));
        }
    }

    #[test]
    fn continuous_mode_from_smclk() {
        let parts = FakeTimer.to_free_running(TimerConfig::smclk(&smclk()).clk_div(TimerDiv::_8));
        assert_eq!(
            REGS.with(|r| r.ctl.get()),
            Some((Tassel::Smclk, TimerDiv::_8, Mc::Continuous))
        );
        assert_eq!(parts.counter.tick_rate(), 2_000_000);
    }

    #[test]
    fn counter_reads_tar_and_taifg() {
        let mut parts = FakeTimer.to_free_running(TimerConfig::smclk(&smclk()));
        REGS.with(|r| {
            r.tar.set(1234);
            r.taifg.set(true);
        });
        assert_eq!(parts.counter.count(), 1234);
        assert!(parts.counter.take_overflow());
        assert!(!parts.counter.overflowed());
    }

    #[test]
    fn start_rate_arms_relative_to_now() {
        let mut parts = FakeTimer.to_free_running(TimerConfig::smclk(&smclk()));
        REGS.with(|r| r.tar.set(65_500));
        parts.ccr0.start_rate(100_000);
        assert_eq!(parts.ccr0.interval(), 160);
        assert_eq!(REGS.with(|r| r.ccr0.get()), 65_500u16.wrapping_add(160));
        assert!(REGS.with(|r| r.ccie.get()));
        parts.ccr0.stop();
        assert!(!REGS.with(|r| r.ccie.get()));
    }

    #[test]
    fn service_rearms_before_handler() {
        let mut parts = FakeTimer.to_free_running(TimerConfig::smclk(&smclk()));
        parts.ccr0.start(160);
        let first = REGS.with(|r| r.ccr0.get());
        REGS.with(|r| r.log.borrow_mut().clear());

        parts.ccr0.service(&mut Recorder);
        assert_eq!(REGS.with(|r| r.log.borrow().clone()), ["set_ccr0", "tick"]);
        assert_eq!(REGS.with(|r| r.ccr0.get()), first.wrapping_add(160));
    }

    #[test]
    fn wait_polls_ccifg() {
        let mut parts = FakeTimer.to_free_running(TimerConfig::smclk(&smclk()));
        parts.ccr0.start(1000);
        assert_eq!(parts.ccr0.wait(), Err(nb::Error::WouldBlock));
        REGS.with(|r| r.ccifg.set(true));
        assert_eq!(parts.ccr0.wait(), Ok(()));
        assert!(!REGS.with(|r| r.ccifg.get()));
        assert_eq!(REGS.with(|r| r.ccr0.get()), 2000);
    }
}
