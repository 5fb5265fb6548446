#![no_main]
#![no_std]

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::StatefulOutputPin;
use g2553_hal::{
    clock::BcsExt,
    delay::CounterDelay,
    gpio::GpioExt,
    timer::{TimerConfig, TimerExt},
    watchdog::Wdt,
};
use msp430_rt::entry;

#[cfg(debug_assertions)]
use panic_msp430 as _;

#[cfg(not(debug_assertions))]
use panic_never as _;

// Red LED on P1.0 toggles every 500 ms, running from the 1 MHz reset clock
#[entry]
fn main() -> ! {
    let Some(periph) = msp430g2553::Peripherals::take() else {
        loop {}
    };
    let _wdt = Wdt::constrain(periph.WATCHDOG_TIMER);

    let clocks = periph.SYSTEM_CLOCK.constrain().dco_default();
    let ports = periph.PORT_1_2.split();
    let mut led = ports.p1.pin0.into_output();

    let parts = periph
        .TIMER0_A3
        .to_free_running(TimerConfig::smclk(&clocks.smclk));
    let mut delay = CounterDelay::new(parts.counter);

    loop {
        led.toggle().ok();
        delay.delay_ms(500);
    }
}

// The compiler will emit calls to the abort() compiler intrinsic if debug assertions are
// enabled (default for dev profile). MSP430 does not actually have meaningful abort() support
// so for now, we create our own in each application where debug assertions are present.
#[no_mangle]
extern "C" fn abort() -> ! {
    panic!();
}
