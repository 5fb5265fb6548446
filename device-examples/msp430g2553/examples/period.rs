#![no_main]
#![no_std]

use core::num::NonZeroU16;
use embedded_hal::delay::DelayNs;
use g2553_hal::{
    clock::BcsExt,
    console::Console,
    delay::CounterDelay,
    gpio::GpioExt,
    period::PeriodMeter,
    serial::{SerialConfig, DEFAULT_BAUD},
    timer::{TimerConfig, TimerExt},
    watchdog::Wdt,
};
use msp430_rt::entry;

#[cfg(debug_assertions)]
use panic_msp430 as _;

#[cfg(not(debug_assertions))]
use panic_never as _;

const PERIODS: NonZeroU16 = match NonZeroU16::new(100) {
    Some(n) => n,
    None => loop {},
};

// Period measurement on P2.2 (pin 10) using the free-running counter of TIMER0_A3.
// Prints the frequency and the raw tick count of 100 periods over the UART at 115200 baud.
#[entry]
fn main() -> ! {
    let Some(periph) = msp430g2553::Peripherals::take() else {
        loop {}
    };
    let _wdt = Wdt::constrain(periph.WATCHDOG_TIMER);

    let clocks = periph.SYSTEM_CLOCK.constrain().dco_calibrated_16mhz();
    let ports = periph.PORT_1_2.split();

    let mut counter = periph
        .TIMER0_A3
        .to_free_running(TimerConfig::smclk(&clocks.smclk))
        .counter;

    let mut input = ports.p2.pin2.into_pullup_input();

    let tx = SerialConfig::new(periph.USCI_A0_UART_MODE, DEFAULT_BAUD)
        .use_smclk(&clocks.smclk)
        .tx_only(ports.p1.pin2.into_alternate_secondary());
    let mut console = Console::new(tx);

    // Give the terminal time to start
    CounterDelay::new(&mut counter).delay_ms(500);
    console
        .write_text(
            "Period measurement using the free running counter of timer TA0.\n\
             Connect signal to P2.2 (pin 10).\n",
        )
        .ok();

    loop {
        match PeriodMeter::new(&mut counter, &mut input).try_measure(PERIODS) {
            Ok(measurement) => console.write_frequency(&measurement).ok(),
            Err(_) => console.write_no_signal().ok(),
        };
        CounterDelay::new(&mut counter).delay_ms(200);
    }
}

// The compiler will emit calls to the abort() compiler intrinsic if debug assertions are
// enabled (default for dev profile). MSP430 does not actually have meaningful abort() support
// so for now, we create our own in each application where debug assertions are present.
#[no_mangle]
extern "C" fn abort() -> ! {
    panic!();
}
