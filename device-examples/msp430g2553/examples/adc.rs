#![no_main]
#![no_std]

use core::fmt::Write;
use embedded_hal::delay::DelayNs;
use g2553_hal::{
    adc::{count_to_mv, AdcConfig, Reference},
    clock::BcsExt,
    console::Console,
    delay::CounterDelay,
    gpio::GpioExt,
    serial::{SerialConfig, DEFAULT_BAUD},
    timer::{TimerConfig, TimerExt},
    watchdog::Wdt,
};
use msp430_rt::entry;

#[cfg(debug_assertions)]
use panic_msp430 as _;

#[cfg(not(debug_assertions))]
use panic_never as _;

// Measures the voltage at A3 (P1.3, pin 5 of the DIP20 package) against VCC and prints it over
// the LaunchPad UART at 115200 baud. Swap in `Reference::Internal1V5` or `Internal2V5` to use
// the internal references.
#[entry]
fn main() -> ! {
    let Some(periph) = msp430g2553::Peripherals::take() else {
        loop {}
    };
    let _wdt = Wdt::constrain(periph.WATCHDOG_TIMER);

    let clocks = periph.SYSTEM_CLOCK.constrain().dco_calibrated_16mhz();
    let p1 = periph.PORT_1_2.split().p1;

    let tx = SerialConfig::new(periph.USCI_A0_UART_MODE, DEFAULT_BAUD)
        .use_smclk(&clocks.smclk)
        .tx_only(p1.pin2.into_alternate_secondary());
    let mut console = Console::new(tx);

    let timer = periph
        .TIMER0_A3
        .to_free_running(TimerConfig::smclk(&clocks.smclk));
    let mut delay = CounterDelay::new(timer.counter);

    let a3 = p1.pin3.into_analog();
    let mut adc = AdcConfig::new()
        .reference(Reference::Vcc)
        .configure(periph.ADC10);

    console
        .write_text("\nADC test program.  Measuring the voltage at input A3 (pin 5 in DIP 20 package)\n")
        .ok();

    loop {
        let count = adc.read_pin(&a3);
        let mv = count_to_mv(count, adc.vref_mv());
        write!(console, "ADC: 0x{:03x}, ", count).ok();
        console.write_millivolts(mv).ok();
        console.write_text(" \r").ok();
        delay.delay_ms(200);
    }
}

// The compiler will emit calls to the abort() compiler intrinsic if debug assertions are
// enabled (default for dev profile). MSP430 does not actually have meaningful abort() support
// so for now, we create our own in each application where debug assertions are present.
#[no_mangle]
extern "C" fn abort() -> ! {
    panic!();
}
