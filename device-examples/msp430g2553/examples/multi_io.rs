#![no_main]
#![no_std]
#![feature(abi_msp430_interrupt)]

use core::cell::RefCell;
use core::num::NonZeroU16;
use critical_section::{with, Mutex};
use embedded_hal::delay::DelayNs;
use g2553_hal::{
    adc::{count_to_mv, AdcConfig},
    chase::Chase,
    clock::BcsExt,
    console::Console,
    delay::CounterDelay,
    gpio::{GpioExt, Output, Pin, Pin5, Pin6, P1, P2},
    period::PeriodMeter,
    pwm::{Channel, ServoPwm, Sweep, DEFAULT_DUTY, ISR_RATE_HZ},
    serial::{SerialConfig, DEFAULT_BAUD},
    timer::{PeriodicCompare, TimerConfig, TimerExt},
    watchdog::Wdt,
};
use msp430_rt::entry;
use msp430g2553::{interrupt, TIMER0_A3};

#[cfg(debug_assertions)]
use panic_msp430 as _;

#[cfg(not(debug_assertions))]
use panic_never as _;

type Servos = ServoPwm<Pin<P2, Pin5, Output>, Pin<P1, Pin6, Output>>;

static SERVOS: Mutex<RefCell<Option<(PeriodicCompare<TIMER0_A3>, Servos)>>> =
    Mutex::new(RefCell::new(None));

const PERIODS: NonZeroU16 = match NonZeroU16::new(100) {
    Some(n) => n,
    None => loop {},
};

// Measures A0 and A3 (pins 2 and 5), the period on P1.7 (pin 15), lights P2.0 to P2.4
// (pins 8 to 12) in turn and sweeps two servo signals on P2.5 and P1.6 (pins 13 and 14).
// Results are printed over the UART at 115200 baud.
#[entry]
fn main() -> ! {
    let Some(periph) = msp430g2553::Peripherals::take() else {
        loop {}
    };
    let _wdt = Wdt::constrain(periph.WATCHDOG_TIMER);

    let clocks = periph.SYSTEM_CLOCK.constrain().dco_calibrated_16mhz();
    let ports = periph.PORT_1_2.split();
    let (p1, p2) = (ports.p1, ports.p2);

    let a0 = p1.pin0.into_analog();
    let a3 = p1.pin3.into_analog();
    let mut period_input = p1.pin7.into_pullup_input();
    let _leds = (
        p2.pin0.into_output(),
        p2.pin1.into_output(),
        p2.pin2.into_output(),
        p2.pin3.into_output(),
        p2.pin4.into_output(),
    );
    let mut leds_out = p2.out;
    let servos = ServoPwm::new(p2.pin5.into_output(), p1.pin6.into_output());

    let tx = SerialConfig::new(periph.USCI_A0_UART_MODE, DEFAULT_BAUD)
        .use_smclk(&clocks.smclk)
        .tx_only(p1.pin2.into_alternate_secondary());
    let mut console = Console::new(tx);

    let mut adc = AdcConfig::new().configure(periph.ADC10);

    // One timer serves the period meter, the delays and the servo interrupt
    let timer = periph
        .TIMER0_A3
        .to_free_running(TimerConfig::smclk(&clocks.smclk));
    let mut counter = timer.counter;
    let mut alarm = timer.ccr0;
    alarm.start_rate(ISR_RATE_HZ);
    with(|cs| *SERVOS.borrow_ref_mut(cs) = Some((alarm, servos)));
    unsafe { msp430::interrupt::enable() };

    CounterDelay::new(&mut counter).delay_ms(500);
    console.clear_screen().ok();
    console
        .write_text(
            "\nMSP430G2553 multi I/O example.\n\
             Measures the voltage at channels A0 and A3 (pins 2 and 5 of DIP20 package)\n\
             Measures period on P1.7 (pin 15 of DIP20 package)\n\
             Toggles P2.0, P2.1, P2.2, P2.3, P2.4 (pins 8, 9, 10, 11, 12 of DIP20 package)\n\
             Generate servo PWMs on P2.5, P1.6 (pins 13, 14 of DIP20 package)\n\n",
        )
        .ok();

    let mut chase = Chase::<5>::new();
    let mut sweep_a = Sweep::falling(DEFAULT_DUTY);
    let mut sweep_b = Sweep::rising(DEFAULT_DUTY);

    loop {
        let count = adc.read_pin(&a0);
        console.write_adc(0, count, count_to_mv(count, adc.vref_mv())).ok();
        let count = adc.read_pin(&a3);
        console.write_adc(3, count, count_to_mv(count, adc.vref_mv())).ok();

        match PeriodMeter::new(&mut counter, &mut period_input).try_measure(PERIODS) {
            Ok(measurement) => console.write_frequency(&measurement).ok(),
            Err(_) => console.write_no_signal().ok(),
        };

        leds_out.write_masked(Chase::<5>::all(), chase.next_mask());

        let (duty_a, duty_b) = (sweep_a.next(), sweep_b.next());
        with(|cs| {
            if let Some((_, servos)) = SERVOS.borrow_ref_mut(cs).as_mut() {
                servos.set_duty(Channel::A, duty_a.unwrap_or(DEFAULT_DUTY));
                servos.set_duty(Channel::B, duty_b.unwrap_or(DEFAULT_DUTY));
            }
        });

        CounterDelay::new(&mut counter).delay_ms(200);
    }
}

#[interrupt]
fn TIMER0_A0() {
    with(|cs| {
        if let Some((alarm, servos)) = SERVOS.borrow_ref_mut(cs).as_mut() {
            alarm.service(servos);
        }
    });
}

// The compiler will emit calls to the abort() compiler intrinsic if debug assertions are
// enabled (default for dev profile). MSP430 does not actually have meaningful abort() support
// so for now, we create our own in each application where debug assertions are present.
#[no_mangle]
extern "C" fn abort() -> ! {
    panic!();
}
