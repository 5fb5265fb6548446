//! Free-running timer period measurement and peripheral drivers for the MSP430G2553.
//! Here are the [`datasheet`] and [`User's guide`] for reference.
//!
//! The heart of the crate is [`period::PeriodMeter`], which times a number of full cycles of a
//! digital signal by polling an input pin against the 16-bit free-running counter of a Timer_A
//! peripheral, counting counter overflows as it goes. The remaining modules are the drivers the
//! demonstration programs need around it: GPIO, the basic clock system, the watchdog, ADC10,
//! the USCI_A0 UART, a console formatter and an interrupt-driven servo PWM controller.
//!
//! [`datasheet`]: https://www.ti.com/lit/ds/symlink/msp430g2553.pdf
//! [`User's guide`]: https://www.ti.com/lit/ug/slau144j/slau144j.pdf
//!
//! # Usage
//!
//! Requires `msp430-elf-gcc` installed and in $PATH to build for the device. Enable the
//! `msp430g2553` feature to get the register-level implementations; without it the portable
//! drivers still build (and are tested) on the host.
//!
//! # Examples
//!
//! The `device-examples/msp430g2553` package contains the demo programs built on these
//! abstractions: `blinky`, `adc`, `period` and `multi_io`.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

#[macro_use]
mod log;

pub mod adc;
pub mod chase;
pub mod clock;
pub mod console;
pub mod counter;
pub mod delay;
pub mod gpio;
pub mod period;
pub mod prelude;
pub mod pwm;
pub mod serial;
pub mod timer;
pub mod watchdog;

mod hw_traits;

#[cfg(feature = "msp430g2553")]
pub use msp430g2553 as pac;
