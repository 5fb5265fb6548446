//! Serial UART
//!
//! USCI_A0 in UART mode, 8N1, on P1.1 (RXD) and P1.2 (TXD).
//!
//! Begin configuration by calling [`SerialConfig::new()`] and selecting a clock source. After
//! configuration, [`Rx`] and/or [`Tx`] structs are produced by providing the corresponding GPIO
//! pins in their secondary function.
//!
//! [`Tx`] and [`Rx`] implement both [`embedded-io`](embedded_io)'s buffer-based blocking traits
//! and the single-byte non-blocking [`embedded-hal-nb`](embedded_hal_nb::serial) traits. The
//! USCI has a single byte buffer, so [`embedded_io::Write::write`] and
//! [`embedded_io::Read::read`] move one byte per call; use `write_all` and `read_exact` for
//! longer transfers.

use crate::clock::{Clock, Smclk};
use crate::gpio::{Alternate, Pin, Pin1, Pin2, Secondary, P1};
use crate::hw_traits::usci::{Ucastat, Ucssel, UsciUart};
use crate::hw_traits::Steal;
use core::convert::Infallible;
use core::marker::PhantomData;
use core::num::NonZeroU32;

/// Bitrate used by the demonstration programs
pub const DEFAULT_BAUD: u32 = 115_200;

/// Marks a USCI that can be used as a serial UART
pub trait SerialUsci: UsciUart + Steal {
    /// Pin used for serial TX
    type TxPin;
    /// Pin used for serial RX
    type RxPin;
}

/// UCA0 TXD pin
pub struct UsciA0TxPin;
impl From<Pin<P1, Pin2, Alternate<Secondary>>> for UsciA0TxPin {
    #[inline(always)]
    fn from(_val: Pin<P1, Pin2, Alternate<Secondary>>) -> Self {
        UsciA0TxPin
    }
}

/// UCA0 RXD pin
pub struct UsciA0RxPin;
impl From<Pin<P1, Pin1, Alternate<Secondary>>> for UsciA0RxPin {
    #[inline(always)]
    fn from(_val: Pin<P1, Pin1, Alternate<Secondary>>) -> Self {
        UsciA0RxPin
    }
}

#[cfg(feature = "msp430g2553")]
impl SerialUsci for crate::pac::USCI_A0_UART_MODE {
    type TxPin = UsciA0TxPin;
    type RxPin = UsciA0RxPin;
}

/// Bitrate divider settings for low-frequency mode (UCOS16 = 0)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaudConfig {
    br: u16,
    brs: u8,
}

impl BaudConfig {
    /// Divider `clk_freq / bps` with the fractional part spread over eight bit times by the
    /// second-stage modulator (UCBRS, rounded)
    pub fn new(clk_freq: u32, bps: NonZeroU32) -> Self {
        let bps = bps.get();
        let mut br = clk_freq / bps;
        let mut brs = ((clk_freq % bps) as u64 * 8 + bps as u64 / 2) / bps as u64;
        if brs == 8 {
            br += 1;
            brs = 0;
        }
        BaudConfig {
            br: br.clamp(1, 0xFFFF) as u16,
            brs: brs as u8,
        }
    }

    /// UCBRx
    pub fn br(&self) -> u16 {
        self.br
    }

    /// UCBRSx
    pub fn brs(&self) -> u8 {
        self.brs
    }
}

/// Typestate for a serial interface with an unspecified clock source
pub struct NoClockSet {
    baudrate: NonZeroU32,
}

/// Typestate for a serial interface with a specified clock source
pub struct ClockSet {
    baud_config: BaudConfig,
    clksel: Ucssel,
}

/// Builder object for configuring a serial UART
///
/// Once the clock source has been selected, the builder can be converted into pins that can
/// transmit or receive bytes.
pub struct SerialConfig<USCI: SerialUsci, S> {
    usci: USCI,
    state: S,
}

impl<USCI: SerialUsci> SerialConfig<USCI, NoClockSet> {
    /// Create a new serial configuration. A bitrate of 0 is treated as 1.
    #[inline]
    pub fn new(usci: USCI, baudrate: u32) -> Self {
        SerialConfig {
            usci,
            state: NoClockSet {
                baudrate: NonZeroU32::new(baudrate).unwrap_or(NonZeroU32::MIN),
            },
        }
    }

    /// Clock the UART from an external UCA0CLK of `freq` hertz
    #[inline]
    pub fn use_uclk(self, freq: u32) -> SerialConfig<USCI, ClockSet> {
        self.with_clock(freq, Ucssel::Uclk)
    }

    /// Clock the UART from ACLK running at `freq` hertz
    #[inline]
    pub fn use_aclk(self, freq: u32) -> SerialConfig<USCI, ClockSet> {
        self.with_clock(freq, Ucssel::Aclk)
    }

    /// Clock the UART from SMCLK
    #[inline]
    pub fn use_smclk(self, smclk: &Smclk) -> SerialConfig<USCI, ClockSet> {
        self.with_clock(smclk.freq(), Ucssel::Smclk)
    }

    fn with_clock(self, freq: u32, clksel: Ucssel) -> SerialConfig<USCI, ClockSet> {
        SerialConfig {
            usci: self.usci,
            state: ClockSet {
                baud_config: BaudConfig::new(freq, self.state.baudrate),
                clksel,
            },
        }
    }
}

impl<USCI: SerialUsci> SerialConfig<USCI, ClockSet> {
    /// Divider settings that will be written
    pub fn baud_config(&self) -> BaudConfig {
        self.state.baud_config
    }

    #[inline]
    fn config_hw(self) {
        let ClockSet {
            baud_config,
            clksel,
        } = self.state;
        let usci = self.usci;

        usci.reset_with_clock(clksel);
        usci.br_wr(baud_config.br);
        usci.mctl_wr(baud_config.brs, 0, false);
        usci.release();
    }

    /// Perform hardware configuration and split into Tx and Rx from the appropriate GPIOs
    #[inline]
    pub fn split<T: Into<USCI::TxPin>, R: Into<USCI::RxPin>>(
        self,
        _tx: T,
        _rx: R,
    ) -> (Tx<USCI>, Rx<USCI>) {
        self.config_hw();
        (Tx(PhantomData), Rx(PhantomData))
    }

    /// Perform hardware configuration and create a transmitter only
    #[inline]
    pub fn tx_only<T: Into<USCI::TxPin>>(self, _tx: T) -> Tx<USCI> {
        self.config_hw();
        Tx(PhantomData)
    }

    /// Perform hardware configuration and create a receiver only
    #[inline]
    pub fn rx_only<R: Into<USCI::RxPin>>(self, _rx: R) -> Rx<USCI> {
        self.config_hw();
        Rx(PhantomData)
    }
}

/// Serial transmitter
pub struct Tx<USCI: SerialUsci>(PhantomData<USCI>);

impl<USCI: SerialUsci> Tx<USCI> {
    // TXIFG is set once the buffer has moved to the shift register
    #[inline]
    fn flush(&mut self) -> nb::Result<(), Infallible> {
        let usci = unsafe { USCI::steal() };
        if usci.txifg_rd() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    #[inline]
    fn send(&mut self, data: u8) -> nb::Result<(), Infallible> {
        let usci = unsafe { USCI::steal() };
        if usci.txifg_rd() {
            usci.tx_wr(data);
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

/// Serial receiver
pub struct Rx<USCI: SerialUsci>(PhantomData<USCI>);

impl<USCI: SerialUsci> Rx<USCI> {
    // Status has to be read before RXBUF, which clears the error flags
    fn recv(&mut self) -> nb::Result<u8, RecvError> {
        let usci = unsafe { USCI::steal() };

        if usci.rxifg_rd() {
            let stat = usci.stat_rd();
            let data = usci.rx_rd();

            if stat.contains(Ucastat::UCFE) {
                Err(nb::Error::Other(RecvError::Framing))
            } else if stat.contains(Ucastat::UCPE) {
                Err(nb::Error::Other(RecvError::Parity))
            } else if stat.contains(Ucastat::UCOE) {
                Err(nb::Error::Other(RecvError::Overrun(data)))
            } else {
                Ok(data)
            }
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

/// Serial receive errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecvError {
    /// Framing error
    Framing,
    /// Parity error
    Parity,
    /// Buffer overrun error. Contains the most recently read byte, which is still valid.
    Overrun(u8),
}

mod emb_io {
    use super::*;
    use embedded_io::{Error, ErrorKind, ErrorType, Read, ReadReady, Write, WriteReady};
    use nb::block;

    impl<USCI: SerialUsci> ErrorType for Rx<USCI> {
        type Error = RecvError;
    }

    impl Error for RecvError {
        fn kind(&self) -> ErrorKind {
            match self {
                RecvError::Framing | RecvError::Parity => ErrorKind::InvalidData,
                RecvError::Overrun(_) => ErrorKind::Other,
            }
        }
    }

    impl<USCI: SerialUsci> Read for Rx<USCI> {
        /// Block until one byte arrives and store it in `buf[0]`. An empty `buf` returns `Ok(0)`
        /// without blocking.
        #[inline]
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if buf.is_empty() {
                return Ok(0);
            }
            buf[0] = block!(self.recv())?;
            Ok(1)
        }
    }

    impl<USCI: SerialUsci> ReadReady for Rx<USCI> {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            let usci = unsafe { USCI::steal() };
            Ok(usci.rxifg_rd())
        }
    }

    impl<USCI: SerialUsci> ErrorType for Tx<USCI> {
        type Error = Infallible;
    }

    impl<USCI: SerialUsci> Write for Tx<USCI> {
        /// Returns once the TX buffer is empty. The last byte may still be shifting out.
        #[inline]
        fn flush(&mut self) -> Result<(), Self::Error> {
            block!(self.flush())
        }

        /// Sends only the first byte of `buf`, blocking until the buffer is free, and returns
        /// `Ok(1)`. An empty `buf` returns `Ok(0)` without blocking.
        #[inline]
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if buf.is_empty() {
                return Ok(0);
            }
            block!(self.send(buf[0]))?;
            Ok(1)
        }
    }

    impl<USCI: SerialUsci> WriteReady for Tx<USCI> {
        fn write_ready(&mut self) -> Result<bool, Self::Error> {
            let usci = unsafe { USCI::steal() };
            Ok(usci.txifg_rd())
        }
    }
}

mod ehal_nb1 {
    use super::*;
    use embedded_hal_nb::serial::{Error, ErrorKind, ErrorType, Read, Write};

    impl Error for RecvError {
        fn kind(&self) -> ErrorKind {
            match self {
                RecvError::Framing => ErrorKind::FrameFormat,
                RecvError::Parity => ErrorKind::Parity,
                RecvError::Overrun(_) => ErrorKind::Overrun,
            }
        }
    }

    impl<USCI: SerialUsci> ErrorType for Rx<USCI> {
        type Error = RecvError;
    }

    impl<USCI: SerialUsci> Read<u8> for Rx<USCI> {
        /// Read the received byte if RXIFG is set, otherwise `WouldBlock`
        #[inline]
        fn read(&mut self) -> nb::Result<u8, Self::Error> {
            self.recv()
        }
    }

    impl<USCI: SerialUsci> ErrorType for Tx<USCI> {
        type Error = Infallible;
    }

    impl<USCI: SerialUsci> Write<u8> for Tx<USCI> {
        #[inline]
        fn flush(&mut self) -> nb::Result<(), Self::Error> {
            self.flush()
        }

        /// Write a byte if TXIFG is set, otherwise `WouldBlock`
        #[inline]
        fn write(&mut self, data: u8) -> nb::Result<(), Self::Error> {
            self.send(data)
        }
    }
}
