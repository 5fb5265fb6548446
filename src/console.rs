//! Text console over a byte stream
//!
//! [`Console`] wraps any [`embedded_io::Write`] (normally [`crate::serial::Tx`]) and expands `\n`
//! into `\r\n` for terminal emulators. Numbers are formatted without `core::fmt` through
//! [`Console::write_number`], which keeps the report helpers small enough for a 16 KiB part.
//! [`core::fmt::Write`] is also implemented for the occasional `write!`.

use crate::period::Measurement;
use embedded_io::Write;

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Longest digit string [`Console::write_number`] produces (a `u32` in base 2)
pub const MAX_DIGITS: usize = 32;

/// Line written when no signal was found, padded to overwrite a previous frequency report
pub const NO_SIGNAL: &str = "NO SIGNAL                     \r";

/// Line-oriented text output
pub struct Console<W> {
    writer: W,
}

impl<W: Write> Console<W> {
    /// Wrap a byte sink
    pub fn new(writer: W) -> Self {
        Console { writer }
    }

    /// Release the byte sink
    pub fn free(self) -> W {
        self.writer
    }

    /// Write a single byte, preceding `\n` with `\r`
    pub fn write_byte(&mut self, byte: u8) -> Result<(), W::Error> {
        if byte == b'\n' {
            self.writer.write_all(b"\r")?;
        }
        self.writer.write_all(&[byte])
    }

    /// Write a string with newline expansion
    pub fn write_text(&mut self, text: &str) -> Result<(), W::Error> {
        // Copy runs without a newline in one call
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.writer.write_all(b"\r\n")?;
            }
            self.writer.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    /// Write `val` in `base` (2 to 16, upper case digits), zero padded to at least `digits`
    /// characters. Zero with no padding writes nothing.
    pub fn write_number(&mut self, mut val: u32, base: u32, digits: usize) -> Result<(), W::Error> {
        let base = base.clamp(2, 16);
        let mut digits = digits.min(MAX_DIGITS);
        let mut buf = [0u8; MAX_DIGITS];
        let mut start = MAX_DIGITS;
        while val > 0 || digits > 0 {
            start -= 1;
            buf[start] = DIGITS[(val % base) as usize];
            val /= base;
            digits = digits.saturating_sub(1);
        }
        self.writer.write_all(&buf[start..])
    }

    /// Write millivolts as volts with three decimals, `3.290V`
    pub fn write_millivolts(&mut self, mv: u32) -> Result<(), W::Error> {
        self.write_number(mv / 1000, 10, 1)?;
        self.writer.write_all(b".")?;
        self.write_number(mv % 1000, 10, 3)?;
        self.writer.write_all(b"V")
    }

    /// Report one ADC channel: `ADC[A3]=0x1FF, 1.644V `
    pub fn write_adc(&mut self, channel: u8, count: u16, mv: u32) -> Result<(), W::Error> {
        self.writer.write_all(b"ADC[A")?;
        self.write_number(channel as u32, 10, 1)?;
        self.writer.write_all(b"]=0x")?;
        self.write_number(count as u32, 16, 3)?;
        self.writer.write_all(b", ")?;
        self.write_millivolts(mv)?;
        self.writer.write_all(b" ")
    }

    /// Report a period measurement on the current line: `f=001000Hz, count=1600000\r`
    pub fn write_frequency(&mut self, measurement: &Measurement) -> Result<(), W::Error> {
        self.writer.write_all(b"f=")?;
        self.write_number(measurement.frequency_hz(), 10, 6)?;
        self.writer.write_all(b"Hz, count=")?;
        self.write_number(measurement.ticks(), 10, 6)?;
        self.writer.write_all(b"\r")
    }

    /// Report a failed measurement, overwriting the current line
    pub fn write_no_signal(&mut self) -> Result<(), W::Error> {
        self.writer.write_all(NO_SIGNAL.as_bytes())
    }

    /// Clear the terminal and home the cursor (ANSI)
    pub fn clear_screen(&mut self) -> Result<(), W::Error> {
        self.writer.write_all(b"\x1b[2J\x1b[1;1H")
    }

    /// Wait until everything written has left the sink
    pub fn flush(&mut self) -> Result<(), W::Error> {
        self.writer.flush()
    }
}

impl<W: Write> core::fmt::Write for Console<W> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.write_text(s).map_err(|_| core::fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use core::fmt::Write as _;
    use core::num::NonZeroU16;
    use embedded_io::ErrorType;
    use std::string::String;
    use std::vec::Vec;

    #[derive(Default)]
    struct Sink(Vec<u8>);

    impl ErrorType for Sink {
        type Error = Infallible;
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    fn output(f: impl FnOnce(&mut Console<Sink>) -> Result<(), Infallible>) -> String {
        let mut console = Console::new(Sink::default());
        f(&mut console).unwrap();
        String::from_utf8(console.free().0).unwrap()
    }

    #[test]
    fn newline_expansion() {
        assert_eq!(output(|c| c.write_text("a\nb\n")), "a\r\nb\r\n");
        assert_eq!(output(|c| c.write_byte(b'\n')), "\r\n");
        assert_eq!(output(|c| c.write_byte(b'x')), "x");
    }

    #[test]
    fn fmt_write_expands_too() {
        let mut console = Console::new(Sink::default());
        write!(console, "{}\n", 42).unwrap();
        assert_eq!(console.free().0, b"42\r\n");
    }

    #[test]
    fn number_padding() {
        assert_eq!(output(|c| c.write_number(0x3FF, 16, 3)), "3FF");
        assert_eq!(output(|c| c.write_number(0x1F, 16, 3)), "01F");
        assert_eq!(output(|c| c.write_number(1234567, 10, 6)), "1234567");
        assert_eq!(output(|c| c.write_number(5, 2, 0)), "101");
        assert_eq!(output(|c| c.write_number(0, 10, 1)), "0");
        assert_eq!(output(|c| c.write_number(0, 10, 0)), "");
        assert_eq!(output(|c| c.write_number(u32::MAX, 2, 40)).len(), MAX_DIGITS);
    }

    #[test]
    fn adc_line() {
        assert_eq!(
            output(|c| c.write_adc(3, 0x3FF, 3290)),
            "ADC[A3]=0x3FF, 3.290V "
        );
        assert_eq!(output(|c| c.write_adc(0, 0, 0)), "ADC[A0]=0x000, 0.000V ");
        assert_eq!(output(|c| c.write_millivolts(1005)), "1.005V");
    }

    #[test]
    fn frequency_line() {
        let m = Measurement::new(1_600_000, NonZeroU16::new(100).unwrap(), 16_000_000);
        assert_eq!(
            output(|c| c.write_frequency(&m)),
            "f=001000Hz, count=1600000\r"
        );
        assert_eq!(output(|c| c.write_no_signal()), NO_SIGNAL);
    }
}
