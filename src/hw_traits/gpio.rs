#[cfg(feature = "msp430g2553")]
use crate::pac;

/// Register access for one 8-bit GPIO port. Ports 1 and 2 share the `PORT_1_2` register block
/// on this device, so ports are zero-sized tokens and the accessors are associated functions.
pub trait GpioPort {
    fn pxin_rd() -> u8;

    fn pxout_rd() -> u8;
    fn pxout_set(bits: u8);
    fn pxout_clear(bits: u8);
    fn pxout_toggle(bits: u8);

    fn pxdir_set(bits: u8);
    fn pxdir_clear(bits: u8);

    fn pxren_set(bits: u8);
    fn pxren_clear(bits: u8);

    fn pxsel_set(bits: u8);
    fn pxsel_clear(bits: u8);

    fn pxsel2_set(bits: u8);
    fn pxsel2_clear(bits: u8);
}

#[cfg(feature = "msp430g2553")]
macro_rules! reg_methods {
    ($reg:ident, $set:ident, $clear:ident) => {
        #[inline(always)]
        fn $set(bits: u8) {
            regs().$reg.modify(|r, w| unsafe { w.bits(r.bits() | bits) });
        }

        #[inline(always)]
        fn $clear(bits: u8) {
            regs().$reg.modify(|r, w| unsafe { w.bits(r.bits() & !bits) });
        }
    };
}

#[cfg(feature = "msp430g2553")]
#[inline(always)]
fn regs() -> &'static pac::port_1_2::RegisterBlock {
    // Pin ownership is tracked by the typestate tokens in `gpio`, and every access below is a
    // single read-modify-write of one port register.
    unsafe { &*pac::PORT_1_2::ptr() }
}

#[cfg(feature = "msp430g2553")]
macro_rules! gpio_impl {
    ($Px:ty => $pxin:ident, $pxout:ident, $pxdir:ident, $pxren:ident, $pxsel:ident, $pxsel2:ident) => {
        impl GpioPort for $Px {
            #[inline(always)]
            fn pxin_rd() -> u8 {
                regs().$pxin.read().bits()
            }

            #[inline(always)]
            fn pxout_rd() -> u8 {
                regs().$pxout.read().bits()
            }

            #[inline(always)]
            fn pxout_toggle(bits: u8) {
                regs().$pxout.modify(|r, w| unsafe { w.bits(r.bits() ^ bits) });
            }

            reg_methods!($pxout, pxout_set, pxout_clear);
            reg_methods!($pxdir, pxdir_set, pxdir_clear);
            reg_methods!($pxren, pxren_set, pxren_clear);
            reg_methods!($pxsel, pxsel_set, pxsel_clear);
            reg_methods!($pxsel2, pxsel2_set, pxsel2_clear);
        }
    };
}

#[cfg(feature = "msp430g2553")]
gpio_impl!(crate::gpio::P1 => p1in, p1out, p1dir, p1ren, p1sel, p1sel2);
#[cfg(feature = "msp430g2553")]
gpio_impl!(crate::gpio::P2 => p2in, p2out, p2dir, p2ren, p2sel, p2sel2);
