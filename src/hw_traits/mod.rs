pub mod adc10;
pub mod bcs;
pub mod gpio;
pub mod timera;
pub mod usci;
pub mod wdt;

/// Conjure a handle to a peripheral that a HAL object already owns a share of
pub trait Steal {
    /// # Safety
    /// The caller must only touch the registers its HAL object is responsible for.
    unsafe fn steal() -> Self;
}

#[cfg(feature = "msp430g2553")]
macro_rules! steal_impl {
    ($($P:ident),*) => {
        $(
            impl Steal for crate::pac::$P {
                #[inline(always)]
                unsafe fn steal() -> Self {
                    crate::pac::Peripherals::steal().$P
                }
            }
        )*
    };
}

#[cfg(feature = "msp430g2553")]
steal_impl!(TIMER0_A3, TIMER1_A3, USCI_A0_UART_MODE);
