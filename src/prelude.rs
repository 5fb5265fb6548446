//! Prelude

pub use crate::clock::BcsExt as _g2553_hal_BcsExt;
pub use crate::clock::Clock as _g2553_hal_Clock;
pub use crate::counter::FreeRunningCounter as _g2553_hal_FreeRunningCounter;
pub use crate::gpio::GpioExt as _g2553_hal_GpioExt;
pub use crate::gpio::PinNum as _g2553_hal_PinNum;
pub use crate::timer::TickHandler as _g2553_hal_TickHandler;
pub use crate::timer::TimerExt as _g2553_hal_TimerExt;
