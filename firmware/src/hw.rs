pub use atmega8::{self as mcu, Peripherals};
pub use avr_device::atmega8;
pub use avr_device::interrupt::{self, Mutex};

use crate::mutex::IrqCtx;

macro_rules! define_isr {
    ($name:ident, $handler:path) => {
        #[avr_device::interrupt(atmega8)]
        fn $name() {
            // SAFETY: We are inside of an interrupt handler.
            // Therefore, it is safe to construct an `IrqCtx`.
            let c = unsafe { IrqCtx::new() };
            $handler(&c);
        }
    };
}

define_isr!(TWI, crate::twi::irq_handler_twi);
define_isr!(TIMER1_COMPA, crate::timer::irq_handler_timer1_compa);

// vim: ts=4 sw=4 expandtab
