//! Minimal TX-only USART driver for the debug stream.

use crate::{
    hw::mcu,
    mutex::{LazyMainInit, MainCtx},
};

#[allow(non_snake_case)]
pub struct UartPeriph {
    pub USART: mcu::USART,
}

// SAFETY: Is initialized when constructing the MainCtx.
pub static UART_PERIPH: LazyMainInit<UartPeriph> = unsafe { LazyMainInit::uninit() };

#[allow(unused_unsafe)]
pub fn uart_init(m: &MainCtx<'_>) {
    let usart = &UART_PERIPH.deref(m).USART;

    // 9600 Bd at 8 MHz. Frame format is the reset default (8N1).
    // SAFETY: Plain data register.
    unsafe {
        usart.ubrrl().write(|w| w.bits(51));
    }
    usart.ucsrb().write(|w| w.txen().set_bit());
}

/// Try to send one byte. Returns false if the transmitter is busy;
/// the caller retries on a later loop iteration.
#[allow(unused_unsafe)]
pub fn uart_tx(m: &MainCtx<'_>, data: u8) -> bool {
    let usart = &UART_PERIPH.deref(m).USART;

    if usart.ucsra().read().udre().bit_is_clear() {
        return false;
    }
    // SAFETY: Plain data register.
    unsafe {
        usart.udr().write(|w| w.bits(data));
    }
    true
}

// vim: ts=4 sw=4 expandtab
