//! The 1 Hz duty-cycle tick.

use crate::{
    hw::{Mutex, interrupt},
    mutex::{IrqCtx, LazyMainInit, MainCtx},
};
use core::cell::Cell;
use hpctl_core::heater::PERIOD_TICKS;

#[allow(non_snake_case)]
pub struct TimerPeriph {
    pub TC1: crate::hw::mcu::TC1,
}

// SAFETY: Is initialized when constructing the MainCtx.
pub static TIMER_PERIPH: LazyMainInit<TimerPeriph> = unsafe { LazyMainInit::uninit() };

/// Free running tick counter, wrapped to the duty-cycle period.
static TICK: Mutex<Cell<u8>> = Mutex::new(Cell::new(0));

#[allow(unused_unsafe)]
#[rustfmt::skip]
pub fn timer_init(m: &MainCtx<'_>) {
    let tc1 = &TIMER_PERIPH.deref(m).TC1;

    // Timer 1 configuration:
    // CTC mode, prescaler 256: 8 MHz / 256 / 31250 = 1 Hz.
    tc1.tccr1a().write(|w| w);
    // SAFETY: Plain data registers, any value is valid hardware wise.
    unsafe {
        tc1.tcnt1().write(|w| w.bits(0));
        tc1.ocr1a().write(|w| w.bits(31249));
    }
    tc1.tccr1b().write(|w| {
        w.cs1().prescale_256()
         .wgm1().set(1)
    });
    tc1.timsk().modify(|_, w| w.ocie1a().set_bit());
}

/// Get the current tick, 0..[PERIOD_TICKS].
pub fn tick_get(_m: &MainCtx<'_>) -> u8 {
    interrupt::free(|cs| TICK.borrow(cs).get())
}

pub fn irq_handler_timer1_compa(c: &IrqCtx) {
    let cs = c.cs();
    let tick = TICK.borrow(cs).get();
    TICK.borrow(cs).set((tick + 1) % PERIOD_TICKS);
}

// vim: ts=4 sw=4 expandtab
