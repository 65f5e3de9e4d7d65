//! Pin setup and the output driving primitives.
//!
//! Pin map:
//!
//! - PB0, PB1:        intake relays 0 and 3
//! - PB2..PB5:        exhaust relays 4..7
//! - PB6, PB7:        heater stages low and mid (SSRs)
//! - PC0..PC3:        general purpose inputs
//! - PC4, PC5:        TWI bus
//! - PD0..PD4:        general purpose SSRs
//! - PD5:             heater stage high (SSR)
//! - PD6, PD7:        intake relays 2 and 1
//!
//! Relay coils are driven active low; their idle level is high.

#![allow(unused_unsafe)]

use crate::{mutex::MainCtx, system::SysPeriph};
use hpctl_core::{heater::HeaterStages, regfile::SSR_OUT_MASK, relay};

fn pin_input(_bit: usize) -> u8 {
    0
}
fn pin_output(bit: usize) -> u8 {
    1 << bit
}
fn pin_low(_bit: usize) -> u8 {
    0
}
fn pin_high(bit: usize) -> u8 {
    1 << bit
}
fn pin_pullup(bit: usize) -> u8 {
    1 << bit
}

pub fn ports_init(_m: &MainCtx<'_>, sp: &SysPeriph) {
    // SAFETY: Called with interrupts disabled during init.
    unsafe {
        sp.PORTB.portb().write(|w| {
            w.bits(
                pin_high(0) | // intake relay 0, idle
                pin_high(1) | // intake relay 3, idle
                pin_high(2) | // exhaust relay 4, idle
                pin_high(3) | // exhaust relay 5, idle
                pin_high(4) | // exhaust relay 6, idle
                pin_high(5) | // exhaust relay 7, idle
                pin_low(6) | // heater stage low, off
                pin_low(7), // heater stage mid, off
            )
        });
        sp.PORTB.ddrb().write(|w| {
            w.bits(
                pin_output(0)
                    | pin_output(1)
                    | pin_output(2)
                    | pin_output(3)
                    | pin_output(4)
                    | pin_output(5)
                    | pin_output(6)
                    | pin_output(7),
            )
        });

        // Inputs with pull ups. The bus lines have external pull ups;
        // the internal ones only ease debugging without them.
        sp.PORTC.portc().write(|w| {
            w.bits(
                pin_pullup(0) | // input 0
                pin_pullup(1) | // input 1
                pin_pullup(2) | // input 2
                pin_pullup(3) | // input 3
                pin_pullup(4) | // SDA
                pin_pullup(5), // SCL
            )
        });
        sp.PORTC.ddrc().write(|w| {
            w.bits(
                pin_input(0)
                    | pin_input(1)
                    | pin_input(2)
                    | pin_input(3)
                    | pin_input(4)
                    | pin_input(5),
            )
        });

        sp.PORTD.portd().write(|w| {
            w.bits(
                pin_low(0) | // SSR 0, off
                pin_low(1) | // SSR 1, off (TXD with the debug feature)
                pin_low(2) | // SSR 2, off
                pin_low(3) | // SSR 3, off
                pin_low(4) | // SSR 4, off
                pin_low(5) | // heater stage high, off
                pin_high(6) | // intake relay 2, idle
                pin_high(7), // intake relay 1, idle
            )
        });
        sp.PORTD.ddrd().write(|w| {
            w.bits(
                pin_output(0)
                    | pin_output(1)
                    | pin_output(2)
                    | pin_output(3)
                    | pin_output(4)
                    | pin_output(5)
                    | pin_output(6)
                    | pin_output(7),
            )
        });
    }
}

/// Sample the four general purpose input lines.
pub fn sample_inputs(sp: &SysPeriph) -> u8 {
    sp.PORTC.pinc().read().bits() & 0x0F
}

/// Drive the three heater stage SSRs.
pub fn drive_heater(sp: &SysPeriph, stages: HeaterStages) {
    sp.PORTB.portb().modify(|_, w| {
        w.pb6().bit(stages.low).pb7().bit(stages.mid)
    });
    sp.PORTD.portd().modify(|_, w| w.pd5().bit(stages.high));
}

// Port bits belonging to the relay groups.
const INTAKE_MASK_B: u8 = 0b0000_0011; // PB0 relay 0, PB1 relay 3
const INTAKE_MASK_D: u8 = 0b1100_0000; // PD7 relay 1, PD6 relay 2
const EXHAUST_MASK_B: u8 = 0b0011_1100; // PB2..PB5 relays 4..7

/// Pin images for an energized-relay set of the intake tree.
/// Starts from all-idle (high) and pulls the energized coils low.
fn intake_pins(active: u8) -> (u8, u8) {
    let mut b = INTAKE_MASK_B;
    let mut d = INTAKE_MASK_D;
    if active & relay::RELAY_0 != 0 {
        b &= !(1 << 0);
    }
    if active & relay::RELAY_3 != 0 {
        b &= !(1 << 1);
    }
    if active & relay::RELAY_1 != 0 {
        d &= !(1 << 7);
    }
    if active & relay::RELAY_2 != 0 {
        d &= !(1 << 6);
    }
    (b, d)
}

fn exhaust_pins(active: u8) -> u8 {
    let mut b = EXHAUST_MASK_B;
    if active & relay::RELAY_4 != 0 {
        b &= !(1 << 2);
    }
    if active & relay::RELAY_5 != 0 {
        b &= !(1 << 3);
    }
    if active & relay::RELAY_6 != 0 {
        b &= !(1 << 4);
    }
    if active & relay::RELAY_7 != 0 {
        b &= !(1 << 5);
    }
    b
}

/// Drive the intake relay group.
///
/// One write per port so the whole group switches without transient
/// intermediate states, and without touching bits outside the group.
pub fn drive_intake(sp: &SysPeriph, active: u8) {
    let (b, d) = intake_pins(active);
    sp.PORTB.portb().modify(|r, w| {
        // SAFETY: Only intake relay pins are changed.
        unsafe { w.bits((r.bits() & !INTAKE_MASK_B) | b) }
    });
    sp.PORTD.portd().modify(|r, w| {
        // SAFETY: Only intake relay pins are changed.
        unsafe { w.bits((r.bits() & !INTAKE_MASK_D) | d) }
    });
}

/// Drive the exhaust relay group. Same single-write rule as intake.
pub fn drive_exhaust(sp: &SysPeriph, active: u8) {
    let b = exhaust_pins(active);
    sp.PORTB.portb().modify(|r, w| {
        // SAFETY: Only exhaust relay pins are changed.
        unsafe { w.bits((r.bits() & !EXHAUST_MASK_B) | b) }
    });
}

/// Drive the general purpose SSRs from the register 3 output image.
pub fn drive_ssrs(sp: &SysPeriph, bits: u8) {
    let value = bits & SSR_OUT_MASK;
    sp.PORTD.portd().modify(|r, w| {
        // SAFETY: Only SSR pins are changed.
        unsafe { w.bits((r.bits() & !SSR_OUT_MASK) | value) }
    });
}

// vim: ts=4 sw=4 expandtab
