//! TWI slave hardware glue.
//!
//! The protocol logic lives in `hpctl_core::bus`; this module owns the
//! TWI peripheral, translates the hardware status codes into bus events
//! and applies the engine's replies to the control register. It also
//! holds the shared register file and hands the control loop critical
//! section scoped access to it.

use crate::{
    hw::{Mutex, interrupt, mcu},
    mutex::{AnyCtx, IrqCtx, LazyMainInit, MainCtx},
};
use core::cell::Cell;
use hpctl_core::{
    bus::{BusEvent, BusReply, SlaveEngine},
    regfile::RegisterFile,
};

/// Our fixed 7 bit slave address.
pub const TWI_ADDR: u8 = 0x3F;

#[allow(non_snake_case)]
pub struct TwiPeriph {
    pub TWI: mcu::TWI,
}

// SAFETY: Is initialized when constructing the MainCtx.
pub static TWI_PERIPH: LazyMainInit<TwiPeriph> = unsafe { LazyMainInit::uninit() };

/// The register file shared with the bus master.
static REGFILE: Mutex<Cell<RegisterFile>> = Mutex::new(Cell::new(RegisterFile::new()));

/// The slave protocol engine. Only ever touched by the TWI ISR.
static ENGINE: Mutex<Cell<SlaveEngine>> = Mutex::new(Cell::new(SlaveEngine::new()));

// TWI status codes (TWSR with the prescaler bits masked out).
const TW_SR_SLA_ACK: u8 = 0x60;
const TW_SR_DATA_ACK: u8 = 0x80;
const TW_SR_STOP: u8 = 0xA0;
const TW_ST_SLA_ACK: u8 = 0xA8;
const TW_ST_DATA_ACK: u8 = 0xB8;

#[allow(unused_unsafe)]
pub fn twi_init(m: &MainCtx<'_>) {
    let twi = &TWI_PERIPH.deref(m).TWI;

    // SAFETY: Any address value is valid hardware wise.
    unsafe {
        // 7 bit address, shifted up; general call disabled.
        twi.twar().write(|w| w.bits(TWI_ADDR << 1));
    }
    // Enable the interface in slave mode with interrupts.
    twi.twcr().write(|w| {
        w.twea().set_bit()
            .twen().set_bit()
            .twie().set_bit()
    });
}

/// Run a closure on the shared register file with interrupts masked.
///
/// This is the critical section that keeps multi-step read-modify-write
/// sequences of the control loop from interleaving with bus writes.
pub fn with_regfile<F, R>(f: F) -> R
where
    F: FnOnce(&mut RegisterFile) -> R,
{
    interrupt::free(|cs| {
        let cell = REGFILE.borrow(cs);
        let mut regs = cell.get();
        let ret = f(&mut regs);
        cell.set(regs);
        ret
    })
}

/// ACK after received data / expect ACK after transmitted data.
#[rustfmt::skip]
fn twcr_ack(twi: &mcu::TWI) {
    twi.twcr().write(|w| {
        w.twint().set_bit()
         .twea().set_bit()
         .twen().set_bit()
         .twie().set_bit()
    });
}

/// Expect NACK after the transmitted data byte: end of transfer.
#[rustfmt::skip]
fn twcr_nack(twi: &mcu::TWI) {
    twi.twcr().write(|w| {
        w.twint().set_bit()
         .twen().set_bit()
         .twie().set_bit()
    });
}

/// Switch back to the not-addressed slave mode.
#[rustfmt::skip]
fn twcr_reset(twi: &mcu::TWI) {
    twi.twcr().write(|w| {
        w.twint().set_bit()
         .twea().set_bit()
         .twsto().set_bit()
         .twen().set_bit()
         .twie().set_bit()
    });
}

#[allow(unused_unsafe)]
fn apply_reply(twi: &mcu::TWI, reply: BusReply) {
    match reply {
        BusReply::Ack => twcr_ack(twi),
        BusReply::TransmitAck(data) => {
            // SAFETY: Plain data register.
            unsafe { twi.twdr().write(|w| w.bits(data)) };
            twcr_ack(twi);
        }
        BusReply::TransmitNack(data) => {
            // SAFETY: Plain data register.
            unsafe { twi.twdr().write(|w| w.bits(data)) };
            twcr_nack(twi);
        }
        BusReply::ErrorReset => twcr_reset(twi),
    }
}

pub fn irq_handler_twi(c: &IrqCtx) {
    let cs = c.cs();

    // SAFETY: The TWI peripheral is only accessed from this ISR after
    //         init. Therefore, it is safe to pretend to be the main
    //         context for dereferencing the peripheral handle.
    let m = unsafe { AnyCtx::new().to_main_ctx() };
    let twi = &TWI_PERIPH.deref(&m).TWI;

    let status = twi.twsr().read().bits() & 0xF8;
    let event = match status {
        TW_SR_SLA_ACK => BusEvent::WriteAddressed,
        TW_SR_DATA_ACK => BusEvent::ByteReceived(twi.twdr().read().bits()),
        TW_SR_STOP => BusEvent::StopOrRestart,
        TW_ST_SLA_ACK => BusEvent::ReadAddressed,
        TW_ST_DATA_ACK => BusEvent::ByteRequested,
        // NACKs, end of read, bus errors: re-arm.
        _ => BusEvent::ProtocolError,
    };

    let mut engine = ENGINE.borrow(cs).get();
    let mut regs = REGFILE.borrow(cs).get();
    let reply = engine.process(&mut regs, event);
    REGFILE.borrow(cs).set(regs);
    ENGINE.borrow(cs).set(engine);

    apply_reply(twi, reply);
}

// vim: ts=4 sw=4 expandtab
