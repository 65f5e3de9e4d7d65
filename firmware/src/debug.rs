//! Debug value streaming over the USART.
//!
//! The control loop logs a handful of values per iteration; this
//! module round-robins them onto the wire as two byte frames:
//! a tag byte with bit 7 set, then the raw value. At most one byte
//! leaves per loop iteration, so the loop timing stays bounded.

use crate::{
    mutex::{MainCtx, MutexCell},
    uart::uart_tx,
};

#[derive(Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Debug {
    Tick,
    HeaterLevel,
    Stages,
    IntakeMode,
    ExhaustMode,
}
const NRVALUES: usize = 5;

static VALUES: [MutexCell<u8>; NRVALUES] = [
    MutexCell::new(0),
    MutexCell::new(0),
    MutexCell::new(0),
    MutexCell::new(0),
    MutexCell::new(0),
];

/// Transmit position: value index in the upper bits, frame phase in
/// bit 0 (0 = tag byte, 1 = value byte).
static INDEX: MutexCell<u8> = MutexCell::new(0);

impl Debug {
    pub fn log_u8(&self, m: &MainCtx<'_>, value: u8) {
        VALUES[*self as usize].set(m, value);
    }
}

/// Push the next pending byte out, if the transmitter is free.
pub fn run(m: &MainCtx<'_>) {
    let index = INDEX.get(m);
    let id = index >> 1;

    let data = if index & 1 == 0 {
        0x80 | id
    } else {
        VALUES[id as usize].get(m)
    };
    if uart_tx(m, data) {
        let next = if index as usize >= NRVALUES * 2 - 1 {
            0
        } else {
            index + 1
        };
        INDEX.set(m, next);
    }
}

// vim: ts=4 sw=4 expandtab
