//! Target independent logic of the HPCtl heater/ventilation controller.
//!
//! This crate holds everything with real protocol or timing state:
//! the shared register file, the two-wire bus slave state machine, the
//! tiered heater duty-cycle algorithm and the relay mode tables.
//! The firmware crate wires these up to the actual MCU peripherals.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod bus;
pub mod heater;
pub mod regfile;
pub mod relay;

pub use bus::SlaveEngine;
pub use regfile::RegisterFile;

// vim: ts=4 sw=4 expandtab
