//! Two-wire bus slave engine.
//!
//! An explicit state machine that maps bus controller events onto
//! register file accesses. The hardware ISR translates the controller
//! status codes into [BusEvent]s and applies the returned [BusReply]
//! to the control register.
//!
//! Supported transaction shapes:
//! - Pure write: one address byte selecting a register, then data bytes
//!   written sequentially with auto-increment and write policy.
//! - Pure read: up to [NUM_REGS] bytes starting at register 0.
//! - Write-then-read: one address byte, then a read phase starting at
//!   that address after a repeated start.
//!
//! All error conditions are absorbed locally by re-arming; retries are
//! the bus master's business.

use crate::regfile::{NUM_REGS, RegisterFile};

/// Transmitted for every byte requested past the last register.
pub const READ_OVERRUN: u8 = 0xFE;

/// A bus controller event, as seen by the slave.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BusEvent {
    /// Own slave address plus write bit received and acknowledged.
    WriteAddressed,
    /// A data byte was received and acknowledged.
    ByteReceived(u8),
    /// Own slave address plus read bit received and acknowledged.
    ReadAddressed,
    /// The master acknowledged the previous byte and wants another.
    ByteRequested,
    /// Stop or repeated start while addressed.
    StopOrRestart,
    /// NACK, end of read or any unexpected controller status.
    ProtocolError,
}

/// What the hardware layer must do in response to an event.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BusReply {
    /// Acknowledge and wait for the next event.
    Ack,
    /// Load the byte for transmission, then expect an ACK.
    TransmitAck(u8),
    /// Load the final byte for transmission, then expect a NACK.
    TransmitNack(u8),
    /// Re-arm as not-addressed slave.
    ErrorReset,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum State {
    /// Not addressed. A cursor left over from a previous write phase
    /// survives here so that a write-then-read can pick it up.
    Unaddressed,
    /// Addressed for write, no register selected yet.
    AddressPhase,
    /// Register selected, data bytes are being written.
    WritePhase,
    /// Addressed for read, bytes are being transmitted.
    ReadPhase,
}

/// The slave protocol engine.
///
/// Plain data; the firmware keeps the shared instance inside a mutex
/// and drives it to completion for one event at a time.
#[derive(Copy, Clone)]
pub struct SlaveEngine {
    state: State,
    /// Currently selected register. `None` is the "no address set yet"
    /// sentinel. May legally point past the end of the register file
    /// after write auto-increment.
    cursor: Option<u8>,
}

impl SlaveEngine {
    pub const fn new() -> Self {
        Self {
            state: State::Unaddressed,
            cursor: None,
        }
    }

    /// Feed one bus event through the state machine.
    pub fn process(&mut self, regs: &mut RegisterFile, event: BusEvent) -> BusReply {
        match event {
            BusEvent::WriteAddressed => {
                self.cursor = None;
                self.state = State::AddressPhase;
                BusReply::Ack
            }
            BusEvent::ByteReceived(data) => self.receive(regs, data),
            BusEvent::ReadAddressed => {
                // A pure read without a preceding address byte starts
                // at register 0. A cursor past the end stays put and
                // yields the overrun byte below.
                if self.cursor.is_none() {
                    self.cursor = Some(0);
                }
                self.state = State::ReadPhase;
                self.transmit(regs)
            }
            BusEvent::ByteRequested => {
                if self.state == State::ReadPhase {
                    self.transmit(regs)
                } else {
                    self.reset()
                }
            }
            BusEvent::StopOrRestart => {
                // Keep the cursor: a repeated-start read continues at
                // the address the write phase left behind.
                self.state = State::Unaddressed;
                BusReply::Ack
            }
            BusEvent::ProtocolError => self.reset(),
        }
    }

    fn receive(&mut self, regs: &mut RegisterFile, data: u8) -> BusReply {
        match self.state {
            State::AddressPhase => {
                // The first byte selects the register. An out of range
                // value is acknowledged (the bus needs the ACK to keep
                // the transfer alive) but selects nothing; the next
                // byte is treated as a fresh address attempt.
                if (data as usize) < NUM_REGS {
                    self.cursor = Some(data);
                    self.state = State::WritePhase;
                }
                BusReply::Ack
            }
            State::WritePhase => {
                if let Some(cursor) = self.cursor {
                    regs.bus_write(cursor, data);
                    self.cursor = Some(cursor.saturating_add(1));
                }
                BusReply::Ack
            }
            State::Unaddressed | State::ReadPhase => self.reset(),
        }
    }

    fn transmit(&mut self, regs: &RegisterFile) -> BusReply {
        match self.cursor {
            Some(cursor) if (cursor as usize) < NUM_REGS => {
                let data = regs.read(cursor);
                if cursor as usize == NUM_REGS - 1 {
                    // Last register: announce end of transfer. The
                    // following controller event re-arms the engine.
                    BusReply::TransmitNack(data)
                } else {
                    self.cursor = Some(cursor + 1);
                    BusReply::TransmitAck(data)
                }
            }
            // Read past the end: report per byte, keep acknowledging.
            _ => BusReply::TransmitAck(READ_OVERRUN),
        }
    }

    fn reset(&mut self) -> BusReply {
        self.state = State::Unaddressed;
        self.cursor = None;
        BusReply::ErrorReset
    }
}

impl Default for SlaveEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::regfile::{REG_CHECKSUM, REG_HEATER_LEVEL, REG_INTAKE_MODE};
    use std::vec::Vec;

    fn write_txn(engine: &mut SlaveEngine, regs: &mut RegisterFile, bytes: &[u8]) {
        assert_eq!(
            engine.process(regs, BusEvent::WriteAddressed),
            BusReply::Ack
        );
        for b in bytes {
            assert_eq!(engine.process(regs, BusEvent::ByteReceived(*b)), BusReply::Ack);
        }
        assert_eq!(engine.process(regs, BusEvent::StopOrRestart), BusReply::Ack);
    }

    fn read_txn(engine: &mut SlaveEngine, regs: &mut RegisterFile, n: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for i in 0..n {
            let ev = if i == 0 {
                BusEvent::ReadAddressed
            } else {
                BusEvent::ByteRequested
            };
            match engine.process(regs, ev) {
                BusReply::TransmitAck(b) | BusReply::TransmitNack(b) => out.push(b),
                reply => panic!("unexpected reply {reply:?}"),
            }
        }
        // The master NACKs the final byte.
        assert_eq!(
            engine.process(regs, BusEvent::ProtocolError),
            BusReply::ErrorReset
        );
        out
    }

    #[test]
    fn test_single_byte_write() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        write_txn(&mut engine, &mut regs, &[REG_HEATER_LEVEL, 25]);
        assert_eq!(regs.heater_level(), 25);
    }

    #[test]
    fn test_auto_increment_roundtrip() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        write_txn(&mut engine, &mut regs, &[0, 5, 2]);
        assert_eq!(regs.heater_level(), 5);
        assert_eq!(regs.intake_mode(), 2);

        // Read back from address 0 via write-then-read.
        assert_eq!(
            engine.process(&mut regs, BusEvent::WriteAddressed),
            BusReply::Ack
        );
        assert_eq!(engine.process(&mut regs, BusEvent::ByteReceived(0)), BusReply::Ack);
        assert_eq!(engine.process(&mut regs, BusEvent::StopOrRestart), BusReply::Ack);
        let data = read_txn(&mut engine, &mut regs, 6);
        assert_eq!(data[0], 5);
        assert_eq!(data[1], 2);
    }

    #[test]
    fn test_cursor_survives_stop() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        write_txn(&mut engine, &mut regs, &[2, 3]);
        // The write left the cursor at register 3: a read without a
        // new address phase continues right there.
        assert_eq!(
            engine.process(&mut regs, BusEvent::ReadAddressed),
            BusReply::TransmitAck(regs.read(3))
        );
    }

    #[test]
    fn test_write_past_end_is_dropped() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        regs.update_checksum();
        let checksum = regs.read(REG_CHECKSUM);
        // Start at the exhaust mode register and write through the
        // core owned registers and beyond.
        write_txn(&mut engine, &mut regs, &[2, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);
        assert_eq!(regs.exhaust_mode(), 0xAA);
        assert_eq!(regs.read(REG_CHECKSUM), checksum);
    }

    #[test]
    fn test_invalid_address_byte_then_retry() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        // First byte is no valid register index: acknowledged, nothing
        // selected. The following byte acts as a new address byte.
        write_txn(&mut engine, &mut regs, &[6, REG_INTAKE_MODE, 4]);
        assert_eq!(regs.intake_mode(), 4);
        assert_eq!(regs.heater_level(), 0);
    }

    #[test]
    fn test_pure_read_starts_at_zero() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        write_txn(&mut engine, &mut regs, &[0, 7]);
        // The previous transaction left the cursor at 1, but the
        // engine was re-armed via the error path, so a fresh pure
        // read starts at register 0 again.
        assert_eq!(
            engine.process(&mut regs, BusEvent::ProtocolError),
            BusReply::ErrorReset
        );
        let data = read_txn(&mut engine, &mut regs, 6);
        assert_eq!(data[0], 7);
    }

    #[test]
    fn test_write_then_read() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        regs.update_checksum();
        write_txn(&mut engine, &mut regs, &[0, 9]);

        // Addressed read: address byte, repeated start, read phase.
        assert_eq!(
            engine.process(&mut regs, BusEvent::WriteAddressed),
            BusReply::Ack
        );
        assert_eq!(
            engine.process(&mut regs, BusEvent::ByteReceived(REG_CHECKSUM)),
            BusReply::Ack
        );
        assert_eq!(engine.process(&mut regs, BusEvent::StopOrRestart), BusReply::Ack);
        assert_eq!(
            engine.process(&mut regs, BusEvent::ReadAddressed),
            BusReply::TransmitAck(regs.read(REG_CHECKSUM))
        );
        // Register 5 is the last one: end of transfer is announced.
        match engine.process(&mut regs, BusEvent::ByteRequested) {
            BusReply::TransmitNack(_) => (),
            reply => panic!("unexpected reply {reply:?}"),
        }
    }

    #[test]
    fn test_last_register_signals_end() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        let data = read_txn(&mut engine, &mut regs, 6);
        assert_eq!(data.len(), 6);
        // Verify the final byte really came with the NACK reply.
        let mut engine = SlaveEngine::new();
        for i in 0..6 {
            let ev = if i == 0 {
                BusEvent::ReadAddressed
            } else {
                BusEvent::ByteRequested
            };
            let reply = engine.process(&mut regs, ev);
            if i == 5 {
                assert!(matches!(reply, BusReply::TransmitNack(_)));
            } else {
                assert!(matches!(reply, BusReply::TransmitAck(_)));
            }
        }
    }

    #[test]
    fn test_read_overrun_byte() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        // Write one byte at the last register: the cursor increments
        // past the end.
        write_txn(&mut engine, &mut regs, &[5, 0]);
        // The subsequent addressed read is out of bounds and reports
        // the overrun byte for every requested byte.
        assert_eq!(
            engine.process(&mut regs, BusEvent::ReadAddressed),
            BusReply::TransmitAck(READ_OVERRUN)
        );
        assert_eq!(
            engine.process(&mut regs, BusEvent::ByteRequested),
            BusReply::TransmitAck(READ_OVERRUN)
        );
    }

    #[test]
    fn test_error_resets_cursor() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        write_txn(&mut engine, &mut regs, &[5, 0]);
        assert_eq!(
            engine.process(&mut regs, BusEvent::ProtocolError),
            BusReply::ErrorReset
        );
        // Cursor is back at the sentinel: a pure read starts at 0.
        assert!(matches!(
            engine.process(&mut regs, BusEvent::ReadAddressed),
            BusReply::TransmitAck(_)
        ));
    }

    #[test]
    fn test_unexpected_byte_request_resets() {
        let mut engine = SlaveEngine::new();
        let mut regs = RegisterFile::new();
        assert_eq!(
            engine.process(&mut regs, BusEvent::ByteRequested),
            BusReply::ErrorReset
        );
        assert_eq!(
            engine.process(&mut regs, BusEvent::ByteReceived(1)),
            BusReply::ErrorReset
        );
    }
}

// vim: ts=4 sw=4 expandtab
