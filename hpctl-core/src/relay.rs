//! Relay mode tables for the intake and exhaust air paths.
//!
//! Eight relays form two multiplexer trees that tap the fan supply
//! voltages. A mode value selects one branch combination per tree:
//!
//! Intake (relays 0..=3): relay 0 connects the 100 V tap (and doubles
//! as the "fan running" interlock line towards the heater MCU), relay 3
//! switches between the 190 V and 230 V taps, relay 1 multiplexes the
//! two supplies and relay 2 demuxes onto the two fan windings.
//!
//! Exhaust (relays 4..=7): relays 4, 5 and 7 carry the 80 V, 120/150 V
//! and 230 V taps, relay 6 multiplexes between them.
//!
//! The functions return the set of *energized* relays. The coils are
//! driven active low; the inversion happens at the port driver.
//! Modes outside the documented domain deenergize the whole group.

pub const RELAY_0: u8 = 1 << 0;
pub const RELAY_1: u8 = 1 << 1;
pub const RELAY_2: u8 = 1 << 2;
pub const RELAY_3: u8 = 1 << 3;
pub const RELAY_4: u8 = 1 << 4;
pub const RELAY_5: u8 = 1 << 5;
pub const RELAY_6: u8 = 1 << 6;
pub const RELAY_7: u8 = 1 << 7;

/// All relays of the intake tree.
pub const INTAKE_RELAYS: u8 = RELAY_0 | RELAY_1 | RELAY_2 | RELAY_3;
/// All relays of the exhaust tree.
pub const EXHAUST_RELAYS: u8 = RELAY_4 | RELAY_5 | RELAY_6 | RELAY_7;

/// Intake modes 0 (off) ..= 6.
pub const NUM_INTAKE_MODES: u8 = 7;
/// Exhaust modes 0 (off) ..= 4.
pub const NUM_EXHAUST_MODES: u8 = 5;

/// Map an intake air mode to its energized relay set.
pub fn intake(mode: u8) -> u8 {
    match mode {
        1 => RELAY_0,
        2 => RELAY_0 | RELAY_3,
        3 => RELAY_0 | RELAY_1,
        4 => RELAY_0 | RELAY_1 | RELAY_2,
        5 => RELAY_0 | RELAY_1 | RELAY_3,
        6 => RELAY_0 | RELAY_1 | RELAY_2 | RELAY_3,
        _ => 0,
    }
}

/// Map an exhaust air mode to its energized relay set.
pub fn exhaust(mode: u8) -> u8 {
    match mode {
        1 => RELAY_4,
        2 => RELAY_5,
        3 => RELAY_5 | RELAY_6,
        4 => RELAY_7,
        _ => 0,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_intake_table() {
        let expected = [
            0,
            RELAY_0,
            RELAY_0 | RELAY_3,
            RELAY_0 | RELAY_1,
            RELAY_0 | RELAY_1 | RELAY_2,
            RELAY_0 | RELAY_1 | RELAY_3,
            RELAY_0 | RELAY_1 | RELAY_2 | RELAY_3,
        ];
        for (mode, mask) in expected.iter().enumerate() {
            assert_eq!(intake(mode as u8), *mask);
        }
    }

    #[test]
    fn test_exhaust_table() {
        let expected = [0, RELAY_4, RELAY_5, RELAY_5 | RELAY_6, RELAY_7];
        for (mode, mask) in expected.iter().enumerate() {
            assert_eq!(exhaust(mode as u8), *mask);
        }
    }

    #[test]
    fn test_masks_distinct() {
        for a in 0..NUM_INTAKE_MODES {
            for b in (a + 1)..NUM_INTAKE_MODES {
                assert_ne!(intake(a), intake(b));
            }
        }
        for a in 0..NUM_EXHAUST_MODES {
            for b in (a + 1)..NUM_EXHAUST_MODES {
                assert_ne!(exhaust(a), exhaust(b));
            }
        }
    }

    #[test]
    fn test_tables_stay_in_their_group() {
        for mode in 0..=0xFF_u16 {
            assert_eq!(intake(mode as u8) & !INTAKE_RELAYS, 0);
            assert_eq!(exhaust(mode as u8) & !EXHAUST_RELAYS, 0);
        }
    }

    #[test]
    fn test_out_of_domain_is_off() {
        for mode in NUM_INTAKE_MODES..=0xFF {
            assert_eq!(intake(mode), 0);
        }
        for mode in NUM_EXHAUST_MODES..=0xFF {
            assert_eq!(exhaust(mode), 0);
        }
    }

    #[test]
    fn test_intake_interlock_line() {
        // Relay 0 signals "fan running" to the heater MCU and must be
        // energized in every non-off mode.
        for mode in 1..NUM_INTAKE_MODES {
            assert_ne!(intake(mode) & RELAY_0, 0);
        }
        assert_eq!(intake(0) & RELAY_0, 0);
    }
}

// vim: ts=4 sw=4 expandtab
