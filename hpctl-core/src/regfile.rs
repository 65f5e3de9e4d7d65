use crate::heater::HeaterStages;

/// Number of registers visible on the bus.
pub const NUM_REGS: usize = 6;

/// Heater level, 0..=30. Master writable, validated.
pub const REG_HEATER_LEVEL: u8 = 0;
/// Intake air mode, 0..=6. Master writable, validated.
pub const REG_INTAKE_MODE: u8 = 1;
/// Exhaust air mode, 0..=4. Master writable, unvalidated.
pub const REG_EXHAUST_MODE: u8 = 2;
/// Composite SSR/relay status byte. Partially master writable.
pub const REG_SSR: u8 = 3;
/// One's complement checksum over registers 0..=3. Core owned.
pub const REG_CHECKSUM: u8 = 4;
/// Input snapshot, low nibble plus complemented high nibble. Core owned.
pub const REG_INPUTS: u8 = 5;

/// Bits of register 3 the bus master may write.
/// Bits 5..=7 mirror the heater stage SSRs and are owned by the control
/// loop. Bit 3 is write protected, too, although it lies inside the
/// general purpose SSR output group. This asymmetry is inherited from
/// the board wiring and must not be "fixed".
pub const SSR_BUS_WRITE_MASK: u8 = 0b0001_0111;

/// Bits of register 3 that drive the general purpose SSR outputs.
pub const SSR_OUT_MASK: u8 = 0b0001_1111;

/// Heater stage status bits within register 3.
pub const SSR_STAGE_LOW: u8 = 1 << 5;
pub const SSR_STAGE_MID: u8 = 1 << 6;
pub const SSR_STAGE_HIGH: u8 = 1 << 7;
const SSR_STAGE_MASK: u8 = SSR_STAGE_LOW | SSR_STAGE_MID | SSR_STAGE_HIGH;

const HEATER_LEVEL_MAX: u8 = 30;
const INTAKE_MODE_MAX: u8 = 6;

/// Compose the input snapshot byte: sampled bits in the low nibble,
/// their bitwise complement in the high nibble.
pub fn input_snapshot(pins: u8) -> u8 {
    let low = pins & 0x0F;
    ((!low) << 4) | low
}

/// The register file shared with the bus master.
///
/// The struct itself is plain data. All concurrent access rules
/// (critical sections around multi-step mutations) are enforced by the
/// firmware layer that owns the shared instance.
#[derive(Copy, Clone)]
pub struct RegisterFile {
    regs: [u8; NUM_REGS],
}

impl RegisterFile {
    pub const fn new() -> Self {
        Self {
            regs: [0; NUM_REGS],
        }
    }

    /// Raw register read for the bus engine.
    ///
    /// An out of range `index` is a programming error and panics.
    /// The bus engine bounds checks the cursor before calling this.
    pub fn read(&self, index: u8) -> u8 {
        self.regs[index as usize]
    }

    /// Apply one master write with the per-register policy.
    ///
    /// Out of domain values and writes to core owned or nonexistent
    /// registers are silently dropped; the previous value is retained.
    pub fn bus_write(&mut self, index: u8, value: u8) {
        match index {
            REG_HEATER_LEVEL => {
                if value <= HEATER_LEVEL_MAX {
                    self.regs[index as usize] = value;
                }
            }
            REG_INTAKE_MODE => {
                if value <= INTAKE_MODE_MAX {
                    self.regs[index as usize] = value;
                }
            }
            REG_EXHAUST_MODE => {
                self.regs[index as usize] = value;
            }
            REG_SSR => {
                let kept = self.regs[index as usize] & !SSR_BUS_WRITE_MASK;
                self.regs[index as usize] = kept | (value & SSR_BUS_WRITE_MASK);
            }
            _ => (),
        }
    }

    pub fn heater_level(&self) -> u8 {
        self.regs[REG_HEATER_LEVEL as usize]
    }

    pub fn intake_mode(&self) -> u8 {
        self.regs[REG_INTAKE_MODE as usize]
    }

    pub fn exhaust_mode(&self) -> u8 {
        self.regs[REG_EXHAUST_MODE as usize]
    }

    /// The general purpose SSR output image.
    pub fn ssr_bits(&self) -> u8 {
        self.regs[REG_SSR as usize] & SSR_OUT_MASK
    }

    /// Mirror the actual heater stage state into register 3 bits 5..=7,
    /// preserving all master writable bits.
    pub fn set_stage_status(&mut self, stages: HeaterStages) {
        let kept = self.regs[REG_SSR as usize] & !SSR_STAGE_MASK;
        self.regs[REG_SSR as usize] = kept | (stages.as_bits() << 5);
    }

    /// One's complement of the 8 bit wrapping sum over registers 0..=3.
    pub fn checksum(&self) -> u8 {
        let mut sum: u8 = 0;
        for value in &self.regs[..REG_CHECKSUM as usize] {
            sum = sum.wrapping_add(*value);
        }
        !sum
    }

    /// Recompute register 4 from the current command registers.
    pub fn update_checksum(&mut self) {
        self.regs[REG_CHECKSUM as usize] = self.checksum();
    }

    /// Publish the sampled input lines into register 5.
    pub fn set_input_snapshot(&mut self, pins: u8) {
        self.regs[REG_INPUTS as usize] = input_snapshot(pins);
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}


// vim: ts=4 sw=4 expandtab
