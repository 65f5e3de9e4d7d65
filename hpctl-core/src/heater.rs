//! Tiered duty-cycle control of the three heater stage SSRs.
//!
//! The 0..=30 level range is split into three 10 wide tiers, one per
//! stage. All tiers below the requested level are fully on, the tier
//! containing the remainder is duty-cycled against the tick counter and
//! all tiers above are off. This gives an average power that rises by
//! one tick worth of heat per level step, with at most one switching
//! edge per stage and cycle.

/// Ticks per duty cycle. The timer delivers one tick per second.
pub const PERIOD_TICKS: u8 = 10;

/// Number of heater stages.
pub const NUM_STAGES: u8 = 3;

/// Maximum heater level: one full duty cycle per stage.
pub const LEVEL_MAX: u8 = PERIOD_TICKS * NUM_STAGES;

/// The on/off state of the three heater stage SSRs.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct HeaterStages {
    pub low: bool,
    pub mid: bool,
    pub high: bool,
}

impl HeaterStages {
    pub const OFF: Self = Self {
        low: false,
        mid: false,
        high: false,
    };

    /// Pack into bits 0..=2 (low, mid, high).
    pub fn as_bits(&self) -> u8 {
        (self.low as u8) | (self.mid as u8) << 1 | (self.high as u8) << 2
    }
}

/// Compute the stage states for `level` (0..=30) at `tick` (0..10).
///
/// Levels above [LEVEL_MAX] saturate to full power; ticks are expected
/// to be pre-wrapped by the timer.
pub fn stages(level: u8, tick: u8) -> HeaterStages {
    if level > 2 * PERIOD_TICKS {
        HeaterStages {
            low: true,
            mid: true,
            high: tick < level - 2 * PERIOD_TICKS,
        }
    } else if level > PERIOD_TICKS {
        HeaterStages {
            low: true,
            mid: tick < level - PERIOD_TICKS,
            high: false,
        }
    } else {
        HeaterStages {
            low: tick < level,
            mid: false,
            high: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Independent reference: stage `i` covers levels (i*10, (i+1)*10].
    fn stage_expected(level: u8, tick: u8, stage: u8) -> bool {
        let lo = stage * PERIOD_TICKS;
        let hi = (stage + 1) * PERIOD_TICKS;
        if level > hi {
            true
        } else if level > lo {
            tick < level - lo
        } else {
            false
        }
    }

    #[test]
    fn test_tier_pattern() {
        for level in 0..=LEVEL_MAX {
            for tick in 0..PERIOD_TICKS {
                let s = stages(level, tick);
                assert_eq!(s.low, stage_expected(level, tick, 0));
                assert_eq!(s.mid, stage_expected(level, tick, 1));
                assert_eq!(s.high, stage_expected(level, tick, 2));
            }
        }
    }

    #[test]
    fn test_energy_equals_level() {
        // Summed on-ticks over one full cycle must equal the level,
        // which makes the average power strictly monotonic.
        for level in 0..=LEVEL_MAX {
            let mut energy = 0u32;
            for tick in 0..PERIOD_TICKS {
                let s = stages(level, tick);
                energy += s.low as u32 + s.mid as u32 + s.high as u32;
            }
            assert_eq!(energy, level as u32);
        }
    }

    #[test]
    fn test_single_edge_per_cycle() {
        // Each stage is on for a contiguous prefix of the cycle.
        for level in 0..=LEVEL_MAX {
            for tick in 1..PERIOD_TICKS {
                let prev = stages(level, tick - 1);
                let cur = stages(level, tick);
                assert!(!cur.low | prev.low);
                assert!(!cur.mid | prev.mid);
                assert!(!cur.high | prev.high);
            }
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(stages(0, 0), HeaterStages::OFF);
        // Full power: every stage on for the whole cycle.
        for tick in 0..PERIOD_TICKS {
            let s = stages(30, tick);
            assert!(s.low && s.mid && s.high);
        }
        // Exactly one full tier: low stage is solid on, rest off.
        for tick in 0..PERIOD_TICKS {
            let s = stages(10, tick);
            assert!(s.low && !s.mid && !s.high);
        }
        // First partial tick of the top tier.
        assert!(stages(21, 0).high);
        assert!(!stages(21, 1).high);
    }

    #[test]
    fn test_saturation_above_max() {
        for tick in 0..PERIOD_TICKS {
            assert_eq!(stages(0xFF, tick), stages(LEVEL_MAX, tick));
        }
    }

    #[test]
    fn test_as_bits() {
        assert_eq!(HeaterStages::OFF.as_bits(), 0);
        assert_eq!(stages(30, 0).as_bits(), 0b111);
        assert_eq!(stages(15, 9).as_bits(), 0b001);
    }
}

// vim: ts=4 sw=4 expandtab
