//! The control loop body.

use crate::{
    hw::mcu,
    mutex::MainCtx,
    ports,
    timer::tick_get,
    twi::with_regfile,
};
use hpctl_core::{heater, relay};

#[allow(non_snake_case)]
pub struct SysPeriph {
    pub PORTB: mcu::PORTB,
    pub PORTC: mcu::PORTC,
    pub PORTD: mcu::PORTD,
}

/// One control loop iteration.
///
/// Every multi-step access to the shared register file runs inside
/// [with_regfile], which masks the bus interrupt for its duration.
pub fn run(m: &MainCtx<'_>, sp: &SysPeriph) {
    // Publish the sampled inputs with their redundancy nibble.
    let pins = ports::sample_inputs(sp);
    with_regfile(|regs| regs.set_input_snapshot(pins));

    // Checksum over the command registers, as of this iteration.
    with_regfile(|regs| regs.update_checksum());

    let tick = tick_get(m);
    let (level, intake_mode, exhaust_mode, ssr_bits) = with_regfile(|regs| {
        (
            regs.heater_level(),
            regs.intake_mode(),
            regs.exhaust_mode(),
            regs.ssr_bits(),
        )
    });

    // Heater: compute the stage states, expose them to the master,
    // then drive the SSRs.
    let stages = heater::stages(level, tick);
    with_regfile(|regs| regs.set_stage_status(stages));
    ports::drive_heater(sp, stages);

    // Air path relays and general purpose SSRs.
    ports::drive_intake(sp, relay::intake(intake_mode));
    ports::drive_exhaust(sp, relay::exhaust(exhaust_mode));
    ports::drive_ssrs(sp, ssr_bits);

    #[cfg(feature = "debug")]
    {
        use crate::debug::Debug;

        Debug::Tick.log_u8(m, tick);
        Debug::HeaterLevel.log_u8(m, level);
        Debug::Stages.log_u8(m, stages.as_bits());
        Debug::IntakeMode.log_u8(m, intake_mode);
        Debug::ExhaustMode.log_u8(m, exhaust_mode);
        crate::debug::run(m);
    }
}

// vim: ts=4 sw=4 expandtab
