#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]
#![feature(asm_const)]

mod hw;
mod mutex;
mod ports;
mod system;
mod timer;
mod twi;

#[cfg(feature = "debug")]
mod debug;
#[cfg(feature = "debug")]
mod uart;

use crate::{
    hw::{Peripherals, interrupt, mcu},
    mutex::{MainCtx, unwrap_option},
    ports::ports_init,
    system::SysPeriph,
    timer::{TIMER_PERIPH, TimerPeriph, timer_init},
    twi::{TWI_PERIPH, TwiPeriph, twi_init},
};

fn wdt_init() {
    // SAFETY: The asm code only accesses the WDT registers
    //         which are not accessed from anywhere else in the program.
    unsafe {
        // Enable WDT with timeout 2 s
        core::arch::asm!(
            "ldi {tmp}, 0x18", // WDCE=1, WDE=1
            "out {WDTCR}, {tmp}",
            "ldi {tmp}, 0x0F", // WDE=1, WDP2=1, WDP1=1, WDP0=1
            "out {WDTCR}, {tmp}",
            tmp = out(reg_upper) _,
            WDTCR = const 0x21,
            options(nostack, preserves_flags)
        );
    }
}

fn wdt_poke(_wp: &mcu::WDT) {
    avr_device::asm::wdr();
}

#[avr_device::entry]
fn main() -> ! {
    wdt_init();

    let dp = unwrap_option(Peripherals::take());

    let sp = SysPeriph {
        PORTB: dp.PORTB,
        PORTC: dp.PORTC,
        PORTD: dp.PORTD,
    };

    let tp = TimerPeriph { TC1: dp.TC1 };
    let twip = TwiPeriph { TWI: dp.TWI };
    #[cfg(feature = "debug")]
    let up = crate::uart::UartPeriph { USART: dp.USART };

    let init_static_vars = |ctx| {
        TIMER_PERIPH.init(ctx, tp);
        TWI_PERIPH.init(ctx, twip);
        #[cfg(feature = "debug")]
        crate::uart::UART_PERIPH.init(ctx, up);
    };

    // # SAFETY
    //
    // This is the context handle for the main() function.
    // Holding a reference to this object proves that the holder
    // is running in main() context.
    let m = unsafe { MainCtx::new_with_init(init_static_vars) };

    ports_init(&m, &sp);

    timer_init(&m);
    twi_init(&m);
    #[cfg(feature = "debug")]
    crate::uart::uart_init(&m);

    // Establish the checksum and the input snapshot before the bus
    // can see the register file.
    system::run(&m, &sp);

    // SAFETY: This must be after construction of MainCtx
    //         and after initialization of static MainInit variables.
    unsafe { interrupt::enable() };

    loop {
        system::run(&m, &sp);
        wdt_poke(&dp.WDT);
    }
}

// vim: ts=4 sw=4 expandtab
