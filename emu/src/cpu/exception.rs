//! # Exception entry
//!
//! ```text
//! ┌───────────────────────┬────────┬───────────┬──────────────────────────┐
//! │ Exception             │ Vector │ Mode      │ LR                       │
//! ├───────────────────────┼────────┼───────────┼──────────────────────────┤
//! │ Undefined instruction │ 0x04   │ Undefined │ next instruction         │
//! │ Software interrupt    │ 0x08   │ SVC       │ next instruction         │
//! │ IRQ                   │ 0x18   │ IRQ       │ instruction to resume +4 │
//! └───────────────────────┴────────┴───────────┴──────────────────────────┘
//! ```
//!
//! Entry saves the CPSR into the target mode's SPSR, switches mode, disables
//! IRQs, leaves Thumb state and refills the pipeline from the vector. Handlers
//! return with `MOVS pc, lr` (SWI, undefined) or `SUBS pc, lr, #4` (IRQ) in
//! either state.

use crate::bus::Bus;
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::hardware::dma::Dma;
use crate::cpu::registers::REG_LR;
use crate::cpu::state::State;

pub const VECTOR_UNDEFINED: u32 = 0x04;
pub const VECTOR_SOFTWARE_INTERRUPT: u32 = 0x08;
pub const VECTOR_IRQ: u32 = 0x18;

impl<B: Bus + Dma> Arm7tdmi<B> {
    pub(crate) fn interrupt_sw(&mut self) {
        let lr = self
            .registers
            .program_counter()
            .wrapping_sub(self.instruction_size());
        tracing::debug!("software interrupt, returning to 0x{lr:08X}");
        self.enter_exception(VECTOR_SOFTWARE_INTERRUPT, lr, Mode::Supervisor);
    }

    /// Taken between instructions, before the next one is fetched.
    pub(crate) fn interrupt_hw(&mut self) {
        let size = self.instruction_size();
        let lr = self
            .registers
            .program_counter()
            .wrapping_sub(2 * size)
            .wrapping_add(4);
        tracing::debug!(
            "IRQ with IE=0x{:04X} IF=0x{:04X}",
            self.interrupt_control.interrupt_enable,
            self.interrupt_control.interrupt_request
        );
        self.enter_exception(VECTOR_IRQ, lr, Mode::Irq);

        self.state.remove(State::IRQ);
        self.update_interrupt_line();
    }

    pub(crate) fn undefined_instruction(&mut self, instruction: u32) {
        let lr = self
            .registers
            .program_counter()
            .wrapping_sub(self.instruction_size());
        tracing::debug!(
            "undefined instruction 0x{instruction:08X} at 0x{:08X}",
            self.instruction_address()
        );
        self.enter_exception(VECTOR_UNDEFINED, lr, Mode::Undefined);
    }

    fn enter_exception(&mut self, vector: u32, lr: u32, mode: Mode) {
        let cpsr = self.cpsr;
        self.switch_mode(mode);
        self.set_spsr(cpsr);

        self.cpsr.set_state_bit(false);
        self.cpsr.set_irq_disable(true);
        self.state.remove(State::THUMB);

        self.registers[REG_LR] = lr;
        self.registers.set_program_counter(vector);
        self.flush_word();
    }
}
