//! # ARM7TDMI core
//!
//! [`Arm7tdmi`] owns everything one emulated CPU touches: the register file,
//! the status registers, the prefetch pipeline, the shared [`Scheduler`], the
//! interrupt controller and the bus side `B` (memory plus DMA).
//!
//! ## Run loop
//!
//! [`Arm7tdmi::run`] advances the machine until the scheduler clock reaches
//! `now + cycles`. Every iteration looks at the dispatch [`State`]:
//!
//! ```text
//! DMA active      -> hand the iteration to the DMA controller
//! halted          -> idle until the next event or the end of the budget
//! IRQ and I clear -> enter the IRQ exception
//! otherwise       -> fetch into the pipeline, decode through the lookup
//!                    table, execute, advance PC
//! ```
//!
//! The state is a compile-time parameter of the inner loop, so each of the 16
//! combinations gets its own copy with the checks it does not need folded away.
//! The inner loop exits as soon as the state changes.
//!
//! ## PC
//!
//! While an instruction executes, r15 already points two instructions ahead
//! (+8 in ARM, +4 in Thumb). Handlers that write r15 flush the pipeline, which
//! leaves r15 one instruction past the target; the loop then adds the final
//! instruction size.

use crate::bitwise::Bits;
use crate::bus::{Access, Bus, Width};
use crate::config::{Boot, Config};
use crate::cpu::arm::instructions as arm_instructions;
use crate::cpu::condition::Condition;
use crate::cpu::cpu_modes::{Bank, Mode};
use crate::cpu::hardware::dma::{Dma, DmaStatus};
use crate::cpu::hardware::interrupt_control::{Interrupt, InterruptControl, PowerDown};
use crate::cpu::pipeline::Pipeline;
use crate::cpu::psr::Psr;
use crate::cpu::register_bank::RegisterBank;
use crate::cpu::registers::{REG_PROGRAM_COUNTER, REG_SP, Registers};
use crate::cpu::state::State;
use crate::cpu::thumb::instruction as thumb_instructions;
use crate::error::CpuError;
use crate::scheduler::{EventKind, Scheduler};

pub const SIZE_OF_ARM_INSTRUCTION: u32 = 4;
pub const SIZE_OF_THUMB_INSTRUCTION: u32 = 2;

const CARTRIDGE_ENTRY: u32 = 0x0800_0000;
const CARTRIDGE_SP_SVC: u32 = 0x0300_7FE0;
const CARTRIDGE_SP_IRQ: u32 = 0x0300_7FA0;
const CARTRIDGE_SP_SYS: u32 = 0x0300_7F00;

pub struct Arm7tdmi<B> {
    pub(crate) cpsr: Psr,
    pub(crate) registers: Registers,
    pub(crate) register_bank: RegisterBank,
    pub(crate) pipeline: Pipeline,
    pub(crate) state: State,

    /// Clock value the current `run` call stops at.
    target: u64,
    fault: Option<CpuError>,
    irq_delay_armed: bool,
    config: Config,

    pub scheduler: Scheduler,
    pub interrupt_control: InterruptControl,
    pub bus: B,
}

macro_rules! dispatch_state {
    ($cpu:ident, $state:expr, [$($s:literal),*]) => {
        match $state {
            $($s => $cpu.dispatch::<$s>(),)*
            _ => unreachable!("dispatch state has four bits"),
        }
    };
}

impl<B: Bus + Dma> Arm7tdmi<B> {
    /// Builds a core in reset state. Call [`Self::init`] before running it.
    pub fn new(bus: B, config: Config) -> Self {
        let mut cpsr = Psr::from(Mode::Supervisor);
        cpsr.set_irq_disable(true);
        cpsr.set_fiq_disable(true);

        Self {
            cpsr,
            registers: Registers::default(),
            register_bank: RegisterBank::default(),
            pipeline: Pipeline::default(),
            state: State::default(),
            target: 0,
            fault: None,
            irq_delay_armed: false,
            config,
            scheduler: Scheduler::new(),
            interrupt_control: InterruptControl::default(),
            bus,
        }
    }

    /// Cold boots the pipeline at the boot vector chosen by [`Config::boot`].
    pub fn init(&mut self) {
        self.state = State::default();
        self.cpsr.set_state_bit(false);

        let entry = match self.config.boot {
            Boot::Bios => {
                self.switch_mode(Mode::Supervisor);
                self.cpsr.set_irq_disable(true);
                self.cpsr.set_fiq_disable(true);
                0
            }
            Boot::Cartridge => {
                self.switch_mode(Mode::System);
                self.cpsr.set_irq_disable(false);
                self.cpsr.set_fiq_disable(false);
                self.registers[REG_SP] = CARTRIDGE_SP_SYS;
                self.register_bank.set_stack_pointer(Bank::Supervisor, CARTRIDGE_SP_SVC);
                self.register_bank.set_stack_pointer(Bank::Irq, CARTRIDGE_SP_IRQ);
                CARTRIDGE_ENTRY
            }
        };
        tracing::debug!("booting at 0x{entry:08X} in {:?} mode", self.cpsr.mode());

        self.registers.set_program_counter(entry);
        self.flush_word();
        self.registers.advance_program_counter(SIZE_OF_ARM_INSTRUCTION);
    }

    /// Runs until the scheduler clock reaches `now + cycles`.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::Coprocessor`] when a coprocessor instruction is
    /// executed. The core stays stopped on that instruction and every later
    /// call returns the same error.
    pub fn run(&mut self, cycles: u64) -> Result<(), CpuError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        self.target = self.scheduler.now() + cycles;
        while self.scheduler.now() < self.target {
            let state = self.state.bits();
            dispatch_state!(self, state, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);

            if let Some(fault) = &self.fault {
                return Err(fault.clone());
            }
        }
        Ok(())
    }

    fn dispatch<const STATE: u8>(&mut self) {
        let thumb = STATE & State::THUMB != 0;
        while self.scheduler.now() < self.target && self.state.bits() == STATE {
            if STATE & State::DMA != 0 {
                self.run_dma();
            } else if STATE & State::HALT != 0 {
                let now = self.scheduler.now();
                let until = self.target.min(self.scheduler.next());
                self.scheduler.run(until.saturating_sub(now).max(1));
            } else {
                if STATE & State::IRQ != 0 && !self.cpsr.irq_disable() {
                    self.interrupt_hw();
                } else if thumb {
                    self.step_thumb();
                } else {
                    self.step_arm();
                }
                // The handler may have switched state. A faulting instruction
                // leaves r15 where it executed.
                if self.fault.is_none() {
                    self.advance_program_counter();
                }
            }
            self.process_events();
        }
    }

    #[inline]
    fn step_arm(&mut self) {
        let pc = self.registers.program_counter();
        let fetched = self.fetch_word(pc);
        let instruction = self.pipeline.advance(fetched);

        #[cfg(feature = "trace_instructions")]
        tracing::trace!(
            "0x{:08X}: {instruction:08X} {:?}",
            pc.wrapping_sub(8),
            arm_instructions::classify(arm_instructions::hash(instruction))
        );

        if self.cpsr.check(Condition::from(instruction >> 28)) {
            Self::ARM_LUT[arm_instructions::hash(instruction)](self, instruction);
        }
    }

    #[inline]
    fn step_thumb(&mut self) {
        let pc = self.registers.program_counter();
        let fetched = u32::from(self.fetch_half(pc));
        let instruction = self.pipeline.advance(fetched) as u16;

        #[cfg(feature = "trace_instructions")]
        tracing::trace!(
            "0x{:08X}: {instruction:04X} {:?}",
            pc.wrapping_sub(4),
            thumb_instructions::classify(thumb_instructions::hash(instruction))
        );

        Self::THUMB_LUT[thumb_instructions::hash(instruction)](self, instruction);
    }

    fn run_dma(&mut self) {
        if self.bus.run_slice(&mut self.scheduler, &mut self.interrupt_control)
            == DmaStatus::Idle
        {
            self.state.remove(State::DMA);
        }
        self.update_interrupt_line();
    }

    fn process_events(&mut self) {
        if self.scheduler.next() > self.scheduler.now() {
            return;
        }
        while let Some(event) = self.scheduler.pop_due() {
            let late = self.scheduler.now() - event.time;
            match event.kind {
                EventKind::InterruptDelay => {
                    self.irq_delay_armed = false;
                    self.state.set(State::IRQ, self.interrupt_control.is_line_asserted());
                }
                EventKind::External(id) => {
                    self.bus.on_event(id, late, &mut self.interrupt_control);
                    self.poll_dma();
                    self.update_interrupt_line();
                }
            }
        }
    }

    /// Hands the bus to the DMA controller once it reports a started transfer.
    fn poll_dma(&mut self) {
        if self.bus.is_active() {
            self.state.insert(State::DMA);
        }
    }

    /// Re-evaluates IE, IF and IME after any of them may have changed.
    pub(crate) fn update_interrupt_line(&mut self) {
        if self.interrupt_control.is_pending() {
            self.state.remove(State::HALT);
        }

        if self.interrupt_control.is_line_asserted() {
            if !self.state.contains(State::IRQ) && !self.irq_delay_armed {
                self.irq_delay_armed = true;
                self.scheduler
                    .schedule(EventKind::InterruptDelay, self.config.irq_delay);
            }
        } else {
            self.state.remove(State::IRQ);
            if self.irq_delay_armed {
                self.irq_delay_armed = false;
                self.scheduler.cancel(EventKind::InterruptDelay);
            }
        }
    }

    /// Raises an interrupt source, as a device on the bus would.
    pub fn raise_interrupt(&mut self, interrupt: Interrupt) {
        self.interrupt_control.request(interrupt);
        self.update_interrupt_line();
    }

    /// Stops fetching until an enabled interrupt is requested.
    pub const fn halt(&mut self) {
        self.state.insert(State::HALT);
    }

    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.state.contains(State::HALT)
    }

    /// Switches the DMA-active state. A DMA slice reporting idle clears it too.
    pub const fn set_dma_active(&mut self, active: bool) {
        self.state.set(State::DMA, active);
    }

    #[must_use]
    pub const fn is_thumb(&self) -> bool {
        self.state.contains(State::THUMB)
    }

    #[must_use]
    pub const fn cpsr(&self) -> Psr {
        self.cpsr
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.cpsr.mode()
    }

    /// SPSR of the current mode. User and System have none and read the CPSR.
    #[must_use]
    pub fn spsr(&self) -> Psr {
        let mode = self.cpsr.mode();
        if mode.has_spsr() {
            self.register_bank.spsr(mode.bank())
        } else {
            self.cpsr
        }
    }

    pub(crate) fn set_spsr(&mut self, psr: Psr) {
        let mode = self.cpsr.mode();
        if mode.has_spsr() {
            self.register_bank.set_spsr(mode.bank(), psr);
        } else {
            tracing::warn!("ignoring SPSR write in {mode:?} mode");
        }
    }

    #[inline]
    pub(crate) const fn instruction_size(&self) -> u32 {
        if self.is_thumb() {
            SIZE_OF_THUMB_INSTRUCTION
        } else {
            SIZE_OF_ARM_INSTRUCTION
        }
    }

    #[inline]
    fn advance_program_counter(&mut self) {
        self.registers
            .advance_program_counter(self.instruction_size());
    }

    /// Register of the current mode. r15 reads two instructions ahead.
    #[must_use]
    pub fn register(&self, index: usize) -> u32 {
        self.registers[index]
    }

    /// Writes a register of the current mode. Writing r15 jumps there.
    pub fn set_register(&mut self, index: usize, value: u32) {
        self.registers[index] = value;
        if index == REG_PROGRAM_COUNTER {
            self.flush();
            self.advance_program_counter();
        }
    }

    /// Address of the instruction currently executing.
    #[must_use]
    pub(crate) fn instruction_address(&self) -> u32 {
        self.registers
            .program_counter()
            .wrapping_sub(2 * self.instruction_size())
    }

    /// Writes the mode field, swapping banked registers first.
    pub(crate) fn switch_mode(&mut self, mode: Mode) {
        let current = self.cpsr.mode();
        if current != mode {
            tracing::debug!("mode switch {current:?} -> {mode:?}");
        }
        self.register_bank
            .switch(&mut self.registers, current.bank(), mode.bank());
        self.cpsr.set_mode(mode);
    }

    /// Copies the SPSR back into the CPSR, the exception return path.
    pub(crate) fn restore_cpsr(&mut self) {
        let spsr = self.spsr();
        let mode = spsr.mode();
        self.switch_mode(mode);
        self.cpsr = spsr;
        self.cpsr.set_mode(mode);
        self.state.set(State::THUMB, self.cpsr.state_bit());
    }

    /// Jumps to `address`, entering Thumb state when bit 0 is set.
    pub(crate) fn branch_exchange(&mut self, address: u32) {
        let thumb = address.get_bit(0);
        self.cpsr.set_state_bit(thumb);
        self.state.set(State::THUMB, thumb);
        self.registers.set_program_counter(address);
        self.flush();
    }

    /// Aborts the run loop on an instruction the core cannot execute.
    pub(crate) fn fault(&mut self, error: CpuError) {
        tracing::error!("{error}");
        self.fault = Some(error);
        self.target = self.scheduler.now();
    }

    #[inline]
    pub(crate) fn flush(&mut self) {
        if self.is_thumb() {
            self.flush_half();
        } else {
            self.flush_word();
        }
    }

    pub(crate) fn flush_word(&mut self) {
        let pc = self.registers.program_counter() & !3;
        self.pipeline.access = Access::NonSequential;
        self.pipeline.slots[0] = self.fetch_word(pc);
        self.pipeline.slots[1] = self.fetch_word(pc.wrapping_add(4));
        self.registers.set_program_counter(pc.wrapping_add(4));
    }

    pub(crate) fn flush_half(&mut self) {
        let pc = self.registers.program_counter() & !1;
        self.pipeline.access = Access::NonSequential;
        self.pipeline.slots[0] = u32::from(self.fetch_half(pc));
        self.pipeline.slots[1] = u32::from(self.fetch_half(pc.wrapping_add(2)));
        self.registers.set_program_counter(pc.wrapping_add(2));
    }

    #[inline]
    fn fetch_word(&mut self, address: u32) -> u32 {
        let access = self.pipeline.access;
        self.pipeline.access = Access::Sequential;
        self.scheduler
            .run(self.bus.wait_cycles(address, Width::Word, access));
        self.bus.read_word(address, access)
    }

    #[inline]
    fn fetch_half(&mut self, address: u32) -> u16 {
        let access = self.pipeline.access;
        self.pipeline.access = Access::Sequential;
        self.scheduler
            .run(self.bus.wait_cycles(address, Width::Half, access));
        self.bus.read_half(address, access)
    }

    /// One internal cycle.
    #[inline]
    pub(crate) const fn idle(&mut self) {
        self.scheduler.run(1);
    }

    /// Internal cycles of a multiplication, one per significant byte of
    /// `multiplier` (leading 0x00 bytes, or 0xFF bytes when `signed`, are free).
    pub(crate) const fn tick_multiply(&mut self, multiplier: u32, signed: bool) {
        let mut mask = 0xFFFF_FF00_u32;
        self.idle();
        loop {
            let masked = multiplier & mask;
            if masked == 0 || (signed && masked == mask) {
                break;
            }
            mask <<= 8;
            self.idle();
        }
    }

    fn data_access(&mut self, address: u32, width: Width, access: Access) {
        self.pipeline.access = Access::NonSequential;
        self.scheduler
            .run(self.bus.wait_cycles(address, width, access));
    }

    fn io_read(&self, address: u32, bytes: u32) -> u32 {
        (0..bytes).fold(0, |value, i| {
            value | u32::from(self.interrupt_control.read_byte(address + i)) << (8 * i)
        })
    }

    fn io_write(&mut self, address: u32, value: u32, bytes: u32) {
        for i in 0..bytes {
            let byte = (value >> (8 * i)) as u8;
            if self.interrupt_control.write_byte(address + i, byte) == Some(PowerDown::Halt) {
                self.halt();
            }
        }
        self.update_interrupt_line();
    }

    pub(crate) fn read_byte(&mut self, address: u32, access: Access) -> u8 {
        self.data_access(address, Width::Byte, access);
        if InterruptControl::owns(address) {
            return self.io_read(address, 1) as u8;
        }
        self.bus.read_byte(address, access)
    }

    pub(crate) fn read_half(&mut self, address: u32, access: Access) -> u16 {
        let address = address & !1;
        self.data_access(address, Width::Half, access);
        if InterruptControl::owns(address) {
            return self.io_read(address, 2) as u16;
        }
        self.bus.read_half(address, access)
    }

    pub(crate) fn read_word(&mut self, address: u32, access: Access) -> u32 {
        let address = address & !3;
        self.data_access(address, Width::Word, access);
        if InterruptControl::owns(address) {
            return self.io_read(address, 4);
        }
        self.bus.read_word(address, access)
    }

    pub(crate) fn write_byte(&mut self, address: u32, value: u8, access: Access) {
        self.data_access(address, Width::Byte, access);
        if InterruptControl::owns(address) {
            self.io_write(address, u32::from(value), 1);
        } else {
            self.bus.write_byte(address, value, access);
            self.poll_dma();
        }
    }

    pub(crate) fn write_half(&mut self, address: u32, value: u16, access: Access) {
        let address = address & !1;
        self.data_access(address, Width::Half, access);
        if InterruptControl::owns(address) {
            self.io_write(address, u32::from(value), 2);
        } else {
            self.bus.write_half(address, value, access);
            self.poll_dma();
        }
    }

    pub(crate) fn write_word(&mut self, address: u32, value: u32, access: Access) {
        let address = address & !3;
        self.data_access(address, Width::Word, access);
        if InterruptControl::owns(address) {
            self.io_write(address, value, 4);
        } else {
            self.bus.write_word(address, value, access);
            self.poll_dma();
        }
    }

    /// Misaligned word loads rotate the aligned word.
    pub(crate) fn read_word_rotate(&mut self, address: u32, access: Access) -> u32 {
        self.read_word(address, access)
            .rotate_right((address & 3) * 8)
    }

    pub(crate) fn read_half_rotate(&mut self, address: u32, access: Access) -> u32 {
        u32::from(self.read_half(address, access)).rotate_right((address & 1) * 8)
    }

    pub(crate) fn read_byte_sign_ex(&mut self, address: u32, access: Access) -> u32 {
        u32::from(self.read_byte(address, access)).sign_extended(8)
    }

    /// A misaligned signed half-word load reads the addressed byte only.
    pub(crate) fn read_half_sign_ex(&mut self, address: u32, access: Access) -> u32 {
        if address.get_bit(0) {
            self.read_byte_sign_ex(address, access)
        } else {
            u32::from(self.read_half(address, access)).sign_extended(16)
        }
    }
}
