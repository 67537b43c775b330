//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27        8 7 6 5 4   0
//! ┌──┬──┬──┬──┬──────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │ Reserved │I│F│T│Mode │
//! └──┴──┴──┴──┴──────────┴─┴─┴─┴─────┘
//! ```
//!
//! - **Flags (28-31)**: tested by [`condition`](super::condition) codes
//! - **I/F bits (7-6)**: IRQ/FIQ disable
//! - **T bit (5)**: ARM (0) or Thumb (1) state, must agree with the dispatch state
//! - **Mode (0-4)**: see [`cpu_modes`](super::cpu_modes)
//!
//! Every exception mode has an SPSR that receives the CPSR on exception entry.
//!
//! The flag helpers below are shared by every flag-setting instruction. Carry
//! for additions and subtractions takes 64 bit operands so the carry-in of
//! ADC/SBC can be folded into the second operand without losing the 33rd bit.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::{condition::Condition, cpu_modes::Mode};

/// Field masks selected by bits 16-19 of MSR.
pub const CONTROL_MASK: u32 = 0x0000_00FF;
pub const EXTENSION_MASK: u32 = 0x0000_FF00;
pub const STATUS_MASK: u32 = 0x00FF_0000;
pub const FLAGS_MASK: u32 = 0xFF00_0000;

pub const STATE_BIT_MASK: u32 = 1 << 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether an instruction with condition `cond` runs under the current flags.
    #[must_use]
    pub fn check(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL | NV => true,
        }
    }

    /// N => Bit 31
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// I => Bit 7, (0=Enable, 1=Disable)
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// F => Bit 6, (0=Enable, 1=Disable)
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5, (0=ARM, 1=THUMB)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// M4-M0 => Bits 4-0
    ///
    /// The BIOS sometimes leaves invalid mode bits (like 0) in an SPSR;
    /// those read as Supervisor.
    #[must_use]
    pub fn mode(self) -> Mode {
        Mode::try_from(self.0).unwrap_or_else(|bits| {
            tracing::debug!(
                "invalid mode bits 0b{bits:05b} in PSR=0x{:08X}, using Supervisor",
                self.0
            );
            Mode::Supervisor
        })
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    pub fn set_state_bit(&mut self, value: bool) {
        self.0.set_bit(5, value);
    }

    /// Writes the mode field only. Bank switching is the CPU's job, see
    /// `Arm7tdmi::switch_mode`.
    pub const fn set_mode(&mut self, m: Mode) {
        self.0 = (self.0 & !0b11111) | m as u32;
    }

    /// Replaces the bits selected by `mask` with the ones in `value`.
    pub const fn write_masked(&mut self, value: u32, mask: u32) {
        self.0 = (self.0 & !mask) | (value & mask);
    }

    #[inline]
    pub fn set_z(&mut self, value: u32) {
        self.set_zero_flag(value == 0);
    }

    #[inline]
    pub fn set_n(&mut self, value: u32) {
        self.set_sign_flag(value.get_bit(31));
    }

    #[inline]
    pub fn set_c_add(&mut self, op1: u64, op2: u64) {
        self.set_carry_flag(op1 + op2 > 0xFFFF_FFFF);
    }

    #[inline]
    pub fn set_v_add(&mut self, op1: u32, op2: u32, result: u32) {
        self.set_overflow_flag(((!(op1 ^ op2) & (op1 ^ result)) >> 31) != 0);
    }

    /// Carry is "no borrow": set when `op1 >= op2`.
    #[inline]
    pub fn set_c_sub(&mut self, op1: u64, op2: u64) {
        self.set_carry_flag(op1 >= op2);
    }

    #[inline]
    pub fn set_v_sub(&mut self, op1: u32, op2: u32, result: u32) {
        self.set_overflow_flag((((op1 ^ op2) & (op1 ^ result)) >> 31) != 0);
    }
}

impl From<u32> for Psr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Mode> for Psr {
    fn from(m: Mode) -> Self {
        let mut s = Self(0);
        s.set_mode(m);
        s
    }
}

impl From<Psr> for u32 {
    fn from(p: Psr) -> Self {
        p.0
    }
}
