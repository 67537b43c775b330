//! # Banked registers
//!
//! Storage for the registers swapped out when the CPU changes mode, kept as
//! small tables indexed by [`Bank`]. Switching copies the outgoing mode's
//! registers out of the register file and the incoming mode's registers in.
//!
//! Each exception mode has its own R13, R14 and SPSR. FIQ also banks R8-R12.

use serde::{Deserialize, Serialize};

use crate::cpu::cpu_modes::Bank;
use crate::cpu::psr::Psr;
use crate::cpu::registers::Registers;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterBank {
    /// R13 and R14 of every bank.
    sp_lr: [[u32; 2]; Bank::COUNT],
    /// R8-R12 outside FIQ (index 0) and in FIQ (index 1).
    r8_r12: [[u32; 5]; 2],
    spsr: [Psr; Bank::COUNT],
}

impl RegisterBank {
    #[must_use]
    pub const fn spsr(&self, bank: Bank) -> Psr {
        self.spsr[bank as usize]
    }

    pub const fn set_spsr(&mut self, bank: Bank, psr: Psr) {
        self.spsr[bank as usize] = psr;
    }

    /// R13 of a bank that is not currently swapped in.
    #[must_use]
    pub const fn stack_pointer(&self, bank: Bank) -> u32 {
        self.sp_lr[bank as usize][0]
    }

    pub const fn set_stack_pointer(&mut self, bank: Bank, value: u32) {
        self.sp_lr[bank as usize][0] = value;
    }

    /// Moves the registers of `from` out of `registers` and the ones of `to` in.
    pub fn switch(&mut self, registers: &mut Registers, from: Bank, to: Bank) {
        if from == to {
            return;
        }

        let fiq_from = usize::from(from == Bank::Fiq);
        let fiq_to = usize::from(to == Bank::Fiq);
        if fiq_from != fiq_to {
            for (i, reg) in (8..=12).enumerate() {
                self.r8_r12[fiq_from][i] = registers[reg];
                registers[reg] = self.r8_r12[fiq_to][i];
            }
        }

        self.sp_lr[from as usize] = [registers[13], registers[14]];
        let [sp, lr] = self.sp_lr[to as usize];
        registers[13] = sp;
        registers[14] = lr;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn switch_swaps_sp_lr() {
        let mut bank = RegisterBank::default();
        let mut registers = Registers::default();
        registers[13] = 0x100;
        registers[14] = 0x200;

        bank.switch(&mut registers, Bank::User, Bank::Irq);
        assert_eq!(registers[13], 0);
        registers[13] = 0x300;

        bank.switch(&mut registers, Bank::Irq, Bank::User);
        assert_eq!(registers[13], 0x100);
        assert_eq!(registers[14], 0x200);
        assert_eq!(bank.stack_pointer(Bank::Irq), 0x300);
    }

    #[test]
    fn fiq_banks_high_registers() {
        let mut bank = RegisterBank::default();
        let mut registers = Registers::default();
        for reg in 8..=12 {
            registers[reg] = reg as u32;
        }

        bank.switch(&mut registers, Bank::Supervisor, Bank::Fiq);
        assert_eq!(registers[8], 0);
        registers[8] = 0xF8;

        bank.switch(&mut registers, Bank::Fiq, Bank::Irq);
        assert_eq!(registers[8], 8);
        assert_eq!(registers[12], 12);

        bank.switch(&mut registers, Bank::Irq, Bank::Fiq);
        assert_eq!(registers[8], 0xF8);
    }
}
