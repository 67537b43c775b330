//! # Register file
//!
//! The 16 registers visible at any time.
//!
//! - **R0-R12**: General purpose
//! - **R13 (SP)**: Stack pointer (by convention)
//! - **R14 (LR)**: Link register
//! - **R15 (PC)**: Program counter, reads as the executing address + 8 (ARM) or + 4 (Thumb)
//!
//! The registers of other modes live in [`RegisterBank`](super::register_bank::RegisterBank).

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

pub const REG_SP: usize = 0xD;
pub const REG_LR: usize = 0xE;
pub const REG_PROGRAM_COUNTER: usize = 0xF;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Registers([u32; 16]);

impl Registers {
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.0[REG_PROGRAM_COUNTER]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.0[REG_PROGRAM_COUNTER] = new_value;
    }

    pub const fn advance_program_counter(&mut self, bytes: u32) {
        self.0[REG_PROGRAM_COUNTER] = self.0[REG_PROGRAM_COUNTER].wrapping_add(bytes);
    }
}

impl Index<usize> for Registers {
    type Output = u32;

    fn index(&self, reg: usize) -> &u32 {
        &self.0[reg]
    }
}

impl IndexMut<usize> for Registers {
    fn index_mut(&mut self, reg: usize) -> &mut u32 {
        &mut self.0[reg]
    }
}
