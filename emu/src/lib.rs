//! An ARM7TDMI core as found in the Game Boy Advance.
//!
//! [`cpu::arm7tdmi::Arm7tdmi`] executes ARM and Thumb code against any
//! [`bus::Bus`], with [`memory::Memory`] as a flat GBA memory map to run
//! programs on.

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

pub mod bus;
pub mod config;
pub mod cpu;
pub mod error;

#[allow(clippy::cast_possible_truncation)]
pub mod memory;
pub mod scheduler;
