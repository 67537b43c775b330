//! # Memory bus seam
//!
//! The CPU reaches memory only through the [`Bus`] trait. Every access carries an
//! [`Access`] kind so the implementor can account for wait states; the value
//! returned never depends on it.
//!
//! Half-word and word accesses always arrive aligned: misaligned loads are
//! rotated or sign-extended by the CPU itself after the aligned read.

use serde::{Deserialize, Serialize};

use crate::cpu::hardware::interrupt_control::InterruptControl;

/// Bus-timing classification of an access.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Sequential,
    #[default]
    NonSequential,
}

/// Width of a bus transfer, used to look up wait states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Half,
    Word,
}

pub trait Bus {
    fn read_byte(&mut self, address: u32, access: Access) -> u8;

    fn read_half(&mut self, address: u32, access: Access) -> u16;

    fn read_word(&mut self, address: u32, access: Access) -> u32;

    fn write_byte(&mut self, address: u32, value: u8, access: Access);

    fn write_half(&mut self, address: u32, value: u16, access: Access);

    fn write_word(&mut self, address: u32, value: u32, access: Access);

    /// Cycles spent by one access of the given width.
    fn wait_cycles(&self, _address: u32, _width: Width, _access: Access) -> u64 {
        1
    }

    /// Called when a scheduler event registered with `EventKind::External(id)` fires.
    /// `late` is how many cycles past its due time the event was serviced.
    fn on_event(&mut self, _id: u32, _late: u64, _interrupts: &mut InterruptControl) {}
}
