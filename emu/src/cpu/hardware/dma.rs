//! DMA seam.
//!
//! The DMA controller is a bus master living on the bus side. While the CPU is
//! in the DMA-active state it hands every loop iteration to [`Dma::run_slice`]
//! instead of fetching an instruction. The state is entered either by
//! `Arm7tdmi::set_dma_active` or when [`Dma::is_active`] turns true.

use crate::cpu::hardware::interrupt_control::InterruptControl;
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaStatus {
    /// More transfers are pending, keep the CPU off the bus.
    Active,
    /// All channels are done, the CPU may resume.
    Idle,
}

pub trait Dma {
    /// Performs one unit of transfer work, advancing `scheduler` by its cost.
    /// Completion interrupts are requested through `interrupts`.
    fn run_slice(&mut self, scheduler: &mut Scheduler, interrupts: &mut InterruptControl)
    -> DmaStatus;

    /// Whether a channel has a transfer in progress. Polled after every CPU
    /// write and every external event, so a write to a control register or a
    /// blanking event can take the bus in the middle of a run.
    fn is_active(&self) -> bool {
        false
    }
}
