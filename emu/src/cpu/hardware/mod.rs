pub mod dma;
pub mod interrupt_control;
