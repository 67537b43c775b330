//! Thumb state: the 16 bit instruction set.

pub mod instruction;
mod lut;
mod operations;
