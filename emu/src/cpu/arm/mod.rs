//! ARM (32 bit) instruction set: decoding, the 4096 entry lookup table and
//! the handlers it points to.

pub mod instructions;
mod lut;
mod operations;
