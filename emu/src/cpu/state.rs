//! Dispatch state of the run loop.
//!
//! Four orthogonal conditions packed in a nibble. Each of the 16 values has
//! its own monomorphized inner loop, see `Arm7tdmi::run`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct State(u8);

impl State {
    pub const THUMB: u8 = 1 << 0;
    pub const DMA: u8 = 1 << 1;
    pub const HALT: u8 = 1 << 2;
    pub const IRQ: u8 = 1 << 3;

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub const fn insert(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub const fn remove(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    pub const fn set(&mut self, flag: u8, value: bool) {
        if value {
            self.insert(flag);
        } else {
            self.remove(flag);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut state = State::default();
        state.insert(State::THUMB);
        state.insert(State::IRQ);
        state.set(State::HALT, true);
        state.set(State::HALT, false);

        assert_eq!(state.bits(), 0b1001);
        assert!(state.contains(State::THUMB));
        assert!(!state.contains(State::DMA));
    }
}
