use serde::{Deserialize, Serialize};

use crate::bus::Access;

/// Two-stage prefetch buffer.
///
/// `slots[0]` holds the instruction about to execute and `slots[1]` the one
/// behind it. `access` is the timing of the next opcode fetch.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub slots: [u32; 2],
    pub access: Access,
}

impl Pipeline {
    /// Pushes a freshly fetched opcode and returns the one leaving the buffer.
    #[inline]
    pub const fn advance(&mut self, fetched: u32) -> u32 {
        let current = self.slots[0];
        self.slots[0] = self.slots[1];
        self.slots[1] = fetched;
        current
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn advance_shifts_slots() {
        let mut pipeline = Pipeline {
            slots: [1, 2],
            access: Access::Sequential,
        };

        assert_eq!(pipeline.advance(3), 1);
        assert_eq!(pipeline.slots, [2, 3]);
    }
}
