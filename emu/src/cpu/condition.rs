//! # Condition codes
//!
//! Every ARM instruction carries a condition in bits 31-28 and runs only when
//! the CPSR flags satisfy it. In Thumb state only the conditional branch has
//! one.
//!
//! ```text
//! ┌───────┬────────┬─────────────────────┬──────────────────┐
//! │ Code  │ Suffix │ Meaning             │ Flags tested     │
//! ├───────┼────────┼─────────────────────┼──────────────────┤
//! │ 0000  │   EQ   │ Equal               │ Z=1              │
//! │ 0001  │   NE   │ Not equal           │ Z=0              │
//! │ 0010  │   CS   │ Unsigned ≥          │ C=1              │
//! │ 0011  │   CC   │ Unsigned <          │ C=0              │
//! │ 0100  │   MI   │ Negative            │ N=1              │
//! │ 0101  │   PL   │ Positive or zero    │ N=0              │
//! │ 0110  │   VS   │ Overflow            │ V=1              │
//! │ 0111  │   VC   │ No overflow         │ V=0              │
//! │ 1000  │   HI   │ Unsigned >          │ C=1 and Z=0      │
//! │ 1001  │   LS   │ Unsigned ≤          │ C=0 or Z=1       │
//! │ 1010  │   GE   │ Signed ≥            │ N=V              │
//! │ 1011  │   LT   │ Signed <            │ N≠V              │
//! │ 1100  │   GT   │ Signed >            │ Z=0 and N=V      │
//! │ 1101  │   LE   │ Signed ≤            │ Z=1 or N≠V       │
//! │ 1110  │   AL   │ Always              │                  │
//! │ 1111  │   NV   │ Reserved            │ runs like AL     │
//! └───────┴────────┴─────────────────────┴──────────────────┘
//! ```
//!
//! The ARM7TDMI does not implement the "never" meaning of `1111`: such
//! instructions execute unconditionally.

use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    EQ = 0x0,
    NE = 0x1,
    CS = 0x2,
    CC = 0x3,
    MI = 0x4,
    PL = 0x5,
    VS = 0x6,
    VC = 0x7,
    HI = 0x8,
    LS = 0x9,
    GE = 0xA,
    LT = 0xB,
    GT = 0xC,
    LE = 0xD,
    AL = 0xE,
    NV = 0xF,
}

impl From<u32> for Condition {
    /// Only the low nibble is looked at.
    fn from(item: u32) -> Self {
        match item & 0xF {
            0x0 => Self::EQ,
            0x1 => Self::NE,
            0x2 => Self::CS,
            0x3 => Self::CC,
            0x4 => Self::MI,
            0x5 => Self::PL,
            0x6 => Self::VS,
            0x7 => Self::VC,
            0x8 => Self::HI,
            0x9 => Self::LS,
            0xA => Self::GE,
            0xB => Self::LT,
            0xC => Self::GT,
            0xD => Self::LE,
            0xE => Self::AL,
            _ => Self::NV,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AL => Ok(()),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_nibble() {
        assert_eq!(Condition::from(0x0), Condition::EQ);
        assert_eq!(Condition::from(0xB), Condition::LT);
        assert_eq!(Condition::from(0x1F), Condition::NV);
    }

    #[test]
    fn display_omits_always() {
        assert_eq!(Condition::GE.to_string(), "GE");
        assert_eq!(Condition::AL.to_string(), "");
    }
}
