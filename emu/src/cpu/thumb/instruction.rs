//! # Thumb instruction decoding
//!
//! Thumb instructions are grouped into 19 formats, identified by their high
//! bits. The lookup table is indexed by bits 15-6, which is enough to tell the
//! formats apart and to carry the opcode of every format.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Format 1:  000 xx          Move shifted register                       │
//! │  Format 2:  00011           Add/subtract                                │
//! │  Format 3:  001 xx          Move/compare/add/subtract immediate         │
//! │  Format 4:  010000          ALU operations                              │
//! │  Format 5:  010001          Hi register operations / BX                 │
//! │  Format 6:  01001           PC-relative load                            │
//! │  Format 7:  0101 xx0        Load/store with register offset             │
//! │  Format 8:  0101 xx1        Load/store sign-extended byte/halfword      │
//! │  Format 9:  011 xx          Load/store with immediate offset            │
//! │  Format 10: 1000 x          Load/store halfword                         │
//! │  Format 11: 1001 x          SP-relative load/store                      │
//! │  Format 12: 1010 x          Load address                                │
//! │  Format 13: 10110000        Add offset to stack pointer                 │
//! │  Format 14: 1011 x10x       Push/pop registers                          │
//! │  Format 15: 1100 x          Multiple load/store                         │
//! │  Format 16: 1101 xxxx       Conditional branch                          │
//! │  Format 17: 11011111        Software interrupt                          │
//! │  Format 18: 11100           Unconditional branch                        │
//! │  Format 19: 1111 x          Long branch with link                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Conditional branches with condition 1110 and everything the table does not
//! name are undefined.
//!
//! ## Long Branch (BL)
//!
//! ```text
//! First:  1111 0xxx xxxx xxxx  ; LR = PC + (offset_hi << 12)
//! Second: 1111 1xxx xxxx xxxx  ; PC = LR + (offset_lo << 1), LR = old_PC | 1
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThumbInstructionKind {
    MoveShiftedRegister,
    AddSubtract,
    MoveCompareAddSubtractImmediate,
    AluOperation,
    HighRegisterOperation,
    PcRelativeLoad,
    LoadStoreRegisterOffset,
    LoadStoreSignExtended,
    LoadStoreImmediateOffset,
    LoadStoreHalfword,
    SpRelativeLoadStore,
    LoadAddress,
    AddOffsetToStackPointer,
    PushPopRegisters,
    MultipleLoadStore,
    ConditionalBranch,
    SoftwareInterrupt,
    UnconditionalBranch,
    LongBranchWithLink,
    Undefined,
}

/// Lookup table index of a raw instruction: bits 15-6.
#[inline]
#[must_use]
pub const fn hash(instruction: u16) -> usize {
    (instruction >> 6) as usize
}

#[must_use]
pub const fn classify(hash: usize) -> ThumbInstructionKind {
    use ThumbInstructionKind::{
        AddOffsetToStackPointer, AddSubtract, AluOperation, ConditionalBranch,
        HighRegisterOperation, LoadAddress, LoadStoreHalfword, LoadStoreImmediateOffset,
        LoadStoreRegisterOffset, LoadStoreSignExtended, LongBranchWithLink,
        MoveCompareAddSubtractImmediate, MoveShiftedRegister, MultipleLoadStore,
        PcRelativeLoad, PushPopRegisters, SoftwareInterrupt, SpRelativeLoadStore, Undefined,
        UnconditionalBranch,
    };

    if hash & 0x3E0 == 0x060 {
        AddSubtract
    } else if hash & 0x380 == 0x000 {
        MoveShiftedRegister
    } else if hash & 0x380 == 0x080 {
        MoveCompareAddSubtractImmediate
    } else if hash & 0x3F0 == 0x100 {
        AluOperation
    } else if hash & 0x3F0 == 0x110 {
        HighRegisterOperation
    } else if hash & 0x3E0 == 0x120 {
        PcRelativeLoad
    } else if hash & 0x3C8 == 0x140 {
        LoadStoreRegisterOffset
    } else if hash & 0x3C8 == 0x148 {
        LoadStoreSignExtended
    } else if hash & 0x380 == 0x180 {
        LoadStoreImmediateOffset
    } else if hash & 0x3C0 == 0x200 {
        LoadStoreHalfword
    } else if hash & 0x3C0 == 0x240 {
        SpRelativeLoadStore
    } else if hash & 0x3C0 == 0x280 {
        LoadAddress
    } else if hash & 0x3FC == 0x2C0 {
        AddOffsetToStackPointer
    } else if hash & 0x3D8 == 0x2D0 {
        PushPopRegisters
    } else if hash & 0x3C0 == 0x300 {
        MultipleLoadStore
    } else if hash & 0x3FC == 0x37C {
        SoftwareInterrupt
    } else if hash & 0x3C0 == 0x340 {
        if hash & 0x3C == 0x38 {
            Undefined
        } else {
            ConditionalBranch
        }
    } else if hash & 0x3E0 == 0x380 {
        UnconditionalBranch
    } else if hash & 0x3C0 == 0x3C0 {
        LongBranchWithLink
    } else {
        Undefined
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decode_every_format() {
        use ThumbInstructionKind::*;

        let cases: [(u16, ThumbInstructionKind); 23] = [
            (0x0088, MoveShiftedRegister),             // lsls r0, r1, #2
            (0x1888, AddSubtract),                     // adds r0, r1, r2
            (0x1E48, AddSubtract),                     // subs r0, r1, #1
            (0x2001, MoveCompareAddSubtractImmediate), // movs r0, #1
            (0x4148, AluOperation),                    // adcs r0, r1
            (0x4770, HighRegisterOperation),           // bx lr
            (0x4801, PcRelativeLoad),                  // ldr r0, [pc, #4]
            (0x5088, LoadStoreRegisterOffset),         // str r0, [r1, r2]
            (0x5E88, LoadStoreSignExtended),           // ldrsh r0, [r1, r2]
            (0x6848, LoadStoreImmediateOffset),        // ldr r0, [r1, #4]
            (0x7848, LoadStoreImmediateOffset),        // ldrb r0, [r1, #1]
            (0x8848, LoadStoreHalfword),               // ldrh r0, [r1, #2]
            (0x9801, SpRelativeLoadStore),             // ldr r0, [sp, #4]
            (0xA801, LoadAddress),                     // add r0, sp, #4
            (0xB081, AddOffsetToStackPointer),         // sub sp, #4
            (0xB500, PushPopRegisters),                // push {lr}
            (0xBD00, PushPopRegisters),                // pop {pc}
            (0xC803, MultipleLoadStore),               // ldmia r0!, {r0, r1}
            (0xD0FE, ConditionalBranch),               // beq .
            (0xDF00, SoftwareInterrupt),               // swi #0
            (0xE7FE, UnconditionalBranch),             // b .
            (0xF000, LongBranchWithLink),              // bl (first half)
            (0xF800, LongBranchWithLink),              // bl (second half)
        ];

        for (instruction, expected) in cases {
            assert_eq!(classify(hash(instruction)), expected, "0x{instruction:04X}");
        }
    }

    #[test]
    fn reserved_encodings_are_undefined() {
        // Condition 1110, BLX suffix, and the gaps in the miscellaneous space.
        for instruction in [0xDE00, 0xE800, 0xB100, 0xB200, 0xBE00] {
            assert_eq!(
                classify(hash(instruction)),
                ThumbInstructionKind::Undefined,
                "0x{instruction:04X}"
            );
        }
    }
}
