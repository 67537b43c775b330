//! # ARM instruction decoding
//!
//! The lookup table is indexed by a 12 bit hash made of the bits that tell
//! instruction families apart:
//!
//! ```text
//! 31  28 27        20 19     8 7    4 3    0
//! ┌─────┬────────────┬────────┬──────┬──────┐
//! │cond │  hash 11-4 │        │hash  │      │
//! │     │            │        │ 3-0  │      │
//! └─────┴────────────┴────────┴──────┴──────┘
//! ```
//!
//! ## Decoding priority
//!
//! Some families overlap, so [`classify`] checks them in this order:
//!
//! 1. Branch and Exchange (BX)
//! 2. Branch (B, BL)
//! 3. Multiply (MUL, MLA)
//! 4. Multiply Long (UMULL, UMLAL, SMULL, SMLAL)
//! 5. Single Data Swap (SWP, SWPB)
//! 6. Halfword Data Transfer (LDRH, STRH, LDRSB, LDRSH)
//! 7. PSR Transfer (MRS, MSR)
//! 8. Data Processing
//! 9. Undefined (bits 27-25 = 011 with bit 4 set)
//! 10. Single Data Transfer (LDR, STR)
//! 11. Block Data Transfer (LDM, STM)
//! 12. Software Interrupt
//! 13. Coprocessor data transfer, data operation and register transfer
//!
//! Whatever is left is undefined, so every hash has a family.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmInstructionKind {
    BranchAndExchange,
    Branch,
    Multiply,
    MultiplyLong,
    SingleDataSwap,
    HalfwordDataTransfer,
    PsrTransfer,
    DataProcessing,
    SingleDataTransfer,
    BlockDataTransfer,
    SoftwareInterrupt,
    CoprocessorDataTransfer,
    CoprocessorDataOperation,
    CoprocessorRegisterTransfer,
    Undefined,
}

/// Lookup table index of a raw instruction: bits 27-20 and 7-4.
#[inline]
#[must_use]
pub const fn hash(instruction: u32) -> usize {
    (((instruction >> 16) & 0xFF0) | ((instruction >> 4) & 0xF)) as usize
}

/// Puts the hash bits back at their place in an instruction word.
#[must_use]
pub const fn dehash(hash: usize) -> u32 {
    let hash = hash as u32;
    ((hash & 0xFF0) << 16) | ((hash & 0xF) << 4)
}

#[must_use]
pub const fn classify(hash: usize) -> ArmInstructionKind {
    use ArmInstructionKind::{
        BlockDataTransfer, Branch, BranchAndExchange, CoprocessorDataOperation,
        CoprocessorDataTransfer, CoprocessorRegisterTransfer, DataProcessing,
        HalfwordDataTransfer, Multiply, MultiplyLong, PsrTransfer, SingleDataSwap,
        SingleDataTransfer, SoftwareInterrupt, Undefined,
    };

    if hash & 0xFFF == 0x121 {
        BranchAndExchange
    } else if hash & 0xE00 == 0xA00 {
        Branch
    } else if hash & 0xFCF == 0x009 {
        Multiply
    } else if hash & 0xF8F == 0x089 {
        MultiplyLong
    } else if hash & 0xFBF == 0x109 {
        SingleDataSwap
    } else if hash & 0xE09 == 0x009 {
        let load = hash & 0x010 != 0;
        match (hash >> 1) & 0b11 {
            // SH = 00 is the multiply/swap space, already matched above.
            0 => Undefined,
            1 => HalfwordDataTransfer,
            // LDRD/STRD on later cores.
            _ if !load => Undefined,
            _ => HalfwordDataTransfer,
        }
    } else if hash & 0xD90 == 0x100 {
        PsrTransfer
    } else if hash & 0xC00 == 0x000 {
        DataProcessing
    } else if hash & 0xE01 == 0x601 {
        Undefined
    } else if hash & 0xC00 == 0x400 {
        SingleDataTransfer
    } else if hash & 0xE00 == 0x800 {
        BlockDataTransfer
    } else if hash & 0xF00 == 0xF00 {
        SoftwareInterrupt
    } else if hash & 0xE00 == 0xC00 {
        CoprocessorDataTransfer
    } else if hash & 0xF01 == 0xE00 {
        CoprocessorDataOperation
    } else if hash & 0xF01 == 0xE01 {
        CoprocessorRegisterTransfer
    } else {
        Undefined
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kind(instruction: u32) -> ArmInstructionKind {
        classify(hash(instruction))
    }

    #[test]
    fn decode_common_encodings() {
        use ArmInstructionKind::*;

        let cases = [
            (0xE12F_FF11, BranchAndExchange), // bx r1
            (0xEA00_0000, Branch),            // b
            (0xEB00_0000, Branch),            // bl
            (0xE000_0291, Multiply),          // mul r0, r1, r2
            (0xE020_3291, Multiply),          // mla r0, r1, r2, r3
            (0xE081_0392, MultiplyLong),      // umull r0, r1, r2, r3
            (0xE0E1_0392, MultiplyLong),      // smlal r0, r1, r2, r3
            (0xE102_0091, SingleDataSwap),    // swp r0, r1, [r2]
            (0xE142_0091, SingleDataSwap),    // swpb r0, r1, [r2]
            (0xE1D1_00B2, HalfwordDataTransfer), // ldrh r0, [r1, #2]
            (0xE1C1_00B2, HalfwordDataTransfer), // strh r0, [r1, #2]
            (0xE191_00D2, HalfwordDataTransfer), // ldrsb r0, [r1, r2]
            (0xE1D1_00F0, HalfwordDataTransfer), // ldrsh r0, [r1]
            (0xE10F_0000, PsrTransfer),       // mrs r0, cpsr
            (0xE129_F000, PsrTransfer),       // msr cpsr_fc, r0
            (0xE328_F20F, PsrTransfer),       // msr cpsr_f, #0xF0000000
            (0xE081_0002, DataProcessing),    // add r0, r1, r2
            (0xE1B0_0211, DataProcessing),    // movs r0, r1, lsl r2
            (0xE351_0000, DataProcessing),    // cmp r1, #0
            (0xE591_0000, SingleDataTransfer), // ldr r0, [r1]
            (0xE7C1_0002, SingleDataTransfer), // strb r0, [r1, r2]
            (0xE8BD_8000, BlockDataTransfer), // pop {pc}
            (0xE92D_4000, BlockDataTransfer), // push {lr}
            (0xEF00_0000, SoftwareInterrupt),
            (0xED90_0100, CoprocessorDataTransfer),
            (0xEE00_0000, CoprocessorDataOperation),
            (0xEE10_0010, CoprocessorRegisterTransfer),
            (0xE600_0010, Undefined),
        ];

        for (instruction, expected) in cases {
            assert_eq!(kind(instruction), expected, "0x{instruction:08X}");
        }
    }

    #[test]
    fn test_opcodes_without_s_are_psr_transfers() {
        // tst/teq/cmp/cmn with S clear are MRS/MSR encodings.
        for opcode in 0b1000..=0b1011 {
            let instruction = 0xE000_0000 | (opcode << 21);
            assert_eq!(kind(instruction), ArmInstructionKind::PsrTransfer);
            assert_eq!(kind(instruction | 1 << 20), ArmInstructionKind::DataProcessing);
        }
    }

    #[test]
    fn signed_halfword_store_is_undefined() {
        // strsb / strsh encodings
        assert_eq!(kind(0xE1C1_00D0), ArmInstructionKind::Undefined);
        assert_eq!(kind(0xE1C1_00F0), ArmInstructionKind::Undefined);
    }

    #[test]
    fn dehash_round_trip() {
        for h in 0..4096 {
            assert_eq!(hash(dehash(h)), h);
        }
    }
}
