//! The 4096 entry ARM lookup table.
//!
//! Every entry is built at compile time from the representative instruction
//! [`dehash`] gives back for its index. The bits that select a variant inside
//! a family (load or store, pre or post indexing, the ALU opcode...) become
//! const parameters of the handler, so each variant is its own function.

use crate::bus::Bus;
use crate::cpu::arm::instructions::{ArmInstructionKind, classify, dehash};
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::hardware::dma::Dma;

pub type ArmHandler<B> = fn(&mut Arm7tdmi<B>, u32);

pub const ARM_LUT_SIZE: usize = 4096;

const fn flag(instruction: u32, bit: u32) -> bool {
    (instruction >> bit) & 1 != 0
}

impl<B: Bus + Dma> Arm7tdmi<B> {
    pub(crate) const ARM_LUT: [ArmHandler<B>; ARM_LUT_SIZE] = Self::make_arm_lut();

    const fn make_arm_lut() -> [ArmHandler<B>; ARM_LUT_SIZE] {
        let mut lut: [ArmHandler<B>; ARM_LUT_SIZE] = [Self::arm_undefined; ARM_LUT_SIZE];
        let mut hash = 0;
        while hash < ARM_LUT_SIZE {
            lut[hash] = Self::arm_handler(hash);
            hash += 1;
        }
        lut
    }

    const fn arm_handler(hash: usize) -> ArmHandler<B> {
        use ArmInstructionKind::{
            BlockDataTransfer, Branch, BranchAndExchange, CoprocessorDataOperation,
            CoprocessorDataTransfer, CoprocessorRegisterTransfer, DataProcessing,
            HalfwordDataTransfer, Multiply, MultiplyLong, PsrTransfer, SingleDataSwap,
            SingleDataTransfer, SoftwareInterrupt, Undefined,
        };

        let instruction = dehash(hash);
        match classify(hash) {
            BranchAndExchange => Self::arm_branch_exchange,
            Branch => {
                if flag(instruction, 24) {
                    Self::arm_branch::<true>
                } else {
                    Self::arm_branch::<false>
                }
            }
            Multiply => match (flag(instruction, 21), flag(instruction, 20)) {
                (false, false) => Self::arm_multiply::<false, false>,
                (false, true) => Self::arm_multiply::<false, true>,
                (true, false) => Self::arm_multiply::<true, false>,
                (true, true) => Self::arm_multiply::<true, true>,
            },
            MultiplyLong => match (
                flag(instruction, 22),
                flag(instruction, 21),
                flag(instruction, 20),
            ) {
                (false, false, false) => Self::arm_multiply_long::<false, false, false>,
                (false, false, true) => Self::arm_multiply_long::<false, false, true>,
                (false, true, false) => Self::arm_multiply_long::<false, true, false>,
                (false, true, true) => Self::arm_multiply_long::<false, true, true>,
                (true, false, false) => Self::arm_multiply_long::<true, false, false>,
                (true, false, true) => Self::arm_multiply_long::<true, false, true>,
                (true, true, false) => Self::arm_multiply_long::<true, true, false>,
                (true, true, true) => Self::arm_multiply_long::<true, true, true>,
            },
            SingleDataSwap => {
                if flag(instruction, 22) {
                    Self::arm_single_data_swap::<true>
                } else {
                    Self::arm_single_data_swap::<false>
                }
            }
            HalfwordDataTransfer => {
                let flags = (instruction >> 20) & 0x1F;
                match (instruction >> 5) & 0b11 {
                    1 => Self::halfword_data_transfer::<1>(flags),
                    2 => Self::halfword_data_transfer::<2>(flags),
                    _ => Self::halfword_data_transfer::<3>(flags),
                }
            }
            // MRS ignores bit 25.
            PsrTransfer => match (
                flag(instruction, 25),
                flag(instruction, 22),
                flag(instruction, 21),
            ) {
                (_, false, false) => Self::arm_psr_transfer::<false, false, false>,
                (_, true, false) => Self::arm_psr_transfer::<false, true, false>,
                (false, false, true) => Self::arm_psr_transfer::<false, false, true>,
                (false, true, true) => Self::arm_psr_transfer::<false, true, true>,
                (true, false, true) => Self::arm_psr_transfer::<true, false, true>,
                (true, true, true) => Self::arm_psr_transfer::<true, true, true>,
            },
            DataProcessing => {
                let opcode = (instruction >> 21) & 0xF;
                match (
                    flag(instruction, 25),
                    flag(instruction, 20),
                    flag(instruction, 4),
                ) {
                    (true, false, _) => Self::data_processing::<true, false, false>(opcode),
                    (true, true, _) => Self::data_processing::<true, true, false>(opcode),
                    (false, false, false) => Self::data_processing::<false, false, false>(opcode),
                    (false, false, true) => Self::data_processing::<false, false, true>(opcode),
                    (false, true, false) => Self::data_processing::<false, true, false>(opcode),
                    (false, true, true) => Self::data_processing::<false, true, true>(opcode),
                }
            }
            SingleDataTransfer => specialize!(
                (instruction >> 20) & 0x3F,
                |FLAGS| Self::arm_single_data_transfer::<FLAGS>,
                [
                    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20,
                    21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39,
                    40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58,
                    59, 60, 61, 62, 63,
                ]
            ),
            BlockDataTransfer => specialize!(
                (instruction >> 20) & 0x1F,
                |FLAGS| Self::arm_block_data_transfer::<FLAGS>,
                [
                    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20,
                    21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
                ]
            ),
            SoftwareInterrupt => Self::arm_software_interrupt,
            CoprocessorDataTransfer | CoprocessorDataOperation | CoprocessorRegisterTransfer => {
                Self::arm_coprocessor
            }
            Undefined => Self::arm_undefined,
        }
    }

    const fn data_processing<
        const IMMEDIATE: bool,
        const SET_FLAGS: bool,
        const REGISTER_SHIFT: bool,
    >(
        opcode: u32,
    ) -> ArmHandler<B> {
        specialize!(
            opcode,
            |OPCODE| Self::arm_data_processing::<OPCODE, IMMEDIATE, SET_FLAGS, REGISTER_SHIFT>,
            [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
        )
    }

    const fn halfword_data_transfer<const SH: u32>(flags: u32) -> ArmHandler<B> {
        specialize!(
            flags,
            |FLAGS| Self::arm_halfword_data_transfer::<FLAGS, SH>,
            [
                0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21,
                22, 23, 24, 25, 26, 27, 28, 29, 30, 31,
            ]
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cpu::arm::instructions::hash;
    use crate::cpu::arm7tdmi::tests::{CODE, arm_cpu, step};
    use crate::error::CpuError;

    /// Every hash runs through a handler: coprocessor encodings fault, all
    /// others execute without panicking.
    #[test]
    fn every_hash_has_a_handler() {
        assert_eq!(Arm7tdmi::<crate::memory::Memory>::ARM_LUT.len(), ARM_LUT_SIZE);

        for h in 0..ARM_LUT_SIZE {
            let instruction = 0xE000_0000 | dehash(h);
            assert_eq!(hash(instruction), h);

            let mut cpu = arm_cpu(&[instruction]);
            step(&mut cpu, 1);

            let coprocessor = matches!(
                classify(h),
                ArmInstructionKind::CoprocessorDataTransfer
                    | ArmInstructionKind::CoprocessorDataOperation
                    | ArmInstructionKind::CoprocessorRegisterTransfer
            );
            let faulted = matches!(cpu.run(1), Err(CpuError::Coprocessor { .. }));
            assert_eq!(faulted, coprocessor, "hash 0x{h:03X}");
            if coprocessor {
                assert_eq!(
                    cpu.run(1),
                    Err(CpuError::Coprocessor {
                        instruction,
                        address: CODE
                    })
                );
            }
        }
    }
}
