//! The 1024 entry Thumb lookup table, built the same way as the ARM one from
//! bits 15-6 of the instruction.

use crate::bus::Bus;
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::hardware::dma::Dma;
use crate::cpu::thumb::instruction::{ThumbInstructionKind, classify};

pub type ThumbHandler<B> = fn(&mut Arm7tdmi<B>, u16);

pub const THUMB_LUT_SIZE: usize = 1024;

const fn flag(instruction: u32, bit: u32) -> bool {
    (instruction >> bit) & 1 != 0
}

impl<B: Bus + Dma> Arm7tdmi<B> {
    pub(crate) const THUMB_LUT: [ThumbHandler<B>; THUMB_LUT_SIZE] = Self::make_thumb_lut();

    const fn make_thumb_lut() -> [ThumbHandler<B>; THUMB_LUT_SIZE] {
        let mut lut: [ThumbHandler<B>; THUMB_LUT_SIZE] = [Self::thumb_undefined; THUMB_LUT_SIZE];
        let mut hash = 0;
        while hash < THUMB_LUT_SIZE {
            lut[hash] = Self::thumb_handler(hash);
            hash += 1;
        }
        lut
    }

    const fn thumb_handler(hash: usize) -> ThumbHandler<B> {
        use ThumbInstructionKind::{
            AddOffsetToStackPointer, AddSubtract, AluOperation, ConditionalBranch,
            HighRegisterOperation, LoadAddress, LoadStoreHalfword, LoadStoreImmediateOffset,
            LoadStoreRegisterOffset, LoadStoreSignExtended, LongBranchWithLink,
            MoveCompareAddSubtractImmediate, MoveShiftedRegister, MultipleLoadStore,
            PcRelativeLoad, PushPopRegisters, SoftwareInterrupt, SpRelativeLoadStore,
            UnconditionalBranch, Undefined,
        };

        let instruction = (hash as u32) << 6;
        let load = flag(instruction, 11);

        match classify(hash) {
            MoveShiftedRegister => specialize!(
                (instruction >> 11) & 0b11,
                |OP| Self::thumb_move_shifted::<OP>,
                [0, 1, 2]
            ),
            AddSubtract => match (flag(instruction, 10), flag(instruction, 9)) {
                (false, false) => Self::thumb_add_subtract::<false, false>,
                (false, true) => Self::thumb_add_subtract::<false, true>,
                (true, false) => Self::thumb_add_subtract::<true, false>,
                (true, true) => Self::thumb_add_subtract::<true, true>,
            },
            MoveCompareAddSubtractImmediate => specialize!(
                (instruction >> 11) & 0b11,
                |OP| Self::thumb_immediate::<OP>,
                [0, 1, 2, 3]
            ),
            AluOperation => specialize!(
                (instruction >> 6) & 0xF,
                |OP| Self::thumb_alu::<OP>,
                [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
            ),
            HighRegisterOperation => specialize!(
                (instruction >> 8) & 0b11,
                |OP| Self::thumb_high_register::<OP>,
                [0, 1, 2, 3]
            ),
            PcRelativeLoad => Self::thumb_load_pc_relative,
            LoadStoreRegisterOffset => specialize!(
                (instruction >> 10) & 0b11,
                |OP| Self::thumb_load_store_register::<OP>,
                [0, 1, 2, 3]
            ),
            LoadStoreSignExtended => specialize!(
                (instruction >> 10) & 0b11,
                |OP| Self::thumb_load_store_sign_extended::<OP>,
                [0, 1, 2, 3]
            ),
            LoadStoreImmediateOffset => match (flag(instruction, 12), load) {
                (false, false) => Self::thumb_load_store_immediate::<false, false>,
                (false, true) => Self::thumb_load_store_immediate::<false, true>,
                (true, false) => Self::thumb_load_store_immediate::<true, false>,
                (true, true) => Self::thumb_load_store_immediate::<true, true>,
            },
            LoadStoreHalfword => {
                if load {
                    Self::thumb_load_store_halfword::<true>
                } else {
                    Self::thumb_load_store_halfword::<false>
                }
            }
            SpRelativeLoadStore => {
                if load {
                    Self::thumb_load_store_sp_relative::<true>
                } else {
                    Self::thumb_load_store_sp_relative::<false>
                }
            }
            LoadAddress => {
                if flag(instruction, 11) {
                    Self::thumb_load_address::<true>
                } else {
                    Self::thumb_load_address::<false>
                }
            }
            AddOffsetToStackPointer => Self::thumb_add_offset_to_sp,
            PushPopRegisters => match (load, flag(instruction, 8)) {
                (false, false) => Self::thumb_push_pop::<false, false>,
                (false, true) => Self::thumb_push_pop::<false, true>,
                (true, false) => Self::thumb_push_pop::<true, false>,
                (true, true) => Self::thumb_push_pop::<true, true>,
            },
            MultipleLoadStore => {
                if load {
                    Self::thumb_load_store_multiple::<true>
                } else {
                    Self::thumb_load_store_multiple::<false>
                }
            }
            ConditionalBranch => specialize!(
                (instruction >> 8) & 0xF,
                |CONDITION| Self::thumb_conditional_branch::<CONDITION>,
                [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13]
            ),
            SoftwareInterrupt => Self::thumb_software_interrupt,
            UnconditionalBranch => Self::thumb_branch,
            LongBranchWithLink => {
                if flag(instruction, 11) {
                    Self::thumb_long_branch_link::<true>
                } else {
                    Self::thumb_long_branch_link::<false>
                }
            }
            Undefined => Self::thumb_undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cpu::arm7tdmi::tests::{step, thumb_cpu};
    use crate::cpu::cpu_modes::Mode;
    use crate::memory::Memory;

    #[test]
    fn every_hash_has_a_handler() {
        assert_eq!(Arm7tdmi::<Memory>::THUMB_LUT.len(), THUMB_LUT_SIZE);

        for h in 0..THUMB_LUT_SIZE {
            let instruction = (h << 6) as u16;
            let mut cpu = thumb_cpu(&[instruction]);

            step(&mut cpu, 1);

            let undefined = classify(h) == ThumbInstructionKind::Undefined;
            assert_eq!(cpu.mode() == Mode::Undefined, undefined, "hash 0x{h:03X}");
            assert_eq!(cpu.run(1), Ok(()));
        }
    }
}
