//! Thumb instruction handlers, one per format.
//!
//! r15 reads as the executing address + 4. PC-relative loads and load address
//! clear bit 1 of it first.

use crate::bitwise::Bits;
use crate::bus::{Access, Bus};
use crate::cpu::alu;
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::condition::Condition;
use crate::cpu::hardware::dma::Dma;
use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER, REG_SP};
use crate::cpu::shifter::{self, ShiftKind};

const AND: u32 = 0x0;
const EOR: u32 = 0x1;
const LSL: u32 = 0x2;
const LSR: u32 = 0x3;
const ASR: u32 = 0x4;
const ADC: u32 = 0x5;
const SBC: u32 = 0x6;
const ROR: u32 = 0x7;
const TST: u32 = 0x8;
const NEG: u32 = 0x9;
const CMP: u32 = 0xA;
const CMN: u32 = 0xB;
const ORR: u32 = 0xC;
const MUL: u32 = 0xD;
const BIC: u32 = 0xE;
const MVN: u32 = 0xF;

/// Low register (r0-r7) field starting at `lowest_bit`.
fn low(instruction: u32, lowest_bit: u8) -> usize {
    instruction.get_bits(lowest_bit..=lowest_bit + 2) as usize
}

impl<B: Bus + Dma> Arm7tdmi<B> {
    /// Format 1: LSL, LSR and ASR by an immediate.
    pub(crate) fn thumb_move_shifted<const OP: u32>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let amount = instruction.get_bits(6..=10);
        let value = self.registers[low(instruction, 3)];

        let result =
            shifter::shift::<true>(ShiftKind::from(OP), &mut self.cpsr, value, amount, true);
        self.registers[low(instruction, 0)] = alu::log(&mut self.cpsr, result, true);
    }

    /// Format 2: ADD and SUB with a register or a 3 bit immediate.
    pub(crate) fn thumb_add_subtract<const IMMEDIATE: bool, const SUBTRACT: bool>(
        &mut self,
        instruction: u16,
    ) {
        let instruction = u32::from(instruction);
        let operand = if IMMEDIATE {
            instruction.get_bits(6..=8)
        } else {
            self.registers[low(instruction, 6)]
        };
        let source = self.registers[low(instruction, 3)];

        self.registers[low(instruction, 0)] = if SUBTRACT {
            alu::sub(&mut self.cpsr, source, operand, true)
        } else {
            alu::add(&mut self.cpsr, source, operand, true)
        };
    }

    /// Format 3: MOV, CMP, ADD and SUB with an 8 bit immediate.
    pub(crate) fn thumb_immediate<const OP: u32>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let rd = low(instruction, 8);
        let immediate = instruction.get_bits(0..=7);
        let value = self.registers[rd];

        match OP {
            0 => self.registers[rd] = alu::log(&mut self.cpsr, immediate, true),
            1 => {
                alu::sub(&mut self.cpsr, value, immediate, true);
            }
            2 => self.registers[rd] = alu::add(&mut self.cpsr, value, immediate, true),
            _ => self.registers[rd] = alu::sub(&mut self.cpsr, value, immediate, true),
        }
    }

    /// Format 4: register to register ALU operations.
    pub(crate) fn thumb_alu<const OP: u32>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let rd = low(instruction, 0);
        let destination = self.registers[rd];
        let source = self.registers[low(instruction, 3)];

        let result = match OP {
            AND | TST => alu::log(&mut self.cpsr, destination & source, true),
            EOR => alu::log(&mut self.cpsr, destination ^ source, true),
            LSL | LSR | ASR | ROR => {
                let kind = match OP {
                    LSL => ShiftKind::Lsl,
                    LSR => ShiftKind::Lsr,
                    ASR => ShiftKind::Asr,
                    _ => ShiftKind::Ror,
                };
                let shifted =
                    shifter::shift::<false>(kind, &mut self.cpsr, destination, source & 0xFF, true);
                self.idle();
                alu::log(&mut self.cpsr, shifted, true)
            }
            ADC => alu::adc(&mut self.cpsr, destination, source, true),
            SBC => alu::sbc(&mut self.cpsr, destination, source, true),
            NEG => alu::sub(&mut self.cpsr, 0, source, true),
            CMP => alu::sub(&mut self.cpsr, destination, source, true),
            CMN => alu::add(&mut self.cpsr, destination, source, true),
            ORR => alu::log(&mut self.cpsr, destination | source, true),
            MUL => {
                self.tick_multiply(destination, true);
                alu::log(&mut self.cpsr, destination.wrapping_mul(source), true)
            }
            BIC => alu::log(&mut self.cpsr, destination & !source, true),
            MVN => alu::log(&mut self.cpsr, !source, true),
            _ => unreachable!("thumb ALU opcode has four bits"),
        };

        if !matches!(OP, TST | CMP | CMN) {
            self.registers[rd] = result;
        }
    }

    /// Format 5: ADD, CMP and MOV on the full register set, and BX.
    pub(crate) fn thumb_high_register<const OP: u32>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let rd = low(instruction, 0) | (usize::from(instruction.get_bit(7)) << 3);
        let rs = instruction.get_bits(3..=6) as usize;
        let source = self.registers[rs];

        match OP {
            0 => {
                let result = self.registers[rd].wrapping_add(source);
                self.write_high_register(rd, result);
            }
            1 => {
                alu::sub(&mut self.cpsr, self.registers[rd], source, true);
            }
            2 => self.write_high_register(rd, source),
            _ => self.branch_exchange(source),
        }
    }

    fn write_high_register(&mut self, rd: usize, value: u32) {
        if rd == REG_PROGRAM_COUNTER {
            self.registers.set_program_counter(value & !1);
            self.flush_half();
        } else {
            self.registers[rd] = value;
        }
    }

    /// Format 6: LDR rd, [pc, #imm].
    pub(crate) fn thumb_load_pc_relative(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let address = (self.registers.program_counter() & !2)
            .wrapping_add(instruction.get_bits(0..=7) << 2);

        let value = self.read_word(address, Access::NonSequential);
        self.idle();
        self.registers[low(instruction, 8)] = value;
    }

    /// Format 7: STR, STRB, LDR and LDRB with a register offset.
    pub(crate) fn thumb_load_store_register<const OP: u32>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let rd = low(instruction, 0);
        let address = self.registers[low(instruction, 3)]
            .wrapping_add(self.registers[low(instruction, 6)]);

        match OP {
            0 => self.write_word(address, self.registers[rd], Access::NonSequential),
            1 => self.write_byte(address, self.registers[rd] as u8, Access::NonSequential),
            2 => {
                self.registers[rd] = self.read_word_rotate(address, Access::NonSequential);
                self.idle();
            }
            _ => {
                self.registers[rd] = u32::from(self.read_byte(address, Access::NonSequential));
                self.idle();
            }
        }
    }

    /// Format 8: STRH, LDSB, LDRH and LDSH with a register offset.
    pub(crate) fn thumb_load_store_sign_extended<const OP: u32>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let rd = low(instruction, 0);
        let address = self.registers[low(instruction, 3)]
            .wrapping_add(self.registers[low(instruction, 6)]);

        let value = match OP {
            0 => {
                self.write_half(address, self.registers[rd] as u16, Access::NonSequential);
                return;
            }
            1 => self.read_byte_sign_ex(address, Access::NonSequential),
            2 => self.read_half_rotate(address, Access::NonSequential),
            _ => self.read_half_sign_ex(address, Access::NonSequential),
        };
        self.idle();
        self.registers[rd] = value;
    }

    /// Format 9: STR, LDR, STRB and LDRB with a 5 bit immediate offset.
    pub(crate) fn thumb_load_store_immediate<const BYTE: bool, const LOAD: bool>(
        &mut self,
        instruction: u16,
    ) {
        let instruction = u32::from(instruction);
        let rd = low(instruction, 0);
        let offset = instruction.get_bits(6..=10);
        let base = self.registers[low(instruction, 3)];

        if BYTE {
            let address = base.wrapping_add(offset);
            if LOAD {
                self.registers[rd] = u32::from(self.read_byte(address, Access::NonSequential));
                self.idle();
            } else {
                self.write_byte(address, self.registers[rd] as u8, Access::NonSequential);
            }
        } else {
            let address = base.wrapping_add(offset << 2);
            if LOAD {
                self.registers[rd] = self.read_word_rotate(address, Access::NonSequential);
                self.idle();
            } else {
                self.write_word(address, self.registers[rd], Access::NonSequential);
            }
        }
    }

    /// Format 10: STRH and LDRH with a 5 bit immediate offset.
    pub(crate) fn thumb_load_store_halfword<const LOAD: bool>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let rd = low(instruction, 0);
        let address = self.registers[low(instruction, 3)]
            .wrapping_add(instruction.get_bits(6..=10) << 1);

        if LOAD {
            self.registers[rd] = self.read_half_rotate(address, Access::NonSequential);
            self.idle();
        } else {
            self.write_half(address, self.registers[rd] as u16, Access::NonSequential);
        }
    }

    /// Format 11: STR and LDR relative to SP.
    pub(crate) fn thumb_load_store_sp_relative<const LOAD: bool>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let rd = low(instruction, 8);
        let address = self.registers[REG_SP].wrapping_add(instruction.get_bits(0..=7) << 2);

        if LOAD {
            self.registers[rd] = self.read_word_rotate(address, Access::NonSequential);
            self.idle();
        } else {
            self.write_word(address, self.registers[rd], Access::NonSequential);
        }
    }

    /// Format 12: ADD rd, pc/sp, #imm.
    pub(crate) fn thumb_load_address<const SP: bool>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let base = if SP {
            self.registers[REG_SP]
        } else {
            self.registers.program_counter() & !2
        };
        self.registers[low(instruction, 8)] = base.wrapping_add(instruction.get_bits(0..=7) << 2);
    }

    /// Format 13: ADD sp, #±imm.
    pub(crate) fn thumb_add_offset_to_sp(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let offset = instruction.get_bits(0..=6) << 2;
        let sp = self.registers[REG_SP];

        self.registers[REG_SP] = if instruction.get_bit(7) {
            sp.wrapping_sub(offset)
        } else {
            sp.wrapping_add(offset)
        };
    }

    /// Format 14: PUSH {rlist, lr} and POP {rlist, pc}.
    pub(crate) fn thumb_push_pop<const POP: bool, const PC_LR: bool>(&mut self, instruction: u16) {
        let list = u32::from(instruction).get_bits(0..=7);
        let sp = self.registers[REG_SP];
        let mut access = Access::NonSequential;

        if POP {
            let mut address = sp;
            for r in list.ones() {
                self.registers[r] = self.read_word(address, access);
                access = Access::Sequential;
                address = address.wrapping_add(4);
            }
            if PC_LR || list == 0 {
                let pc = self.read_word(address, access);
                self.registers.set_program_counter(pc & !1);
                self.flush_half();
                address = address.wrapping_add(if PC_LR { 4 } else { 0x40 });
            }
            self.idle();
            self.registers[REG_SP] = address;
        } else {
            let start = if list == 0 && !PC_LR {
                sp.wrapping_sub(0x40)
            } else {
                sp.wrapping_sub(4 * (list.count_ones() + u32::from(PC_LR)))
            };

            let mut address = start;
            for r in list.ones() {
                self.write_word(address, self.registers[r], access);
                access = Access::Sequential;
                address = address.wrapping_add(4);
            }
            if PC_LR {
                self.write_word(address, self.registers[REG_LR], access);
            } else if list == 0 {
                let pc = self.registers.program_counter().wrapping_add(2);
                self.write_word(address, pc, access);
            }
            self.registers[REG_SP] = start;
        }
    }

    /// Format 15: LDMIA and STMIA with write-back.
    pub(crate) fn thumb_load_store_multiple<const LOAD: bool>(&mut self, instruction: u16) {
        let instruction = u32::from(instruction);
        let rb = low(instruction, 8);
        let list = instruction.get_bits(0..=7);
        let base = self.registers[rb];

        if list == 0 {
            if LOAD {
                let pc = self.read_word(base, Access::NonSequential);
                self.idle();
                self.registers.set_program_counter(pc & !1);
                self.flush_half();
            } else {
                let pc = self.registers.program_counter().wrapping_add(2);
                self.write_word(base, pc, Access::NonSequential);
            }
            self.registers[rb] = base.wrapping_add(0x40);
            return;
        }

        let new_base = base.wrapping_add(4 * list.count_ones());
        let lowest = list.trailing_zeros() as usize;
        let mut address = base;
        let mut access = Access::NonSequential;
        for r in list.ones() {
            if LOAD {
                self.registers[r] = self.read_word(address, access);
            } else {
                let value = if r == rb && r != lowest {
                    new_base
                } else {
                    self.registers[r]
                };
                self.write_word(address, value, access);
            }
            access = Access::Sequential;
            address = address.wrapping_add(4);
        }

        if LOAD {
            self.idle();
            if list.get_bit(rb as u8) {
                return;
            }
        }
        self.registers[rb] = new_base;
    }

    /// Format 16: B{cond} with a signed 8 bit half-word offset.
    pub(crate) fn thumb_conditional_branch<const CONDITION: u32>(&mut self, instruction: u16) {
        if !self.cpsr.check(Condition::from(CONDITION)) {
            return;
        }
        let offset = u32::from(instruction).get_bits(0..=7).sign_extended(8) << 1;
        let target = self.registers.program_counter().wrapping_add(offset);
        self.registers.set_program_counter(target);
        self.flush_half();
    }

    /// Format 17.
    pub(crate) fn thumb_software_interrupt(&mut self, _instruction: u16) {
        self.interrupt_sw();
    }

    /// Format 18: B with a signed 11 bit half-word offset.
    pub(crate) fn thumb_branch(&mut self, instruction: u16) {
        let offset = u32::from(instruction).get_bits(0..=10).sign_extended(11) << 1;
        let target = self.registers.program_counter().wrapping_add(offset);
        self.registers.set_program_counter(target);
        self.flush_half();
    }

    /// Format 19: the two halves of BL.
    pub(crate) fn thumb_long_branch_link<const SECOND: bool>(&mut self, instruction: u16) {
        let offset = u32::from(instruction).get_bits(0..=10);
        let pc = self.registers.program_counter();

        if SECOND {
            let return_address = pc.wrapping_sub(2) | 1;
            let target = self.registers[REG_LR].wrapping_add(offset << 1);
            self.registers.set_program_counter(target);
            self.registers[REG_LR] = return_address;
            self.flush_half();
        } else {
            self.registers[REG_LR] = pc.wrapping_add(offset.sign_extended(11) << 12);
        }
    }

    pub(crate) fn thumb_undefined(&mut self, instruction: u16) {
        self.undefined_instruction(u32::from(instruction));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::bus::Access;
    use crate::cpu::arm7tdmi::tests::{CODE, step, thumb_cpu};

    const DATA: u32 = 0x0300_1000;
    const NOP: u16 = 0x46C0;

    #[test]
    fn shift_by_immediate() {
        // lsls r0, r1, #2 ; lsrs r2, r1, #0
        let mut cpu = thumb_cpu(&[0x0088, 0x080A]);
        cpu.registers[1] = 0x8000_0001;

        step(&mut cpu, 1);
        assert_eq!(cpu.register(0), 4);
        assert!(!cpu.cpsr().carry_flag());

        step(&mut cpu, 1);
        assert_eq!(cpu.register(2), 0);
        assert!(cpu.cpsr().carry_flag());
        assert!(cpu.cpsr().zero_flag());
    }

    #[test]
    fn add_subtract() {
        // adds r0, r1, r2 ; subs r3, r1, #1
        let mut cpu = thumb_cpu(&[0x1888, 0x1E4B]);
        cpu.registers[1] = 0xFFFF_FFFF;
        cpu.registers[2] = 1;

        step(&mut cpu, 1);
        assert_eq!(cpu.register(0), 0);
        assert!(cpu.cpsr().carry_flag());
        assert!(cpu.cpsr().zero_flag());

        step(&mut cpu, 1);
        assert_eq!(cpu.register(3), 0xFFFF_FFFE);
        assert!(cpu.cpsr().sign_flag());
        assert!(cpu.cpsr().carry_flag());
    }

    #[test]
    fn immediate_operations() {
        // movs r0, #0xFF ; cmp r0, #0xFF ; adds r1, #1 ; subs r1, #2
        let mut cpu = thumb_cpu(&[0x20FF, 0x28FF, 0x3101, 0x3902]);

        step(&mut cpu, 2);
        assert_eq!(cpu.register(0), 0xFF);
        assert!(cpu.cpsr().zero_flag());

        step(&mut cpu, 2);
        assert_eq!(cpu.register(1), 0xFFFF_FFFF);
        assert!(!cpu.cpsr().carry_flag());
    }

    #[test]
    fn alu_operations() {
        // (instruction, r0, r1, expected r0)
        let cases: [(u16, u32, u32, u32); 10] = [
            (0x4008, 0b1100, 0b1010, 0b1000),    // ands
            (0x4048, 0b1100, 0b1010, 0b0110),    // eors
            (0x4088, 1, 4, 16),                  // lsls r0, r1
            (0x40C8, 0x80, 4, 0x8),              // lsrs r0, r1
            (0x4108, 0x8000_0000, 4, 0xF800_0000), // asrs r0, r1
            (0x41C8, 0x1, 1, 0x8000_0000),       // rors r0, r1
            (0x4248, 0, 1, 0xFFFF_FFFF),         // negs r0, r1
            (0x4308, 0b1100, 0b0011, 0b1111),    // orrs
            (0x4348, 6, 7, 42),                  // muls r0, r1
            (0x4388, 0b1111, 0b0101, 0b1010),    // bics
        ];

        for (instruction, r0, r1, expected) in cases {
            let mut cpu = thumb_cpu(&[instruction]);
            cpu.registers[0] = r0;
            cpu.registers[1] = r1;

            step(&mut cpu, 1);

            assert_eq!(cpu.register(0), expected, "0x{instruction:04X}");
        }
    }

    #[test]
    fn alu_register_shift_saturates() {
        // lsls r0, r1 with r1 = 32
        let mut cpu = thumb_cpu(&[0x4088]);
        cpu.registers[0] = 0x0000_0001;
        cpu.registers[1] = 32;

        step(&mut cpu, 1);

        assert_eq!(cpu.register(0), 0);
        assert!(cpu.cpsr().carry_flag());
        assert!(cpu.cpsr().zero_flag());
    }

    #[test]
    fn alu_compare_and_test_do_not_write() {
        // tst r0, r1 ; cmp r0, r1 ; cmn r0, r1
        let mut cpu = thumb_cpu(&[0x4208, 0x4288, 0x42C8]);
        cpu.registers[0] = 5;
        cpu.registers[1] = 0xFFFF_FFFB;

        step(&mut cpu, 1);
        assert!(!cpu.cpsr().zero_flag());
        step(&mut cpu, 1);
        assert!(!cpu.cpsr().carry_flag());
        step(&mut cpu, 1);
        assert!(cpu.cpsr().zero_flag());
        assert!(cpu.cpsr().carry_flag());

        assert_eq!(cpu.register(0), 5);
    }

    #[test]
    fn adc_sbc_and_mvn() {
        // adcs r0, r1 ; sbcs r2, r1 ; mvns r3, r1
        let mut cpu = thumb_cpu(&[0x4148, 0x418A, 0x43CB]);
        cpu.cpsr.set_carry_flag(true);
        cpu.registers[0] = 1;
        cpu.registers[1] = 1;
        cpu.registers[2] = 5;

        step(&mut cpu, 1);
        assert_eq!(cpu.register(0), 3);
        // No carry out of the ADC, so SBC borrows.
        step(&mut cpu, 1);
        assert_eq!(cpu.register(2), 3);
        step(&mut cpu, 1);
        assert_eq!(cpu.register(3), 0xFFFF_FFFE);
    }

    #[test]
    fn high_register_operations() {
        // add r8, r0 ; mov r1, r8 ; cmp r8, r9
        let mut cpu = thumb_cpu(&[0x4480, 0x4641, 0x45C8]);
        cpu.registers[0] = 5;
        cpu.registers[8] = 10;
        cpu.registers[9] = 15;
        let flags = cpu.cpsr().bits();

        step(&mut cpu, 1);
        assert_eq!(cpu.register(8), 15);
        assert_eq!(cpu.cpsr().bits(), flags);

        step(&mut cpu, 1);
        assert_eq!(cpu.register(1), 15);

        step(&mut cpu, 1);
        assert!(cpu.cpsr().zero_flag());
    }

    #[test]
    fn mov_to_pc_branches() {
        // mov pc, r0
        let mut cpu = thumb_cpu(&[0x4687]);
        cpu.registers[0] = CODE + 0x41;

        step(&mut cpu, 1);

        assert!(cpu.is_thumb());
        assert_eq!(cpu.register(15), CODE + 0x44);
    }

    #[test]
    fn bx_to_arm() {
        // bx r0
        let mut cpu = thumb_cpu(&[0x4700]);
        cpu.registers[0] = CODE + 0x20;
        cpu.write_word(CODE + 0x20, 0xE3A0_1005, Access::NonSequential);

        step(&mut cpu, 1);
        assert!(!cpu.is_thumb());
        assert_eq!(cpu.register(15), CODE + 0x28);

        // mov r1, #5
        step(&mut cpu, 1);
        assert_eq!(cpu.register(1), 5);
    }

    #[test]
    fn bx_pc_from_misaligned_address_lands_aligned() {
        // nop ; bx pc
        let mut cpu = thumb_cpu(&[NOP, 0x4778, NOP, NOP]);

        step(&mut cpu, 2);

        assert!(!cpu.is_thumb());
        // r15 read CODE + 6, which the ARM refill aligns down to CODE + 4.
        assert_eq!(cpu.register(15), CODE + 12);
    }

    #[test]
    fn pc_relative_load_aligns_pc() {
        // ldr r0, [pc, #4] ; ldr r1, [pc, #4]
        let mut cpu = thumb_cpu(&[0x4801, 0x4901, NOP, NOP, 0x5678, 0x1234]);

        step(&mut cpu, 2);

        assert_eq!(cpu.register(0), 0x1234_5678);
        assert_eq!(cpu.register(1), 0x1234_5678);
    }

    #[test]
    fn register_offset_transfers() {
        // str r0, [r1, r2] ; ldrb r3, [r1, r2] ; strh r0, [r1, r2] ; ldsb r4, [r1, r2] ; ldrh r5, [r1, r2] ; ldsh r6, [r1, r2]
        let mut cpu = thumb_cpu(&[0x5088, 0x5C8B, 0x5288, 0x568C, 0x5A8D, 0x5E8E]);
        cpu.registers[0] = 0x1234_80F0;
        cpu.registers[1] = DATA;
        cpu.registers[2] = 4;

        step(&mut cpu, 2);
        assert_eq!(cpu.read_word(DATA + 4, Access::NonSequential), 0x1234_80F0);
        assert_eq!(cpu.register(3), 0xF0);

        cpu.write_word(DATA + 4, 0, Access::NonSequential);
        step(&mut cpu, 4);
        assert_eq!(cpu.read_word(DATA + 4, Access::NonSequential), 0x80F0);
        assert_eq!(cpu.register(4), 0xFFFF_FFF0);
        assert_eq!(cpu.register(5), 0x80F0);
        assert_eq!(cpu.register(6), 0xFFFF_80F0);
    }

    #[test]
    fn immediate_offset_transfers() {
        // str r0, [r1, #4] ; ldr r2, [r1, #4] ; strb r0, [r1, #1] ; ldrb r3, [r1, #1]
        let mut cpu = thumb_cpu(&[0x6048, 0x684A, 0x7048, 0x784B]);
        cpu.registers[0] = 0xCAFE_BABE;
        cpu.registers[1] = DATA;

        step(&mut cpu, 4);

        assert_eq!(cpu.register(2), 0xCAFE_BABE);
        assert_eq!(cpu.register(3), 0xBE);
        assert_eq!(cpu.read_word(DATA, Access::NonSequential), 0x0000_BE00);
    }

    #[test]
    fn halfword_immediate_transfers() {
        // strh r0, [r1, #2] ; ldrh r2, [r1, #2]
        let mut cpu = thumb_cpu(&[0x8048, 0x884A]);
        cpu.registers[0] = 0xAAAA_BBBB;
        cpu.registers[1] = DATA;

        step(&mut cpu, 2);

        assert_eq!(cpu.read_word(DATA, Access::NonSequential), 0xBBBB_0000);
        assert_eq!(cpu.register(2), 0xBBBB);
    }

    #[test]
    fn sp_relative_and_load_address() {
        // str r0, [sp, #4] ; ldr r1, [sp, #4] ; add r2, pc, #4 ; add r3, sp, #8
        let mut cpu = thumb_cpu(&[0x9001, 0x9901, 0xA201, 0xAB02]);
        cpu.registers[0] = 0x600D;
        cpu.registers[13] = DATA;

        step(&mut cpu, 4);

        assert_eq!(cpu.register(1), 0x600D);
        // Executed at CODE + 4, r15 = CODE + 8.
        assert_eq!(cpu.register(2), CODE + 12);
        assert_eq!(cpu.register(3), DATA + 8);
    }

    #[test]
    fn adjust_stack_pointer() {
        // add sp, #8 ; sub sp, #4
        let mut cpu = thumb_cpu(&[0xB002, 0xB081]);
        cpu.registers[13] = DATA;

        step(&mut cpu, 1);
        assert_eq!(cpu.register(13), DATA + 8);
        step(&mut cpu, 1);
        assert_eq!(cpu.register(13), DATA + 4);
    }

    #[test]
    fn push_and_pop() {
        // push {r0, r1, lr} ; pop {r2, r3, pc}
        let mut cpu = thumb_cpu(&[0xB503, 0xBD0C]);
        cpu.registers[0] = 10;
        cpu.registers[1] = 11;
        cpu.registers[13] = DATA;
        cpu.registers[14] = CODE + 0x81;

        step(&mut cpu, 1);
        assert_eq!(cpu.register(13), DATA - 12);
        assert_eq!(cpu.read_word(DATA - 4, Access::NonSequential), CODE + 0x81);

        step(&mut cpu, 1);
        assert_eq!(cpu.register(2), 10);
        assert_eq!(cpu.register(3), 11);
        assert_eq!(cpu.register(13), DATA);
        assert!(cpu.is_thumb());
        assert_eq!(cpu.register(15), CODE + 0x84);
    }

    #[test]
    fn empty_push_and_pop() {
        // push {} ; pop {}
        let mut cpu = thumb_cpu(&[0xB400, 0xBC00]);
        cpu.registers[13] = DATA;

        step(&mut cpu, 1);
        assert_eq!(cpu.register(13), DATA - 0x40);
        assert_eq!(cpu.read_word(DATA - 0x40, Access::NonSequential), CODE + 6);

        cpu.write_word(DATA - 0x40, CODE + 0x20, Access::NonSequential);
        step(&mut cpu, 1);
        assert_eq!(cpu.register(13), DATA);
        assert_eq!(cpu.register(15), CODE + 0x24);
    }

    #[test]
    fn load_store_multiple() {
        // stmia r0!, {r1, r2} ; ldmia r3!, {r4, r5}
        let mut cpu = thumb_cpu(&[0xC006, 0xCB30]);
        cpu.registers[0] = DATA;
        cpu.registers[1] = 1;
        cpu.registers[2] = 2;
        cpu.registers[3] = DATA;

        step(&mut cpu, 2);

        assert_eq!(cpu.register(0), DATA + 8);
        assert_eq!(cpu.register(3), DATA + 8);
        assert_eq!((cpu.register(4), cpu.register(5)), (1, 2));
    }

    #[test]
    fn load_store_multiple_with_base_in_list() {
        // stmia r0!, {r0, r1} ; stmia r2!, {r1, r2} ; ldmia r3!, {r3, r4}
        let mut cpu = thumb_cpu(&[0xC003, 0xC206, 0xCB18]);
        cpu.registers[0] = DATA;
        cpu.registers[2] = DATA + 0x10;
        cpu.registers[3] = DATA + 0x10;

        step(&mut cpu, 2);
        assert_eq!(cpu.read_word(DATA, Access::NonSequential), DATA);
        assert_eq!(cpu.read_word(DATA + 0x14, Access::NonSequential), DATA + 0x18);

        step(&mut cpu, 1);
        assert_eq!(cpu.register(3), 0);
        assert_eq!(cpu.register(4), DATA + 0x18);
    }

    #[test]
    fn empty_list_multiple_transfers() {
        // stmia r0!, {}
        let mut cpu = thumb_cpu(&[0xC000]);
        cpu.registers[0] = DATA;

        step(&mut cpu, 1);

        assert_eq!(cpu.read_word(DATA, Access::NonSequential), CODE + 6);
        assert_eq!(cpu.register(0), DATA + 0x40);
    }

    #[test]
    fn conditional_branch() {
        // beq +4 ; bne +4 (not taken)
        let mut cpu = thumb_cpu(&[0xD002]);
        cpu.cpsr.set_zero_flag(true);
        step(&mut cpu, 1);
        assert_eq!(cpu.register(15), CODE + 12);

        let mut cpu = thumb_cpu(&[0xD102]);
        cpu.cpsr.set_zero_flag(true);
        step(&mut cpu, 1);
        assert_eq!(cpu.register(15), CODE + 6);
    }

    #[test]
    fn unconditional_branch_to_itself() {
        // b .
        let mut cpu = thumb_cpu(&[0xE7FE]);

        step(&mut cpu, 3);

        assert_eq!(cpu.register(15), CODE + 4);
    }

    #[test]
    fn long_branch_with_link() {
        // bl CODE + 8
        let mut cpu = thumb_cpu(&[0xF000, 0xF802]);

        step(&mut cpu, 2);

        assert_eq!(cpu.register(14), CODE + 5);
        assert_eq!(cpu.register(15), CODE + 12);
    }

    #[test]
    fn long_branch_with_link_backwards() {
        // bl CODE
        let mut cpu = thumb_cpu(&[0xF7FF, 0xFFFE]);

        step(&mut cpu, 2);

        assert_eq!(cpu.register(14), CODE + 5);
        assert_eq!(cpu.register(15), CODE + 4);
    }
}
