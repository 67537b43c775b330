//! ARM instruction handlers.
//!
//! r15 reads as the executing address + 8 everywhere, except for data
//! processing with a register-specified shift where an extra internal cycle
//! has already moved it to + 12.

use crate::bitwise::Bits;
use crate::bus::{Access, Bus};
use crate::cpu::alu;
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::hardware::dma::Dma;
use crate::cpu::psr::{CONTROL_MASK, EXTENSION_MASK, FLAGS_MASK, STATE_BIT_MASK, STATUS_MASK};
use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER};
use crate::cpu::shifter::{self, ShiftKind};
use crate::error::CpuError;

const AND: u32 = 0b0000;
const EOR: u32 = 0b0001;
const SUB: u32 = 0b0010;
const RSB: u32 = 0b0011;
const ADD: u32 = 0b0100;
const ADC: u32 = 0b0101;
const SBC: u32 = 0b0110;
const RSC: u32 = 0b0111;
const TST: u32 = 0b1000;
const TEQ: u32 = 0b1001;
const CMP: u32 = 0b1010;
const CMN: u32 = 0b1011;
const ORR: u32 = 0b1100;
const MOV: u32 = 0b1101;
const BIC: u32 = 0b1110;
const MVN: u32 = 0b1111;

/// Register fields of the ARM encodings.
fn reg(instruction: u32, lowest_bit: u8) -> usize {
    instruction.get_bits(lowest_bit..=lowest_bit + 3) as usize
}

impl<B: Bus + Dma> Arm7tdmi<B> {
    pub(crate) fn arm_branch_exchange(&mut self, instruction: u32) {
        let address = self.registers[reg(instruction, 0)];
        self.branch_exchange(address);
    }

    pub(crate) fn arm_branch<const LINK: bool>(&mut self, instruction: u32) {
        let offset = instruction.get_bits(0..=23).sign_extended(24) << 2;
        let pc = self.registers.program_counter();

        if LINK {
            self.registers[REG_LR] = pc.wrapping_sub(4);
        }
        self.registers.set_program_counter(pc.wrapping_add(offset));
        self.flush_word();
    }

    pub(crate) fn arm_data_processing<
        const OPCODE: u32,
        const IMMEDIATE: bool,
        const SET_FLAGS: bool,
        const REGISTER_SHIFT: bool,
    >(
        &mut self,
        instruction: u32,
    ) {
        let test = matches!(OPCODE, TST | TEQ | CMP | CMN);
        let logical = matches!(OPCODE, AND | EOR | TST | TEQ | ORR | MOV | BIC | MVN);

        let rd = reg(instruction, 12);
        let rn = reg(instruction, 16);
        let flags = test || (SET_FLAGS && rd != REG_PROGRAM_COUNTER);
        // The shifter carry only reaches C through logical operations.
        let shifter_carry = flags && logical;

        let mut op1 = self.registers[rn];
        let op2 = if IMMEDIATE {
            let value = instruction.get_bits(0..=7);
            let amount = instruction.get_bits(8..=11) * 2;
            if amount == 0 {
                value
            } else {
                shifter::ror::<false>(&mut self.cpsr, value, amount, shifter_carry)
            }
        } else {
            let rm = reg(instruction, 0);
            let kind = ShiftKind::from(instruction.get_bits(5..=6));
            let mut value = self.registers[rm];

            if REGISTER_SHIFT {
                let amount = self.registers[reg(instruction, 8)] & 0xFF;
                self.idle();
                if rn == REG_PROGRAM_COUNTER {
                    op1 = op1.wrapping_add(4);
                }
                if rm == REG_PROGRAM_COUNTER {
                    value = value.wrapping_add(4);
                }
                shifter::shift::<false>(kind, &mut self.cpsr, value, amount, shifter_carry)
            } else {
                let amount = instruction.get_bits(7..=11);
                shifter::shift::<true>(kind, &mut self.cpsr, value, amount, shifter_carry)
            }
        };

        let cpsr = &mut self.cpsr;
        let result = match OPCODE {
            AND | TST => alu::log(cpsr, op1 & op2, flags),
            EOR | TEQ => alu::log(cpsr, op1 ^ op2, flags),
            SUB | CMP => alu::sub(cpsr, op1, op2, flags),
            RSB => alu::sub(cpsr, op2, op1, flags),
            ADD | CMN => alu::add(cpsr, op1, op2, flags),
            ADC => alu::adc(cpsr, op1, op2, flags),
            SBC => alu::sbc(cpsr, op1, op2, flags),
            RSC => alu::sbc(cpsr, op2, op1, flags),
            ORR => alu::log(cpsr, op1 | op2, flags),
            MOV => alu::log(cpsr, op2, flags),
            BIC => alu::log(cpsr, op1 & !op2, flags),
            MVN => alu::log(cpsr, !op2, flags),
            _ => unreachable!("data processing opcode has four bits"),
        };

        if !test {
            self.registers[rd] = result;
        }

        if rd == REG_PROGRAM_COUNTER {
            // Exception return: the restored mode decides how to refill.
            if SET_FLAGS {
                self.restore_cpsr();
            }
            if !test {
                self.flush();
            }
        }
    }

    /// MRS and MSR.
    pub(crate) fn arm_psr_transfer<const IMMEDIATE: bool, const SPSR: bool, const WRITE: bool>(
        &mut self,
        instruction: u32,
    ) {
        if !WRITE {
            let value = if SPSR { self.spsr() } else { self.cpsr };
            self.registers[reg(instruction, 12)] = value.bits();
            return;
        }

        let value = if IMMEDIATE {
            instruction
                .get_bits(0..=7)
                .rotate_right(instruction.get_bits(8..=11) * 2)
        } else {
            self.registers[reg(instruction, 0)]
        };

        let mut mask = 0;
        for (bit, field) in [CONTROL_MASK, EXTENSION_MASK, STATUS_MASK, FLAGS_MASK]
            .into_iter()
            .enumerate()
        {
            if instruction.get_bit(16 + bit as u8) {
                mask |= field;
            }
        }

        if SPSR {
            let mut spsr = self.spsr();
            spsr.write_masked(value, mask);
            self.set_spsr(spsr);
            return;
        }

        let current = self.cpsr.mode();
        if current == Mode::User {
            mask &= FLAGS_MASK;
        }
        mask &= !STATE_BIT_MASK;

        let mut cpsr = self.cpsr;
        cpsr.write_masked(value, mask);
        let mode = Mode::try_from(cpsr.bits()).unwrap_or_else(|bits| {
            tracing::warn!("MSR with invalid mode bits 0b{bits:05b}, keeping {current:?}");
            current
        });

        self.switch_mode(mode);
        self.cpsr = cpsr;
        self.cpsr.set_mode(mode);
    }

    /// MUL and MLA.
    pub(crate) fn arm_multiply<const ACCUMULATE: bool, const SET_FLAGS: bool>(
        &mut self,
        instruction: u32,
    ) {
        let multiplier = self.registers[reg(instruction, 8)];
        let mut result = self.registers[reg(instruction, 0)].wrapping_mul(multiplier);
        self.tick_multiply(multiplier, true);

        if ACCUMULATE {
            result = result.wrapping_add(self.registers[reg(instruction, 12)]);
            self.idle();
        }
        if SET_FLAGS {
            self.cpsr.set_z(result);
            self.cpsr.set_n(result);
        }
        self.registers[reg(instruction, 16)] = result;
    }

    /// UMULL, UMLAL, SMULL and SMLAL.
    pub(crate) fn arm_multiply_long<
        const SIGNED: bool,
        const ACCUMULATE: bool,
        const SET_FLAGS: bool,
    >(
        &mut self,
        instruction: u32,
    ) {
        let rd_lo = reg(instruction, 12);
        let rd_hi = reg(instruction, 16);
        let multiplicand = self.registers[reg(instruction, 0)];
        let multiplier = self.registers[reg(instruction, 8)];

        let mut result = if SIGNED {
            (i64::from(multiplicand as i32) * i64::from(multiplier as i32)) as u64
        } else {
            u64::from(multiplicand) * u64::from(multiplier)
        };
        self.tick_multiply(multiplier, SIGNED);
        self.idle();

        if ACCUMULATE {
            let accumulator =
                (u64::from(self.registers[rd_hi]) << 32) | u64::from(self.registers[rd_lo]);
            result = result.wrapping_add(accumulator);
            self.idle();
        }
        if SET_FLAGS {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result >> 63 != 0);
        }

        self.registers[rd_lo] = result as u32;
        self.registers[rd_hi] = (result >> 32) as u32;
    }

    /// LDR, STR, LDRB and STRB.
    ///
    /// `FLAGS` holds bits 25-20: register offset, pre-index, up, byte,
    /// write-back, load.
    pub(crate) fn arm_single_data_transfer<const FLAGS: u32>(&mut self, instruction: u32) {
        let register_offset = FLAGS & 0b10_0000 != 0;
        let pre_index = FLAGS & 0b01_0000 != 0;
        let up = FLAGS & 0b00_1000 != 0;
        let byte = FLAGS & 0b00_0100 != 0;
        let write_back = FLAGS & 0b00_0010 != 0 || !pre_index;
        let load = FLAGS & 0b00_0001 != 0;

        let rd = reg(instruction, 12);
        let rn = reg(instruction, 16);

        let offset = if register_offset {
            let kind = ShiftKind::from(instruction.get_bits(5..=6));
            let amount = instruction.get_bits(7..=11);
            let value = self.registers[reg(instruction, 0)];
            shifter::shift::<true>(kind, &mut self.cpsr, value, amount, false)
        } else {
            instruction.get_bits(0..=11)
        };

        let base = self.registers[rn];
        let offset_base = if up {
            base.wrapping_add(offset)
        } else {
            base.wrapping_sub(offset)
        };
        let address = if pre_index { offset_base } else { base };

        if load {
            let value = if byte {
                u32::from(self.read_byte(address, Access::NonSequential))
            } else {
                self.read_word_rotate(address, Access::NonSequential)
            };
            self.idle();

            // A loaded base wins over the written back one.
            if write_back {
                self.registers[rn] = offset_base;
            }
            self.registers[rd] = value;
            if rd == REG_PROGRAM_COUNTER {
                self.flush_word();
            }
        } else {
            let mut value = self.registers[rd];
            if rd == REG_PROGRAM_COUNTER {
                value = value.wrapping_add(4);
            }
            if byte {
                self.write_byte(address, value as u8, Access::NonSequential);
            } else {
                self.write_word(address, value, Access::NonSequential);
            }
            if write_back {
                self.registers[rn] = offset_base;
            }
        }
    }

    /// LDRH, STRH, LDRSB and LDRSH.
    ///
    /// `FLAGS` holds bits 24-20: pre-index, up, immediate, write-back, load.
    /// `SH` is bits 6-5.
    pub(crate) fn arm_halfword_data_transfer<const FLAGS: u32, const SH: u32>(
        &mut self,
        instruction: u32,
    ) {
        let pre_index = FLAGS & 0b1_0000 != 0;
        let up = FLAGS & 0b0_1000 != 0;
        let immediate = FLAGS & 0b0_0100 != 0;
        let write_back = FLAGS & 0b0_0010 != 0 || !pre_index;
        let load = FLAGS & 0b0_0001 != 0;

        let rd = reg(instruction, 12);
        let rn = reg(instruction, 16);

        let offset = if immediate {
            ((instruction >> 4) & 0xF0) | (instruction & 0xF)
        } else {
            self.registers[reg(instruction, 0)]
        };

        let base = self.registers[rn];
        let offset_base = if up {
            base.wrapping_add(offset)
        } else {
            base.wrapping_sub(offset)
        };
        let address = if pre_index { offset_base } else { base };

        if load {
            let value = match SH {
                1 => self.read_half_rotate(address, Access::NonSequential),
                2 => self.read_byte_sign_ex(address, Access::NonSequential),
                _ => self.read_half_sign_ex(address, Access::NonSequential),
            };
            self.idle();

            if write_back {
                self.registers[rn] = offset_base;
            }
            self.registers[rd] = value;
            if rd == REG_PROGRAM_COUNTER {
                self.flush_word();
            }
        } else {
            let mut value = self.registers[rd];
            if rd == REG_PROGRAM_COUNTER {
                value = value.wrapping_add(4);
            }
            self.write_half(address, value as u16, Access::NonSequential);
            if write_back {
                self.registers[rn] = offset_base;
            }
        }
    }

    /// LDM and STM.
    ///
    /// `FLAGS` holds bits 24-20: pre-index, up, PSR/user bank, write-back, load.
    pub(crate) fn arm_block_data_transfer<const FLAGS: u32>(&mut self, instruction: u32) {
        let pre_index = FLAGS & 0b1_0000 != 0;
        let up = FLAGS & 0b0_1000 != 0;
        let psr = FLAGS & 0b0_0100 != 0;
        let write_back = FLAGS & 0b0_0010 != 0;
        let load = FLAGS & 0b0_0001 != 0;

        let rn = reg(instruction, 16);
        let base = self.registers[rn];
        let mut list = instruction.get_bits(0..=15);

        // Registers are always transferred lowest first, from the lowest
        // address, so decrementing modes start below the base.
        let (mut address, new_base) = if list == 0 {
            list = 1 << REG_PROGRAM_COUNTER;
            let address = match (pre_index, up) {
                (false, true) => base,
                (true, true) => base.wrapping_add(4),
                (false, false) => base.wrapping_sub(0x3C),
                (true, false) => base.wrapping_sub(0x40),
            };
            let new_base = if up {
                base.wrapping_add(0x40)
            } else {
                base.wrapping_sub(0x40)
            };
            (address, new_base)
        } else {
            let size = 4 * list.count_ones();
            match (pre_index, up) {
                (false, true) => (base, base.wrapping_add(size)),
                (true, true) => (base.wrapping_add(4), base.wrapping_add(size)),
                (false, false) => (base.wrapping_sub(size).wrapping_add(4), base.wrapping_sub(size)),
                (true, false) => (base.wrapping_sub(size), base.wrapping_sub(size)),
            }
        };

        let loads_pc = load && list.get_bit(15);
        let user_bank = psr && !loads_pc;
        let mode = self.cpsr.mode();
        if user_bank {
            self.switch_mode(Mode::User);
        }

        let lowest = list.trailing_zeros() as usize;
        let mut access = Access::NonSequential;
        for r in list.ones() {
            if load {
                let value = self.read_word(address, access);
                self.registers[r] = value;
            } else {
                let value = match r {
                    REG_PROGRAM_COUNTER => self.registers[r].wrapping_add(4),
                    // Write-back lands after the first transfer.
                    r if r == rn && r != lowest && write_back => new_base,
                    r => self.registers[r],
                };
                self.write_word(address, value, access);
            }
            access = Access::Sequential;
            address = address.wrapping_add(4);
        }

        if user_bank {
            self.switch_mode(mode);
        }

        if write_back && !(load && list.get_bit(rn as u8)) {
            self.registers[rn] = new_base;
        }

        if load {
            self.idle();
            if loads_pc {
                if psr {
                    self.restore_cpsr();
                }
                self.flush();
            }
        }
    }

    /// SWP and SWPB.
    pub(crate) fn arm_single_data_swap<const BYTE: bool>(&mut self, instruction: u32) {
        let address = self.registers[reg(instruction, 16)];
        let source = self.registers[reg(instruction, 0)];

        let value = if BYTE {
            let value = u32::from(self.read_byte(address, Access::NonSequential));
            self.write_byte(address, source as u8, Access::NonSequential);
            value
        } else {
            let value = self.read_word_rotate(address, Access::NonSequential);
            self.write_word(address, source, Access::NonSequential);
            value
        };
        self.idle();

        self.registers[reg(instruction, 12)] = value;
    }

    pub(crate) fn arm_software_interrupt(&mut self, _instruction: u32) {
        self.interrupt_sw();
    }

    pub(crate) fn arm_coprocessor(&mut self, instruction: u32) {
        self.fault(CpuError::Coprocessor {
            instruction,
            address: self.instruction_address(),
        });
    }

    pub(crate) fn arm_undefined(&mut self, instruction: u32) {
        self.undefined_instruction(instruction);
    }
}
