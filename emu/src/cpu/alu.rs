//! Flag-setting arithmetic shared by ARM data processing and the Thumb ALU.
//!
//! Every operation returns the 32 bit result and touches the CPSR only when
//! `flags` is set.

use crate::cpu::psr::Psr;

/// Pass-through used by moves and logical operations: only N and Z change.
#[inline]
pub fn log(cpsr: &mut Psr, value: u32, flags: bool) -> u32 {
    if flags {
        cpsr.set_z(value);
        cpsr.set_n(value);
    }
    value
}

#[inline]
pub fn add(cpsr: &mut Psr, op1: u32, op2: u32, flags: bool) -> u32 {
    let result = op1.wrapping_add(op2);
    if flags {
        cpsr.set_z(result);
        cpsr.set_n(result);
        cpsr.set_c_add(u64::from(op1), u64::from(op2));
        cpsr.set_v_add(op1, op2, result);
    }
    result
}

#[inline]
pub fn sub(cpsr: &mut Psr, op1: u32, op2: u32, flags: bool) -> u32 {
    let result = op1.wrapping_sub(op2);
    if flags {
        cpsr.set_z(result);
        cpsr.set_n(result);
        cpsr.set_c_sub(u64::from(op1), u64::from(op2));
        cpsr.set_v_sub(op1, op2, result);
    }
    result
}

#[inline]
pub fn adc(cpsr: &mut Psr, op1: u32, op2: u32, flags: bool) -> u32 {
    let opc = u64::from(op2) + u64::from(cpsr.carry_flag());
    let result = (u64::from(op1) + opc) as u32;
    if flags {
        cpsr.set_z(result);
        cpsr.set_n(result);
        cpsr.set_c_add(u64::from(op1), opc);
        cpsr.set_v_add(op1, op2, result);
    }
    result
}

/// `op1 - op2 - !carry`, computed as `op1 - (op2 - carry + 1)`.
#[inline]
pub fn sbc(cpsr: &mut Psr, op1: u32, op2: u32, flags: bool) -> u32 {
    let opc = u64::from(op2) + 1 - u64::from(cpsr.carry_flag());
    let result = u64::from(op1).wrapping_sub(opc) as u32;
    if flags {
        cpsr.set_z(result);
        cpsr.set_n(result);
        cpsr.set_c_sub(u64::from(op1), opc);
        cpsr.set_v_sub(op1, op2, result);
    }
    result
}
