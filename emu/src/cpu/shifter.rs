//! # Barrel shifter
//!
//! Each shift comes in two flavors selected by `IMMEDIATE`:
//!
//! ```text
//! ┌──────┬──────────────────────────────┬──────────────────────────────────┐
//! │      │ immediate amount (5 bits)    │ register amount (low byte of Rs) │
//! ├──────┼──────────────────────────────┼──────────────────────────────────┤
//! │ LSL  │ #0 leaves value and C alone  │ 0: no-op, 32: 0 C=bit0,          │
//! │      │                              │ >32: 0 C=0                       │
//! │ LSR  │ #0 means #32                 │ 0: no-op, 32: 0 C=bit31,         │
//! │      │                              │ >32: 0 C=0                       │
//! │ ASR  │ #0 means #32                 │ 0: no-op, ≥32: sign fill C=bit31 │
//! │ ROR  │ #0 means RRX (C into bit 31) │ 0: no-op, multiple of 32:        │
//! │      │                              │ value kept C=bit31               │
//! └──────┴──────────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! The carry flag receives the last bit shifted out, only when `flags` is set.

use crate::cpu::psr::Psr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    Lsl = 0,
    Lsr = 1,
    Asr = 2,
    Ror = 3,
}

impl From<u32> for ShiftKind {
    fn from(value: u32) -> Self {
        match value & 0b11 {
            0 => Self::Lsl,
            1 => Self::Lsr,
            2 => Self::Asr,
            _ => Self::Ror,
        }
    }
}

/// Shifts by the kind encoded in bits 6-5 of data processing and transfer opcodes.
#[inline]
pub fn shift<const IMMEDIATE: bool>(
    kind: ShiftKind,
    cpsr: &mut Psr,
    value: u32,
    amount: u32,
    flags: bool,
) -> u32 {
    match kind {
        ShiftKind::Lsl => lsl::<IMMEDIATE>(cpsr, value, amount, flags),
        ShiftKind::Lsr => lsr::<IMMEDIATE>(cpsr, value, amount, flags),
        ShiftKind::Asr => asr::<IMMEDIATE>(cpsr, value, amount, flags),
        ShiftKind::Ror => ror::<IMMEDIATE>(cpsr, value, amount, flags),
    }
}

#[inline]
pub fn lsl<const IMMEDIATE: bool>(cpsr: &mut Psr, value: u32, amount: u32, flags: bool) -> u32 {
    match amount {
        0 => value,
        1..=31 => {
            if flags {
                cpsr.set_carry_flag((value >> (32 - amount)) & 1 != 0);
            }
            value << amount
        }
        _ => {
            if flags {
                cpsr.set_carry_flag(amount == 32 && value & 1 != 0);
            }
            0
        }
    }
}

#[inline]
pub fn lsr<const IMMEDIATE: bool>(cpsr: &mut Psr, value: u32, amount: u32, flags: bool) -> u32 {
    match amount {
        0 if IMMEDIATE => {
            if flags {
                cpsr.set_carry_flag(value >> 31 != 0);
            }
            0
        }
        0 => value,
        1..=31 => {
            if flags {
                cpsr.set_carry_flag((value >> (amount - 1)) & 1 != 0);
            }
            value >> amount
        }
        _ => {
            if flags {
                cpsr.set_carry_flag(amount == 32 && value >> 31 != 0);
            }
            0
        }
    }
}

#[inline]
pub fn asr<const IMMEDIATE: bool>(cpsr: &mut Psr, value: u32, amount: u32, flags: bool) -> u32 {
    match amount {
        0 if !IMMEDIATE => value,
        1..=31 => {
            if flags {
                cpsr.set_carry_flag((value >> (amount - 1)) & 1 != 0);
            }
            ((value as i32) >> amount) as u32
        }
        // Immediate #0 is #32, which behaves like every larger amount.
        _ => {
            let sign = value >> 31 != 0;
            if flags {
                cpsr.set_carry_flag(sign);
            }
            if sign { u32::MAX } else { 0 }
        }
    }
}

#[inline]
pub fn ror<const IMMEDIATE: bool>(cpsr: &mut Psr, value: u32, amount: u32, flags: bool) -> u32 {
    if amount == 0 {
        if !IMMEDIATE {
            return value;
        }
        // RRX
        let carry_in = u32::from(cpsr.carry_flag());
        if flags {
            cpsr.set_carry_flag(value & 1 != 0);
        }
        return (carry_in << 31) | (value >> 1);
    }

    let result = value.rotate_right(amount % 32);
    if flags {
        cpsr.set_carry_flag(result >> 31 != 0);
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::Rng;

    use super::*;

    #[test]
    fn immediate_lsr_zero_is_lsr_32() {
        let mut cpsr = Psr::default();

        assert_eq!(lsr::<true>(&mut cpsr, 0x8000_0001, 0, true), 0);
        assert!(cpsr.carry_flag());

        assert_eq!(lsr::<true>(&mut cpsr, 0x7FFF_FFFF, 0, true), 0);
        assert!(!cpsr.carry_flag());
    }

    #[test]
    fn register_lsl_saturates() {
        let mut cpsr = Psr::default();

        assert_eq!(lsl::<false>(&mut cpsr, 0x0000_0003, 32, true), 0);
        assert!(cpsr.carry_flag());

        assert_eq!(lsl::<false>(&mut cpsr, 0xFFFF_FFFF, 33, true), 0);
        assert!(!cpsr.carry_flag());
    }

    #[test]
    fn register_zero_amount_is_noop() {
        let mut cpsr = Psr::default();
        cpsr.set_carry_flag(true);

        for kind in [ShiftKind::Lsl, ShiftKind::Lsr, ShiftKind::Asr, ShiftKind::Ror] {
            assert_eq!(shift::<false>(kind, &mut cpsr, 0x1234_5678, 0, true), 0x1234_5678);
            assert!(cpsr.carry_flag());
        }
    }

    #[test]
    fn lsl_carry_is_last_bit_out() {
        let mut cpsr = Psr::default();

        assert_eq!(lsl::<true>(&mut cpsr, 0x4000_0001, 2, true), 0x0000_0004);
        assert!(cpsr.carry_flag());
    }

    #[test]
    fn register_lsr_32_and_above() {
        let mut cpsr = Psr::default();

        assert_eq!(lsr::<false>(&mut cpsr, 0x8000_0000, 32, true), 0);
        assert!(cpsr.carry_flag());
        assert_eq!(lsr::<false>(&mut cpsr, 0x8000_0000, 40, true), 0);
        assert!(!cpsr.carry_flag());
    }

    #[test]
    fn asr_fills_with_sign() {
        let mut cpsr = Psr::default();

        assert_eq!(asr::<true>(&mut cpsr, 0x8000_0000, 0, true), 0xFFFF_FFFF);
        assert!(cpsr.carry_flag());
        assert_eq!(asr::<false>(&mut cpsr, 0x4000_0000, 200, true), 0);
        assert!(!cpsr.carry_flag());
        assert_eq!(asr::<true>(&mut cpsr, 0xF000_0000, 4, true), 0xFF00_0000);
        assert!(!cpsr.carry_flag());
    }

    #[test]
    fn immediate_ror_zero_is_rrx() {
        let mut cpsr = Psr::default();
        cpsr.set_carry_flag(true);

        assert_eq!(ror::<true>(&mut cpsr, 0x0000_0003, 0, true), 0x8000_0001);
        assert!(cpsr.carry_flag());

        assert_eq!(ror::<true>(&mut cpsr, 0x0000_0002, 0, true), 0x8000_0001);
        assert!(!cpsr.carry_flag());
    }

    #[test]
    fn register_ror_multiple_of_32() {
        let mut cpsr = Psr::default();

        assert_eq!(ror::<false>(&mut cpsr, 0x8000_0001, 64, true), 0x8000_0001);
        assert!(cpsr.carry_flag());
    }

    #[test]
    fn carry_kept_when_flags_not_requested() {
        let mut cpsr = Psr::default();

        lsr::<true>(&mut cpsr, 0x8000_0000, 0, false);
        lsl::<false>(&mut cpsr, 1, 32, false);
        ror::<true>(&mut cpsr, 1, 0, false);

        assert!(!cpsr.carry_flag());
    }

    #[test]
    fn register_ror_matches_rotate() {
        let mut rng = rand::thread_rng();
        let mut cpsr = Psr::default();
        for _ in 0..500 {
            let value: u32 = rng.r#gen();
            let amount = rng.gen_range(1..=255);

            assert_eq!(
                ror::<false>(&mut cpsr, value, amount, true),
                value.rotate_right(amount)
            );
        }
    }
}
