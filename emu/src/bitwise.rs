use std::ops::RangeInclusive;

/// Helpers to read and manipulate bits of the integer registers the CPU works with.
/// Bit indexes go from lsb to msb (right to left).
pub trait Bits: Copy {
    fn get_bit(self, bit_idx: u8) -> bool;

    fn set_bit(&mut self, bit_idx: u8, value: bool);

    /// Returns the bits in `bits_range` moved down to position 0.
    fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self;

    /// Returns a copy of the value sign-extended from its lowest `number_of_bits` bits.
    fn sign_extended(self, number_of_bits: u8) -> Self;

    /// Iterates over the indexes of the bits set to 1, from the lowest.
    fn ones(self) -> Ones;
}

macro_rules! impl_bits {
    ($ty:ty, $signed:ty) => {
        impl Bits for $ty {
            #[inline]
            fn get_bit(self, bit_idx: u8) -> bool {
                debug_assert!(u32::from(bit_idx) < <$ty>::BITS);
                (self >> bit_idx) & 1 != 0
            }

            #[inline]
            fn set_bit(&mut self, bit_idx: u8, value: bool) {
                debug_assert!(u32::from(bit_idx) < <$ty>::BITS);
                let mask = 1 << bit_idx;
                if value {
                    *self |= mask;
                } else {
                    *self &= !mask;
                }
            }

            #[inline]
            fn get_bits(self, bits_range: RangeInclusive<u8>) -> Self {
                let start = *bits_range.start();
                let length = u32::from(*bits_range.end() - start + 1);
                let value = self >> start;
                if length >= <$ty>::BITS {
                    value
                } else {
                    value & ((1 << length) - 1)
                }
            }

            #[inline]
            fn sign_extended(self, number_of_bits: u8) -> Self {
                let shift = <$ty>::BITS - u32::from(number_of_bits);
                (((self << shift) as $signed) >> shift) as $ty
            }

            #[inline]
            fn ones(self) -> Ones {
                Ones(u32::from(self))
            }
        }
    };
}

impl_bits!(u32, i32);
impl_bits!(u16, i16);

/// Iterator returned by [`Bits::ones`].
pub struct Ones(u32);

impl Iterator for Ones {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(idx as usize)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::Rng;

    use super::*;

    #[test]
    fn set_bit() {
        let mut b = 0b1100110_u32;
        b.set_bit(0, true);
        b.set_bit(1, true);
        b.set_bit(2, false);
        b.set_bit(3, false);
        assert_eq!(b, 0b1100011);
    }

    #[test]
    fn get_bit() {
        let b = 0b1011001110_u32;
        assert!(b.get_bit(1));
        assert!(!b.get_bit(0));
        assert!(b.get_bit(2));
        assert!(!b.get_bit(31));
    }

    #[test]
    fn get_bits() {
        let b = 0b0110_1101_u32;
        assert_eq!(b.get_bits(0..=3), 0b1101);
        assert_eq!(b.get_bits(4..=7), 0b0110);
        assert_eq!(b.get_bits(2..=5), 0b1011);
        assert_eq!(0xFFFF_0000_u32.get_bits(0..=31), 0xFFFF_0000);
        assert_eq!(0xA55A_u16.get_bits(8..=15), 0xA5);
    }

    #[test]
    fn sign_extended() {
        assert_eq!(0x80_u32.sign_extended(8), 0xFFFF_FF80);
        assert_eq!(0x7F_u32.sign_extended(8), 0x7F);
        assert_eq!(0x0080_0000_u32.sign_extended(24), 0xFF80_0000);
        assert_eq!(0x8000_u32.sign_extended(16), 0xFFFF_8000);
        assert_eq!(0b1001_u16.sign_extended(4), 0xFFF9);
    }

    #[test]
    fn toggle_every_bit() {
        let original = rand::thread_rng().gen_range(1..=u32::MAX - 1);
        let mut fin = original;
        for i in 0..32 {
            let bit = fin.get_bit(i);
            fin.set_bit(i, !bit);
        }

        assert_eq!(!original, fin);
    }

    #[test]
    fn ones() {
        let list = 0b1000_0000_0010_0101_u16;
        assert_eq!(list.ones().collect::<Vec<_>>(), vec![0, 2, 5, 15]);
        assert_eq!(0_u32.ones().count(), 0);
        assert_eq!(u32::MAX.ones().count(), 32);
    }
}
