//! Interrupt controller registers.
//!
//! ```text
//! 0x04000200  IE       interrupt enable
//! 0x04000202  IF       interrupt request, writing 1 clears a bit
//! 0x04000204  WAITCNT  stored only
//! 0x04000208  IME      interrupt master enable (bit 0)
//! 0x04000300  POSTFLG
//! 0x04000301  HALTCNT  write-only, any write halts the CPU
//! ```

use serde::{Deserialize, Serialize};

/// Interrupt sources, by their bit in IE/IF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interrupt {
    VBlank = 0,
    HBlank = 1,
    VCount = 2,
    Timer0 = 3,
    Timer1 = 4,
    Timer2 = 5,
    Timer3 = 6,
    Serial = 7,
    Dma0 = 8,
    Dma1 = 9,
    Dma2 = 10,
    Dma3 = 11,
    Keypad = 12,
    GamePak = 13,
}

/// Side effect of a write that the CPU must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerDown {
    Halt,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InterruptControl {
    pub interrupt_enable: u16,
    pub interrupt_request: u16,
    pub wait_state_control: u16,
    pub interrupt_master_enable: u16,
    pub post_boot_flag: u8,
}

impl InterruptControl {
    /// Whether `address` is one of the registers above.
    #[must_use]
    pub const fn owns(address: u32) -> bool {
        matches!(address, 0x0400_0200..=0x0400_020B | 0x0400_0300..=0x0400_0303)
    }

    pub const fn request(&mut self, interrupt: Interrupt) {
        self.interrupt_request |= 1 << interrupt as u16;
    }

    /// IE & IF, regardless of IME. Enough to wake a halted CPU.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.interrupt_enable & self.interrupt_request != 0
    }

    /// The IRQ line as the CPU sees it.
    #[must_use]
    pub const fn is_line_asserted(&self) -> bool {
        self.interrupt_master_enable & 1 != 0 && self.is_pending()
    }

    #[must_use]
    pub const fn read_byte(&self, address: u32) -> u8 {
        let [lo, hi] = match address & !1 {
            0x0400_0200 => self.interrupt_enable,
            0x0400_0202 => self.interrupt_request,
            0x0400_0204 => self.wait_state_control,
            0x0400_0208 => self.interrupt_master_enable,
            0x0400_0300 => self.post_boot_flag as u16,
            _ => 0,
        }
        .to_le_bytes();
        if address & 1 == 0 { lo } else { hi }
    }

    pub fn write_byte(&mut self, address: u32, value: u8) -> Option<PowerDown> {
        let shift = (address & 1) * 8;
        let mask = 0xFF_u16 << shift;
        let value = u16::from(value) << shift;
        match address & !1 {
            0x0400_0200 => self.interrupt_enable = (self.interrupt_enable & !mask) | value,
            0x0400_0202 => self.interrupt_request &= !value,
            0x0400_0204 => self.wait_state_control = (self.wait_state_control & !mask) | value,
            0x0400_0208 => {
                self.interrupt_master_enable = (self.interrupt_master_enable & !mask) | value;
            }
            0x0400_0300 if address & 1 == 0 => self.post_boot_flag = value as u8,
            0x0400_0300 => return Some(PowerDown::Halt),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn request_and_acknowledge() {
        let mut control = InterruptControl::default();
        control.request(Interrupt::VBlank);
        control.request(Interrupt::Timer0);

        assert_eq!(control.read_byte(0x0400_0202), 0b1001);
        assert!(!control.is_pending());

        control.write_byte(0x0400_0200, 0b1000);
        assert!(control.is_pending());
        assert!(!control.is_line_asserted());

        control.write_byte(0x0400_0208, 1);
        assert!(control.is_line_asserted());

        control.write_byte(0x0400_0202, 0b1000);
        assert_eq!(control.interrupt_request, 0b0001);
        assert!(!control.is_pending());
    }

    #[test]
    fn high_byte_writes() {
        let mut control = InterruptControl::default();
        control.write_byte(0x0400_0201, 0x20);
        control.request(Interrupt::GamePak);

        assert_eq!(control.interrupt_enable, 0x2000);
        assert_eq!(control.read_byte(0x0400_0203), 0x20);

        control.write_byte(0x0400_0203, 0x20);
        assert_eq!(control.interrupt_request, 0);
    }

    #[test]
    fn haltcnt_requests_halt() {
        let mut control = InterruptControl::default();

        assert_eq!(control.write_byte(0x0400_0301, 0), Some(PowerDown::Halt));
        assert_eq!(control.write_byte(0x0400_0300, 1), None);
        assert_eq!(control.post_boot_flag, 1);
    }

    #[test]
    fn owns_only_its_registers() {
        assert!(InterruptControl::owns(0x0400_0208));
        assert!(InterruptControl::owns(0x0400_0301));
        assert!(!InterruptControl::owns(0x0400_0100));
        assert!(!InterruptControl::owns(0x0300_0200));
    }
}
