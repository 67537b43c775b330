//! # Operating modes
//!
//! ```text
//! ┌────────────┬───────┬────────────────────────────┐
//! │ Mode       │ M4-M0 │ Banked registers           │
//! ├────────────┼───────┼────────────────────────────┤
//! │ User       │ 10000 │                            │
//! │ FIQ        │ 10001 │ R8-R14, SPSR_fiq           │
//! │ IRQ        │ 10010 │ R13-R14, SPSR_irq          │
//! │ Supervisor │ 10011 │ R13-R14, SPSR_svc          │
//! │ Abort      │ 10111 │ R13-R14, SPSR_abt          │
//! │ Undefined  │ 11011 │ R13-R14, SPSR_und          │
//! │ System     │ 11111 │ shares User registers      │
//! └────────────┴───────┴────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The normal program execution state.
    User = 0b10000,

    /// Fast interrupt, unused on the GBA.
    Fiq = 0b10001,

    /// Used for general-purpose interrupt handling.
    Irq = 0b10010,

    /// Entered on reset and software interrupts.
    Supervisor = 0b10011,

    /// Entered after a data or instruction prefetch abort.
    Abort = 0b10111,

    /// Entered when an undefined instruction is executed.
    Undefined = 0b11011,

    /// Privileged mode sharing the User registers.
    System = 0b11111,
}

/// Register bank a mode reads r13/r14 (and r8-r12 for FIQ) and the SPSR from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    User = 0,
    Fiq = 1,
    Supervisor = 2,
    Abort = 3,
    Irq = 4,
    Undefined = 5,
}

impl Bank {
    pub const COUNT: usize = 6;
}

impl Mode {
    #[must_use]
    pub const fn bank(self) -> Bank {
        match self {
            Self::User | Self::System => Bank::User,
            Self::Fiq => Bank::Fiq,
            Self::Irq => Bank::Irq,
            Self::Supervisor => Bank::Supervisor,
            Self::Abort => Bank::Abort,
            Self::Undefined => Bank::Undefined,
        }
    }

    /// Whether the mode owns a saved program status register.
    #[must_use]
    pub const fn has_spsr(self) -> bool {
        !matches!(self, Self::User | Self::System)
    }
}

impl From<Mode> for u32 {
    fn from(m: Mode) -> Self {
        m as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = u32;

    /// Fails with the offending bits when they name no mode.
    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n & 0b11111 {
            0b10000 => Ok(Self::User),
            0b10001 => Ok(Self::Fiq),
            0b10010 => Ok(Self::Irq),
            0b10011 => Ok(Self::Supervisor),
            0b10111 => Ok(Self::Abort),
            0b11011 => Ok(Self::Undefined),
            0b11111 => Ok(Self::System),
            bits => Err(bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mode_bits_round_trip() {
        for mode in [
            Mode::User,
            Mode::Fiq,
            Mode::Irq,
            Mode::Supervisor,
            Mode::Abort,
            Mode::Undefined,
            Mode::System,
        ] {
            assert_eq!(Mode::try_from(u32::from(mode)), Ok(mode));
        }
        assert_eq!(Mode::try_from(0b00000), Err(0));
        assert_eq!(Mode::try_from(0b10100), Err(0b10100));
    }

    #[test]
    fn system_shares_user_bank() {
        assert_eq!(Mode::System.bank(), Mode::User.bank());
        assert!(!Mode::System.has_spsr());
        assert!(Mode::Irq.has_spsr());
    }
}
