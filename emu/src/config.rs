//! Knobs of a single emulated machine.

use serde::{Deserialize, Serialize};

/// Where execution starts after [`Arm7tdmi::init`](crate::cpu::arm7tdmi::Arm7tdmi::init).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boot {
    /// Reset vector in Supervisor mode, the BIOS does the rest.
    #[default]
    Bios,
    /// State the BIOS leaves behind when it jumps to the cartridge entry point.
    Cartridge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub boot: Boot,
    /// Cycles between the interrupt line rising and the CPU noticing it.
    pub irq_delay: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boot: Boot::Bios,
            irq_delay: 3,
        }
    }
}
