//! Runner configuration: an optional TOML file overridden by command-line flags.
//!
//! ```toml
//! [cpu]
//! boot = "cartridge"
//! irq_delay = 3
//!
//! [run]
//! cycles = 16_777_216
//! load_address = 0x0800_0000
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use emu::config::Config;

/// About one second of GBA time.
pub const DEFAULT_CYCLES: u64 = 16_777_216;
pub const DEFAULT_LOAD_ADDRESS: u32 = 0x0800_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Run {
    pub cycles: u64,
    pub load_address: u32,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            cycles: DEFAULT_CYCLES,
            load_address: DEFAULT_LOAD_ADDRESS,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub cpu: Config,
    pub run: Run,
}

impl RunnerConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
