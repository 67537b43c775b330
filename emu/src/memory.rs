//! Flat reference implementation of [`Bus`] following the GBA memory map.
//!
//! Only the regions the CPU needs to boot and run code are backed:
//!
//! ```text
//! 0x00000000-0x00003FFF  BIOS             16 KiB
//! 0x02000000-0x0203FFFF  on-board WRAM    256 KiB, mirrored up to 0x02FFFFFF
//! 0x03000000-0x03007FFF  on-chip WRAM     32 KiB, mirrored up to 0x03FFFFFF
//! 0x08000000-0x0DFFFFFF  Game Pak ROM     up to 32 MiB, three wait-state mirrors
//! ```
//!
//! Everything else reads as zero and ignores writes.

use serde::{Deserialize, Serialize};

use crate::bus::{Access, Bus, Width};
use crate::cpu::hardware::dma::{Dma, DmaStatus};
use crate::cpu::hardware::interrupt_control::InterruptControl;
use crate::error::CpuError;
use crate::scheduler::Scheduler;

pub const BIOS_SIZE: usize = 0x0000_4000;
pub const EWRAM_SIZE: usize = 0x0004_0000;
pub const IWRAM_SIZE: usize = 0x0000_8000;
pub const ROM_CAPACITY: usize = 0x0200_0000;

#[derive(Serialize, Deserialize)]
pub struct Memory {
    bios: Vec<u8>,
    ewram: Vec<u8>,
    iwram: Vec<u8>,
    rom: Vec<u8>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            bios: vec![0; BIOS_SIZE],
            ewram: vec![0; EWRAM_SIZE],
            iwram: vec![0; IWRAM_SIZE],
            rom: Vec::new(),
        }
    }
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `image` into the region starting at `address`.
    ///
    /// Loading into the ROM region grows the cartridge to fit the image.
    ///
    /// # Errors
    ///
    /// Returns [`CpuError::ImageTooLarge`] when the image does not fit the
    /// region, or does not start inside a backed region at all.
    pub fn load(&mut self, address: u32, image: &[u8]) -> Result<(), CpuError> {
        if (0x0800_0000..0x0E00_0000).contains(&address) {
            let offset = (address & 0x01FF_FFFF) as usize;
            let end = offset + image.len();
            if end > ROM_CAPACITY {
                return Err(CpuError::ImageTooLarge {
                    len: image.len(),
                    capacity: ROM_CAPACITY - offset,
                });
            }
            if self.rom.len() < end {
                self.rom.resize(end, 0);
            }
            self.rom[offset..end].copy_from_slice(image);
            return Ok(());
        }

        let (region, offset) = match address >> 24 {
            0x00 if (address as usize) < BIOS_SIZE => (&mut self.bios, address as usize),
            0x02 => (&mut self.ewram, (address as usize) & (EWRAM_SIZE - 1)),
            0x03 => (&mut self.iwram, (address as usize) & (IWRAM_SIZE - 1)),
            _ => {
                return Err(CpuError::ImageTooLarge {
                    len: image.len(),
                    capacity: 0,
                });
            }
        };
        let end = offset + image.len();
        if end > region.len() {
            return Err(CpuError::ImageTooLarge {
                len: image.len(),
                capacity: region.len() - offset,
            });
        }
        region[offset..end].copy_from_slice(image);
        Ok(())
    }

    fn read_rom(&self, offset: usize) -> u8 {
        // Past the end of the cartridge the Game Pak bus still holds the lower
        // 16 bits of the (half-word) address it was sent.
        self.rom.get(offset).copied().unwrap_or_else(|| {
            let open_bus = (offset >> 1) & 0xFFFF;
            (open_bus >> ((offset & 1) * 8)) as u8
        })
    }

    fn read_raw(&self, address: u32) -> u8 {
        let address = address as usize;
        match address >> 24 {
            0x00 if address < BIOS_SIZE => self.bios[address],
            0x02 => self.ewram[address & (EWRAM_SIZE - 1)],
            0x03 => self.iwram[address & (IWRAM_SIZE - 1)],
            0x08..=0x0D => self.read_rom(address & 0x01FF_FFFF),
            _ => 0,
        }
    }

    fn write_raw(&mut self, address: u32, value: u8) {
        let address = address as usize;
        match address >> 24 {
            0x02 => self.ewram[address & (EWRAM_SIZE - 1)] = value,
            0x03 => self.iwram[address & (IWRAM_SIZE - 1)] = value,
            // BIOS and cartridge are read-only.
            _ => {}
        }
    }
}

impl Bus for Memory {
    fn read_byte(&mut self, address: u32, _access: Access) -> u8 {
        self.read_raw(address)
    }

    fn read_half(&mut self, address: u32, _access: Access) -> u16 {
        u16::from_le_bytes([self.read_raw(address), self.read_raw(address + 1)])
    }

    fn read_word(&mut self, address: u32, _access: Access) -> u32 {
        u32::from_le_bytes([
            self.read_raw(address),
            self.read_raw(address + 1),
            self.read_raw(address + 2),
            self.read_raw(address + 3),
        ])
    }

    fn write_byte(&mut self, address: u32, value: u8, _access: Access) {
        self.write_raw(address, value);
    }

    fn write_half(&mut self, address: u32, value: u16, _access: Access) {
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.write_raw(address + i as u32, byte);
        }
    }

    fn write_word(&mut self, address: u32, value: u32, _access: Access) {
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.write_raw(address + i as u32, byte);
        }
    }

    fn wait_cycles(&self, address: u32, width: Width, access: Access) -> u64 {
        match (address >> 24, width) {
            // 16 bit bus with 2 wait states.
            (0x02, Width::Word) => 6,
            (0x02, _) => 3,
            // Wait state 0 defaults: 4 cycles non-sequential, 2 sequential.
            (0x08..=0x0D, width) => {
                let first = match access {
                    Access::NonSequential => 5,
                    Access::Sequential => 3,
                };
                if width == Width::Word { first + 3 } else { first }
            }
            _ => 1,
        }
    }
}

impl Dma for Memory {
    fn run_slice(
        &mut self,
        _scheduler: &mut Scheduler,
        _interrupts: &mut InterruptControl,
    ) -> DmaStatus {
        DmaStatus::Idle
    }
}
