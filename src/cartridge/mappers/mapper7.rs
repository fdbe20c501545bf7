// Mapper 7 (AxROM) - 32KB PRG banking and one-screen mirroring
//
// Memory Layout:
// - CPU $8000-$FFFF: 32KB switchable PRG-ROM bank
// - PPU $0000-$1FFF: 8KB CHR-RAM
//
// Register Interface:
// - $8000-$FFFF (write): Bank select and mirroring
//   Bits 0-2: Select 32KB PRG-ROM bank
//   Bit 4: One-screen mirroring (0 = lower bank, 1 = upper bank)

use super::{linear_chr_banks, CartridgeMapper};
use crate::cartridge::Mirroring;
use crate::ppu::Ppu;

/// PRG-ROM bank size (32KB)
const PRG_BANK_SIZE: usize = 32 * 1024;

/// Mapper 7 implementation (AxROM)
///
/// Used by games like Battletoads, Wizards & Warriors and Marble Madness.
pub struct Mapper7 {
    /// PRG-ROM data
    prg_rom: Vec<u8>,
    /// Current 32KB PRG-ROM bank
    prg_bank: usize,
    /// Selected one-screen nametable
    mirroring: Mirroring,
}

impl Mapper7 {
    /// Create a new Mapper7 instance
    ///
    /// # Arguments
    /// * `prg_rom` - PRG-ROM data
    pub fn new(prg_rom: Vec<u8>) -> Self {
        Mapper7 {
            prg_rom,
            prg_bank: 0,
            mirroring: Mirroring::SingleScreenLower,
        }
    }
}

impl CartridgeMapper for Mapper7 {
    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x8000..=0xFFFF => {
                let index = self.prg_bank * PRG_BANK_SIZE + (address - 0x8000) as usize;
                self.prg_rom[index % self.prg_rom.len()]
            }
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8, ppu: &mut Ppu) {
        if address < 0x8000 {
            return;
        }
        self.prg_bank = (value & 0x07) as usize;

        let mirroring = if value & 0x10 != 0 {
            Mirroring::SingleScreenUpper
        } else {
            Mirroring::SingleScreenLower
        };
        if mirroring != self.mirroring {
            self.mirroring = mirroring;
            ppu.set_mirror_mode(mirroring);
        }
    }

    fn chr_bank_offsets(&self) -> [usize; 8] {
        linear_chr_banks(0)
    }

    fn mirror_mode(&self) -> Mirroring {
        self.mirroring
    }

    fn reset_registers(&mut self) {
        self.prg_bank = 0;
        self.mirroring = Mirroring::SingleScreenLower;
    }
}
