// Mapper 2 (UxROM) - Switchable PRG-ROM with fixed CHR
//
// Memory Layout:
// - CPU $8000-$BFFF: 16KB switchable PRG-ROM bank
// - CPU $C000-$FFFF: 16KB fixed PRG-ROM bank (last bank)
// - PPU $0000-$1FFF: 8KB CHR (usually CHR-RAM)
//
// Bank Switching:
// - Any write to $8000-$FFFF selects the PRG-ROM bank for $8000-$BFFF
// - Last bank is always fixed at $C000-$FFFF
//
// Games using Mapper 2:
// - Mega Man
// - Castlevania
// - Contra

use super::{linear_chr_banks, CartridgeMapper};
use crate::cartridge::Mirroring;
use crate::ppu::Ppu;

/// PRG-ROM bank size (16KB)
const PRG_BANK_SIZE: usize = 16 * 1024;

/// Mapper 2 implementation (UxROM)
pub struct Mapper2 {
    /// PRG-ROM data
    prg_rom: Vec<u8>,
    /// Mirroring type (fixed by the board)
    mirroring: Mirroring,
    /// Currently selected bank for $8000-$BFFF
    prg_bank: usize,
    /// Number of 16KB PRG-ROM banks
    prg_banks: usize,
}

impl Mapper2 {
    /// Create a new Mapper2 instance
    ///
    /// # Arguments
    /// * `prg_rom` - PRG-ROM data
    /// * `mirroring` - Mirroring from the cartridge header
    pub fn new(prg_rom: Vec<u8>, mirroring: Mirroring) -> Self {
        let prg_banks = (prg_rom.len() / PRG_BANK_SIZE).max(1);
        Mapper2 {
            prg_rom,
            mirroring,
            prg_bank: 0,
            prg_banks,
        }
    }

    fn prg_byte(&self, bank: usize, address: u16) -> u8 {
        let index = bank * PRG_BANK_SIZE + (address & 0x3FFF) as usize;
        self.prg_rom[index % self.prg_rom.len()]
    }
}

impl CartridgeMapper for Mapper2 {
    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x8000..=0xBFFF => self.prg_byte(self.prg_bank, address),
            0xC000..=0xFFFF => self.prg_byte(self.prg_banks - 1, address),
            // No PRG-RAM on this board
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8, _ppu: &mut Ppu) {
        if address >= 0x8000 {
            self.prg_bank = value as usize % self.prg_banks;
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
    }
}
