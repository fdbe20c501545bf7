// Mapper 3 (CNROM) - Fixed PRG-ROM with switchable CHR-ROM
//
// Memory Layout:
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror if only 16KB total)
// - PPU $0000-$1FFF: 8KB switchable CHR-ROM bank
//
// Bank Switching:
// - Any write to $8000-$FFFF selects the 8KB CHR-ROM bank (low 2 bits)
// - PRG-ROM is fixed
//
// Games using Mapper 3:
// - Arkanoid
// - Paperboy
// - Q*bert

use super::CartridgeMapper;
use crate::cartridge::Mirroring;
use crate::ppu::Ppu;

/// CHR-ROM bank size (8KB)
const CHR_BANK_SIZE: usize = 8 * 1024;

/// Mapper 3 implementation (CNROM)
pub struct Mapper3 {
    /// PRG-ROM data
    prg_rom: Vec<u8>,
    /// Mirroring type (fixed by the board)
    mirroring: Mirroring,
    /// Currently selected 8KB CHR bank
    chr_bank: usize,
    /// Number of 8KB CHR banks
    chr_banks: usize,
}

impl Mapper3 {
    /// Create a new Mapper3 instance
    ///
    /// # Arguments
    /// * `prg_rom` - PRG-ROM data (16KB or 32KB)
    /// * `chr_size` - CHR-ROM size in bytes, used to wrap bank numbers
    /// * `mirroring` - Mirroring from the cartridge header
    pub fn new(prg_rom: Vec<u8>, chr_size: usize, mirroring: Mirroring) -> Self {
        Mapper3 {
            prg_rom,
            mirroring,
            chr_bank: 0,
            chr_banks: (chr_size / CHR_BANK_SIZE).max(1),
        }
    }
}

impl CartridgeMapper for Mapper3 {
    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x8000..=0xFFFF => self.prg_rom[(address - 0x8000) as usize % self.prg_rom.len()],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8, ppu: &mut Ppu) {
        if address >= 0x8000 {
            self.chr_bank = (value & 0x03) as usize % self.chr_banks;
            ppu.set_chr_bank(self.chr_bank);
        }
    }

    fn chr_bank_offsets(&self) -> [usize; 8] {
        let base = self.chr_bank * 8;
        [0, 1, 2, 3, 4, 5, 6, 7].map(|i| base + i)
    }

    fn mirror_mode(&self) -> Mirroring {
        self.mirroring
    }

    fn reset_registers(&mut self) {
        self.chr_bank = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(chr_banks: usize) -> (Mapper3, Ppu) {
        let mut ppu = Ppu::new();
        ppu.set_chr_rom(vec![0; chr_banks * CHR_BANK_SIZE]);
        let mut prg = vec![0; 32 * 1024];
        prg[0] = 0xA5;
        (Mapper3::new(prg, chr_banks * CHR_BANK_SIZE, Mirroring::Vertical), ppu)
    }

    #[test]
    fn test_prg_is_fixed() {
        let (mut mapper, mut ppu) = setup(4);
        mapper.cpu_write(0x8000, 2, &mut ppu);
        assert_eq!(mapper.cpu_read(0x8000), 0xA5);
    }

    #[test]
    fn test_chr_bank_select_reaches_ppu() {
        let (mut mapper, mut ppu) = setup(4);
        mapper.cpu_write(0x8000, 2, &mut ppu);
        assert_eq!(mapper.chr_bank_offsets()[0], 16);
        assert_eq!(ppu.chr_bank_offsets()[0], 2 * CHR_BANK_SIZE);
        assert_eq!(ppu.chr_bank_offsets()[7], 2 * CHR_BANK_SIZE + 7 * 1024);
    }

    #[test]
    fn test_chr_bank_uses_low_bits_and_wraps() {
        let (mut mapper, mut ppu) = setup(2);
        mapper.cpu_write(0x8000, 0xFD, &mut ppu);
        assert_eq!(mapper.chr_bank_offsets()[0], 8);
        mapper.cpu_write(0x8000, 0x02, &mut ppu);
        assert_eq!(mapper.chr_bank_offsets()[0], 0);
    }
}
