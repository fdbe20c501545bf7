// Mapper 0 (NROM) - The simplest NES mapper with no bank switching
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$BFFF: First 16KB of PRG-ROM
// - CPU $C000-$FFFF: Last 16KB of PRG-ROM (or mirror of first 16KB if only 16KB total)
// - PPU $0000-$1FFF: 8KB CHR-ROM or CHR-RAM
//
// Variants:
// - NROM-128: 16KB PRG-ROM (mirrored to fill 32KB space)
// - NROM-256: 32KB PRG-ROM (no mirroring)

use super::{linear_chr_banks, CartridgeMapper, PRG_RAM_SIZE};
use crate::cartridge::Mirroring;
use crate::ppu::Ppu;

/// Mapper 0 implementation (NROM)
///
/// This is the simplest mapper used by games like Super Mario Bros., Donkey Kong,
/// and Balloon Fight. It has no bank switching capability.
pub struct Mapper0 {
    /// PRG-ROM data (16KB or 32KB)
    prg_rom: Vec<u8>,
    /// PRG-RAM at $6000
    prg_ram: Vec<u8>,
    /// Mirroring type (fixed by the board)
    mirroring: Mirroring,
}

impl Mapper0 {
    /// Create a new Mapper0 instance
    ///
    /// # Arguments
    /// * `prg_rom` - PRG-ROM data; sizes other than 32KB repeat through $8000-$FFFF
    /// * `mirroring` - Mirroring from the cartridge header
    pub fn new(prg_rom: Vec<u8>, mirroring: Mirroring) -> Self {
        Mapper0 {
            prg_rom,
            prg_ram: vec![0; PRG_RAM_SIZE],
            mirroring,
        }
    }
}

impl CartridgeMapper for Mapper0 {
    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr & 0x1FFF) as usize],
            // Modulo mirrors a 16KB ROM into $C000-$FFFF
            0x8000..=0xFFFF => self.prg_rom[(addr - 0x8000) as usize % self.prg_rom.len()],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8, _ppu: &mut Ppu) {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr & 0x1FFF) as usize] = value,
            _ => log::debug!("NROM: ignored write ${:02X} to ${:04X}", value, addr),
        }
    }

    fn chr_bank_offsets(&self) -> [usize; 8] {
        linear_chr_banks(0)
    }

    fn mirror_mode(&self) -> Mirroring {
        self.mirroring
    }

    fn reset_registers(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prg_with_markers(size: usize) -> Vec<u8> {
        let mut prg = vec![0; size];
        prg[0] = 0x11;
        prg[size - 1] = 0x22;
        prg
    }

    #[test]
    fn test_nrom_128_mirrors_first_bank() {
        let mapper = Mapper0::new(prg_with_markers(16 * 1024), Mirroring::Horizontal);
        assert_eq!(mapper.cpu_read(0x8000), 0x11);
        assert_eq!(mapper.cpu_read(0xC000), 0x11);
        assert_eq!(mapper.cpu_read(0xBFFF), 0x22);
        assert_eq!(mapper.cpu_read(0xFFFF), 0x22);
    }

    #[test]
    fn test_nrom_256_maps_full_range() {
        let mapper = Mapper0::new(prg_with_markers(32 * 1024), Mirroring::Vertical);
        assert_eq!(mapper.cpu_read(0x8000), 0x11);
        assert_eq!(mapper.cpu_read(0xC000), 0x00);
        assert_eq!(mapper.cpu_read(0xFFFF), 0x22);
    }

    #[test]
    fn test_prg_rom_writes_ignored() {
        let mut ppu = Ppu::new();
        let mut mapper = Mapper0::new(prg_with_markers(16 * 1024), Mirroring::Vertical);
        mapper.cpu_write(0x8000, 0xFF, &mut ppu);
        assert_eq!(mapper.cpu_read(0x8000), 0x11);
    }

    #[test]
    fn test_prg_ram() {
        let mut ppu = Ppu::new();
        let mut mapper = Mapper0::new(prg_with_markers(16 * 1024), Mirroring::Vertical);
        mapper.cpu_write(0x6123, 0x5A, &mut ppu);
        assert_eq!(mapper.cpu_read(0x6123), 0x5A);
    }

    #[test]
    fn test_fixed_mirroring_and_chr() {
        let mapper = Mapper0::new(vec![0; 16 * 1024], Mirroring::Vertical);
        assert_eq!(mapper.mirror_mode(), Mirroring::Vertical);
        assert_eq!(mapper.chr_bank_offsets(), [0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(!mapper.irq_line());
    }
}
