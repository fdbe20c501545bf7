// Mapper 1 (MMC1) - One of the most common NES mappers
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$BFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - CPU $C000-$FFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - PPU $0000-$0FFF: 4KB CHR bank 0 (switchable)
// - PPU $1000-$1FFF: 4KB CHR bank 1 (switchable)
//
// Register Interface:
// All writes to $8000-$FFFF use a serial shift register:
// - Bit 7 set: Reset shift register, force PRG mode 3
// - Bit 0: Data bit to shift in (LSB first)
// - On the 5th write, the accumulated value goes to the register picked by
//   address bits 13-14
//
// Control Register ($8000-$9FFF):
//   Bits 0-1: Mirroring (0=one-screen lower, 1=one-screen upper, 2=vertical, 3=horizontal)
//   Bits 2-3: PRG-ROM bank mode
//   Bit 4: CHR-ROM bank mode
//
// CHR Bank 0 ($A000-$BFFF), CHR Bank 1 ($C000-$DFFF):
//   4KB bank numbers (bank 0 low bit ignored in 8KB mode)
//
// PRG Bank ($E000-$FFFF):
//   Bits 0-3: Select PRG-ROM bank

use super::{CartridgeMapper, PRG_RAM_SIZE};
use crate::cartridge::Mirroring;
use crate::ppu::Ppu;

/// PRG-ROM bank size (16KB)
const PRG_BANK_SIZE: usize = 16 * 1024;

/// Shift register value with only the sentinel bit set
const SHIFT_RESET: u8 = 0x10;

/// PRG-ROM banking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrgBankMode {
    /// Switch 32KB at $8000, ignoring low bit of bank number
    Switch32KB,
    /// Fix first bank at $8000, switch 16KB bank at $C000
    FixFirst,
    /// Fix last bank at $C000, switch 16KB bank at $8000
    FixLast,
}

impl From<u8> for PrgBankMode {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0 | 1 => PrgBankMode::Switch32KB,
            2 => PrgBankMode::FixFirst,
            _ => PrgBankMode::FixLast,
        }
    }
}

/// Mapper 1 implementation (MMC1)
///
/// Used by games like The Legend of Zelda, Metroid and Mega Man 2.
pub struct Mapper1 {
    /// PRG-ROM data
    prg_rom: Vec<u8>,
    /// PRG-RAM (8KB)
    prg_ram: Vec<u8>,
    /// Mirroring from the header, used for the power-on control value
    header_mirroring: Mirroring,

    /// Shift register; the sentinel bit reaching bit 0 marks the 5th write
    shift: u8,

    // Internal registers
    /// Control register (mirroring and banking modes)
    control: u8,
    /// CHR bank 0 register
    chr_bank_0: u8,
    /// CHR bank 1 register
    chr_bank_1: u8,
    /// PRG bank register
    prg_bank: u8,

    /// Number of 16KB PRG-ROM banks
    prg_banks: usize,
}

impl Mapper1 {
    /// Create a new Mapper1 instance
    ///
    /// # Arguments
    /// * `prg_rom` - PRG-ROM data
    /// * `mirroring` - Mirroring from the header, loaded into the control register
    pub fn new(prg_rom: Vec<u8>, mirroring: Mirroring) -> Self {
        let prg_banks = (prg_rom.len() / PRG_BANK_SIZE).max(1);
        let mut mapper = Mapper1 {
            prg_rom,
            prg_ram: vec![0; PRG_RAM_SIZE],
            header_mirroring: mirroring,
            shift: SHIFT_RESET,
            control: 0,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            prg_banks,
        };
        mapper.reset_registers();
        mapper
    }

    fn header_mirror_bits(&self) -> u8 {
        match self.header_mirroring {
            Mirroring::Horizontal => 3,
            Mirroring::SingleScreenLower => 0,
            Mirroring::SingleScreenUpper => 1,
            _ => 2,
        }
    }

    /// Write to an internal register once the shift register is full
    fn write_internal_register(&mut self, address: u16, value: u8) {
        match (address >> 13) & 3 {
            0 => self.control = value,
            1 => self.chr_bank_0 = value,
            2 => self.chr_bank_1 = value,
            _ => self.prg_bank = value & 0x0F,
        }
    }

    fn prg_bank_mode(&self) -> PrgBankMode {
        PrgBankMode::from(self.control >> 2)
    }

    /// Map CPU address to PRG-ROM offset
    fn map_prg_address(&self, address: u16) -> usize {
        let bank = self.prg_bank as usize;
        let upper = address >= 0xC000;
        let bank_num = match (self.prg_bank_mode(), upper) {
            (PrgBankMode::Switch32KB, false) => bank & !1,
            (PrgBankMode::Switch32KB, true) => bank | 1,
            (PrgBankMode::FixFirst, false) => 0,
            (PrgBankMode::FixFirst, true) => bank,
            (PrgBankMode::FixLast, false) => bank,
            (PrgBankMode::FixLast, true) => self.prg_banks - 1,
        };
        let offset = (address & 0x3FFF) as usize;
        ((bank_num % self.prg_banks) * PRG_BANK_SIZE + offset) % self.prg_rom.len()
    }
}

impl CartridgeMapper for Mapper1 {
    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x6000..=0x7FFF => self.prg_ram[(address & 0x1FFF) as usize],
            0x8000..=0xFFFF => self.prg_rom[self.map_prg_address(address)],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8, ppu: &mut Ppu) {
        match address {
            0x6000..=0x7FFF => self.prg_ram[(address & 0x1FFF) as usize] = value,
            0x8000..=0xFFFF => {
                if value & 0x80 != 0 {
                    self.shift = SHIFT_RESET;
                    self.control |= 0x0C;
                    return;
                }

                let full = self.shift & 1 != 0;
                self.shift = (self.shift >> 1) | ((value & 1) << 4);
                if !full {
                    return;
                }

                let register_value = self.shift;
                self.shift = SHIFT_RESET;

                let mirroring = self.mirror_mode();
                let banks = self.chr_bank_offsets();
                self.write_internal_register(address, register_value);

                if self.mirror_mode() != mirroring {
                    ppu.set_mirror_mode(self.mirror_mode());
                }
                if self.chr_bank_offsets() != banks {
                    ppu.set_chr_bank_offsets(&self.chr_bank_offsets());
                }
            }
            _ => {}
        }
    }

    fn chr_bank_offsets(&self) -> [usize; 8] {
        let (low, high) = if self.control & 0x10 == 0 {
            // 8KB mode: low bit of bank 0 ignored
            let base = (self.chr_bank_0 & 0x1E) as usize * 4;
            (base, base + 4)
        } else {
            (
                self.chr_bank_0 as usize * 4,
                self.chr_bank_1 as usize * 4,
            )
        };
        [0, 1, 2, 3, 4, 5, 6, 7].map(|i| if i < 4 { low + i } else { high + i - 4 })
    }

    fn mirror_mode(&self) -> Mirroring {
        match self.control & 0b11 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }

    fn reset_registers(&mut self) {
        self.shift = SHIFT_RESET;
        self.control = 0x0C | self.header_mirror_bits();
        self.chr_bank_0 = 0;
        self.chr_bank_1 = 0;
        self.prg_bank = 0;
    }
}
