// Mapper 4 (MMC3) - One of the most important and complex NES mappers
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM
// - CPU $8000-$9FFF: 8KB PRG-ROM bank (R6, or second-to-last bank when swapped)
// - CPU $A000-$BFFF: 8KB PRG-ROM bank (always R7)
// - CPU $C000-$DFFF: 8KB PRG-ROM bank (second-to-last bank, or R6 when swapped)
// - CPU $E000-$FFFF: 8KB PRG-ROM bank (fixed to last bank)
// - PPU $0000-$0FFF: two 2KB CHR banks (R0, R1), or four 1KB banks when inverted
// - PPU $1000-$1FFF: four 1KB CHR banks (R2-R5), or two 2KB banks when inverted
//
// Register Interface:
// - $8000-$9FFE (even): Bank select
//   Bit 7: CHR A12 inversion
//   Bit 6: PRG swap ($8000 pinned instead of $C000)
//   Bits 0-2: Bank register to update (0-7)
// - $8001-$9FFF (odd): Bank data for the selected register
// - $A000-$BFFE (even): Mirroring (0 = vertical, 1 = horizontal)
// - $A001-$BFFF (odd): PRG-RAM protect (stored only)
// - $C000-$DFFE (even): IRQ latch
// - $C001-$DFFF (odd): IRQ reload request
// - $E000-$FFFE (even): IRQ disable and acknowledge
// - $E001-$FFFF (odd): IRQ enable

use super::{CartridgeMapper, PRG_RAM_SIZE};
use crate::cartridge::Mirroring;
use crate::ppu::{Ppu, LAST_VISIBLE_SCANLINE, PRERENDER_SCANLINE};

/// PRG-ROM bank size (8KB)
const PRG_BANK_SIZE: usize = 8 * 1024;

/// Mapper 4 implementation (MMC3)
///
/// Used by games like Super Mario Bros. 3, Kirby's Adventure and Mega Man 3-6.
pub struct Mapper4 {
    /// PRG-ROM data
    prg_rom: Vec<u8>,
    /// PRG-RAM (8KB)
    prg_ram: Vec<u8>,

    // Internal registers
    /// Bank select register
    bank_select: u8,
    /// Bank data registers R0-R7
    bank_registers: [u8; 8],
    /// Current mirroring mode
    mirroring: Mirroring,
    /// PRG-RAM protect register
    prg_ram_protect: u8,

    /// Byte offset of each 8KB PRG window, recomputed on every register write
    prg_offsets: [usize; 4],

    // IRQ registers
    /// Counter reload value
    irq_latch: u8,
    /// Scanline counter
    irq_counter: u8,
    /// Reload the counter on the next clock
    irq_reload: bool,
    /// IRQ enabled flag
    irq_enabled: bool,
    /// IRQ line asserted until acknowledged
    irq_pending: bool,

    /// Highest 8KB PRG bank number
    max_prg: usize,
}

impl Mapper4 {
    /// Create a new Mapper4 instance
    ///
    /// # Arguments
    /// * `prg_rom` - PRG-ROM data (a multiple of 8KB)
    pub fn new(prg_rom: Vec<u8>) -> Self {
        let max_prg = (prg_rom.len() / PRG_BANK_SIZE).max(1) - 1;
        let mut mapper = Mapper4 {
            prg_rom,
            prg_ram: vec![0; PRG_RAM_SIZE],
            bank_select: 0,
            bank_registers: [0; 8],
            mirroring: Mirroring::Vertical,
            prg_ram_protect: 0,
            prg_offsets: [0; 4],
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
            max_prg,
        };
        mapper.reset_registers();
        mapper
    }

    fn prg_swapped(&self) -> bool {
        self.bank_select & 0x40 != 0
    }

    fn chr_inverted(&self) -> bool {
        self.bank_select & 0x80 != 0
    }

    /// Recompute the four PRG window offsets from the bank registers
    fn update_prg_offsets(&mut self) {
        let second_last = 0xFE & self.max_prg;
        let r6 = self.bank_registers[6] as usize & self.max_prg;
        let r7 = self.bank_registers[7] as usize & self.max_prg;
        let banks = if self.prg_swapped() {
            [second_last, r7, r6, self.max_prg]
        } else {
            [r6, r7, second_last, self.max_prg]
        };
        self.prg_offsets = banks.map(|bank| (bank * PRG_BANK_SIZE) % self.prg_rom.len());
    }

    /// Clock the scanline counter
    fn clock_irq_counter(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }

        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }
}

impl CartridgeMapper for Mapper4 {
    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x6000..=0x7FFF => self.prg_ram[(address & 0x1FFF) as usize],
            0x8000..=0xFFFF => {
                let window = ((address - 0x8000) >> 13) as usize;
                let offset = self.prg_offsets[window] + (address & 0x1FFF) as usize;
                self.prg_rom[offset % self.prg_rom.len()]
            }
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8, ppu: &mut Ppu) {
        let even = address & 1 == 0;
        match address {
            0x6000..=0x7FFF => self.prg_ram[(address & 0x1FFF) as usize] = value,
            0x8000..=0x9FFF => {
                if even {
                    self.bank_select = value;
                } else {
                    self.bank_registers[(self.bank_select & 7) as usize] = value;
                }
                self.update_prg_offsets();
                ppu.set_chr_bank_offsets(&self.chr_bank_offsets());
            }
            0xA000..=0xBFFF => {
                if even {
                    self.mirroring = if value & 1 == 0 {
                        Mirroring::Vertical
                    } else {
                        Mirroring::Horizontal
                    };
                    ppu.set_mirror_mode(self.mirroring);
                } else {
                    self.prg_ram_protect = value;
                }
            }
            0xC000..=0xDFFF => {
                if even {
                    self.irq_latch = value;
                } else {
                    self.irq_reload = true;
                }
            }
            0xE000..=0xFFFF => {
                if even {
                    self.irq_enabled = false;
                    self.irq_pending = false;
                } else {
                    self.irq_enabled = true;
                }
            }
            _ => {}
        }
    }

    fn on_scanline(&mut self, line: u16, rendering: bool, _ppu: &mut Ppu) {
        if rendering && (line <= LAST_VISIBLE_SCANLINE || line == PRERENDER_SCANLINE) {
            self.clock_irq_counter();
        }
    }

    fn chr_bank_offsets(&self) -> [usize; 8] {
        let r = self.bank_registers.map(usize::from);
        let pairs = [r[0] & 0xFE, (r[0] & 0xFE) | 1, r[1] & 0xFE, (r[1] & 0xFE) | 1];
        let singles = [r[2], r[3], r[4], r[5]];
        let (low, high) = if self.chr_inverted() {
            (singles, pairs)
        } else {
            (pairs, singles)
        };
        [low[0], low[1], low[2], low[3], high[0], high[1], high[2], high[3]]
    }

    fn mirror_mode(&self) -> Mirroring {
        self.mirroring
    }

    fn irq_line(&self) -> bool {
        self.irq_pending
    }

    fn reset_registers(&mut self) {
        self.bank_select = 0;
        self.bank_registers = [0, 2, 4, 5, 6, 7, 0, 1];
        self.mirroring = Mirroring::Vertical;
        self.prg_ram_protect = 0;
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_reload = false;
        self.irq_enabled = false;
        self.irq_pending = false;
        self.update_prg_offsets();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// PRG where the first byte of each 8KB bank holds its bank number
    fn numbered_prg(banks: usize) -> Vec<u8> {
        let mut prg = vec![0; banks * PRG_BANK_SIZE];
        for bank in 0..banks {
            prg[bank * PRG_BANK_SIZE] = bank as u8;
        }
        prg
    }

    fn setup() -> (Mapper4, Ppu) {
        let mut ppu = Ppu::new();
        ppu.set_chr_rom(vec![0; 256 * 1024]);
        (Mapper4::new(numbered_prg(16)), ppu)
    }

    fn set_bank(mapper: &mut Mapper4, ppu: &mut Ppu, select: u8, register: u8, value: u8) {
        mapper.cpu_write(0x8000, select | register, ppu);
        mapper.cpu_write(0x8001, value, ppu);
    }

    fn window_banks(mapper: &Mapper4) -> [u8; 4] {
        [0x8000, 0xA000, 0xC000, 0xE000].map(|addr| mapper.cpu_read(addr))
    }

    #[test]
    fn test_power_on_prg_layout() {
        let (mapper, _) = setup();
        assert_eq!(window_banks(&mapper), [0, 1, 14, 15]);
    }

    #[test]
    fn test_swap_bit_exchanges_pinned_window() {
        let (mut mapper, mut ppu) = setup();
        set_bank(&mut mapper, &mut ppu, 0x00, 6, 3);
        set_bank(&mut mapper, &mut ppu, 0x00, 7, 5);
        assert_eq!(window_banks(&mapper), [3, 5, 14, 15]);

        mapper.cpu_write(0x8000, 0x40, &mut ppu);
        assert_eq!(window_banks(&mapper), [14, 5, 3, 15]);
    }

    #[test]
    fn test_prg_bank_masked_to_size() {
        let (mut mapper, mut ppu) = setup();
        set_bank(&mut mapper, &mut ppu, 0x00, 6, 0x13);
        assert_eq!(mapper.cpu_read(0x8000), 3);
    }

    #[test]
    fn test_chr_grouping_and_inversion() {
        let (mut mapper, mut ppu) = setup();
        for (register, value) in [(0, 9), (1, 20), (2, 40), (3, 41), (4, 42), (5, 43)] {
            set_bank(&mut mapper, &mut ppu, 0x00, register, value);
        }
        assert_eq!(mapper.chr_bank_offsets(), [8, 9, 20, 21, 40, 41, 42, 43]);
        assert_eq!(ppu.chr_bank_offsets()[1], 9 << 10);

        mapper.cpu_write(0x8000, 0x80, &mut ppu);
        assert_eq!(mapper.chr_bank_offsets(), [40, 41, 42, 43, 8, 9, 20, 21]);
        assert_eq!(ppu.chr_bank_offsets()[4], 8 << 10);
    }

    #[test]
    fn test_mirroring_register() {
        let (mut mapper, mut ppu) = setup();
        mapper.cpu_write(0xA000, 1, &mut ppu);
        assert_eq!(ppu.mirror_mode(), Mirroring::Horizontal);
        mapper.cpu_write(0xA000, 0, &mut ppu);
        assert_eq!(mapper.mirror_mode(), Mirroring::Vertical);
        assert_eq!(ppu.mirror_mode(), Mirroring::Vertical);
    }

    #[test]
    fn test_irq_fires_after_latch_lines() {
        let (mut mapper, mut ppu) = setup();
        mapper.cpu_write(0xC000, 3, &mut ppu);
        mapper.cpu_write(0xC001, 0, &mut ppu);
        mapper.cpu_write(0xE001, 0, &mut ppu);

        // First clock reloads to 3, then 2, 1, 0
        for line in 0..3 {
            mapper.on_scanline(line, true, &mut ppu);
            assert!(!mapper.irq_line(), "line {}", line);
        }
        mapper.on_scanline(3, true, &mut ppu);
        assert!(mapper.irq_line());

        // Stays asserted until acknowledged
        mapper.on_scanline(4, true, &mut ppu);
        assert!(mapper.irq_line());
        mapper.cpu_write(0xE000, 0, &mut ppu);
        assert!(!mapper.irq_line());
    }

    #[test]
    fn test_irq_counter_idle_without_rendering() {
        let (mut mapper, mut ppu) = setup();
        mapper.cpu_write(0xC000, 1, &mut ppu);
        mapper.cpu_write(0xE001, 0, &mut ppu);
        for line in 0..240 {
            mapper.on_scanline(line, false, &mut ppu);
        }
        assert!(!mapper.irq_line());
    }

    #[test]
    fn test_irq_disabled_never_asserts() {
        let (mut mapper, mut ppu) = setup();
        mapper.cpu_write(0xC000, 1, &mut ppu);
        for line in 0..10 {
            mapper.on_scanline(line, true, &mut ppu);
        }
        assert!(!mapper.irq_line());
    }

    #[test]
    fn test_prg_smaller_than_one_bank_wraps() {
        let mut prg = vec![0; 0x1000];
        prg[0x123] = 0x5A;
        prg[0xFFF] = 0xA5;
        let mapper = Mapper4::new(prg);
        assert_eq!(mapper.cpu_read(0xE123), 0x5A);
        assert_eq!(mapper.cpu_read(0x9FFF), 0xA5);
        assert_eq!(mapper.cpu_read(0xFFFF), 0xA5);
    }

    #[test]
    fn test_prg_ram_and_protect_register() {
        let (mut mapper, mut ppu) = setup();
        mapper.cpu_write(0xA001, 0x00, &mut ppu);
        mapper.cpu_write(0x6010, 0x77, &mut ppu);
        assert_eq!(mapper.cpu_read(0x6010), 0x77);
    }
}
