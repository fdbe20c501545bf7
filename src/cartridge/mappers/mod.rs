// Mappers module - Implementations of various NES cartridge mappers
//
// This module contains the mapper factory and individual mapper implementations.
// Each mapper handles memory mapping and banking for one cartridge board type.
//
// A mapper owns its PRG data and bank registers. CHR data lives in the PPU;
// the mapper drives it by pushing 1KB bank numbers through
// `Ppu::set_chr_bank_offsets`, which also records a timeline event so bank
// switches take effect on the right scanline.

mod mapper0;
mod mapper1;
mod mapper2;
mod mapper3;
mod mapper4;
mod mapper7;

pub use mapper0::Mapper0;
pub use mapper1::Mapper1;
pub use mapper2::Mapper2;
pub use mapper3::Mapper3;
pub use mapper4::Mapper4;
pub use mapper7::Mapper7;

use super::{Cartridge, Mirroring};
use crate::bus::{Bus, Handler};
use crate::ppu::Ppu;

/// PRG-RAM size for boards that carry it (8KB at $6000-$7FFF)
pub(crate) const PRG_RAM_SIZE: usize = 8 * 1024;

/// Error type for mapper creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapperError {
    /// The requested mapper number is not supported
    UnsupportedMapper(u8),
    /// Invalid cartridge configuration for the mapper
    InvalidConfiguration(String),
}

impl std::fmt::Display for MapperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapperError::UnsupportedMapper(num) => {
                write!(f, "Mapper {} is not supported", num)
            }
            MapperError::InvalidConfiguration(msg) => {
                write!(f, "Invalid mapper configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for MapperError {}

/// Behavior shared by every cartridge board
///
/// Mutating calls receive the PPU explicitly so bank and mirroring changes
/// reach it at the moment of the write.
pub trait CartridgeMapper {
    /// Install CPU handlers on the bus
    ///
    /// The default claims $6000-$FFFF for reads and writes.
    fn install(&self, bus: &mut Bus) {
        bus.set_read_handler(0x6000, 0xFFFF, Handler::Cartridge);
        bus.set_write_handler(0x6000, 0xFFFF, Handler::Cartridge);
    }

    /// Read PRG-ROM / PRG-RAM
    fn cpu_read(&self, addr: u16) -> u8;

    /// Write PRG-RAM or a bank register
    fn cpu_write(&mut self, addr: u16, value: u8, ppu: &mut Ppu);

    /// Scanline notification for boards with a scanline counter
    fn on_scanline(&mut self, _line: u16, _rendering: bool, _ppu: &mut Ppu) {}

    /// Current CHR bank (1KB units) for each of the eight PPU windows
    fn chr_bank_offsets(&self) -> [usize; 8];

    /// Current nametable mirroring
    fn mirror_mode(&self) -> Mirroring;

    /// Level of the IRQ line
    fn irq_line(&self) -> bool {
        false
    }

    /// Return bank registers to their power-on state
    fn reset_registers(&mut self);

    /// Reset registers and re-derive the PPU's bank and mirroring state
    fn reset(&mut self, ppu: &mut Ppu) {
        self.reset_registers();
        ppu.set_mirror_mode(self.mirror_mode());
        ppu.set_chr_bank_offsets(&self.chr_bank_offsets());
    }
}

/// Supported cartridge boards
pub enum Mapper {
    /// iNES 0
    Nrom(Mapper0),
    /// iNES 1
    Mmc1(Mapper1),
    /// iNES 2
    UxRom(Mapper2),
    /// iNES 3
    CnRom(Mapper3),
    /// iNES 4
    Mmc3(Mapper4),
    /// iNES 7
    AxRom(Mapper7),
}

impl Mapper {
    fn board(&self) -> &dyn CartridgeMapper {
        match self {
            Mapper::Nrom(m) => m,
            Mapper::Mmc1(m) => m,
            Mapper::UxRom(m) => m,
            Mapper::CnRom(m) => m,
            Mapper::Mmc3(m) => m,
            Mapper::AxRom(m) => m,
        }
    }

    fn board_mut(&mut self) -> &mut dyn CartridgeMapper {
        match self {
            Mapper::Nrom(m) => m,
            Mapper::Mmc1(m) => m,
            Mapper::UxRom(m) => m,
            Mapper::CnRom(m) => m,
            Mapper::Mmc3(m) => m,
            Mapper::AxRom(m) => m,
        }
    }

    /// iNES mapper number
    pub fn number(&self) -> u8 {
        match self {
            Mapper::Nrom(_) => 0,
            Mapper::Mmc1(_) => 1,
            Mapper::UxRom(_) => 2,
            Mapper::CnRom(_) => 3,
            Mapper::Mmc3(_) => 4,
            Mapper::AxRom(_) => 7,
        }
    }

    /// Board name
    pub fn name(&self) -> &'static str {
        match self {
            Mapper::Nrom(_) => "NROM",
            Mapper::Mmc1(_) => "MMC1",
            Mapper::UxRom(_) => "UxROM",
            Mapper::CnRom(_) => "CNROM",
            Mapper::Mmc3(_) => "MMC3",
            Mapper::AxRom(_) => "AxROM",
        }
    }

    /// Install CPU handlers on the bus
    pub fn install(&self, bus: &mut Bus) {
        self.board().install(bus);
    }

    /// Read PRG-ROM / PRG-RAM
    pub fn cpu_read(&self, addr: u16) -> u8 {
        self.board().cpu_read(addr)
    }

    /// Write PRG-RAM or a bank register
    pub fn cpu_write(&mut self, addr: u16, value: u8, ppu: &mut Ppu) {
        self.board_mut().cpu_write(addr, value, ppu);
    }

    /// Scanline notification
    pub fn on_scanline(&mut self, line: u16, rendering: bool, ppu: &mut Ppu) {
        self.board_mut().on_scanline(line, rendering, ppu);
    }

    /// Current CHR bank (1KB units) for each PPU window
    pub fn chr_bank_offsets(&self) -> [usize; 8] {
        self.board().chr_bank_offsets()
    }

    /// Current nametable mirroring
    pub fn mirror_mode(&self) -> Mirroring {
        self.board().mirror_mode()
    }

    /// Level of the IRQ line
    pub fn irq_line(&self) -> bool {
        self.board().irq_line()
    }

    /// Reset registers and re-derive the PPU's bank and mirroring state
    pub fn reset(&mut self, ppu: &mut Ppu) {
        self.board_mut().reset(ppu);
    }
}

impl std::fmt::Debug for Mapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mapper({} {})", self.number(), self.name())
    }
}

/// Create a mapper instance based on the mapper number in the cartridge
///
/// PRG data is copied into the mapper; the cartridge itself is untouched, so a
/// failure leaves every piece of emulator state as it was.
///
/// # Arguments
/// * `cartridge` - The cartridge to create a mapper for
///
/// # Errors
/// Returns `MapperError::UnsupportedMapper` if the mapper number is not
/// implemented, `MapperError::InvalidConfiguration` if the PRG size does not
/// fit the board
///
/// # Example
/// ```
/// use nesemu::cartridge::{create_mapper, Cartridge, Mirroring};
///
/// let cartridge = Cartridge::new(vec![0; 0x8000], vec![0; 0x2000], 0, Mirroring::Vertical);
/// let mapper = create_mapper(&cartridge).unwrap();
/// assert_eq!(mapper.name(), "NROM");
/// ```
pub fn create_mapper(cartridge: &Cartridge) -> Result<Mapper, MapperError> {
    if cartridge.prg_rom.is_empty() {
        return Err(MapperError::InvalidConfiguration(
            "PRG-ROM is empty".to_string(),
        ));
    }

    let prg = cartridge.prg_rom.clone();
    let chr_size = cartridge.chr_rom.len();
    let mirroring = cartridge.mirroring;

    let mapper = match cartridge.mapper {
        0 => Mapper::Nrom(Mapper0::new(prg, mirroring)),
        1 => Mapper::Mmc1(Mapper1::new(prg, mirroring)),
        2 => Mapper::UxRom(Mapper2::new(prg, mirroring)),
        3 => Mapper::CnRom(Mapper3::new(prg, chr_size, mirroring)),
        4 => Mapper::Mmc3(Mapper4::new(prg)),
        7 => Mapper::AxRom(Mapper7::new(prg)),
        mapper_num => return Err(MapperError::UnsupportedMapper(mapper_num)),
    };

    log::info!(
        "Mapper {} ({}): PRG {}KB, CHR {}",
        mapper.number(),
        mapper.name(),
        cartridge.prg_rom.len() / 1024,
        if chr_size == 0 {
            "RAM 8KB".to_string()
        } else {
            format!("ROM {}KB", chr_size / 1024)
        }
    );
    Ok(mapper)
}

/// Default CHR windows: banks 0-7 in order
pub(crate) fn linear_chr_banks(base: usize) -> [usize; 8] {
    [0, 1, 2, 3, 4, 5, 6, 7].map(|i| base + i)
}
