// Cartridge module - iNES parsing and mapper implementations
//
// A cartridge is described by its PRG-ROM (program), CHR-ROM (pattern data,
// empty when the board carries CHR-RAM instead), a mapper number, and the
// nametable mirroring hint from the header.
//
// # iNES layout
//
// ```text
// 0-3:   "NES" followed by $1A
// 4:     PRG-ROM size in 16KB units
// 5:     CHR-ROM size in 8KB units (0 = CHR-RAM)
// 6:     Flags 6 - mirroring, battery, trainer, four-screen, mapper low nibble
// 7:     Flags 7 - mapper high nibble
// 8-15:  Unused here
// [512-byte trainer if flags 6 bit 2]
// PRG-ROM, then CHR-ROM
// ```

pub mod mappers;

pub use mappers::{create_mapper, Mapper, MapperError};

use std::fmt;

/// iNES header size in bytes
pub const HEADER_SIZE: usize = 16;

/// Trainer size in bytes
const TRAINER_SIZE: usize = 512;

/// PRG-ROM unit size (16KB)
pub const PRG_ROM_UNIT: usize = 16 * 1024;

/// CHR-ROM unit size (8KB)
pub const CHR_ROM_UNIT: usize = 8 * 1024;

/// Nametable mirroring arrangement
///
/// Each mode is encoded as four 2-bit fields, one per logical nametable page
/// (bits 1-0 for page 0 up to bits 7-6 for page 3), holding the physical page
/// the logical page resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// Pages 0/1 share one table, pages 2/3 the other
    Horizontal,
    /// Pages 0/2 share one table, pages 1/3 the other
    Vertical,
    /// All pages map to the first table
    SingleScreenLower,
    /// All pages map to the second table
    SingleScreenUpper,
    /// Four independent tables
    FourScreen,
}

impl Mirroring {
    /// Packed page-selection bits for this mode
    #[inline]
    pub fn bits(self) -> u8 {
        match self {
            Mirroring::Horizontal => 0x50,
            Mirroring::Vertical => 0x44,
            Mirroring::SingleScreenLower => 0x00,
            Mirroring::SingleScreenUpper => 0x55,
            Mirroring::FourScreen => 0xE4,
        }
    }
}

/// Errors raised while parsing an iNES image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum INesError {
    /// Fewer than 16 bytes
    TooShort,
    /// Missing "NES\x1A" signature
    InvalidMagic,
    /// Header declares no PRG-ROM
    NoPrgRom,
    /// The file ends before the declared PRG/CHR data
    Truncated {
        /// Bytes required by the header
        expected: usize,
        /// Bytes actually present
        actual: usize,
    },
}

impl fmt::Display for INesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            INesError::TooShort => write!(f, "File too small for an iNES header"),
            INesError::InvalidMagic => write!(f, "Missing iNES signature"),
            INesError::NoPrgRom => write!(f, "Header declares no PRG-ROM"),
            INesError::Truncated { expected, actual } => write!(
                f,
                "Truncated ROM: header requires {} bytes, file has {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for INesError {}

/// Parsed iNES header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct INesHeader {
    /// PRG-ROM size in 16KB units
    pub prg_rom_banks: u8,
    /// CHR-ROM size in 8KB units
    pub chr_rom_banks: u8,
    /// Flags 6
    pub flags6: u8,
    /// Flags 7
    pub flags7: u8,
}

impl INesHeader {
    /// Parse the first 16 bytes of an iNES image
    ///
    /// # Errors
    /// `INesError::TooShort` or `INesError::InvalidMagic`
    pub fn parse(bytes: &[u8]) -> Result<Self, INesError> {
        if bytes.len() < HEADER_SIZE {
            return Err(INesError::TooShort);
        }
        if bytes[0..4] != [b'N', b'E', b'S', 0x1A] {
            return Err(INesError::InvalidMagic);
        }

        Ok(INesHeader {
            prg_rom_banks: bytes[4],
            chr_rom_banks: bytes[5],
            flags6: bytes[6],
            flags7: bytes[7],
        })
    }

    /// Mapper number from the flag nibbles
    pub fn mapper(&self) -> u8 {
        (self.flags7 & 0xF0) | (self.flags6 >> 4)
    }

    /// Mirroring declared by flags 6
    pub fn mirroring(&self) -> Mirroring {
        if self.flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if self.flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    /// Battery-backed PRG-RAM present
    pub fn has_battery(&self) -> bool {
        self.flags6 & 0x02 != 0
    }

    /// 512-byte trainer precedes PRG-ROM
    pub fn has_trainer(&self) -> bool {
        self.flags6 & 0x04 != 0
    }

    /// PRG-ROM size in bytes
    pub fn prg_rom_size(&self) -> usize {
        self.prg_rom_banks as usize * PRG_ROM_UNIT
    }

    /// CHR-ROM size in bytes
    pub fn chr_rom_size(&self) -> usize {
        self.chr_rom_banks as usize * CHR_ROM_UNIT
    }
}

/// Cartridge structure representing a loaded ROM
#[derive(Debug, Clone)]
pub struct Cartridge {
    /// Program ROM
    pub prg_rom: Vec<u8>,
    /// Pattern ROM (empty for CHR-RAM boards)
    pub chr_rom: Vec<u8>,
    /// Trainer bytes, if present (not mapped)
    pub trainer: Option<Vec<u8>>,
    /// iNES mapper number
    pub mapper: u8,
    /// Initial mirroring
    pub mirroring: Mirroring,
    /// Battery-backed PRG-RAM
    pub has_battery: bool,
}

impl Cartridge {
    /// Build a cartridge directly from its parts
    ///
    /// # Arguments
    /// * `prg_rom` - Program ROM bytes
    /// * `chr_rom` - Pattern ROM bytes, empty for CHR-RAM
    /// * `mapper` - iNES mapper number
    /// * `mirroring` - Initial nametable mirroring
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mapper: u8, mirroring: Mirroring) -> Self {
        Cartridge {
            prg_rom,
            chr_rom,
            trainer: None,
            mapper,
            mirroring,
            has_battery: false,
        }
    }

    /// Parse an iNES image
    ///
    /// # Errors
    /// Any `INesError` for malformed or truncated images
    ///
    /// # Example
    /// ```
    /// use nesemu::cartridge::Cartridge;
    ///
    /// let mut image = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0];
    /// image.resize(16 + 16 * 1024 + 8 * 1024, 0);
    /// let cartridge = Cartridge::from_ines(&image).unwrap();
    /// assert_eq!(cartridge.prg_rom.len(), 16 * 1024);
    /// ```
    pub fn from_ines(bytes: &[u8]) -> Result<Self, INesError> {
        let header = INesHeader::parse(bytes)?;
        if header.prg_rom_banks == 0 {
            return Err(INesError::NoPrgRom);
        }

        let mut offset = HEADER_SIZE;
        let trainer_size = if header.has_trainer() { TRAINER_SIZE } else { 0 };
        let expected = offset + trainer_size + header.prg_rom_size() + header.chr_rom_size();
        if bytes.len() < expected {
            return Err(INesError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let trainer = if header.has_trainer() {
            let data = bytes[offset..offset + TRAINER_SIZE].to_vec();
            offset += TRAINER_SIZE;
            Some(data)
        } else {
            None
        };

        let prg_rom = bytes[offset..offset + header.prg_rom_size()].to_vec();
        offset += header.prg_rom_size();
        let chr_rom = bytes[offset..offset + header.chr_rom_size()].to_vec();

        Ok(Cartridge {
            prg_rom,
            chr_rom,
            trainer,
            mapper: header.mapper(),
            mirroring: header.mirroring(),
            has_battery: header.has_battery(),
        })
    }

    /// Whether the board uses CHR-RAM
    pub fn has_chr_ram(&self) -> bool {
        self.chr_rom.is_empty()
    }
}
