// Common test utilities for integration tests
//
// Builds small iNES images in memory so the emulator can be driven end to
// end without ROM files on disk.

#![allow(dead_code)]

use nesemu::emulator::Emulator;

/// CPU cycles in one NTSC frame, rounded up
pub const CYCLES_PER_FRAME: u64 = 29781;

/// 16KB PRG-ROM unit
pub const PRG_BANK: usize = 16 * 1024;

/// 8KB CHR-ROM unit
pub const CHR_BANK: usize = 8 * 1024;

/// In-memory iNES image builder
pub struct RomBuilder {
    mapper: u8,
    flags6: u8,
    prg: Vec<u8>,
    chr: Vec<u8>,
}

impl RomBuilder {
    /// `prg_banks` x 16KB of NOP-filled PRG, no CHR, mapper 0, horizontal
    /// mirroring. The reset vector points at $8000.
    pub fn new(prg_banks: usize) -> Self {
        let mut builder = RomBuilder {
            mapper: 0,
            flags6: 0,
            prg: vec![0xEA; prg_banks * PRG_BANK],
            chr: Vec::new(),
        };
        builder.set_vector(0xFFFC, 0x8000);
        builder
    }

    pub fn mapper(mut self, mapper: u8) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn vertical_mirroring(mut self) -> Self {
        self.flags6 |= 0x01;
        self
    }

    /// Copy `program` to the start of the last 16KB bank (which always
    /// appears at $C000 and, for a single-bank image, at $8000 too)
    pub fn program(mut self, program: &[u8]) -> Self {
        let start = self.prg.len() - PRG_BANK;
        self.prg[start..start + program.len()].copy_from_slice(program);
        self
    }

    /// Put `program` at the very start of PRG ($8000 with mapper 0)
    pub fn program_at_start(mut self, program: &[u8]) -> Self {
        self.prg[..program.len()].copy_from_slice(program);
        self
    }

    /// Point a CPU vector ($FFFA/$FFFC/$FFFE) at `target`
    pub fn vector(mut self, vector: u16, target: u16) -> Self {
        self.set_vector(vector, target);
        self
    }

    pub fn chr(mut self, chr: Vec<u8>) -> Self {
        self.chr = chr;
        self
    }

    fn set_vector(&mut self, vector: u16, target: u16) {
        let offset = self.prg.len() - (0x10000 - vector as usize);
        self.prg[offset] = target as u8;
        self.prg[offset + 1] = (target >> 8) as u8;
    }

    pub fn build(self) -> Vec<u8> {
        let mut rom = vec![
            b'N',
            b'E',
            b'S',
            0x1A,
            (self.prg.len() / PRG_BANK) as u8,
            (self.chr.len() / CHR_BANK) as u8,
            ((self.mapper & 0x0F) << 4) | self.flags6,
            self.mapper & 0xF0,
        ];
        rom.resize(16, 0);
        rom.extend_from_slice(&self.prg);
        rom.extend_from_slice(&self.chr);
        rom
    }
}

/// Emulator with `rom` loaded and reset
pub fn emulator_with(rom: &[u8]) -> Emulator {
    let mut emulator = Emulator::new();
    emulator
        .load_rom(rom)
        .expect("synthetic ROM should load");
    emulator
}

/// Run until `frames` vblanks have occurred
pub fn run_frames(emulator: &mut Emulator, frames: u64) {
    let target = emulator.frame_count() + frames;
    while emulator.frame_count() < target {
        emulator.run_cycles(CYCLES_PER_FRAME);
    }
}
