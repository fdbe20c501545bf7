// PPU memory access methods

use std::fmt::Write;

use super::constants::{CHR_RAM_SIZE, PALETTE_BASE, VRAM_SIZE};
use super::{ChrMemory, Ppu};

impl Ppu {
    /// Map a PPU address to its physical location
    ///
    /// - `$0000-$1FFF`: unchanged (pattern data, resolved through CHR banks)
    /// - `$2000-$2FFF`: nametable page selected through the mirror bits
    /// - `$3000-$3EFF`: mirror of `$2000-$2EFF`
    /// - `$3F00-$3FFF`: 32-byte palette, `$3F10/$14/$18/$1C` alias `$3F00/$04/$08/$0C`
    ///
    /// # Arguments
    ///
    /// * `addr` - PPU address (only the low 14 bits are used)
    pub(super) fn map_address(&self, addr: u16) -> u16 {
        let mut addr = addr & (VRAM_SIZE as u16 - 1);
        if (0x3000..PALETTE_BASE).contains(&addr) {
            addr -= 0x1000;
        }
        if (0x2000..0x3000).contains(&addr) {
            return mirror_nametable(addr, self.mirror_bits);
        }
        if addr >= PALETTE_BASE {
            addr &= 0xFF1F;
            if addr & 0xFFF3 == 0x3F10 {
                addr &= 0xFFEF;
            }
        }
        addr
    }

    /// Read a mapped address without side effects
    pub(super) fn read_direct(&self, addr: u16) -> u8 {
        if addr >= 0x2000 {
            self.vram[addr as usize]
        } else {
            let offset = self.chr_bank_offsets[(addr >> 10) as usize & 7];
            self.chr_byte(offset + (addr & 0x03FF) as usize)
        }
    }

    /// Write a mapped address
    ///
    /// Pattern writes land in CHR-RAM; CHR-ROM is read-only and the write is
    /// dropped.
    pub(super) fn write_direct(&mut self, addr: u16, data: u8) {
        if addr >= 0x2000 {
            self.vram[addr as usize] = data;
            return;
        }
        let offset = self.chr_bank_offsets[(addr >> 10) as usize & 7] + (addr & 0x03FF) as usize;
        match self.chr {
            ChrMemory::Ram => self.vram[offset & (CHR_RAM_SIZE - 1)] = data,
            ChrMemory::Rom(_) => {
                log::debug!("Ignored CHR-ROM write at ${:04X}", addr);
            }
        }
    }

    /// Fetch a byte of pattern data by absolute CHR offset
    #[inline]
    pub(super) fn chr_byte(&self, offset: usize) -> u8 {
        match &self.chr {
            ChrMemory::Rom(data) => data[offset % data.len()],
            ChrMemory::Ram => self.vram[offset & (CHR_RAM_SIZE - 1)],
        }
    }

    /// Palette RAM entry for a 5-bit palette index
    #[inline]
    pub(super) fn palette_entry(&self, index: u8) -> u8 {
        self.vram[(PALETTE_BASE + (index & 0x1F) as u16) as usize]
    }

    /// Hex dump of `count` bytes of VRAM starting at `start`
    ///
    /// Addresses go through the same mapping as PPUDATA, so mirrored
    /// nametables and palette aliases show their effective contents. Each
    /// line holds 16 bytes prefixed with the logical address.
    pub fn dump_vram(&self, start: u16, count: usize) -> String {
        let mut out = String::new();
        for i in 0..count {
            let addr = start.wrapping_add(i as u16);
            if i % 16 == 0 {
                if i != 0 {
                    out.push('\n');
                }
                let _ = write!(out, "{:04X}:", addr & 0x3FFF);
            }
            let value = self.read_direct(self.map_address(addr));
            let _ = write!(out, " {:02X}", value);
        }
        out
    }
}

/// Resolve a nametable address through the packed mirror bits
///
/// Logical page `p` (bits 11-10) is replaced by the 2-bit field `p` of
/// `mirror_bits`.
#[inline]
pub(super) fn mirror_nametable(addr: u16, mirror_bits: u8) -> u16 {
    let page = (addr >> 10) & 3;
    let physical = ((mirror_bits as u16) << (10 - (page << 1))) & 0x0C00;
    (addr & 0xF3FF) | physical
}
