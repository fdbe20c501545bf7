//! PPU unit tests
//!
//! This module contains tests for the PPU implementation, organized by
//! functionality.

use super::*;
use crate::bus::MemoryMappedDevice;

// ========================================
// Test Constants (PPU Register Addresses)
// ========================================

/// PPU Control Register ($2000) - Write only
pub(crate) const PPUCTRL: u16 = 0x2000;
/// PPU Mask Register ($2001) - Write only
pub(crate) const PPUMASK: u16 = 0x2001;
/// PPU Status Register ($2002) - Read only
pub(crate) const PPUSTATUS: u16 = 0x2002;
/// OAM Address Port ($2003) - Write only
pub(crate) const OAMADDR: u16 = 0x2003;
/// OAM Data Port ($2004) - Read/Write
pub(crate) const OAMDATA: u16 = 0x2004;
/// Scroll Position Register ($2005) - Write×2
pub(crate) const PPUSCROLL: u16 = 0x2005;
/// PPU Address Register ($2006) - Write×2
pub(crate) const PPUADDR: u16 = 0x2006;
/// PPU Data Port ($2007) - Read/Write
pub(crate) const PPUDATA: u16 = 0x2007;

// ========================================
// Test Helper Functions
// ========================================

/// PPU with the given CHR-ROM installed
pub(crate) fn ppu_with_chr(chr: Vec<u8>) -> Ppu {
    let mut ppu = Ppu::new();
    ppu.set_chr_rom(chr);
    ppu
}

/// Point PPUADDR at `addr`
pub(crate) fn set_vram_addr(ppu: &mut Ppu, addr: u16) {
    ppu.write(PPUADDR, (addr >> 8) as u8);
    ppu.write(PPUADDR, addr as u8);
}

/// Write a run of bytes through PPUDATA starting at `addr`
pub(crate) fn write_vram(ppu: &mut Ppu, addr: u16, bytes: &[u8]) {
    set_vram_addr(ppu, addr);
    for &byte in bytes {
        ppu.write(PPUDATA, byte);
    }
}

/// Clear the scroll latch state so the next frame starts at (0, 0) of nametable 0
pub(crate) fn reset_scroll(ppu: &mut Ppu) {
    ppu.read(PPUSTATUS);
    ppu.write(PPUSCROLL, 0);
    ppu.write(PPUSCROLL, 0);
    ppu.write(PPUCTRL, ppu.regs[super::constants::PPUCTRL] & !0x03);
}

/// Enter vblank; writes made afterwards apply from line 0 of the next frame
pub(crate) fn enter_vblank(ppu: &mut Ppu) {
    ppu.set_scanline(POSTRENDER_SCANLINE);
    ppu.set_scanline(VBLANK_SCANLINE);
    ppu.set_vblank();
}

/// Run the pre-render line and all visible lines, calling `on_line` after
/// each line begins, then enter vblank so the frame becomes render-ready
pub(crate) fn run_frame(ppu: &mut Ppu, mut on_line: impl FnMut(&mut Ppu, u16)) {
    ppu.set_scanline(PRERENDER_SCANLINE);
    ppu.clear_vblank();
    for line in 0..=LAST_VISIBLE_SCANLINE {
        ppu.set_scanline(line);
        on_line(ppu, line);
    }
    enter_vblank(ppu);
}

/// Palette index of the offscreen pixel at (x, y) after a render
pub(crate) fn offscreen_at(ppu: &Ppu, x: usize, y: usize) -> u8 {
    ppu.offscreen[y * SCREEN_WIDTH + x]
}

// ========================================
// Test Modules
// ========================================

mod memory;
