// PPU module - Picture Processing Unit (2C02) implementation
//
// The PPU is driven one scanline at a time. Register writes that change how
// the picture is drawn are not applied to pixels immediately; they are
// recorded as HEvents on a per-frame timeline (see `timeline`), and `render`
// replays the finished frame's timeline into pixels. This reproduces
// mid-frame raster effects (split scrolling, CHR bank switches, mask changes)
// without a per-dot pipeline.
//
// # Submodules
//
// - `constants`: register indices, bit masks, timing
// - `registers`: CPU-visible register side effects ($2000-$2007)
// - `memory`: PPU address space mapping and palette RAM
// - `timeline`: HEvent snapshots and timeline double-buffering
// - `rendering`: background/sprite passes, sprite 0 hit, palette resolve
// - `tables`: color palette and pattern-decode lookup tables

mod constants;
mod memory;
mod registers;
mod rendering;
pub mod tables;
pub mod timeline;

#[cfg(test)]
mod tests;

pub use constants::{
    DOTS_PER_SCANLINE, LAST_VISIBLE_SCANLINE, POSTRENDER_SCANLINE, PRERENDER_SCANLINE,
    SCANLINES_PER_FRAME, SCREEN_HEIGHT, SCREEN_WIDTH, VBLANK_SCANLINE,
};
pub use timeline::{HEvent, Timeline};

use crate::bus::MemoryMappedDevice;
use crate::cartridge::Mirroring;
use constants::*;
use timeline::advance_vertical;

/// Source of pattern data for $0000-$1FFF
#[derive(Debug, Clone)]
enum ChrMemory {
    /// Read-only CHR-ROM from the cartridge
    Rom(Vec<u8>),
    /// CHR-RAM aliased onto the low 8KB of VRAM
    Ram,
}

/// Loopy scroll registers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollRegisters {
    /// Current VRAM address / scroll position (v, 15 bits)
    pub current: u16,
    /// Temporary address / scroll latch (t, 15 bits)
    pub temp: u16,
    /// Fine X scroll (x, 3 bits)
    pub fine_x: u8,
}

/// PPU structure representing the Picture Processing Unit state
pub struct Ppu {
    /// Raw register latches ($2000-$2007)
    regs: [u8; REGISTER_COUNT],

    /// 16KB PPU address space; nametables and palette live here, plus
    /// pattern data when the cartridge uses CHR-RAM
    vram: Vec<u8>,

    /// Object Attribute Memory (64 sprites x 4 bytes)
    oam: [u8; OAM_SIZE],

    /// Pattern data source
    chr: ChrMemory,

    /// Byte offset into CHR data for each 1KB window
    chr_bank_offsets: [usize; 8],

    /// Current mirroring and its packed page bits
    mirroring: Mirroring,
    mirror_bits: u8,

    /// Scanline most recently entered (0-261)
    scanline: u16,

    /// Shared write toggle for PPUSCROLL/PPUADDR (w)
    write_latch: bool,

    /// VRAM address used by PPUDATA
    vram_addr: u16,

    /// PPUDATA read buffer
    read_buffer: u8,

    /// Loopy v/t/x
    scroll: ScrollRegisters,

    // ========================================
    // Timeline Double Buffer
    // ========================================
    /// Two timelines; `accumulating` indexes the one being recorded
    timelines: [Timeline; 2],
    accumulating: usize,

    /// Palette index per pixel, bit 7 = sprite opaque marker
    offscreen: Vec<u8>,
}

impl Ppu {
    /// Create a new PPU in its power-on state
    ///
    /// # Example
    /// ```
    /// use nesemu::Ppu;
    /// let ppu = Ppu::new();
    /// assert!(!ppu.nmi_enabled());
    /// ```
    pub fn new() -> Self {
        let mut ppu = Ppu {
            regs: [0; REGISTER_COUNT],
            vram: vec![0; VRAM_SIZE],
            oam: [0; OAM_SIZE],
            chr: ChrMemory::Ram,
            chr_bank_offsets: default_chr_offsets(),
            mirroring: Mirroring::Vertical,
            mirror_bits: Mirroring::Vertical.bits(),
            scanline: 0,
            write_latch: false,
            vram_addr: 0,
            read_buffer: 0,
            scroll: ScrollRegisters::default(),
            timelines: [Timeline::new(), Timeline::new()],
            accumulating: 0,
            offscreen: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        };
        ppu.reset();
        ppu
    }

    /// Reset registers, VRAM, OAM and timelines to power-on values
    ///
    /// CHR data and the mirroring mode survive; the mapper re-derives its bank
    /// offsets afterwards. The PPU is left on the pre-render line with a
    /// line-0 snapshot, so state pushed before the first frame covers line 0.
    pub fn reset(&mut self) {
        self.regs = [0; REGISTER_COUNT];
        self.vram.fill(0);
        self.oam = [0; OAM_SIZE];
        self.chr_bank_offsets = default_chr_offsets();
        self.scanline = PRERENDER_SCANLINE;
        self.write_latch = false;
        self.vram_addr = 0;
        self.read_buffer = 0;
        self.scroll = ScrollRegisters::default();
        for timeline in &mut self.timelines {
            timeline.clear();
        }
        self.accumulating = 0;
        self.offscreen.fill(0);

        let base = PALETTE_BASE as usize;
        self.vram[base..base + INITIAL_PALETTE.len()].copy_from_slice(&INITIAL_PALETTE);
        self.record_event();
    }

    // ========================================
    // Cartridge Interface
    // ========================================

    /// Install the cartridge's CHR-ROM; an empty slice selects CHR-RAM
    pub fn set_chr_rom(&mut self, chr_rom: Vec<u8>) {
        self.chr = if chr_rom.is_empty() {
            ChrMemory::Ram
        } else {
            ChrMemory::Rom(chr_rom)
        };
    }

    /// Size of the pattern data in bytes
    pub fn chr_size(&self) -> usize {
        match &self.chr {
            ChrMemory::Rom(data) => data.len(),
            ChrMemory::Ram => CHR_RAM_SIZE,
        }
    }

    /// Point one 1KB CHR window at a 1KB bank
    ///
    /// The offset is wrapped into the CHR data size. Records an HEvent.
    ///
    /// # Arguments
    /// * `window` - CHR window (0-7, $0000-$1FFF in 1KB steps)
    /// * `bank` - Bank number in 1KB units
    pub fn set_chr_bank_offset(&mut self, window: usize, bank: usize) {
        self.chr_bank_offsets[window & 7] = self.wrap_chr_offset(bank);
        self.advance_scroll();
        self.record_event();
    }

    /// Set all eight CHR windows at once and record a single HEvent
    ///
    /// # Arguments
    /// * `banks` - Bank number (1KB units) for each window
    pub fn set_chr_bank_offsets(&mut self, banks: &[usize; 8]) {
        for (window, &bank) in banks.iter().enumerate() {
            self.chr_bank_offsets[window] = self.wrap_chr_offset(bank);
        }
        self.advance_scroll();
        self.record_event();
    }

    /// Map an 8KB CHR bank across all windows
    pub fn set_chr_bank(&mut self, bank: usize) {
        let base = bank << 3;
        let banks = [0, 1, 2, 3, 4, 5, 6, 7].map(|i| base + i);
        self.set_chr_bank_offsets(&banks);
    }

    /// Current CHR window offsets in bytes
    pub fn chr_bank_offsets(&self) -> [usize; 8] {
        self.chr_bank_offsets
    }

    /// Change nametable mirroring. Records an HEvent.
    pub fn set_mirror_mode(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
        self.mirror_bits = mirroring.bits();
        self.advance_scroll();
        self.record_event();
    }

    /// Current nametable mirroring
    pub fn mirror_mode(&self) -> Mirroring {
        self.mirroring
    }

    fn wrap_chr_offset(&self, bank: usize) -> usize {
        let size = self.chr_size();
        if size == 0 {
            0
        } else {
            (bank << 10) % size
        }
    }

    // ========================================
    // Frame Timing
    // ========================================

    /// Enter scanline `line` (0-261)
    ///
    /// On visible lines the horizontal scroll is reloaded from `t` and sprite 0
    /// hit is evaluated.
    pub fn set_scanline(&mut self, line: u16) {
        self.scanline = line;
        if line <= LAST_VISIBLE_SCANLINE {
            self.reload_horizontal();
        }
        self.check_sprite0_hit(line);
    }

    /// Scanline most recently entered
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Raise the vblank flag and swap timelines
    ///
    /// The finished frame's timeline becomes render-ready and a fresh timeline
    /// starts with a snapshot of the current state at scanline 0.
    pub fn set_vblank(&mut self) {
        self.regs[PPUSTATUS] |= STATUS_VBLANK;
        self.accumulating ^= 1;
        self.timelines[self.accumulating].clear();
        self.record_event();
    }

    /// Pre-render line: clear vblank and sprite 0 hit, reload `v` from `t`
    pub fn clear_vblank(&mut self) {
        self.regs[PPUSTATUS] &= !(STATUS_VBLANK | STATUS_SPRITE0_HIT);
        self.scroll.current = self.scroll.temp;
        self.record_event();
    }

    /// Whether PPUCTRL requests an NMI at vblank
    pub fn nmi_enabled(&self) -> bool {
        self.regs[PPUCTRL] & CTRL_NMI_ENABLE != 0
    }

    /// Whether background or sprite rendering is on
    pub fn rendering_enabled(&self) -> bool {
        self.regs[PPUMASK] & (MASK_SHOW_BG | MASK_SHOW_SPRITES) != 0
    }

    /// Raw PPUSTATUS value without read side effects
    pub fn status(&self) -> u8 {
        self.regs[PPUSTATUS]
    }

    /// Scroll registers (v, t, fine X)
    pub fn scroll(&self) -> ScrollRegisters {
        self.scroll
    }

    /// Timeline of the last completed frame
    pub fn render_timeline(&self) -> &Timeline {
        &self.timelines[self.accumulating ^ 1]
    }

    /// Timeline being recorded for the running frame
    pub fn pending_timeline(&self) -> &Timeline {
        &self.timelines[self.accumulating]
    }

    // ========================================
    // OAM
    // ========================================

    /// Copy a 256-byte page into OAM starting at OAMADDR (OAM DMA)
    pub fn write_oam_dma(&mut self, page: &[u8; OAM_SIZE]) {
        let mut addr = self.regs[OAMADDR];
        for &byte in page.iter() {
            self.oam[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Object Attribute Memory contents
    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    // ========================================
    // Timeline Recording
    // ========================================

    /// Scanline a write made now first affects, if any
    ///
    /// Writes during a visible line apply from the next line. Writes during the
    /// last visible line and the post-render line never reach the screen; the
    /// vblank snapshot supersedes them. Writes during vblank apply from line 0
    /// of the next frame.
    fn event_scanline(&self) -> Option<u16> {
        match self.scanline {
            line if line < LAST_VISIBLE_SCANLINE => Some(line + 1),
            LAST_VISIBLE_SCANLINE | POSTRENDER_SCANLINE => None,
            _ => Some(0),
        }
    }

    /// Move v/t down by the lines drawn since the previous event
    fn advance_scroll(&mut self) {
        let Some(target) = self.event_scanline() else {
            return;
        };
        let Some(last) = self.timelines[self.accumulating].last() else {
            return;
        };
        if target <= last.scanline {
            return;
        }
        let lines = target - last.scanline;
        self.scroll.temp = advance_vertical(self.scroll.temp, lines);
        self.scroll.current = advance_vertical(self.scroll.current, lines);
    }

    /// Snapshot the current state into the accumulating timeline
    fn record_event(&mut self) {
        let Some(scanline) = self.event_scanline() else {
            return;
        };
        let event = HEvent {
            scanline,
            ctrl: self.regs[PPUCTRL],
            mask: self.regs[PPUMASK],
            chr_bank_offsets: self.chr_bank_offsets,
            mirror_bits: self.mirror_bits,
            scroll_current: self.scroll.current,
            fine_x: self.scroll.fine_x,
        };
        self.timelines[self.accumulating].push(event);
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMappedDevice for Ppu {
    /// Read a PPU register; `addr` is mirrored every 8 bytes
    fn read(&mut self, addr: u16) -> u8 {
        self.read_register(addr as usize & 7)
    }

    /// Write a PPU register; `addr` is mirrored every 8 bytes
    fn write(&mut self, addr: u16, data: u8) {
        self.write_register(addr as usize & 7, data);
    }
}

fn default_chr_offsets() -> [usize; 8] {
    [0, 1, 2, 3, 4, 5, 6, 7].map(|i| i << 10)
}
