// PPU constants

/// Number of CPU-visible PPU registers ($2000-$2007)
pub(super) const REGISTER_COUNT: usize = 8;

/// PPU address space size (16KB)
pub(super) const VRAM_SIZE: usize = 0x4000;

/// OAM size: 64 sprites x 4 bytes
pub(super) const OAM_SIZE: usize = 0x100;

/// Number of sprites in OAM
pub(super) const MAX_SPRITES: usize = 64;

/// CHR-RAM size when the cartridge has no CHR-ROM
pub(super) const CHR_RAM_SIZE: usize = 0x2000;

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Tile size in pixels (8x8)
pub(super) const TILE_SIZE: usize = 8;

/// Palette RAM base address
pub(super) const PALETTE_BASE: u16 = 0x3F00;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// Number of PPU dots per scanline
pub const DOTS_PER_SCANLINE: u32 = 341;

/// Number of scanlines per frame
pub const SCANLINES_PER_FRAME: u16 = 262;

/// Last visible scanline
pub const LAST_VISIBLE_SCANLINE: u16 = 239;

/// Post-render scanline
pub const POSTRENDER_SCANLINE: u16 = 240;

/// Scanline on which the vblank flag is raised
pub const VBLANK_SCANLINE: u16 = 241;

/// Pre-render scanline
pub const PRERENDER_SCANLINE: u16 = 261;

// ========================================
// Register Indices
// ========================================

pub(super) const PPUCTRL: usize = 0;
pub(super) const PPUMASK: usize = 1;
pub(super) const PPUSTATUS: usize = 2;
pub(super) const OAMADDR: usize = 3;
pub(super) const OAMDATA: usize = 4;
pub(super) const PPUSCROLL: usize = 5;
pub(super) const PPUADDR: usize = 6;
pub(super) const PPUDATA: usize = 7;

// ========================================
// PPUCTRL ($2000) Bits
// ========================================

/// Generate NMI at the start of vblank
pub(super) const CTRL_NMI_ENABLE: u8 = 0x80;
/// Sprite size: 0 = 8x8, 1 = 8x16
pub(super) const CTRL_SPRITE_SIZE: u8 = 0x20;
/// Background pattern table: 0 = $0000, 1 = $1000
pub(super) const CTRL_BG_PATTERN: u8 = 0x10;
/// Sprite pattern table for 8x8 sprites
pub(super) const CTRL_SPRITE_PATTERN: u8 = 0x08;
/// VRAM address increment: 0 = +1, 1 = +32
pub(super) const CTRL_INCREMENT_32: u8 = 0x04;
/// Base nametable select
pub(super) const CTRL_NAMETABLE: u8 = 0x03;

// ========================================
// PPUMASK ($2001) Bits
// ========================================

pub(super) const MASK_SHOW_SPRITES: u8 = 0x10;
pub(super) const MASK_SHOW_BG: u8 = 0x08;
pub(super) const MASK_SPRITES_LEFT: u8 = 0x04;
pub(super) const MASK_BG_LEFT: u8 = 0x02;

// ========================================
// PPUSTATUS ($2002) Bits
// ========================================

pub(super) const STATUS_VBLANK: u8 = 0x80;
pub(super) const STATUS_SPRITE0_HIT: u8 = 0x40;

// ========================================
// Sprite Attribute Bits
// ========================================

pub(super) const SPRITE_FLIP_VERT: u8 = 0x80;
pub(super) const SPRITE_FLIP_HORZ: u8 = 0x40;
pub(super) const SPRITE_PALETTE: u8 = 0x03;

/// Offscreen marker: a sprite pixel is opaque here
pub(super) const SPRITE_MARKER: u8 = 0x80;

/// Palette RAM contents after reset
pub(super) const INITIAL_PALETTE: [u8; 32] = [
    0x09, 0x01, 0x00, 0x01, 0x00, 0x02, 0x02, 0x0D, 0x08, 0x10, 0x08, 0x24, 0x00, 0x00, 0x04, 0x2C,
    0x09, 0x01, 0x34, 0x03, 0x00, 0x04, 0x00, 0x14, 0x08, 0x3A, 0x00, 0x02, 0x00, 0x20, 0x2C, 0x08,
];
