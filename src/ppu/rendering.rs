// PPU rendering logic
//
// A frame is drawn from the render-ready timeline in three passes over the
// offscreen buffer (one palette index per pixel):
//
// 1. Background, one event range at a time, using the range's snapshot of
//    control, scroll, CHR banks and mirroring
// 2. Sprites, for every range with sprites enabled
// 3. Resolve, palette index -> palette RAM -> RGBA

use super::constants::*;
use super::memory::mirror_nametable;
use super::tables::{decode_pattern_row, palette_to_rgba, FLIP_BITS};
use super::timeline::HEvent;
use super::Ppu;

/// Priority mask for sprites in front of the background: only an earlier
/// sprite pixel blocks
const FRONT_PRIORITY_MASK: u8 = SPRITE_MARKER;

/// Priority mask for sprites behind the background: any opaque pixel blocks
const BEHIND_PRIORITY_MASK: u8 = 0xFF;

/// Represents a parsed sprite from OAM
#[derive(Debug, Clone, Copy)]
struct Sprite {
    /// Y position (top edge - 1)
    y: u8,
    /// Tile index (or tile bank for 8x16 mode)
    tile_index: u8,
    /// Attribute byte
    attributes: u8,
    /// X position (left edge)
    x: u8,
}

impl Sprite {
    fn from_oam(oam: &[u8; OAM_SIZE], index: usize) -> Self {
        let base = index * 4;
        Sprite {
            y: oam[base],
            tile_index: oam[base + 1],
            attributes: oam[base + 2],
            x: oam[base + 3],
        }
    }

    fn is_vflip(&self) -> bool {
        self.attributes & SPRITE_FLIP_VERT != 0
    }

    fn is_hflip(&self) -> bool {
        self.attributes & SPRITE_FLIP_HORZ != 0
    }

    fn is_behind_background(&self) -> bool {
        self.attributes & 0x20 != 0
    }

    /// Byte offset of the sprite's first pattern row in $0000-$1FFF
    fn pattern_index(&self, tall: bool, table: usize) -> usize {
        let tile = self.tile_index as usize;
        if tall {
            (tile & 0xFE) * 16 + ((tile & 1) << 12)
        } else {
            tile * 16 + table
        }
    }
}

impl Ppu {
    /// Render the last completed frame into an RGBA buffer
    ///
    /// Walks the render-ready timeline, so the output reflects every raster
    /// change made during that frame. `pixels` should hold 256x240x4 bytes;
    /// a shorter buffer receives the leading pixels only.
    ///
    /// # Example
    ///
    /// ```
    /// use nesemu::Ppu;
    ///
    /// let mut ppu = Ppu::new();
    /// let mut frame = vec![0u8; 256 * 240 * 4];
    /// ppu.render(&mut frame);
    /// assert_eq!(frame[3], 0xFF);
    /// ```
    pub fn render(&mut self, pixels: &mut [u8]) {
        let mut offscreen = std::mem::take(&mut self.offscreen);
        self.render_background(&mut offscreen);
        self.render_sprites(&mut offscreen);
        self.resolve(&offscreen, pixels);
        self.offscreen = offscreen;
    }

    // ========================================
    // Background
    // ========================================

    fn render_background(&self, offscreen: &mut [u8]) {
        for (event, line0, line1) in self.render_timeline().ranges() {
            if line0 >= line1 {
                continue;
            }
            if event.mask & MASK_SHOW_BG == 0 {
                clear_columns(offscreen, line0, line1, SCREEN_WIDTH);
                continue;
            }
            let mut x0 = 0;
            if event.mask & MASK_BG_LEFT == 0 {
                x0 = TILE_SIZE as i32;
                clear_columns(offscreen, line0, line1, TILE_SIZE);
            }
            self.draw_background_range(offscreen, event, line0, line1, x0);
        }
    }

    /// Draw lines `[line0, line1)` with the state captured in `event`
    fn draw_background_range(
        &self,
        offscreen: &mut [u8],
        event: &HEvent,
        line0: usize,
        line1: usize,
        x0: i32,
    ) {
        let v = event.scroll_current;
        let base_nametable = ((v & 0x0C00) >> 10) as i32;
        let chr_start = ((event.ctrl & CTRL_BG_PATTERN) as usize) << 8;
        let scroll_x = event.fine_x as i32 | (((v & 0x001F) as i32) << 3);
        let mut scroll_y = (((v & 0x7000) >> 12) | ((v & 0x03E0) >> 2)) as i32;
        if scroll_y >= 240 {
            scroll_y -= 256;
        }

        for line in line0..line1 {
            let y = (line - line0) as i32 + scroll_y;
            let block_y = ((y >> 3) + 60).rem_euclid(60);
            let tile_y = block_y % 30;

            for column in 0..=(SCREEN_WIDTH / TILE_SIZE) as i32 {
                let block_x = (column + (scroll_x >> 3)) & 63;
                let tile_x = block_x & 31;

                let page = ((((block_x >> 5) & 1) + (((block_y / 30) & 1) << 1)) ^ base_nametable)
                    as u16;
                let nametable = mirror_nametable(0x2000 | (page << 10), event.mirror_bits) as usize;
                let name = self.vram[nametable + (tile_x + (tile_y << 5)) as usize] as usize;

                let shift = (tile_x & 2) + ((tile_y & 2) << 1);
                let attribute_index = ((tile_x >> 2) + ((tile_y << 1) & 0xF8)) as usize;
                let attribute = self.vram[nametable + 0x3C0 + attribute_index];
                let palette_high = ((attribute >> shift) & 3) << 2;

                let left = column * TILE_SIZE as i32 - (scroll_x & 7);
                let px_start = (x0 - left).max(0);
                let px_end = (SCREEN_WIDTH as i32 - left).min(TILE_SIZE as i32);
                if px_start >= px_end {
                    continue;
                }

                let mut pattern = self.pattern_row(
                    name * 16 + chr_start,
                    (y & 7) as usize,
                    &event.chr_bank_offsets,
                ) as u32;
                pattern = (pattern << (px_start * 2)) & 0xFFFF;

                let row = line * SCREEN_WIDTH;
                for px in px_start..px_end {
                    let mut pal = (pattern >> 14) as u8;
                    pattern = (pattern << 2) & 0xFFFF;
                    if pal != 0 {
                        pal |= palette_high;
                    }
                    offscreen[row + (left + px) as usize] = pal;
                }
            }
        }
    }

    // ========================================
    // Sprites
    // ========================================

    fn render_sprites(&self, offscreen: &mut [u8]) {
        let ctrl = self.regs[PPUCTRL];
        let chr_start = self.sprite_pattern_table();
        let tall = ctrl & CTRL_SPRITE_SIZE != 0;

        for (event, line0, line1) in self.render_timeline().ranges() {
            if event.mask & MASK_SHOW_SPRITES == 0 || line0 >= line1 {
                continue;
            }
            let x0 = if event.mask & MASK_SPRITES_LEFT != 0 {
                0
            } else {
                TILE_SIZE as i32
            };
            self.draw_sprite_range(
                offscreen,
                line0 as i32,
                line1 as i32,
                x0,
                tall,
                chr_start,
                &event.chr_bank_offsets,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_sprite_range(
        &self,
        offscreen: &mut [u8],
        line0: i32,
        line1: i32,
        x0: i32,
        tall: bool,
        chr_start: usize,
        chr_bank_offsets: &[usize; 8],
    ) {
        let height = if tall { 16 } else { 8 };
        let width = TILE_SIZE as i32;

        for index in 0..MAX_SPRITES {
            let sprite = Sprite::from_oam(&self.oam, index);
            let y = sprite.y as i32 + 1;
            if y + height < line0 || y >= line1 {
                continue;
            }
            let x = sprite.x as i32;
            let priority_mask = if sprite.is_behind_background() {
                BEHIND_PRIORITY_MASK
            } else {
                FRONT_PRIORITY_MASK
            };
            let pattern_index = sprite.pattern_index(tall, chr_start);
            let palette_high = ((sprite.attributes & SPRITE_PALETTE) << 2) | 0x10 | SPRITE_MARKER;

            let py0 = (line0 - y).max(0);
            let py1 = height.min(line1 - y).min(SCREEN_HEIGHT as i32 - y);
            let px0 = (x0 - x).max(0);
            let px1 = (SCREEN_WIDTH as i32 - x).min(width);

            for py in py0..py1 {
                let row = if sprite.is_vflip() { height - 1 - py } else { py };
                let pattern =
                    self.sprite_pattern_row(pattern_index, row as usize, sprite.is_hflip(), chr_bank_offsets);
                for px in px0..px1 {
                    let pal = ((pattern >> ((7 - px) << 1)) & 3) as u8;
                    if pal == 0 {
                        continue;
                    }
                    let pixel = ((y + py) * SCREEN_WIDTH as i32 + x + px) as usize;
                    if offscreen[pixel] & priority_mask != 0 {
                        offscreen[pixel] |= SPRITE_MARKER;
                        continue;
                    }
                    offscreen[pixel] = palette_high + pal;
                }
            }
        }
    }

    // ========================================
    // Sprite 0 Hit
    // ========================================

    /// Set the sprite 0 hit flag when `line` is sprite 0's first opaque row
    ///
    /// Only evaluated while both layers are enabled and the flag is still
    /// clear, so the flag rises at most once per frame.
    pub(super) fn check_sprite0_hit(&mut self, line: u16) {
        let layers = MASK_SHOW_BG | MASK_SHOW_SPRITES;
        if self.regs[PPUSTATUS] & STATUS_SPRITE0_HIT != 0 || self.regs[PPUMASK] & layers != layers {
            return;
        }
        let sprite0_y = self.oam[0] as u16;
        if line < sprite0_y || line >= sprite0_y + 16 {
            return;
        }
        if self.oam[3] == 0xFF {
            return;
        }
        if let Some(dy) = self.first_opaque_sprite0_row() {
            if line == sprite0_y + dy {
                self.regs[PPUSTATUS] |= STATUS_SPRITE0_HIT;
            }
        }
    }

    fn first_opaque_sprite0_row(&self) -> Option<u16> {
        let tall = self.regs[PPUCTRL] & CTRL_SPRITE_SIZE != 0;
        let height: u16 = if tall { 16 } else { 8 };
        let sprite = Sprite::from_oam(&self.oam, 0);
        let pattern_index = sprite.pattern_index(tall, self.sprite_pattern_table());

        (0..height).find(|&py| {
            let row = if sprite.is_vflip() { height - 1 - py } else { py };
            self.sprite_pattern_row(pattern_index, row as usize, false, &self.chr_bank_offsets) != 0
        })
    }

    /// Pattern table used by 8x8 sprites; 8x16 sprites encode it per tile
    fn sprite_pattern_table(&self) -> usize {
        let ctrl = self.regs[PPUCTRL];
        if ctrl & CTRL_SPRITE_SIZE == 0 {
            ((ctrl & CTRL_SPRITE_PATTERN) as usize) << 9
        } else {
            0
        }
    }

    // ========================================
    // Pattern Fetch
    // ========================================

    /// Decode one background tile row through the given bank offsets
    fn pattern_row(&self, index: usize, row: usize, chr_bank_offsets: &[usize; 8]) -> u16 {
        let (lo, hi) = self.pattern_planes(index + row, chr_bank_offsets);
        decode_pattern_row(lo, hi)
    }

    /// Decode one sprite row; rows 8-15 of a tall sprite come from the next tile
    fn sprite_pattern_row(
        &self,
        index: usize,
        row: usize,
        flip_horizontal: bool,
        chr_bank_offsets: &[usize; 8],
    ) -> u16 {
        let (mut lo, mut hi) = self.pattern_planes(index + (row & 7) + ((row & 8) << 1), chr_bank_offsets);
        if flip_horizontal {
            lo = FLIP_BITS[lo as usize];
            hi = FLIP_BITS[hi as usize];
        }
        decode_pattern_row(lo, hi)
    }

    fn pattern_planes(&self, index: usize, chr_bank_offsets: &[usize; 8]) -> (u8, u8) {
        let offset = chr_bank_offsets[(index >> 10) & 7] + (index & 0x03FF);
        (self.chr_byte(offset), self.chr_byte(offset + 8))
    }

    // ========================================
    // Resolve
    // ========================================

    fn resolve(&self, offscreen: &[u8], pixels: &mut [u8]) {
        for (rgba, &index) in pixels.chunks_exact_mut(4).zip(offscreen.iter()) {
            let mut pal = index & 0x1F;
            // Sprite palette entry 0 shares the backdrop slots
            if pal & 0x13 == 0x10 {
                pal &= 0x0F;
            }
            rgba.copy_from_slice(&palette_to_rgba(self.palette_entry(pal)));
        }
    }
}

/// Zero the first `width` pixels of lines `[line0, line1)`
fn clear_columns(offscreen: &mut [u8], line0: usize, line1: usize, width: usize) {
    for line in line0..line1 {
        let row = line * SCREEN_WIDTH;
        offscreen[row..row + width].fill(0);
    }
}
