// Static lookup tables shared by the PPU
//
// - NES_PALETTE: the 64 hardware colors (indexed 0x00-0x3F)
// - STAGGERED: spreads the 8 bits of a pattern plane over the even bits of a u16
// - FLIP_BITS: reverses the bit order of a byte (horizontal sprite flip)
//
// All tables are computed at compile time and never mutated.

/// NES master palette in RGB format (64 colors)
///
/// Each color is represented as a 32-bit value: 0xRRGGBB.
/// Indices $0E-$0F, $1E-$1F, $2E-$2F, $3E-$3F are unused and render as black.
pub const NES_PALETTE: [u32; 64] = [
    // $00-$0F
    0x666666, 0x002A88, 0x1412A7, 0x3B00A4, 0x5C007E, 0x6E0040, 0x6C0600, 0x561D00,
    0x333500, 0x0B4800, 0x005200, 0x004F08, 0x00404D, 0x000000, 0x000000, 0x000000,
    // $10-$1F
    0xADADAD, 0x155FD9, 0x4240FF, 0x7527FE, 0xA01ACC, 0xB71E7B, 0xB53120, 0x994E00,
    0x6B6D00, 0x388700, 0x0C9300, 0x008F32, 0x007C8D, 0x000000, 0x000000, 0x000000,
    // $20-$2F
    0xFFFEFF, 0x64B0FF, 0x9290FF, 0xC676FF, 0xF36AFF, 0xFE6ECC, 0xFE8170, 0xEA9E22,
    0xBCBE00, 0x88D800, 0x5CE430, 0x45E082, 0x48CDDE, 0x4F4F4F, 0x000000, 0x000000,
    // $30-$3F
    0xFFFEFF, 0xC0DFFF, 0xD3D2FF, 0xE8C8FF, 0xFBC2FF, 0xFEC4EA, 0xFECCC5, 0xF7D8A5,
    0xE4E594, 0xCFEF96, 0xBDF4AB, 0xB3F3CC, 0xB5EBF2, 0xB8B8B8, 0x000000, 0x000000,
];

/// Bit-staggering table for pattern decode
///
/// Bit `i` of the index lands on bit `2 * i` of the entry, so a tile row is
/// decoded as `STAGGERED[lo] | STAGGERED[hi] << 1`: a u16 holding eight 2-bit
/// pixels, leftmost pixel in bits 15-14.
pub static STAGGERED: [u16; 256] = build_staggered();

/// Bit-reversal table (bit 0 <-> bit 7, bit 1 <-> bit 6, ...)
pub static FLIP_BITS: [u8; 256] = build_flip_bits();

const fn build_staggered() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut value = 0;
    while value < 256 {
        let mut staggered = 0u16;
        let mut bit = 0;
        while bit < 8 {
            if value & (1 << bit) != 0 {
                staggered |= 1 << (bit * 2);
            }
            bit += 1;
        }
        table[value] = staggered;
        value += 1;
    }
    table
}

const fn build_flip_bits() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut value = 0;
    while value < 256 {
        table[value] = (value as u8).reverse_bits();
        value += 1;
    }
    table
}

/// Convert a NES color index to RGB color
///
/// # Arguments
/// * `index` - Color index (only the low 6 bits are used)
///
/// # Returns
/// 32-bit RGB color value (0xRRGGBB)
#[inline]
pub fn palette_to_rgb(index: u8) -> u32 {
    NES_PALETTE[(index & 0x3F) as usize]
}

/// Convert NES color index directly to RGBA bytes
///
/// # Arguments
/// * `index` - Color index (only the low 6 bits are used)
///
/// # Returns
/// Array of [R, G, B, A] bytes with alpha fully opaque
#[inline]
pub fn palette_to_rgba(index: u8) -> [u8; 4] {
    let rgb = palette_to_rgb(index);
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF]
}

/// Decode one tile row from its two bit planes
#[inline]
pub fn decode_pattern_row(lo: u8, hi: u8) -> u16 {
    STAGGERED[lo as usize] | (STAGGERED[hi as usize] << 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_to_rgb_masks_index() {
        assert_eq!(palette_to_rgb(0x00), 0x666666);
        assert_eq!(palette_to_rgb(0x30), 0xFFFEFF);
        assert_eq!(palette_to_rgb(0x40), palette_to_rgb(0x00));
    }

    #[test]
    fn test_palette_to_rgba() {
        assert_eq!(palette_to_rgba(0x00), [0x66, 0x66, 0x66, 0xFF]);
        assert_eq!(palette_to_rgba(0x21), [0x64, 0xB0, 0xFF, 0xFF]);
    }

    #[test]
    fn test_staggered_spreads_bits() {
        assert_eq!(STAGGERED[0x00], 0x0000);
        assert_eq!(STAGGERED[0x01], 0x0001);
        assert_eq!(STAGGERED[0x80], 0x4000);
        assert_eq!(STAGGERED[0xFF], 0x5555);
        assert_eq!(STAGGERED[0xA5], 0x4411);
    }

    #[test]
    fn test_flip_bits() {
        assert_eq!(FLIP_BITS[0x01], 0x80);
        assert_eq!(FLIP_BITS[0xF0], 0x0F);
        assert_eq!(FLIP_BITS[0xA5], 0xA5);
        assert_eq!(FLIP_BITS[0x12], 0x48);
    }

    #[test]
    fn test_decode_pattern_row_leftmost_pixel_in_high_bits() {
        // Plane 0 sets the leftmost pixel, plane 1 the rightmost
        let row = decode_pattern_row(0x80, 0x01);
        assert_eq!(row >> 14, 1);
        assert_eq!(row & 3, 2);

        // Both planes set: color 3 everywhere
        assert_eq!(decode_pattern_row(0xFF, 0xFF), 0xFFFF);
    }
}
