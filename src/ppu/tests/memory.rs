//! PPU Memory Tests
//!
//! Tests for the PPU address space: nametable mirroring, palette aliasing,
//! CHR-ROM / CHR-RAM access through the bank offsets, and VRAM dumps.

use super::*;

// ========================================
// Nametable Mirroring Tests
// ========================================

#[test]
fn test_vertical_mirroring() {
    let ppu = Ppu::new();
    assert_eq!(ppu.map_address(0x2000), 0x2000);
    assert_eq!(ppu.map_address(0x2400), 0x2400);
    assert_eq!(ppu.map_address(0x2800), 0x2000);
    assert_eq!(ppu.map_address(0x2C10), 0x2410);
}

#[test]
fn test_horizontal_mirroring() {
    let mut ppu = Ppu::new();
    ppu.set_mirror_mode(Mirroring::Horizontal);
    assert_eq!(ppu.map_address(0x2000), 0x2000);
    assert_eq!(ppu.map_address(0x2400), 0x2000);
    assert_eq!(ppu.map_address(0x2800), 0x2400);
    assert_eq!(ppu.map_address(0x2C10), 0x2410);
}

#[test]
fn test_single_screen_mirroring() {
    let mut ppu = Ppu::new();
    ppu.set_mirror_mode(Mirroring::SingleScreenLower);
    for base in [0x2000, 0x2400, 0x2800, 0x2C00] {
        assert_eq!(ppu.map_address(base + 5), 0x2005);
    }

    ppu.set_mirror_mode(Mirroring::SingleScreenUpper);
    for base in [0x2000, 0x2400, 0x2800, 0x2C00] {
        assert_eq!(ppu.map_address(base + 5), 0x2405);
    }
}

#[test]
fn test_four_screen_keeps_pages_distinct() {
    let mut ppu = Ppu::new();
    ppu.set_mirror_mode(Mirroring::FourScreen);
    for base in [0x2000, 0x2400, 0x2800, 0x2C00] {
        assert_eq!(ppu.map_address(base), base);
    }
}

#[test]
fn test_3000_mirrors_2000() {
    let mut ppu = Ppu::new();
    write_vram(&mut ppu, 0x3005, &[0x42]);
    assert_eq!(ppu.vram[0x2005], 0x42);
}

#[test]
fn test_mirrored_write_visible_through_both_pages() {
    let mut ppu = Ppu::new();
    ppu.set_mirror_mode(Mirroring::Horizontal);
    write_vram(&mut ppu, 0x2410, &[0x99]);

    set_vram_addr(&mut ppu, 0x2010);
    ppu.read(PPUDATA);
    assert_eq!(ppu.read(PPUDATA), 0x99);
}

// ========================================
// Palette Tests
// ========================================

#[test]
fn test_palette_repeats_every_32_bytes() {
    let ppu = Ppu::new();
    assert_eq!(ppu.map_address(0x3F25), 0x3F05);
    assert_eq!(ppu.map_address(0x3FE1), 0x3F01);
}

#[test]
fn test_sprite_backdrop_entries_alias_background() {
    let mut ppu = Ppu::new();
    for (alias, target) in [(0x3F10, 0x3F00), (0x3F14, 0x3F04), (0x3F18, 0x3F08), (0x3F1C, 0x3F0C)] {
        assert_eq!(ppu.map_address(alias), target);
    }

    write_vram(&mut ppu, 0x3F10, &[0x21]);
    assert_eq!(ppu.palette_entry(0x00), 0x21);
}

#[test]
fn test_non_backdrop_sprite_entries_are_separate() {
    let ppu = Ppu::new();
    assert_eq!(ppu.map_address(0x3F11), 0x3F11);
    assert_eq!(ppu.map_address(0x3F1F), 0x3F1F);
}

// ========================================
// Pattern Memory Tests
// ========================================

#[test]
fn test_chr_rom_read_through_ppudata() {
    let chr: Vec<u8> = (0..0x2000).map(|i| (i & 0xFF) as u8).collect();
    let mut ppu = ppu_with_chr(chr);

    set_vram_addr(&mut ppu, 0x0123);
    ppu.read(PPUDATA);
    assert_eq!(ppu.read(PPUDATA), 0x23);
}

#[test]
fn test_chr_rom_writes_are_ignored() {
    let mut ppu = ppu_with_chr(vec![0x11; 0x2000]);
    write_vram(&mut ppu, 0x0010, &[0xFF]);
    assert_eq!(ppu.read_direct(0x0010), 0x11);
}

#[test]
fn test_chr_ram_write_and_read() {
    let mut ppu = Ppu::new();
    write_vram(&mut ppu, 0x1FF0, &[0xC3]);
    assert_eq!(ppu.read_direct(0x1FF0), 0xC3);
    assert_eq!(ppu.vram[0x1FF0], 0xC3);
}

#[test]
fn test_chr_bank_offset_selects_1k_bank() {
    let mut chr = vec![0u8; 0x8000];
    for (bank, chunk) in chr.chunks_mut(0x400).enumerate() {
        chunk.fill(bank as u8);
    }
    let mut ppu = ppu_with_chr(chr);

    ppu.set_chr_bank_offset(2, 17);
    assert_eq!(ppu.read_direct(0x0800), 17);
    assert_eq!(ppu.read_direct(0x0BFF), 17);
    assert_eq!(ppu.read_direct(0x0C00), 3);
}

#[test]
fn test_chr_bank_offsets_wrap_into_chr_size() {
    let mut ppu = ppu_with_chr(vec![0u8; 0x4000]);
    ppu.set_chr_bank_offset(0, 20);
    // 20KB wraps to 4KB in a 16KB CHR
    assert_eq!(ppu.chr_bank_offsets()[0], 0x1000);
}

#[test]
fn test_set_chr_bank_maps_8k() {
    let mut chr = vec![0u8; 0x8000];
    for (bank, chunk) in chr.chunks_mut(0x2000).enumerate() {
        chunk.fill(0x10 + bank as u8);
    }
    let mut ppu = ppu_with_chr(chr);

    ppu.set_chr_bank(3);
    assert_eq!(ppu.read_direct(0x0000), 0x13);
    assert_eq!(ppu.read_direct(0x1FFF), 0x13);
}

#[test]
fn test_chr_ram_offsets_stay_in_8k() {
    let mut ppu = Ppu::new();
    ppu.set_chr_bank_offset(0, 9);
    assert_eq!(ppu.chr_bank_offsets()[0], 0x0400);
}

// ========================================
// Dump Tests
// ========================================

#[test]
fn test_dump_vram_formats_lines_of_16() {
    let mut ppu = Ppu::new();
    let bytes: Vec<u8> = (0..20).collect();
    write_vram(&mut ppu, 0x2000, &bytes);

    let dump = ppu.dump_vram(0x2000, 20);
    let lines: Vec<&str> = dump.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2000: 00 01 02"));
    assert_eq!(lines[1], "2010: 10 11 12 13");
}

#[test]
fn test_dump_vram_follows_mirroring() {
    let mut ppu = Ppu::new();
    write_vram(&mut ppu, 0x2000, &[0xAB]);
    assert_eq!(ppu.dump_vram(0x2800, 1), "2800: AB");
}
