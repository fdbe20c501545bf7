// End-to-end tests driving the emulator with synthetic cartridges
//
// Each test builds a tiny iNES image in memory (see `common`), loads it and
// checks observable results: CPU registers, RAM, rendered pixels.

mod common;

use common::{emulator_with, run_frames, RomBuilder, CHR_BANK, CYCLES_PER_FRAME};
use nesemu::bus::Handler;
use nesemu::emulator::{Emulator, LoadError};
use nesemu::input::buttons;
use nesemu::ppu::tables::palette_to_rgba;
use nesemu::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};
use std::cell::RefCell;
use std::rc::Rc;

const FRAME_BYTES: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 4;

fn pixel(frame: &[u8], x: usize, y: usize) -> [u8; 4] {
    let i = (y * SCREEN_WIDTH + x) * 4;
    [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
}

#[test]
fn test_nop_cartridge_runs_straight_through() {
    let rom = RomBuilder::new(2).build();
    let mut emulator = emulator_with(&rom);
    assert_eq!(emulator.cpu().pc, 0x8000);

    // 16384 NOPs at 2 cycles each fill $8000-$BFFF
    let consumed = emulator.run_cycles(32768);
    assert_eq!(consumed, 32768);
    assert_eq!(emulator.cpu().pc, 0xC000);
    assert_eq!(emulator.cpu().cycles, 7 + 32768);
    assert_eq!(emulator.frame_count(), 1);
}

#[test]
fn test_program_draws_diagonal_tile() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x3F, 0x8D, 0x06, 0x20, // LDA #$3F / STA $2006
        0xA9, 0x00, 0x8D, 0x06, 0x20, // LDA #$00 / STA $2006
        0xA9, 0x0F, 0x8D, 0x07, 0x20, // backdrop black
        0xA9, 0x30, 0x8D, 0x07, 0x20, // color 1 white
        0xA9, 0x20, 0x8D, 0x06, 0x20, // LDA #$20 / STA $2006
        0xA9, 0x00, 0x8D, 0x06, 0x20, // LDA #$00 / STA $2006
        0xA9, 0x01, 0x8D, 0x07, 0x20, // tile 1 at the top-left corner
        0xA9, 0x00, 0x8D, 0x05, 0x20, // scroll (0, 0)
        0x8D, 0x05, 0x20,
        0xA9, 0x0A, 0x8D, 0x01, 0x20, // background on, left column shown
        0x4C, 0x30, 0x80,             // JMP $8030
    ];
    let mut chr = vec![0u8; CHR_BANK];
    for row in 0..8 {
        chr[16 + row] = 0x80 >> row;
    }
    let rom = RomBuilder::new(1).program(&program).chr(chr).build();
    let mut emulator = emulator_with(&rom);

    run_frames(&mut emulator, 2);
    let mut frame = vec![0u8; FRAME_BYTES];
    emulator.render(&mut frame);

    let white = palette_to_rgba(0x30);
    let black = palette_to_rgba(0x0F);
    for y in 0..8 {
        for x in 0..8 {
            let expected = if x == y { white } else { black };
            assert_eq!(pixel(&frame, x, y), expected, "pixel ({}, {})", x, y);
        }
    }
    assert_eq!(pixel(&frame, 8, 0), black);
    assert_eq!(pixel(&frame, 100, 100), black);
}

#[test]
fn test_controller_read_through_program() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x01, 0x8D, 0x16, 0x40, // strobe on
        0xA9, 0x00, 0x8D, 0x16, 0x40, // strobe off
        0xA2, 0x00,                   // LDX #0
        0xAD, 0x16, 0x40,             // loop: LDA $4016
        0x9D, 0x00, 0x02,             // STA $0200,X
        0xE8,                         // INX
        0xE0, 0x09,                   // CPX #9
        0xD0, 0xF5,                   // BNE loop
        0x4C, 0x17, 0x80,             // JMP $8017
    ];
    let rom = RomBuilder::new(1).program(&program).build();
    let mut emulator = emulator_with(&rom);
    emulator.set_pad_status(0, buttons::A | buttons::START);

    emulator.run_cycles(1000);

    let ram = emulator.bus().ram_contents();
    assert_eq!(
        &ram[0x200..0x209],
        &[0x41, 0x40, 0x40, 0x41, 0x40, 0x40, 0x40, 0x40, 0x41]
    );
}

#[test]
fn test_nmi_handler_runs_once_per_frame() {
    #[rustfmt::skip]
    let program = [
        0xA9, 0x80, 0x8D, 0x00, 0x20, // PPUCTRL: NMI on
        0x4C, 0x05, 0x80,             // JMP $8005
        0xE6, 0x00,                   // nmi: INC $00
        0x40,                         // RTI
    ];
    let rom = RomBuilder::new(1)
        .program(&program)
        .vector(0xFFFA, 0x8008)
        .build();
    let mut emulator = emulator_with(&rom);

    run_frames(&mut emulator, 3);
    emulator.run_cycles(100);

    assert_eq!(emulator.bus().ram_contents()[0], 3);
}

#[test]
fn test_mmc3_scanline_irq_reaches_cpu() {
    // Runs from the fixed bank at $C000
    #[rustfmt::skip]
    let program = [
        0xA9, 0x0A,                   // LDA #10
        0x8D, 0x00, 0xC0,             // IRQ latch
        0x8D, 0x01, 0xC0,             // reload
        0x8D, 0x01, 0xE0,             // enable
        0xA9, 0x08, 0x8D, 0x01, 0x20, // background on
        0x58,                         // CLI
        0x4C, 0x11, 0xC0,             // JMP $C011
        0x8D, 0x00, 0xE0,             // irq: acknowledge
        0x8D, 0x01, 0xE0,             // enable again
        0xE6, 0x00,                   // INC $00
        0x40,                         // RTI
    ];
    let rom = RomBuilder::new(2)
        .mapper(4)
        .program(&program)
        .vector(0xFFFC, 0xC000)
        .vector(0xFFFE, 0xC014)
        .build();
    let mut emulator = emulator_with(&rom);

    emulator.run_cycles(CYCLES_PER_FRAME);

    // One IRQ per 11 clocks (reload then 10 decrements), 241 clocks in the run
    let irqs = emulator.bus().ram_contents()[0];
    assert!((20..=22).contains(&irqs), "irqs = {}", irqs);
}

#[test]
fn test_every_supported_mapper_claims_cartridge_space() {
    for mapper in [0u8, 1, 2, 3, 4, 7] {
        let rom = RomBuilder::new(2)
            .mapper(mapper)
            .vector(0xFFFC, 0xC000)
            .chr(vec![0; CHR_BANK])
            .build();
        let emulator = emulator_with(&rom);
        let bus = emulator.bus();

        for addr in 0x6000..=0xFFFFu16 {
            assert_eq!(
                bus.read_handler(addr),
                Some(Handler::Cartridge),
                "mapper {} read ${:04X}",
                mapper,
                addr
            );
            assert_eq!(
                bus.write_handler(addr),
                Some(Handler::Cartridge),
                "mapper {} write ${:04X}",
                mapper,
                addr
            );
        }
        assert_eq!(bus.mapper().map(|m| m.number()), Some(mapper));
    }
}

#[test]
fn test_unsupported_mapper_keeps_previous_cartridge() {
    let mut emulator = emulator_with(&RomBuilder::new(1).build());
    emulator.run_cycles(100);
    let pc = emulator.cpu().pc;

    let result = emulator.load_rom(&RomBuilder::new(1).mapper(9).build());
    assert!(matches!(result, Err(LoadError::Mapper(_))));
    assert!(emulator.is_loaded());
    assert_eq!(emulator.cpu().pc, pc);
}

#[test]
fn test_vblank_callback_counts_down_budget() {
    let mut emulator = emulator_with(&RomBuilder::new(1).build());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    emulator.set_vblank_callback(move |left| sink.borrow_mut().push(left));

    emulator.run_cycles(CYCLES_PER_FRAME * 4);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 4);
    assert_eq!(*seen.last().expect("at least one vblank"), 0);
    assert!(seen.windows(2).all(|w| w[0] == w[1] + 1));
}

#[test]
fn test_empty_emulator_runs_without_cartridge() {
    let mut emulator = Emulator::new();
    assert!(!emulator.is_loaded());
    // Reset vector reads open bus, so execution starts at $0000 (BRK)
    emulator.run_cycles(1000);
    assert!(emulator.cpu().cycles >= 1000);
}
