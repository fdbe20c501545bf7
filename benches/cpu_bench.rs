// CPU Benchmarks
// Performance benchmarks for instruction dispatch and whole-frame execution

use criterion::{criterion_group, criterion_main, Criterion};
use nesemu::cartridge::create_mapper;
use nesemu::{Bus, Cartridge, Cpu, Emulator, Mirroring};
use std::hint::black_box;

/// Bus with a 32KB NROM cartridge whose PRG repeats `pattern` and whose
/// reset vector points at $8000
fn bus_with_pattern(pattern: &[u8]) -> Bus {
    let mut prg: Vec<u8> = pattern.iter().copied().cycle().take(0x8000).collect();
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;

    let cartridge = Cartridge::new(prg, vec![0; 0x2000], 0, Mirroring::Horizontal);
    let mapper = create_mapper(&cartridge).expect("NROM is supported");
    let mut bus = Bus::new();
    bus.insert_cartridge(mapper, cartridge.chr_rom);
    bus
}

/// Benchmark single instructions
///
/// The PC is rewound whenever it nears the vectors so every iteration runs
/// the same opcode.
fn bench_cpu_instructions(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_instructions");

    let cases: [(&str, &[u8]); 6] = [
        ("nop", &[0xEA]),
        ("lda_immediate", &[0xA9, 0x42]),
        ("adc_immediate", &[0x69, 0x01]),
        ("sta_absolute", &[0x8D, 0x00, 0x02]),
        ("lda_indirect_y", &[0xB1, 0x10]),
        ("inc_zero_page", &[0xE6, 0x10]),
    ];

    for (name, pattern) in cases {
        group.bench_function(name, |b| {
            let mut bus = bus_with_pattern(pattern);
            let mut cpu = Cpu::new();
            cpu.reset(&mut bus);

            b.iter(|| {
                if cpu.pc >= 0xFF00 {
                    cpu.pc = 0x8000;
                }
                black_box(cpu.step(black_box(&mut bus)));
            });
        });
    }

    group.bench_function("jmp_absolute", |b| {
        let mut bus = bus_with_pattern(&[0x4C, 0x00, 0x80]);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        b.iter(|| {
            black_box(cpu.step(black_box(&mut bus)));
        });
    });

    group.finish();
}

/// Benchmark a short loop mixing loads, arithmetic, stores and a branch
fn bench_instruction_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_sequences");

    #[rustfmt::skip]
    let program = [
        0xA2, 0x00,       // LDX #0
        0xBD, 0x00, 0x03, // loop: LDA $0300,X
        0x18,             // CLC
        0x69, 0x01,       // ADC #1
        0x9D, 0x00, 0x03, // STA $0300,X
        0xE8,             // INX
        0xD0, 0xF4,       // BNE loop
        0x4C, 0x00, 0x80, // JMP $8000
    ];

    group.bench_function("typical_sequence", |b| {
        let mut bus = bus_with_pattern(&program);
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        b.iter(|| {
            for _ in 0..100 {
                black_box(cpu.step(&mut bus));
            }
        });
    });

    group.finish();
}

/// Benchmark full emulator frames (CPU plus scanline-driven PPU)
fn bench_frame_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_execution");
    group.sample_size(20);

    let mut rom = vec![b'N', b'E', b'S', 0x1A, 2, 1, 0, 0];
    rom.resize(16, 0);
    let mut prg = vec![0xEA; 0x8000];
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;
    rom.extend_from_slice(&prg);
    rom.extend_from_slice(&[0; 0x2000]);

    group.bench_function("1000_cycles", |b| {
        let mut emulator = Emulator::new();
        emulator.load_rom(&rom).expect("benchmark ROM loads");

        b.iter(|| {
            emulator.reset();
            black_box(emulator.run_cycles(1000));
        });
    });

    group.bench_function("29781_cycles_one_frame", |b| {
        let mut emulator = Emulator::new();
        emulator.load_rom(&rom).expect("benchmark ROM loads");

        b.iter(|| {
            emulator.reset();
            black_box(emulator.run_cycles(29781));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cpu_instructions,
    bench_instruction_sequence,
    bench_frame_execution
);
criterion_main!(benches);
