// NES Emulator Library
// Core library for the nesemu emulator: 6502 CPU, bus and mappers, and a
// scanline-timeline PPU, driven by the `Emulator` orchestrator.

// Public modules
pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod emulator;
pub mod input;
pub mod ppu;

// Re-export main types for convenience
pub use apu::{AudioUnit, ChannelType, RegisterApu};
pub use bus::{Bus, Handler, MemoryMappedDevice, OPEN_BUS};
pub use cartridge::{Cartridge, INesError, INesHeader, Mapper, MapperError, Mirroring};
pub use cpu::Cpu;
pub use debug::{LogLevel, Logger, TraceEntry};
pub use emulator::{Emulator, EmulatorConfig, LoadError, SpeedMode};
pub use input::ControllerPorts;
pub use ppu::{HEvent, Ppu, Timeline};
